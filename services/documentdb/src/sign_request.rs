use crate::Credential;
use azrest_core::hash::sign;
use azrest_core::Result;
use http::Method;
use log::debug;

/// Construct the string to sign of the resource scheme.
///
/// ## Format
///
/// ```text
/// lowercase(
///     VERB + "\n" +
///     ResourceType + "\n" +
///     ResourceId + "\n" +
///     x-ms-date + "\n" +
///     "" + "\n"
/// )
/// ```
///
/// `date` must be the exact value sent in `x-ms-date`.
pub fn string_to_sign(verb: &Method, resource_type: &str, resource_id: &str, date: &str) -> String {
    let s = format!("{verb}\n{resource_type}\n{resource_id}\n{date}\n\n").to_lowercase();
    debug!("string to sign: {:?}", &s);
    s
}

/// Build the `Authorization` header value for a request.
///
/// The value is the form-urlencoded `type=master&ver=1.0&sig={signature}`.
pub fn authorization(
    credential: &Credential,
    verb: &Method,
    resource_type: &str,
    resource_id: &str,
    date: &str,
) -> Result<String> {
    let string_to_sign = string_to_sign(verb, resource_type, resource_id, date);
    let signature = sign(&credential.master_key, &string_to_sign)?;
    let token = format!("type=master&ver=1.0&sig={signature}");
    Ok(form_urlencoded::byte_serialize(token.as_bytes()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrest_core::ErrorKind;
    use pretty_assertions::assert_eq;

    const DATE: &str = "Tue, 01 Mar 2022 08:02:04 GMT";

    fn credential() -> Credential {
        // base64("documentdb-master-key")
        Credential::new("account", "ZG9jdW1lbnRkYi1tYXN0ZXIta2V5")
    }

    #[test]
    fn test_string_to_sign() {
        assert_eq!(
            string_to_sign(&Method::GET, "dbs", "D1", DATE),
            "get\ndbs\nd1\ntue, 01 mar 2022 08:02:04 gmt\n\n"
        );
        assert_eq!(
            string_to_sign(&Method::POST, "dbs", "", DATE),
            "post\ndbs\n\ntue, 01 mar 2022 08:02:04 gmt\n\n"
        );
    }

    #[test]
    fn test_authorization() {
        let value = authorization(&credential(), &Method::GET, "dbs", "D1", DATE).unwrap();
        assert_eq!(
            value,
            "type%3Dmaster%26ver%3D1.0%26sig%3Dt5czAMybQLLyAe52eVgmEs%2FCPG7Lm4odGIaHsRPJkjc%3D"
        );
    }

    #[test]
    fn test_authorization_is_deterministic_and_sensitive() {
        let cred = credential();
        let base = authorization(&cred, &Method::GET, "dbs", "D1", DATE).unwrap();
        assert_eq!(
            base,
            authorization(&cred, &Method::GET, "dbs", "D1", DATE).unwrap()
        );

        for other in [
            authorization(&cred, &Method::PUT, "dbs", "D1", DATE),
            authorization(&cred, &Method::GET, "colls", "D1", DATE),
            authorization(&cred, &Method::GET, "dbs", "D2", DATE),
            authorization(&cred, &Method::GET, "dbs", "D1", "Tue, 01 Mar 2022 08:02:05 GMT"),
        ] {
            assert_ne!(base, other.unwrap());
        }
    }

    #[test]
    fn test_authorization_rejects_bad_key() {
        let cred = Credential::new("account", "not base64!");
        let err = authorization(&cred, &Method::GET, "dbs", "D1", DATE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::SigningFailed);
    }
}

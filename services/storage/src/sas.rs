use crate::client::encode_path;
use crate::constants::STORAGE_VERSION;
use crate::Credential;
use azrest_core::hash::sign;
use azrest_core::time::{format_date, format_iso8601, now, DateTime};
use azrest_core::Result;
use chrono::TimeDelta;
use http::Uri;
use log::debug;

/// Builder of a service shared access signature for a container or a blob.
///
/// - [Create a service SAS](https://learn.microsoft.com/en-us/rest/api/storageservices/create-service-sas)
///
/// ```
/// use azrest_storage::{Credential, SharedAccessSignature};
///
/// let cred = Credential::new("acct", "c3RvcmFnZS1hY2NvdW50LWtleQ==");
/// let url = SharedAccessSignature::new("images")
///     .with_blob("logo.png")
///     .with_permissions("r")
///     .signed_url(&cred, "https://acct.blob.core.windows.net")
///     .unwrap();
/// assert!(url.starts_with("https://acct.blob.core.windows.net/images/logo.png?sv=2014-02-14&sr=b&se="));
/// ```
#[derive(Debug, Clone)]
pub struct SharedAccessSignature {
    container: String,
    blob: Option<String>,
    permissions: String,
    start: Option<DateTime>,
    expiry: TimeDelta,
    long_format: bool,
    time: Option<DateTime>,
}

impl SharedAccessSignature {
    /// Create a read-only signature for `container`, valid for 24 hours.
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            blob: None,
            permissions: "r".to_string(),
            start: None,
            expiry: TimeDelta::hours(24),
            long_format: false,
            time: None,
        }
    }

    /// Scope the signature to a single blob.
    pub fn with_blob(mut self, blob: impl Into<String>) -> Self {
        self.blob = Some(blob.into());
        self
    }

    /// Set the signed permissions, like `r`, `rw` or `rwdl`.
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// Set an explicit start time.
    ///
    /// Without it the signature is valid from now on and `st` is not sent.
    pub fn with_start(mut self, start: DateTime) -> Self {
        self.start = Some(start);
        self
    }

    /// Set how long the signature stays valid after the start time.
    pub fn with_expiry(mut self, expiry: TimeDelta) -> Self {
        self.expiry = expiry;
        self
    }

    /// Format times as `yyyy-MM-ddTHH:mm:ssZ` instead of `yyyy-MM-dd`.
    pub fn with_long_format(mut self, long_format: bool) -> Self {
        self.long_format = long_format;
        self
    }

    /// Specify the current time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    fn format(&self, t: DateTime) -> String {
        if self.long_format {
            format_iso8601(t)
        } else {
            format_date(t)
        }
    }

    /// Build the query pairs `sv, sr, st?, se, sp, sig` for the resource at
    /// `resource_path`, which is the unencoded uri path of the resource.
    pub fn token(&self, cred: &Credential, resource_path: &str) -> Result<Vec<(String, String)>> {
        let start = self.start.map(|v| self.format(v));
        let expiry = self.format(self.start.or(self.time).unwrap_or_else(now) + self.expiry);
        let signed_resource = if self.blob.is_some() { "b" } else { "c" };

        let string_to_sign = format!(
            "{}\n{}\n{}\n/{}{}\n\n{}\n\n\n\n\n",
            self.permissions,
            start.as_deref().unwrap_or_default(),
            expiry,
            cred.account_name,
            resource_path,
            STORAGE_VERSION,
        );
        debug!("string to sign: {}", &string_to_sign);
        let signature = sign(&cred.account_key, &string_to_sign)?;

        let mut elements = vec![
            ("sv".to_string(), STORAGE_VERSION.to_string()),
            ("sr".to_string(), signed_resource.to_string()),
        ];
        if let Some(start) = start {
            elements.push(("st".to_string(), urlencoded(&start)));
        }
        elements.push(("se".to_string(), urlencoded(&expiry)));
        elements.push(("sp".to_string(), urlencoded(&self.permissions)));
        elements.push(("sig".to_string(), urlencoded(&signature)));

        Ok(elements)
    }

    /// Build the signed url of the resource under `endpoint`.
    pub fn signed_url(&self, cred: &Credential, endpoint: &str) -> Result<String> {
        let endpoint = endpoint.trim_end_matches('/');
        let base_path = endpoint.parse::<Uri>()?.path().trim_end_matches('/').to_string();

        let mut resource_path = format!("{base_path}/{}", self.container);
        let mut url = format!("{endpoint}/{}", encode_path(&self.container));
        if let Some(blob) = &self.blob {
            resource_path.push('/');
            resource_path.push_str(blob);
            url.push('/');
            url.push_str(&encode_path(blob));
        }

        let token = self.token(cred, &resource_path)?;
        for (i, (k, v)) in token.iter().enumerate() {
            url.push(if i == 0 { '?' } else { '&' });
            url.push_str(k);
            url.push('=');
            url.push_str(v);
        }
        Ok(url)
    }
}

fn urlencoded(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

use std::collections::HashMap;

use azrest_core::{Error, Result};

use crate::Config;

// Azurite defaults.
const DEVELOPMENT_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEVELOPMENT_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEVELOPMENT_BLOB_URI: &str = "http://127.0.0.1:10000";

/// Parses an [Azure connection string][1] for the blob service.
///
/// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
pub(crate) fn parse(conn_str: &str) -> Result<Config> {
    let key_values = parse_into_key_values(conn_str)?;

    if key_values.get("UseDevelopmentStorage").map(String::as_str) == Some("true") {
        let account_name = key_values
            .get("AccountName")
            .cloned()
            .unwrap_or_else(|| DEVELOPMENT_ACCOUNT_NAME.to_string());
        let account_key = key_values
            .get("AccountKey")
            .cloned()
            .unwrap_or_else(|| DEVELOPMENT_ACCOUNT_KEY.to_string());
        let proxy_uri = key_values
            .get("DevelopmentStorageProxyUri")
            .map(String::as_str)
            .unwrap_or(DEVELOPMENT_BLOB_URI);

        return Ok(Config {
            endpoint: Some(format!("{proxy_uri}/{account_name}")),
            account_name: Some(account_name),
            account_key: Some(account_key),
        });
    }

    Ok(Config {
        account_name: key_values.get("AccountName").cloned(),
        account_key: key_values.get("AccountKey").cloned(),
        endpoint: collect_endpoint(&key_values)?,
    })
}

fn parse_into_key_values(conn_str: &str) -> Result<HashMap<String, String>> {
    conn_str
        .trim()
        .replace('\n', "")
        .split(';')
        .filter(|field| !field.trim().is_empty())
        .map(|field| {
            let (key, value) = field.trim().split_once('=').ok_or_else(|| {
                Error::config_invalid(format!(
                    "invalid connection string, expected '=' in field: {field}"
                ))
            })?;
            Ok((key.to_string(), value.to_string()))
        })
        .collect()
}

/// `BlobEndpoint` wins, otherwise the endpoint is built from the account
/// name and the endpoint suffix.
fn collect_endpoint(key_values: &HashMap<String, String>) -> Result<Option<String>> {
    if let Some(endpoint) = key_values.get("BlobEndpoint") {
        return Ok(Some(endpoint.clone()));
    }

    let (Some(account_name), Some(suffix)) = (
        key_values.get("AccountName"),
        key_values.get("EndpointSuffix"),
    ) else {
        return Ok(None);
    };

    let protocol = key_values
        .get("DefaultEndpointsProtocol")
        .map(String::as_str)
        .unwrap_or("https");
    if protocol != "http" && protocol != "https" {
        return Err(Error::config_invalid(format!(
            "invalid DefaultEndpointsProtocol: {protocol}"
        )));
    }

    Ok(Some(format!("{protocol}://{account_name}.blob.{suffix}")))
}

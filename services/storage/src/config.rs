use crate::constants::*;
use crate::{connection_string, Credential};
use azrest_core::{Context, Error, Result};
use log::warn;

/// Config carries all the configuration for a blob storage client.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Config {
    /// `account_name` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_NAME`] or [`AZURE_STORAGE_ACCOUNT_NAME`]
    /// - connection string in [`AZURE_STORAGE_CONNECTION_STRING`]
    pub account_name: Option<String>,
    /// `account_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ACCOUNT_KEY`] or [`AZURE_STORAGE_ACCOUNT_KEY`]
    /// - connection string in [`AZURE_STORAGE_CONNECTION_STRING`]
    pub account_key: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZBLOB_ENDPOINT`]
    /// - connection string in [`AZURE_STORAGE_CONNECTION_STRING`]
    ///
    /// Defaults to `https://{account_name}.blob.core.windows.net`.
    pub endpoint: Option<String>,
}

impl Config {
    /// Load config from env, explicit fields win.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.account_name.is_none() {
            self.account_name = ctx
                .env_var(AZBLOB_ACCOUNT_NAME)
                .or_else(|| ctx.env_var(AZURE_STORAGE_ACCOUNT_NAME));
        }
        if self.account_key.is_none() {
            self.account_key = ctx
                .env_var(AZBLOB_ACCOUNT_KEY)
                .or_else(|| ctx.env_var(AZURE_STORAGE_ACCOUNT_KEY));
        }
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var(AZBLOB_ENDPOINT);
        }

        if let Some(conn_str) = ctx.env_var(AZURE_STORAGE_CONNECTION_STRING) {
            match connection_string::parse(&conn_str) {
                Ok(parsed) => self = self.merge(parsed),
                Err(e) => warn!("ignore {AZURE_STORAGE_CONNECTION_STRING}: {e}"),
            }
        }
        self
    }

    /// Parses an [Azure connection string][1] into a configuration object.
    ///
    /// The connection string doesn't have to carry every value, the user is
    /// still allowed to set the missing ones on the returned config.
    ///
    /// ```txt
    /// AccountName=mystorageaccount;
    /// AccountKey=Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==;
    /// BlobEndpoint=https://mystorageaccount.blob.core.windows.net
    /// ```
    ///
    /// [1]: https://learn.microsoft.com/en-us/azure/storage/common/storage-configure-connection-string
    pub fn try_from_connection_string(conn_str: &str) -> Result<Self> {
        connection_string::parse(conn_str)
    }

    /// Fill the fields still unset with values from `other`.
    fn merge(mut self, other: Config) -> Self {
        self.account_name = self.account_name.or(other.account_name);
        self.account_key = self.account_key.or(other.account_key);
        self.endpoint = self.endpoint.or(other.endpoint);
        self
    }

    pub(crate) fn credential(&self) -> Result<Credential> {
        let (Some(account_name), Some(account_key)) = (&self.account_name, &self.account_key)
        else {
            return Err(Error::config_invalid(
                "storage config requires account_name and account_key",
            ));
        };
        let cred = Credential::new(account_name, account_key);
        cred.check()?;
        Ok(cred)
    }

    pub(crate) fn endpoint(&self, account_name: &str) -> String {
        match &self.endpoint {
            Some(v) => v.trim_end_matches('/').to_string(),
            None => format!("https://{account_name}.blob.core.windows.net"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azrest_core::{ErrorKind, StaticEnv};
    use std::collections::HashMap;

    fn ctx(envs: &[(&str, &str)]) -> Context {
        Context::new().with_env(StaticEnv {
            envs: envs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect::<HashMap<_, _>>(),
        })
    }

    #[test]
    fn test_from_env_prefers_azblob() {
        let ctx = ctx(&[
            (AZBLOB_ACCOUNT_NAME, "azblob"),
            (AZURE_STORAGE_ACCOUNT_NAME, "storage"),
            (AZURE_STORAGE_ACCOUNT_KEY, "a2V5"),
        ]);
        let cfg = Config::default().from_env(&ctx);
        assert_eq!(cfg.account_name.as_deref(), Some("azblob"));
        assert_eq!(cfg.account_key.as_deref(), Some("a2V5"));
        assert_eq!(cfg.endpoint("azblob"), "https://azblob.blob.core.windows.net");
    }

    #[test]
    fn test_from_env_with_connection_string() {
        let ctx = ctx(&[
            (AZBLOB_ENDPOINT, "http://127.0.0.1:10000/acct/"),
            (
                AZURE_STORAGE_CONNECTION_STRING,
                "AccountName=acct;AccountKey=a2V5;BlobEndpoint=https://acct.blob.core.windows.net",
            ),
        ]);
        let cfg = Config::default().from_env(&ctx);
        assert_eq!(cfg.account_name.as_deref(), Some("acct"));
        assert_eq!(cfg.account_key.as_deref(), Some("a2V5"));
        assert_eq!(cfg.endpoint("acct"), "http://127.0.0.1:10000/acct");
    }

    #[test]
    fn test_explicit_fields_win() {
        let ctx = ctx(&[(AZBLOB_ACCOUNT_NAME, "env")]);
        let cfg = Config {
            account_name: Some("explicit".to_string()),
            ..Default::default()
        }
        .from_env(&ctx);
        assert_eq!(cfg.account_name.as_deref(), Some("explicit"));
    }

    #[test]
    fn test_credential_requires_key() {
        let cfg = Config {
            account_name: Some("acct".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.credential().unwrap_err().kind(), ErrorKind::ConfigInvalid);
    }
}

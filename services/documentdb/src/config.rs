use crate::constants::*;
use crate::{ConsistencyLevel, Credential};
use azrest_core::{Context, Error, Result};
use log::warn;

/// Config carries all the configuration for a DocumentDB client.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Config {
    /// `account` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_DOCUMENTDB_ACCOUNT`]
    pub account: Option<String>,
    /// `master_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_DOCUMENTDB_MASTER_KEY`]
    pub master_key: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_DOCUMENTDB_ENDPOINT`]
    ///
    /// Defaults to `https://{account}.documents.azure.com`.
    pub endpoint: Option<String>,
    /// `consistency_level` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_DOCUMENTDB_CONSISTENCY_LEVEL`]
    pub consistency_level: Option<ConsistencyLevel>,
}

impl Config {
    /// Load config from env, explicit fields win.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.account.is_none() {
            self.account = ctx.env_var(AZURE_DOCUMENTDB_ACCOUNT);
        }
        if self.master_key.is_none() {
            self.master_key = ctx.env_var(AZURE_DOCUMENTDB_MASTER_KEY);
        }
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var(AZURE_DOCUMENTDB_ENDPOINT);
        }
        if self.consistency_level.is_none() {
            if let Some(v) = ctx.env_var(AZURE_DOCUMENTDB_CONSISTENCY_LEVEL) {
                match v.parse() {
                    Ok(level) => self.consistency_level = Some(level),
                    Err(e) => warn!("ignore {AZURE_DOCUMENTDB_CONSISTENCY_LEVEL}: {e}"),
                }
            }
        }
        self
    }

    pub(crate) fn credential(&self) -> Result<Credential> {
        let (Some(account), Some(master_key)) = (&self.account, &self.master_key) else {
            return Err(Error::config_invalid(
                "documentdb config requires account and master_key",
            ));
        };
        let cred = Credential::new(account, master_key);
        cred.check()?;
        Ok(cred)
    }

    pub(crate) fn endpoint(&self, account: &str) -> String {
        match &self.endpoint {
            Some(v) => v.trim_end_matches('/').to_string(),
            None => format!("https://{account}.documents.azure.com"),
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
    fn test_from_env() {
        let ctx = ctx(&[
            (AZURE_DOCUMENTDB_ACCOUNT, "acct"),
            (AZURE_DOCUMENTDB_MASTER_KEY, "a2V5"),
            (AZURE_DOCUMENTDB_CONSISTENCY_LEVEL, "Session"),
        ]);
        let cfg = Config::default().from_env(&ctx);
        assert_eq!(cfg.account.as_deref(), Some("acct"));
        assert_eq!(cfg.master_key.as_deref(), Some("a2V5"));
        assert_eq!(cfg.consistency_level, Some(ConsistencyLevel::Session));
        assert_eq!(cfg.endpoint("acct"), "https://acct.documents.azure.com");
    }

    #[test]
    fn test_explicit_fields_win() {
        let ctx = ctx(&[
            (AZURE_DOCUMENTDB_ACCOUNT, "env"),
            (AZURE_DOCUMENTDB_ENDPOINT, "http://127.0.0.1:8081/"),
            (AZURE_DOCUMENTDB_CONSISTENCY_LEVEL, "nonsense"),
        ]);
        let cfg = Config {
            account: Some("explicit".to_string()),
            ..Default::default()
        }
        .from_env(&ctx);
        assert_eq!(cfg.account.as_deref(), Some("explicit"));
        assert_eq!(cfg.consistency_level, None);
        assert_eq!(cfg.endpoint("explicit"), "http://127.0.0.1:8081");
    }

    #[test]
    fn test_credential_requires_key() {
        let cfg = Config {
            account: Some("acct".to_string()),
            ..Default::default()
        };
        assert_eq!(cfg.credential().unwrap_err().kind(), ErrorKind::ConfigInvalid);
    }
}

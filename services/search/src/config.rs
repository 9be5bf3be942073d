use crate::constants::*;
use crate::Credential;
use azrest_core::{Context, Error, Result};

/// Config carries all the configuration for a search client.
#[derive(Clone, Default)]
#[cfg_attr(test, derive(Debug, PartialEq))]
pub struct Config {
    /// `service` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_SEARCH_SERVICE`]
    pub service: Option<String>,
    /// `api_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_SEARCH_API_KEY`]
    pub api_key: Option<String>,
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`AZURE_SEARCH_ENDPOINT`]
    ///
    /// Defaults to `https://{service}.search.windows.net`.
    pub endpoint: Option<String>,
}

impl Config {
    /// Load config from env, explicit fields win.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if self.service.is_none() {
            self.service = ctx.env_var(AZURE_SEARCH_SERVICE);
        }
        if self.api_key.is_none() {
            self.api_key = ctx.env_var(AZURE_SEARCH_API_KEY);
        }
        if self.endpoint.is_none() {
            self.endpoint = ctx.env_var(AZURE_SEARCH_ENDPOINT);
        }
        self
    }

    pub(crate) fn credential(&self) -> Result<Credential> {
        let Some(api_key) = &self.api_key else {
            return Err(Error::config_invalid("search config requires api_key"));
        };
        let cred = Credential::new(api_key);
        cred.check()?;
        Ok(cred)
    }

    pub(crate) fn endpoint(&self) -> Result<String> {
        match (&self.endpoint, &self.service) {
            (Some(v), _) => Ok(v.trim_end_matches('/').to_string()),
            (None, Some(service)) => Ok(format!("https://{service}.search.windows.net")),
            (None, None) => Err(Error::config_invalid(
                "search config requires service or endpoint",
            )),
        }
    }
}

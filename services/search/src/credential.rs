use azrest_core::utils::Redact;
use azrest_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// Credential holds the admin or query key of a search service.
#[derive(Default, Clone)]
pub struct Credential {
    /// Key sent in the `api-key` header.
    pub api_key: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &Redact::from(&self.api_key))
            .finish()
    }
}

impl Credential {
    /// Create a new credential.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(Error::config_invalid("search credential requires an api key"));
        }
        Ok(())
    }
}

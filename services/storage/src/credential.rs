use azrest_core::utils::Redact;
use azrest_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// Credential holds the account name and the shared key of a storage account.
#[derive(Default, Clone)]
pub struct Credential {
    /// Storage account name.
    pub account_name: String,
    /// Base64 encoded account key.
    pub account_key: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account_name", &self.account_name)
            .field("account_key", &Redact::from(&self.account_key))
            .finish()
    }
}

impl Credential {
    /// Create a new credential.
    pub fn new(account_name: impl Into<String>, account_key: impl Into<String>) -> Self {
        Self {
            account_name: account_name.into(),
            account_key: account_key.into(),
        }
    }

    pub(crate) fn check(&self) -> Result<()> {
        if self.account_name.is_empty() || self.account_key.is_empty() {
            return Err(Error::config_invalid(
                "storage credential requires both account name and account key",
            ));
        }
        Ok(())
    }
}

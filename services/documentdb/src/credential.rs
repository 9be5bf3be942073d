use azrest_core::utils::Redact;
use azrest_core::{Error, Result};
use std::fmt::{Debug, Formatter};

/// Credential holds the account name and the master key of a DocumentDB account.
#[derive(Default, Clone)]
pub struct Credential {
    /// DocumentDB account name.
    pub account: String,
    /// Base64 encoded master key.
    pub master_key: String,
}

impl Debug for Credential {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("account", &self.account)
            .field("master_key", &Redact::from(&self.master_key))
            .finish()
    }
}

impl Credential {
    /// Create a new credential.
    pub fn new(account: impl Into<String>, master_key: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            master_key: master_key.into(),
        }
    }

    /// Returns an error if either part of the credential is empty.
    pub(crate) fn check(&self) -> Result<()> {
        if self.account.is_empty() || self.master_key.is_empty() {
            return Err(Error::config_invalid(
                "documentdb credential requires both account and master key",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_master_key() {
        let cred = Credential::new("account", "c2VjcmV0LW1hc3Rlci1rZXktdmFsdWU=");
        let s = format!("{cred:?}");
        assert!(s.contains("account"));
        assert!(!s.contains("c2VjcmV0LW1hc3Rlci1rZXktdmFsdWU="));
        assert!(s.contains("c2V***WU="));
    }

    #[test]
    fn test_check() {
        assert!(Credential::new("a", "k").check().is_ok());
        assert!(Credential::new("", "k").check().is_err());
        assert!(Credential::default().check().is_err());
    }
}

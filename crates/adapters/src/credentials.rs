//! Credential sources resolved at call time

use instapost_domain::ValidationError;
use secrecy::{ExposeSecret, SecretString};

/// Where an adapter reads a credential from
pub enum Credential {
    /// Environment variable, read on every call
    Env(String),
    /// Value injected up front, e.g. from the config file
    Fixed { name: String, value: SecretString },
}

impl Credential {
    pub fn env(name: impl Into<String>) -> Self {
        Credential::Env(name.into())
    }

    pub fn fixed(name: impl Into<String>, value: SecretString) -> Self {
        Credential::Fixed {
            name: name.into(),
            value,
        }
    }

    /// Name used in error messages
    pub fn name(&self) -> &str {
        match self {
            Credential::Env(name) => name,
            Credential::Fixed { name, .. } => name,
        }
    }

    /// Current value, or `None` when unset or blank
    pub fn lookup(&self) -> Option<SecretString> {
        let value = match self {
            Credential::Env(name) => std::env::var(name).ok()?,
            Credential::Fixed { value, .. } => value.expose_secret().to_string(),
        };
        let value = value.trim();
        (!value.is_empty()).then(|| SecretString::new(value.into()))
    }

    /// Current value; a missing credential is a validation failure
    pub fn resolve(&self) -> Result<SecretString, ValidationError> {
        self.lookup().ok_or_else(|| ValidationError::MissingCredential {
            name: self.name().to_string(),
        })
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credential::Env(name) => f.debug_tuple("Env").field(name).finish(),
            Credential::Fixed { name, .. } => f
                .debug_struct("Fixed")
                .field("name", name)
                .field("value", &"[REDACTED]")
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_blank_is_missing() {
        let credential = Credential::fixed("LATE_API_KEY", SecretString::new("  ".into()));
        assert_eq!(
            credential.resolve().unwrap_err(),
            ValidationError::MissingCredential {
                name: "LATE_API_KEY".into()
            }
        );
    }

    #[test]
    fn test_fixed_value_is_trimmed() {
        let credential = Credential::fixed("KEY", SecretString::new(" abc ".into()));
        assert_eq!(credential.resolve().unwrap().expose_secret(), "abc");
    }

    #[test]
    fn test_unset_env_is_missing() {
        let credential = Credential::env("INSTAPOST_TEST_NEVER_SET_VARIABLE");
        assert!(credential.lookup().is_none());
        assert_eq!(credential.name(), "INSTAPOST_TEST_NEVER_SET_VARIABLE");
    }

    #[test]
    fn test_debug_redacts_value() {
        let credential = Credential::fixed("KEY", SecretString::new("hunter2".into()));
        assert!(!format!("{:?}", credential).contains("hunter2"));
    }
}

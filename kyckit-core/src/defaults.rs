use std::time::Duration;

use strum::{Display, EnumString};

/// Timeout applied to every backend call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Backend deployment the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, uniffi::Enum, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Pre-production backend.
    Staging,
    /// Production backend.
    Production,
}

impl Environment {
    /// Returns the backend base URL of the environment.
    #[must_use]
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Staging => "https://api.staging.kyckit.app",
            Self::Production => "https://api.kyckit.app",
        }
    }
}

/// Connection settings for [`crate::api::ApiClient`].
#[derive(Debug, Clone, PartialEq, Eq, uniffi::Record)]
pub struct ClientConfig {
    /// Base URL, without a trailing slash (one is tolerated).
    pub base_url: String,
    /// Timeout applied to every call. A timed-out call is a network failure.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Default settings for `environment`.
    #[must_use]
    pub fn from_environment(environment: Environment) -> Self {
        Self::with_base_url(environment.base_url())
    }

    /// Default settings against a custom backend (local development, tests).
    #[must_use]
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Default client settings for `environment`.
#[uniffi::export]
#[must_use]
pub fn client_config_for(environment: Environment) -> ClientConfig {
    ClientConfig::from_environment(environment)
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn test_environment_from_str() {
        assert_eq!(Environment::from_str("staging").unwrap(), Environment::Staging);
        assert_eq!(
            Environment::from_str("production").unwrap(),
            Environment::Production
        );
        assert!(Environment::from_str("dev").is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::from_environment(Environment::Staging);
        assert_eq!(config.base_url, "https://api.staging.kyckit.app");
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
    }
}

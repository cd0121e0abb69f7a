//! Authentication configuration

use std::time::Duration;

use gatehouse_common::Config;

/// Authentication configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Upper bound for session lifetimes
    pub session_max_age: Duration,
    /// Whether session cookies carry the `Secure` attribute
    pub secure_cookies: bool,
}

impl From<&Config> for AuthConfig {
    fn from(config: &Config) -> Self {
        Self {
            session_max_age: config.session_max_age,
            secure_cookies: config.secure_cookies(),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_max_age: Duration::from_secs(7 * 24 * 60 * 60),
            secure_cookies: true,
        }
    }
}

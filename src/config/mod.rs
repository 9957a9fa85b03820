//! # Harness Configuration
//!
//! Fixed inputs for a test session: the base address of the service under
//! test and the credential pair exchanged for a bearer token. These are
//! configuration, not core logic; scenarios receive them through a
//! [`TestContext`](crate::scenario::TestContext) rather than reading ambient
//! global state.

use std::env;

/// Environment variable naming the service base URL.
pub const BASE_URL_VAR: &str = "SHELFCHECK_BASE_URL";
/// Environment variable naming the login email.
pub const EMAIL_VAR: &str = "SHELFCHECK_EMAIL";
/// Environment variable naming the login password.
pub const PASSWORD_VAR: &str = "SHELFCHECK_PASSWORD";

const DEFAULT_BASE_URL: &str = "http://localhost:3000";
const DEFAULT_EMAIL: &str = "john.doe@example.com";
const DEFAULT_PASSWORD: &str = "password123";

/// Base endpoint address plus test credentials, shared read-only by every
/// scenario in a run.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub base_url: String,
    pub email: String,
    pub password: String,
}

impl HarnessConfig {
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    /// Read the configuration from the environment, falling back to the
    /// seeded test account on the local service.
    pub fn from_env() -> Self {
        Self {
            base_url: env::var(BASE_URL_VAR).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            email: env::var(EMAIL_VAR).unwrap_or_else(|_| DEFAULT_EMAIL.to_string()),
            password: env::var(PASSWORD_VAR).unwrap_or_else(|_| DEFAULT_PASSWORD.to_string()),
        }
    }
}

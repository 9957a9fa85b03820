//! # Authentication
//!
//! Exchanges the configured credential pair for a bearer token. Every
//! mutating call needs the token; reads go out without it. Authentication
//! failure is fatal to the calling scenario and is never retried.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::HarnessConfig;
use crate::error::HarnessError;

/// Opaque bearer credential. Guaranteed non-empty by construction through
/// [`authenticate`]; test code may mint one directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

/// Obtain a bearer token for the configured account.
///
/// Any outcome other than a 200 with a non-empty `token` field is an
/// [`HarnessError::AuthenticationFailure`]. That covers rejected
/// credentials, transport failures, and malformed bodies alike. The caller
/// must abort before issuing any mutating call.
pub async fn authenticate(http: &Client, config: &HarnessConfig) -> Result<AuthToken, HarnessError> {
    if config.email.is_empty() || config.password.is_empty() {
        return Err(HarnessError::AuthenticationFailure(
            "email and password must be non-empty".into(),
        ));
    }

    let url = format!("{}/user/login", config.base_url.trim_end_matches('/'));
    let response = http
        .post(&url)
        .json(&LoginRequest {
            email: &config.email,
            password: &config.password,
        })
        .send()
        .await
        .map_err(|err| HarnessError::AuthenticationFailure(format!("login request failed: {err}")))?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(HarnessError::AuthenticationFailure(format!(
            "service rejected credentials for `{}` with status {status}",
            config.email
        )));
    }

    let body: LoginResponse = response.json().await.map_err(|err| {
        HarnessError::AuthenticationFailure(format!("malformed login response: {err}"))
    })?;

    if body.token.is_empty() {
        return Err(HarnessError::AuthenticationFailure(
            "service returned an empty token".into(),
        ));
    }

    Ok(AuthToken(body.token))
}

//! Bearer-token gate for analysis requests.
//!
//! When an access key is configured (and demo mode is off) the analysis
//! route requires `Authorization: Bearer <key>`. The check runs as
//! middleware, before the request body is read.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use narrative_common::config::Config;
use std::sync::Arc;

use crate::error::ApiError;

/// Access-key state shared across requests.
#[derive(Clone, Default)]
pub struct AuthGate {
    access_key: Option<Arc<String>>,
}

impl AuthGate {
    /// Gate requiring `key`.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            access_key: Some(Arc::new(key.into())),
        }
    }

    /// Gate that lets every request through.
    pub fn open() -> Self {
        Self::default()
    }

    /// Gate matching the configuration.
    pub fn from_config(config: &Config) -> Self {
        match &config.access.access_key {
            Some(key) if config.requires_api_key() => Self::new(key.clone()),
            _ => Self::open(),
        }
    }

    /// Whether requests must present a key.
    pub fn is_enabled(&self) -> bool {
        self.access_key.is_some()
    }

    /// Check an `Authorization` header value.
    pub fn authorize(&self, authorization: Option<&str>) -> Result<(), ApiError> {
        let Some(expected) = &self.access_key else {
            return Ok(());
        };

        let token = authorization
            .and_then(bearer_token)
            .ok_or(ApiError::Unauthorized)?;

        if constant_time_eq(token.as_bytes(), expected.as_bytes()) {
            Ok(())
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

/// Credentials of a `Bearer` authorization value; the scheme is matched
/// case-insensitively.
fn bearer_token(authorization: &str) -> Option<&str> {
    let (scheme, credentials) = authorization.trim_start().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(credentials.trim())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Authentication middleware.
pub async fn require_bearer(
    State(gate): State<AuthGate>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    if let Err(err) = gate.authorize(authorization) {
        tracing::warn!(
            path = %request.uri().path(),
            has_header = authorization.is_some(),
            "Rejected request without a valid access key"
        );
        return Err(err);
    }

    Ok(next.run(request).await)
}

//! Request-side types shared with the host application.
//!
//! The host's authentication layer inserts [`AuthenticatedUser`] into the
//! request extensions once a credential has been validated. The capture
//! middleware only reads it, so the auth layer must sit outside (be added
//! after) the capture layer.

use axum::http::{header, HeaderMap};

/// Identity of the caller, as established by the host's auth layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
}

impl AuthenticatedUser {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Whether the request carried any authorization credential.
pub fn has_authorization(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .is_some_and(|value| !value.is_empty())
}

/// Whether the body is declared as JSON.
pub fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with("application/json"))
}

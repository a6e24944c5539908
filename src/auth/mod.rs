//! Admin authorization
//!
//! Mutating endpoints ask an `Authorizer` whether the request headers carry
//! admin rights. The shipped policy is a single shared secret.

use axum::http::HeaderMap;

/// Header carrying the admin credential
pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Decides whether a request may perform admin operations
pub trait Authorizer: Send + Sync {
    fn is_admin(&self, headers: &HeaderMap) -> bool;
}

/// Static shared secret compared verbatim against `X-Admin-Key`
#[derive(Clone)]
pub struct SharedSecret {
    secret: String,
}

impl SharedSecret {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

impl Authorizer for SharedSecret {
    fn is_admin(&self, headers: &HeaderMap) -> bool {
        // HeaderMap lookups are case-insensitive
        headers
            .get(ADMIN_KEY_HEADER)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|key| key == self.secret)
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedSecret").finish_non_exhaustive()
    }
}

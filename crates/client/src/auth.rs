//! Auth-header seam for integration calls.

use async_trait::async_trait;

use crate::error::Result;

/// Produces the `Authorization` header value for an outgoing request.
///
/// Implementations typically read a session token; they are called once
/// per request so a refreshed token is picked up immediately.
#[async_trait]
pub trait AuthHeaderProvider: Send + Sync {
    async fn authorization(&self) -> Result<String>;
}

/// Fixed bearer token.
#[derive(Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BearerToken(***)")
    }
}

#[async_trait]
impl AuthHeaderProvider for BearerToken {
    async fn authorization(&self) -> Result<String> {
        Ok(format!("Bearer {}", self.0))
    }
}

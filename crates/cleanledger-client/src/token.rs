//! Bearer token sources
//!
//! Obtaining and refreshing tokens is the job of the identity provider;
//! the client only asks for the current one before each request.

use async_trait::async_trait;
use cleanledger_config::Config;

#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Current token, or `None` when signed out
    async fn token(&self) -> Option<String>;
}

/// A token fixed at startup
#[derive(Debug, Clone, Default)]
pub struct StaticTokenSource {
    token: Option<String>,
}

impl StaticTokenSource {
    pub fn new(token: Option<String>) -> Self {
        Self { token }
    }

    /// Token from `api.token`, falling back to the `api.token_env` variable
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_token())
    }
}

#[async_trait]
impl TokenSource for StaticTokenSource {
    async fn token(&self) -> Option<String> {
        self.token.clone()
    }
}

//! Persisted OAuth access credential

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::signature::TokenPair;

/// Long-lived access token issued by a completed handshake.
///
/// Stored as a single JSON document so a write either lands whole or not
/// at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub token: String,
    pub secret: String,
    pub user_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default = "Utc::now")]
    pub obtained_at: DateTime<Utc>,
}

impl Credential {
    pub fn new(
        token: impl Into<String>,
        secret: impl Into<String>,
        user_id: impl Into<String>,
    ) -> Self {
        Self {
            token: token.into(),
            secret: secret.into(),
            user_id: user_id.into(),
            username: None,
            obtained_at: Utc::now(),
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Token pair used to sign requests
    pub fn token_pair(&self) -> TokenPair {
        TokenPair {
            token: self.token.clone(),
            secret: self.secret.clone(),
        }
    }

    /// Username when known, otherwise the user id
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.user_id)
    }
}

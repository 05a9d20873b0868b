use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer session carrying the caller identity asserted by the upstream
/// identity provider
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Request to mint a session for an asserted identity
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSessionRequest {
    pub user_id: String,
    pub display_name: Option<String>,
}

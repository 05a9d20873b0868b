use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What a collaborator may do with a note
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Permission {
    View,
    Edit,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::View => "view",
            Permission::Edit => "edit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "view" => Some(Permission::View),
            "edit" => Some(Permission::Edit),
            _ => None,
        }
    }
}

impl Default for Permission {
    fn default() -> Self {
        Permission::View
    }
}

/// Collaborator record on a note, ordered by invitation time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    pub user_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub permission: Permission,
    pub joined_at: DateTime<Utc>,
}

/// Request to invite a collaborator.
///
/// Either `user_id` or `email` must be present; an email-only invitee gets
/// a deterministic synthesized user id (see [`email_user_id`]).
#[derive(Debug, Clone, Deserialize)]
pub struct InviteCollaboratorRequest {
    pub user_id: Option<String>,
    pub email: Option<String>,
    pub display_name: Option<String>,
    #[serde(default)]
    pub permission: Permission,
}

/// Request to change a collaborator's permission
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePermissionRequest {
    pub permission: Permission,
}

/// Synthesized user id for invitees known only by email address.
pub fn email_user_id(email: &str) -> String {
    format!("email:{}", email.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_permission_round_trip() {
        assert_eq!(Permission::from_str("view"), Some(Permission::View));
        assert_eq!(Permission::from_str("EDIT"), Some(Permission::Edit));
        assert_eq!(Permission::from_str("admin"), None);
        assert_eq!(Permission::Edit.as_str(), "edit");
    }

    #[test]
    fn test_email_user_id_is_deterministic() {
        assert_eq!(email_user_id("Bob@X.com "), "email:bob@x.com");
        assert_eq!(email_user_id("bob@x.com"), email_user_id("BOB@x.com"));
    }
}

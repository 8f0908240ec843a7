use serde::{Deserialize, Serialize};

/// Account role as reported by the server
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Developer,
    Manager,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Developer => "developer",
            Role::Manager => "manager",
            Role::Viewer => "viewer",
        }
    }

    /// Parses a role name, case-insensitive
    pub fn parse(value: &str) -> Option<Role> {
        match value.trim().to_lowercase().as_str() {
            "developer" => Some(Role::Developer),
            "manager" => Some(Role::Manager),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }

    /// Roles an account with this role may view the gallery as
    pub fn view_options(&self) -> &'static [Role] {
        match self {
            Role::Developer => &[Role::Developer, Role::Manager, Role::Viewer],
            Role::Manager => &[Role::Manager, Role::Viewer],
            Role::Viewer => &[],
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub role: Role,
    /// Role the user currently browses as, when it differs from `role`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub effective_role: Option<Role>,
}

impl User {
    pub fn effective_role(&self) -> Role {
        self.effective_role.unwrap_or(self.role)
    }

    pub fn is_developer(&self) -> bool {
        self.effective_role() == Role::Developer
    }

    /// Managers and developers may edit media
    pub fn is_manager(&self) -> bool {
        matches!(self.effective_role(), Role::Developer | Role::Manager)
    }
}

/// Credentials returned by a successful login
#[derive(Debug, Clone, PartialEq)]
pub struct SessionCredentials {
    pub server_url: String,
    pub user: User,
    pub token: String,
}

/// Account row shown in the control center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    pub username: String,
    pub role: Role,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessRequestStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedBy {
    pub id: i64,
    pub username: String,
}

/// Request from a guest asking for a viewer account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
    pub id: i64,
    pub username: String,
    pub status: AccessRequestStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub processed_at: Option<String>,
    #[serde(default)]
    pub processed_by: Option<ProcessedBy>,
    #[serde(default)]
    pub decision_note: Option<String>,
}

/// Wire payloads
#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct AccessRequestBody<'a> {
    pub username: &'a str,
    pub password: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ViewRoleBody {
    pub view_role: Option<Role>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct UserEnvelope {
    pub user: Option<User>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccessRequestEnvelope {
    pub request: AccessRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_effective_role_defaults_to_role() {
        let user: User =
            serde_json::from_str(r#"{"id": 1, "username": "alice", "role": "manager"}"#).unwrap();
        assert_eq!(user.effective_role(), Role::Manager);
        assert!(user.is_manager());
        assert!(!user.is_developer());
    }

    #[test]
    fn test_user_view_role_override() {
        let user: User = serde_json::from_str(
            r#"{"id": 1, "username": "dev", "role": "developer", "effective_role": "viewer"}"#,
        )
        .unwrap();
        assert_eq!(user.role, Role::Developer);
        assert!(!user.is_manager());
    }

    #[test]
    fn test_view_options() {
        assert_eq!(Role::Developer.view_options().len(), 3);
        assert_eq!(Role::Manager.view_options(), &[Role::Manager, Role::Viewer]);
        assert!(Role::Viewer.view_options().is_empty());
    }

    #[test]
    fn test_parse_role() {
        assert_eq!(Role::parse(" Manager "), Some(Role::Manager));
        assert_eq!(Role::parse("admin"), None);
    }
}

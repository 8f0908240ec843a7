use chrono::{DateTime, Utc};
use gallery_api::Role;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Stored session for one gallery server
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientSettings {
    pub id: i64,
    pub server_url: String,
    pub username: Option<String>,
    pub role: Option<Role>,
    pub session_token: Option<String>,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: String,
    pub updated_at: String,
}

impl ClientSettings {
    pub fn new(server_url: String) -> Self {
        Self {
            id: 0,
            server_url: server_url.trim_end_matches('/').to_string(),
            username: None,
            role: None,
            session_token: None,
            last_login: None,
            created_at: String::new(),
            updated_at: String::new(),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.session_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

impl<'r> TryFrom<&Row<'r>> for ClientSettings {
    type Error = rusqlite::Error;

    fn try_from(row: &Row<'r>) -> Result<Self, Self::Error> {
        let role_str: Option<String> = row.get(3)?;

        Ok(ClientSettings {
            id: row.get(0)?,
            server_url: row.get(1)?,
            username: row.get(2)?,
            role: role_str.as_deref().and_then(Role::parse),
            session_token: row.get(4)?,
            last_login: row.get(5)?,
            created_at: row.get(6)?,
            updated_at: row.get(7)?,
        })
    }
}

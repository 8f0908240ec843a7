use crate::error::AppError;
use crate::models::ClientSettings;
use gallery_api::SessionCredentials;
use rusqlite::{params, Connection, OptionalExtension};

const SELECT_SETTINGS: &str = "SELECT id, server_url, username, role, session_token, last_login, created_at, updated_at
     FROM client_settings";

/// Loads the stored settings for a server
pub fn load_settings(conn: &Connection, server_url: &str) -> Result<Option<ClientSettings>, AppError> {
    let mut stmt = conn.prepare(&format!("{} WHERE server_url = ?1", SELECT_SETTINGS))?;
    let settings = stmt
        .query_row(params![server_url.trim_end_matches('/')], |row| {
            ClientSettings::try_from(row)
        })
        .optional()?;
    Ok(settings)
}

/// Saves a fresh session, creating the row for the server if needed
pub fn save_session(conn: &Connection, credentials: &SessionCredentials) -> Result<i64, AppError> {
    let fresh = ClientSettings::new(credentials.server_url.clone());
    let now = chrono::Utc::now();

    if let Some(existing) = load_settings(conn, &fresh.server_url)? {
        conn.execute(
            "UPDATE client_settings
             SET username = ?1, role = ?2, session_token = ?3, last_login = ?4
             WHERE id = ?5",
            params![
                &credentials.user.username,
                credentials.user.role.as_str(),
                &credentials.token,
                now,
                existing.id,
            ],
        )?;
        Ok(existing.id)
    } else {
        conn.execute(
            "INSERT INTO client_settings (server_url, username, role, session_token, last_login)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                &fresh.server_url,
                &credentials.user.username,
                credentials.user.role.as_str(),
                &credentials.token,
                now,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }
}

/// Forgets the session token for a server but keeps the row
pub fn clear_session(conn: &Connection, server_url: &str) -> Result<(), AppError> {
    conn.execute(
        "UPDATE client_settings SET session_token = NULL WHERE server_url = ?1",
        params![server_url.trim_end_matches('/')],
    )?;
    Ok(())
}

pub mod schema;

use crate::error::AppError;
use rusqlite::Connection;
use std::path::Path;

/// Opens the settings database and brings its schema up to date
pub fn init_database(db_path: &Path) -> Result<Connection, AppError> {
    // Make sure the directory exists
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let conn = Connection::open(db_path)?;
    schema::init_schema(&conn)?;
    schema::create_update_triggers(&conn)?;

    log::debug!("Opened settings database at {}", db_path.display());
    Ok(conn)
}

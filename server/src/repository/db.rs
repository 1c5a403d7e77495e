//! Database Connection and Setup
//!
//! Manages the SQLite connection and schema migrations.

use std::path::Path;
use std::sync::Arc;

use rusqlite::{Connection, ErrorCode};
use tokio::sync::Mutex;

use crate::domain::{DomainError, DomainResult, SiblingKind};

/// Shared handle to the single SQLite connection
#[derive(Clone)]
pub struct DbState {
    pub conn: Arc<Mutex<Connection>>,
}

impl DbState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    /// Get a handle to the connection
    pub fn connection(&self) -> Arc<Mutex<Connection>> {
        self.conn.clone()
    }
}

/// Open (or create) the database at `db_path` and run migrations.
///
/// `:memory:` opens a private in-memory database.
pub async fn init_db(db_path: &Path) -> DomainResult<DbState> {
    let conn = Connection::open(db_path)
        .map_err(|e| DomainError::Internal(format!("Failed to open {}: {}", db_path.display(), e)))?;

    run_migrations(&conn)?;
    tracing::info!(path = %db_path.display(), "database ready");

    Ok(DbState::new(conn))
}

/// Run database migrations
fn run_migrations(conn: &Connection) -> DomainResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|e| DomainError::Internal(format!("Failed to enable foreign keys: {}", e)))?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS projects (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            slug TEXT UNIQUE,
            description TEXT,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )",
        (),
    )
    .map_err(map_db_error)?;

    // Parents first: quests reference zones
    for kind in SiblingKind::ALL {
        conn.execute(
            &format!(
                "CREATE TABLE IF NOT EXISTS {table} (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    {parent} INTEGER NOT NULL REFERENCES {parent_table}(id) ON DELETE CASCADE,
                    title TEXT NOT NULL,
                    description TEXT,
                    sort_order INTEGER NOT NULL CHECK (sort_order > 0),
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                )",
                table = kind.table(),
                parent = kind.parent_column(),
                parent_table = kind.parent_table(),
            ),
            (),
        )
        .map_err(map_db_error)?;

        conn.execute(
            &format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_{table}_{parent}_order ON {table}({parent}, sort_order)",
                table = kind.table(),
                parent = kind.parent_column(),
            ),
            (),
        )
        .map_err(map_db_error)?;
    }

    Ok(())
}

/// Translate a SQLite failure into a domain error.
///
/// Constraint violations (unique order, unique slug) become `Conflict`.
pub(crate) fn map_db_error(e: rusqlite::Error) -> DomainError {
    match &e {
        rusqlite::Error::SqliteFailure(err, _) if err.code == ErrorCode::ConstraintViolation => {
            DomainError::Conflict(e.to_string())
        }
        rusqlite::Error::QueryReturnedNoRows => DomainError::NotFound(e.to_string()),
        _ => DomainError::Internal(e.to_string()),
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

//! Document Store
//!
//! SQLite-backed storage for users, sales agents, leads and comments.
//!
//! # Schema Design
//!
//! Each collection is one table. List-valued lead fields (tags and comment
//! references) are JSON text columns so a lead row reads back as a whole
//! document. Emails are `UNIQUE`; a violation surfaces as
//! [`StoreError::UniqueViolation`].

mod agents;
mod comments;
pub mod filter;
mod leads;
mod users;

pub use filter::{FilterError, LeadFilter, LeadPredicate, LeadQuery};

use rusqlite::{types::Type, Connection, Row};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        password TEXT NOT NULL,
        created_at TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS sales_agents (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_sales_agents_name ON sales_agents(name);

    CREATE TABLE IF NOT EXISTS leads (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        source TEXT,
        sales_agent TEXT,
        status TEXT NOT NULL,
        tags TEXT NOT NULL DEFAULT '[]',
        time_to_close INTEGER,
        priority TEXT,
        closed_at TEXT,
        comments TEXT NOT NULL DEFAULT '[]',
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_leads_sales_agent ON leads(sales_agent);
    CREATE INDEX IF NOT EXISTS idx_leads_status ON leads(status);

    CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY,
        lead TEXT NOT NULL REFERENCES leads(id),
        author TEXT NOT NULL,
        comment_text TEXT NOT NULL,
        created_at TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_comments_lead ON comments(lead);
";

/// Shared handle to the document store.
///
/// Cloning is cheap; all clones share one connection guarded by an async
/// mutex, so store calls from concurrent requests are serialised.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a file-backed store and initialise the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "journal_mode", "WAL").ok();
        conn.pragma_update(None, "synchronous", "NORMAL").ok();
        Self::with_connection(conn)
    }

    /// Create an in-memory store (for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.execute_batch(SCHEMA)?;
        debug!("document store schema ready");
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }
}

/// Errors from the document store.
#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Serialization(serde_json::Error),
    /// A write would duplicate a value declared unique.
    UniqueViolation(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(e) => write!(f, "SQLite error: {}", e),
            Self::Serialization(e) => write!(f, "Serialization error: {}", e),
            Self::UniqueViolation(detail) => write!(f, "Unique constraint violated: {}", detail),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, detail) = &e {
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE {
                return Self::UniqueViolation(detail.clone().unwrap_or_default());
            }
        }
        Self::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e)
    }
}

/// Read a JSON-encoded string list column.
fn json_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Bind a whole id list as one JSON array parameter. Queries expand it with
/// `IN (SELECT value FROM json_each(?1))`, so the list length never counts
/// against SQLite's bound-variable limit.
fn id_list(ids: &[String]) -> Result<String, StoreError> {
    Ok(serde_json::to_string(ids)?)
}

pub mod firestore;
pub mod google_auth;
pub mod memory;
pub mod postgres;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::StoreConfig;
use crate::registration::{NewRecord, Receipt};

/// Append-only document collection holding registration records.
///
/// Implementations assign the identifier and the timestamp themselves; the
/// caller never supplies either.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    fn name(&self) -> &str;
    async fn add(&self, record: &NewRecord) -> Result<Receipt, StoreError>;
}

#[derive(Debug)]
pub enum StoreError {
    Auth(String),
    Transport(String),
    Rejected { status: u16, body: String },
    Malformed(String),
    Database(sqlx::Error),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Auth(msg) => write!(f, "Store authentication failed: {msg}"),
            StoreError::Transport(msg) => write!(f, "Store unreachable: {msg}"),
            StoreError::Rejected { status, body } => {
                write!(f, "Store rejected write ({status}): {body}")
            }
            StoreError::Malformed(msg) => write!(f, "Unexpected store response: {msg}"),
            StoreError::Database(err) => write!(f, "Database error: {err}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err)
    }
}

/// Construct the configured store. Called once at startup.
pub async fn connect(config: &StoreConfig) -> Result<Arc<dyn RegistrationStore>, String> {
    match config {
        StoreConfig::Firestore(fs) => {
            let store = firestore::FirestoreStore::new(fs)?;
            tracing::info!(
                project = %fs.project_id,
                database_url = %fs.database_url,
                collection = %fs.collection,
                "Using Firestore store"
            );
            Ok(Arc::new(store))
        }
        StoreConfig::Postgres { database_url } => {
            let store = postgres::PgStore::connect(database_url).await?;
            tracing::info!("Using Postgres store");
            Ok(Arc::new(store))
        }
        StoreConfig::Memory => {
            tracing::warn!("Using in-memory store, records are lost on restart");
            Ok(Arc::new(memory::MemoryStore::new()))
        }
    }
}

/// Leading part of an error body, for inclusion in error details.
pub(crate) fn excerpt(body: &str) -> String {
    const MAX_CHARS: usize = 300;
    let trimmed = body.trim();
    match trimmed.char_indices().nth(MAX_CHARS) {
        Some((idx, _)) => format!("{}...", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}

pub mod passwd;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use futures::stream::BoxStream;
use thiserror::Error;

pub use passwd::PasswdBackend;

/// Single-use password verifier yielded by the Username-Check handler.
///
/// Consumed by the PASS exchange whatever the outcome; the resolved boolean
/// replaces the success/failure continuation pair of older event-driven
/// designs.
pub type PasswordCheck = Box<dyn FnOnce(String) -> BoxFuture<'static, bool> + Send>;

/// One entry of a directory listing or file lookup.
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub is_directory: bool,
    pub filename: String,
    pub parent_path: String,
    pub length: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("file not found: {0}")]
    NotFound(String),
}

/// Callbacks the embedding application registers against the storage
/// backend. The core only performs lookups through this trait, never
/// mutates the registration.
#[async_trait]
pub trait EndpointHandlers: Send + Sync {
    /// Username-Check: `None` refuses the login outright, `Some` yields the
    /// password verifier stored on the session for the PASS exchange.
    async fn check_username(&self, username: &str) -> Option<PasswordCheck>;

    /// Directory-Listing: a finite, non-restartable sequence of entries for
    /// the LIST output.
    async fn list_directory(&self, current_dir: &str) -> BoxStream<'static, FileEntry>;

    /// File-Descriptor: metadata for a single pathname (MDTM).
    async fn describe_file(&self, pathname: &str) -> Result<FileEntry, LookupError>;
}

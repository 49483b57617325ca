use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use futures::FutureExt;
use log::warn;

use crate::core_registry::{EndpointHandlers, FileEntry, LookupError, PasswordCheck};

#[derive(Debug, Clone)]
struct PasswdEntry {
    username: String,
    password: String,
}

impl PasswdEntry {
    fn from_line(line: &str) -> Option<Self> {
        let (username, password) = line.split_once(':')?;
        Some(PasswdEntry {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

/// Static in-memory backend: `username:password` credential lines plus a
/// fixed set of file entries. Intended for the bundled binary and tests;
/// real deployments inject their own [`EndpointHandlers`].
pub struct PasswdBackend {
    entries: Vec<PasswdEntry>,
    files: Vec<FileEntry>,
}

impl PasswdBackend {
    pub fn new(credential_lines: &[String]) -> Self {
        let mut entries = Vec::new();
        for line in credential_lines {
            match PasswdEntry::from_line(line) {
                Some(entry) => entries.push(entry),
                None => warn!("Ignoring malformed credential line: {}", line),
            }
        }
        Self {
            entries,
            files: Vec::new(),
        }
    }

    pub fn with_files(mut self, files: Vec<FileEntry>) -> Self {
        self.files = files;
        self
    }
}

#[async_trait]
impl EndpointHandlers for PasswdBackend {
    async fn check_username(&self, username: &str) -> Option<PasswordCheck> {
        let entry = self.entries.iter().find(|e| e.username == username)?;
        let expected = entry.password.clone();
        Some(Box::new(move |password: String| {
            async move { password == expected }.boxed()
        }))
    }

    async fn list_directory(&self, _current_dir: &str) -> BoxStream<'static, FileEntry> {
        stream::iter(self.files.clone()).boxed()
    }

    async fn describe_file(&self, pathname: &str) -> Result<FileEntry, LookupError> {
        let name = pathname.rsplit('/').next().unwrap_or(pathname);
        self.files
            .iter()
            .find(|f| f.filename == name)
            .cloned()
            .ok_or_else(|| LookupError::NotFound(pathname.to_string()))
    }
}

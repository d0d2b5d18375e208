use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Reasons the directory refuses an insertion.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("server {0} already exists")]
    DuplicateServer(String),

    #[error("channel {0} already exists")]
    DuplicateChannel(String),

    #[error("user {user_id} already exists in server {server_id}")]
    DuplicateUser { server_id: String, user_id: String },

    #[error("no such server: {0}")]
    UnknownServer(String),

    #[error("invalid id {id:?}: {reason}")]
    InvalidId { id: String, reason: &'static str },

    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: &'static str },
}

/// An insertion the directory refused. Hands the entity back so the caller
/// can destroy it properly (text channels hold an open chat).
#[derive(Debug)]
pub struct Rejected<T> {
    pub entity: T,
    pub reason: DirectoryError,
}

impl<T> Rejected<T> {
    pub fn new(entity: T, reason: DirectoryError) -> Self {
        Self { entity, reason }
    }

    pub fn into_inner(self) -> T {
        self.entity
    }
}

impl<T> fmt::Display for Rejected<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rejected: {}", self.reason)
    }
}

impl<T: fmt::Debug> std::error::Error for Rejected<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.reason)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("malformed snapshot: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot violates directory invariants: {0}")]
    Directory(#[from] DirectoryError),
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("Failed to read storage: {0}")]
    ReadError(String),

    #[error("Failed to write storage: {0}")]
    WriteError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// String-keyed, string-valued client storage that outlives a single run.
///
/// Calls are synchronous: a caller's load, mutate and save happen in one
/// step with no other writer in between.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

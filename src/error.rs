use bson::Bson;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("configuration file not found in '{0}'")]
    NotFound(PathBuf),
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Errors surfaced by either collection backend.
///
/// Lookup misses are never errors; they show up as `None`, empty results or
/// zero counts instead.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] mongodb::error::Error),
    #[error("document with _id {0} already exists")]
    DuplicateKey(Bson),
    #[error(transparent)]
    BsonSerialization(#[from] bson::ser::Error),
    #[error(transparent)]
    BsonDeserialization(#[from] bson::de::Error),
}

#[derive(Debug, Error)]
pub enum HashError {
    #[error("bcrypt cost must be within 4..=31, got {0}")]
    Cost(u32),
    #[error("unable to generate password salt: {0}")]
    Rng(#[from] rand::Error),
}

#[derive(Debug, Error)]
pub enum BackendError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Hash(#[from] HashError),
}

pub mod keys;
pub mod migrate;
pub mod operations;
pub mod trees;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::Db;
use thiserror::Error;

#[derive(Debug)]
pub struct Store {
    db: Db,
    pub users: sled::Tree,
    pub sessions: sled::Tree,
    pub kanji: sled::Tree,
    pub groups: sled::Tree,
    pub mastery_records: sled::Tree,
    pub config_versions: sled::Tree,
    // Secondary index trees
    pub kanji_by_character: sled::Tree,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("not found: entity={entity}, key={key}")]
    NotFound { entity: String, key: String },
    #[error("conflict: entity={entity}, key={key}")]
    Conflict { entity: String, key: String },
    #[error("CAS retry exhausted after {attempts} attempts: entity={entity}, key={key}")]
    CasRetryExhausted {
        entity: String,
        key: String,
        attempts: u32,
    },
    #[error("validation error: {0}")]
    Validation(String),
    #[error("migration error at version {version}: {message}")]
    Migration { version: u32, message: String },
}

impl Store {
    pub fn open(sled_path: &str) -> Result<Self, StoreError> {
        let db = sled::open(sled_path)?;
        let users = db.open_tree(trees::USERS)?;
        let sessions = db.open_tree(trees::SESSIONS)?;
        let kanji = db.open_tree(trees::KANJI)?;
        let groups = db.open_tree(trees::GROUPS)?;
        let mastery_records = db.open_tree(trees::MASTERY_RECORDS)?;
        let config_versions = db.open_tree(trees::CONFIG_VERSIONS)?;
        let kanji_by_character = db.open_tree(trees::KANJI_BY_CHARACTER)?;

        Ok(Self {
            db,
            users,
            sessions,
            kanji,
            groups,
            mastery_records,
            config_versions,
            kanji_by_character,
        })
    }

    pub fn run_migrations(&self) -> Result<(), StoreError> {
        migrate::run(self)
    }

    pub fn flush(&self) -> Result<(), StoreError> {
        self.db.flush()?;
        Ok(())
    }

    pub fn raw_db(&self) -> &Db {
        &self.db
    }

    pub(crate) fn serialize<T: Serialize>(value: &T) -> Result<Vec<u8>, StoreError> {
        Ok(serde_json::to_vec(value)?)
    }

    pub(crate) fn deserialize<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, StoreError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

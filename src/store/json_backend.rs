//! JSON table backend — whole-file persisted collections.
//!
//! Each table is one JSON document holding an array of records, read and
//! rewritten in full. Mirrors the upstream spreadsheet round-trip discipline:
//! no partial updates, last writer wins across processes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info};

use crate::auth::Credential;
use crate::catalog::ScheduleEntry;
use crate::error::StoreError;
use crate::search::DirectoryEntry;
use crate::store::traits::{CredentialRepository, DirectoryRepository, ScheduleSource};

async fn read_table<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, std::io::Error> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(std::io::Error::other)
}

async fn write_table<T: serde::Serialize>(path: &Path, records: &[T]) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let bytes = serde_json::to_vec_pretty(records).map_err(std::io::Error::other)?;
    tokio::fs::write(path, bytes).await
}

/// Seed an empty table file if none exists yet.
pub async fn ensure_table(path: &Path) -> Result<(), std::io::Error> {
    if tokio::fs::try_exists(path).await? {
        return Ok(());
    }
    write_table::<serde_json::Value>(path, &[]).await?;
    info!(path = %path.display(), "seeded empty table");
    Ok(())
}

/// Schedule source backed by a JSON file.
pub struct JsonScheduleSource {
    path: PathBuf,
}

impl JsonScheduleSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ScheduleSource for JsonScheduleSource {
    async fn load(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        let rows: Vec<ScheduleEntry> = read_table(&self.path).await.map_err(|e| {
            StoreError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        debug!(rows = rows.len(), "schedule loaded");
        Ok(rows)
    }
}

/// Credential table backed by a JSON file.
pub struct JsonCredentialTable {
    path: PathBuf,
}

impl JsonCredentialTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl CredentialRepository for JsonCredentialTable {
    async fn load(&self) -> Result<Vec<Credential>, StoreError> {
        read_table(&self.path)
            .await
            .map_err(|e| StoreError::ReadFailed(format!("{}: {e}", self.path.display())))
    }

    async fn save(&self, records: &[Credential]) -> Result<(), StoreError> {
        write_table(&self.path, records)
            .await
            .map_err(|e| StoreError::WriteFailed(format!("{}: {e}", self.path.display())))
    }
}

/// Name→group directory backed by a JSON file.
pub struct JsonDirectoryTable {
    path: PathBuf,
}

impl JsonDirectoryTable {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl DirectoryRepository for JsonDirectoryTable {
    async fn load(&self) -> Result<Vec<DirectoryEntry>, StoreError> {
        read_table(&self.path)
            .await
            .map_err(|e| StoreError::ReadFailed(format!("{}: {e}", self.path.display())))
    }
}

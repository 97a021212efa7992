//! In-memory table backends (for tests and ephemeral runs).

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::auth::Credential;
use crate::catalog::ScheduleEntry;
use crate::error::StoreError;
use crate::search::DirectoryEntry;
use crate::store::traits::{CredentialRepository, DirectoryRepository, ScheduleSource};

/// Fixed schedule snapshot.
pub struct StaticScheduleSource {
    rows: Vec<ScheduleEntry>,
}

impl StaticScheduleSource {
    pub fn new(rows: Vec<ScheduleEntry>) -> Self {
        Self { rows }
    }
}

#[async_trait]
impl ScheduleSource for StaticScheduleSource {
    async fn load(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        Ok(self.rows.clone())
    }
}

/// Schedule source that always fails, for exercising the terminal path.
pub struct UnavailableScheduleSource;

#[async_trait]
impl ScheduleSource for UnavailableScheduleSource {
    async fn load(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        Err(StoreError::SourceUnavailable("no schedule source".into()))
    }
}

/// Mutable in-memory credential collection.
#[derive(Default)]
pub struct MemoryCredentialTable {
    records: Mutex<Vec<Credential>>,
}

#[async_trait]
impl CredentialRepository for MemoryCredentialTable {
    async fn load(&self) -> Result<Vec<Credential>, StoreError> {
        Ok(self.records.lock().await.clone())
    }

    async fn save(&self, records: &[Credential]) -> Result<(), StoreError> {
        *self.records.lock().await = records.to_vec();
        Ok(())
    }
}

/// Fixed name→group directory.
#[derive(Default)]
pub struct StaticDirectory {
    entries: Vec<DirectoryEntry>,
}

impl StaticDirectory {
    pub fn new(entries: Vec<DirectoryEntry>) -> Self {
        Self { entries }
    }
}

#[async_trait]
impl DirectoryRepository for StaticDirectory {
    async fn load(&self) -> Result<Vec<DirectoryEntry>, StoreError> {
        Ok(self.entries.clone())
    }
}

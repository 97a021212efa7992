//! Repository traits — injected persistence seams for the dialog core.
//!
//! The core never touches storage directly; it sees three whole-table
//! collaborators. Each read returns the full collection, each write rewrites
//! it in full. There is no transactional isolation between processes.

use async_trait::async_trait;

use crate::auth::Credential;
use crate::catalog::ScheduleEntry;
use crate::error::StoreError;
use crate::search::DirectoryEntry;

/// Externally authored schedule table, loaded per query.
#[async_trait]
pub trait ScheduleSource: Send + Sync {
    /// Load the full schedule snapshot in source order.
    ///
    /// A missing or unreadable source is `StoreError::SourceUnavailable`,
    /// which ends the conversation.
    async fn load(&self) -> Result<Vec<ScheduleEntry>, StoreError>;
}

/// Persisted credential collection.
#[async_trait]
pub trait CredentialRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<Credential>, StoreError>;

    /// Rewrite the whole collection.
    async fn save(&self, records: &[Credential]) -> Result<(), StoreError>;
}

/// Read-only name→group lookup table.
#[async_trait]
pub trait DirectoryRepository: Send + Sync {
    async fn load(&self) -> Result<Vec<DirectoryEntry>, StoreError>;
}

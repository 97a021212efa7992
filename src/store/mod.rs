//! Persistence layer — whole-table repositories behind trait seams.

pub mod json_backend;
pub mod memory;
pub mod traits;

pub use json_backend::{JsonCredentialTable, JsonDirectoryTable, JsonScheduleSource, ensure_table};
pub use memory::{
    MemoryCredentialTable, StaticDirectory, StaticScheduleSource, UnavailableScheduleSource,
};
pub use traits::{CredentialRepository, DirectoryRepository, ScheduleSource};

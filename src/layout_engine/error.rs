use thiserror::Error;

use crate::model::WorkspaceId;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("workspace {0} not found")]
    WorkspaceNotFound(WorkspaceId),
    #[error("invalid layout config: {0}")]
    InvalidLayoutConfig(String),
    #[error("refusing to delete the only remaining workspace")]
    LastWorkspace,
    #[error("layout does not match workspace windows: {0}")]
    LayoutMismatch(String),
    #[error("snapshot I/O failed: {0}")]
    SnapshotIo(#[from] std::io::Error),
    #[error("snapshot is not valid state JSON: {0}")]
    SnapshotFormat(#[from] serde_json::Error),
}

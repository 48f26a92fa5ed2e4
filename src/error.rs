use crate::services::ServiceError;

/// Main error type for the Gantt view subsystem.
#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    /// A collaborator service (record query/write/create, dialog) rejected.
    #[error("service error: {0}")]
    Service(#[from] ServiceError),

    /// A task carried an identifier the record service cannot address.
    #[error("invalid record id: {0:?}")]
    InvalidRecordId(String),
}

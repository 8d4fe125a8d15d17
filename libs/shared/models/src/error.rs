use thiserror::Error;

/// Failures surfaced by any persistence collaborator. Services translate
/// these into their own error types; `VersionConflict` is the one variant
/// handled internally (bounded retry) rather than propagated.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("write lost a concurrent commit race")]
    VersionConflict,

    #[error("storage backend error: {0}")]
    Backend(String),
}

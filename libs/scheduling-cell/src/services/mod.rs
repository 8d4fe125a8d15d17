pub mod assigner;
pub mod conflict;
pub mod lifecycle;
pub mod views;
pub mod walkin;

pub use assigner::SlotAssigner;
pub use conflict::ConflictResolver;
pub use lifecycle::{validate_status_transition, AppointmentLifecycleService};
pub use views::QueueViews;
pub use walkin::WalkInPolicy;

use std::future::Future;
use std::time::Duration;

use shared_models::StoreError;

use crate::models::SchedulingError;

/// Bound a persistence call with the configured deadline, mapping both the
/// deadline and backend failures into a `SchedulingError`.
pub(crate) async fn bounded<T, E>(
    limit: Duration,
    fut: impl Future<Output = Result<T, E>>,
) -> Result<T, SchedulingError>
where
    E: std::fmt::Display,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result.map_err(|e| SchedulingError::Persistence(e.to_string())),
        Err(_) => Err(SchedulingError::Persistence(
            "storage call exceeded deadline".to_string(),
        )),
    }
}

/// Deadline-bounded variant that keeps the raw `StoreError`, for callers
/// that need to see `VersionConflict` and retry.
pub(crate) async fn bounded_store<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T, StoreError>>,
) -> Result<T, StoreError> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Backend(
            "storage call exceeded deadline".to_string(),
        )),
    }
}

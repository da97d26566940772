//! Error types for thread-context construction and reload orchestration.

use thiserror::Error;

/// Failures from [`crate::ThreadContext::init`] / `init_for_reload`.
///
/// Per spec.md §7 these are "resource errors": the caller aborts the
/// attempt and keeps whatever snapshot was previously active.
#[derive(Debug, Error)]
pub enum ThreadContextError {
    #[error("no active snapshot available and this thread is not a unit-test runner")]
    NoSnapshotAvailable,
    #[error("thread-keyword sub-context initialization failed")]
    KeywordInitFailed,
}

/// Failures from [`crate::ReloadOrchestrator::run`].
#[derive(Debug, Error)]
pub enum ReloadError {
    #[error("reload {reload_id}: could not create config subtree detect-engine-reloads.{reload_id}")]
    ConfigSubtree { reload_id: u64 },
    #[error("thread-context build failed for worker {worker_index}: {source}")]
    ThreadContextBuild {
        worker_index: usize,
        #[source]
        source: ThreadContextError,
    },
    #[error("reload aborted: shutdown observed before adoption completed")]
    ShutdownDuringBuild,
}

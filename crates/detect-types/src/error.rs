//! Error types for snapshot construction.

use thiserror::Error;

/// Errors surfaced by configuration-driven snapshot construction.
/// Invariant violations (refcount underflow, null required pointers in
/// the original, app-inspection registration conflicts) are not
/// represented here: per spec they are fatal and abort the process via
/// `panic!` at the call site instead. Reload-time failures (thread
/// context build, config subtree) live in `warden-detect-worker`'s
/// `ReloadError`, the crate that actually owns the reload path.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("sgh-mpm-context \"full\" is incompatible with the AC-CUDA matcher")]
    FullContextWithCuda,
}

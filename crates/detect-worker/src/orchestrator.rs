//! Reload orchestrator: the six-phase live rule swap (spec.md §4.6),
//! grounded almost line-for-line on `DetectEngineReloadThreads`.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use warden_detect_core::{EngineSnapshot, MasterRegistry, SyncLatch};
use warden_detect_types::ConfigSource;

use crate::error::ReloadError;
use crate::fleet::{Fleet, PacketKind};
use crate::thread_context::ThreadContext;

const ADOPTION_BACKOFF: Duration = Duration::from_millis(1);
const SHUTDOWN_WAIT_BACKOFF: Duration = Duration::from_micros(100);

/// Result of a successful reload. Supplements the original's bare
/// `return 1` with the counts a caller would otherwise have to
/// re-derive from fleet state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadReport {
    pub workers: usize,
    pub reload_id: u64,
}

/// Drives one live rule swap across a [`Fleet`]. Holds only the
/// monotonic reload-id counter used to name each reload's isolated
/// config subtree (`detect-engine-reloads.N`); all snapshot state
/// lives in the [`MasterRegistry`] passed to `run`.
#[derive(Default)]
pub struct ReloadOrchestrator {
    next_reload_id: AtomicU64,
}

impl ReloadOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs one reload. `new_snapshot` must already be at the head of
    /// `registry`'s active list (phase 0, owned by the caller). `latch`
    /// should already have been raised by whatever requested this
    /// reload (spec.md §4.1's "a reload request raises the latch");
    /// `run` only observes it and lowers it again on completion, it
    /// never raises it itself. Returns `Ok(None)` when the fleet has no
    /// workers — not an error, mirrors the original's unix-socket-mode
    /// `retval 0`.
    pub fn run(
        &self,
        registry: &MasterRegistry,
        fleet: &Fleet,
        new_snapshot: &Arc<EngineSnapshot>,
        config: &dyn ConfigSource,
        latch: &SyncLatch,
        shutdown: &AtomicBool,
    ) -> Result<Option<ReloadReport>, ReloadError> {
        let reload_id = self.next_reload_id.fetch_add(1, Ordering::SeqCst);

        if !latch.is_reload_requested() {
            tracing::warn!(reload_id, "reload executed without an observed latch request");
        }

        if !config.prepare_reload_subtree(reload_id) {
            return Err(ReloadError::ConfigSubtree { reload_id });
        }

        // Phase 1 — enumerate.
        let workers = fleet.workers();
        let n = workers.len();
        if n == 0 {
            tracing::debug!(reload_id, "reload skipped: no detection workers");
            return Ok(None);
        }
        if shutdown.load(Ordering::SeqCst) {
            return Err(ReloadError::ShutdownDuringBuild);
        }

        tracing::info!(reload_id, workers = n, "rule reload starting");

        // Phase 2 — build.
        let mut old_ctx = Vec::with_capacity(n);
        let mut new_ctx = Vec::with_capacity(n);
        for (i, worker) in workers.iter().enumerate() {
            if shutdown.load(Ordering::SeqCst) {
                return Err(ReloadError::ShutdownDuringBuild);
            }
            let built = ThreadContext::init_for_reload(worker.thread_handle, new_snapshot.clone())
                .map_err(|source| ReloadError::ThreadContextBuild { worker_index: i, source })?;
            old_ctx.push(worker.slot.load());
            new_ctx.push(Arc::new(built));
        }

        // Phase 3 — publish. Each slot store is independent; there is
        // no cross-worker ordering requirement (spec.md §4.6).
        for (worker, fresh) in workers.iter().zip(new_ctx.iter()) {
            worker.slot.publish(fresh.clone());
        }
        tracing::info!(
            reload_id,
            workers = n,
            "rule reload has swapped old thread contexts with new ones"
        );

        // Phase 4 — force adoption.
        let mut adopted_through = n;
        for (i, worker) in workers.iter().enumerate() {
            let ctx = &new_ctx[i];
            std::thread::sleep(ADOPTION_BACKOFF);
            let mut pseudo_injected = false;
            let mut shutdown_seen = false;
            while !ctx.is_adopted() {
                if shutdown.load(Ordering::SeqCst) {
                    shutdown_seen = true;
                    break;
                }
                if !pseudo_injected {
                    pseudo_injected = true;
                    worker.slot.queue.enqueue(PacketKind::PseudoStreamEnd);
                }
                std::thread::sleep(ADOPTION_BACKOFF);
            }
            if shutdown_seen {
                adopted_through = i;
                break;
            }
            tracing::debug!(reload_id, worker = worker.thread_handle, "new thread context adopted");
        }

        // Phase 5 — shutdown-safe wait. Only reachable if phase 4 was
        // cut short; leaves already-published pointers in place
        // (spec.md §9 open question b).
        if adopted_through != n {
            for worker in &workers[adopted_through..] {
                while !worker.slot.is_running_done() {
                    std::thread::sleep(SHUTDOWN_WAIT_BACKOFF);
                }
            }
        }

        // Phase 6 — reclaim.
        let previous_id = old_ctx.first().map(|ctx| ctx.snapshot().id);
        drop(old_ctx);
        if let Some(previous_id) = previous_id {
            registry.move_to_free_list(previous_id);
        }
        latch.mark_done();
        tracing::info!(reload_id, "rule reload complete");

        Ok(Some(ReloadReport { workers: n, reload_id }))
    }
}

//! Per-worker mutable scratch tied to exactly one snapshot (spec.md
//! §4.4).
//!
//! The original's `DetectEngineThreadCtx` is one flat struct with a
//! couple dozen fields sized by various hashes on `de_ctx`; here the
//! same fields are grouped into small named scratch types so each
//! allocation's provenance (which snapshot dimension sized it) stays
//! visible at the call site.

use std::any::Any;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use warden_detect_core::{EngineSnapshot, MasterRegistry};

use crate::error::ThreadContextError;

/// Per-direction multi-pattern-match scratch. The matcher's actual
/// working set lives in the (out-of-scope) pattern-matcher factory;
/// this only records the capacity it was sized to.
#[derive(Debug, Clone, Copy, Default)]
pub struct MpmScratch {
    pub capacity: usize,
}

/// A per-application-layer buffer with its own independently resolved
/// size (header buffers, client-body, server-body all size
/// differently off the bound snapshot).
#[derive(Debug, Clone, Default)]
pub struct AppBuffer {
    pub capacity: usize,
}

/// Placeholder for the out-of-scope IP-only match state.
#[derive(Debug, Clone, Copy, Default)]
pub struct IpOnlyState;

#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadCounters {
    pub alerts: u16,
}

/// Per-worker scratch bound to exactly one [`EngineSnapshot`] for its
/// entire lifetime.
pub struct ThreadContext {
    pub thread_handle: u64,
    snapshot: Arc<EngineSnapshot>,
    pub payload_mpm: MpmScratch,
    pub stream_mpm: MpmScratch,
    pub uri_mpm: MpmScratch,
    pub match_queue: Vec<u32>,
    pub non_mpm_id_array: Vec<u32>,
    pub ip_only_state: IpOnlyState,
    pub de_state_sig_array: Vec<bool>,
    pub match_array: Vec<u32>,
    pub bj_values: Vec<i64>,
    pub header_buffers: Vec<AppBuffer>,
    pub client_body_buffers: Vec<AppBuffer>,
    pub server_body_buffers: Vec<AppBuffer>,
    keyword_sub_contexts: Vec<Box<dyn Any + Send>>,
    adopted: AtomicBool,
    pub counters: ThreadCounters,
}

impl ThreadContext {
    /// Worker start-up path. Prefers [`MasterRegistry::get_current`];
    /// falls back to `fallback` only when `unittest_run_mode` is set,
    /// mirroring `DetectEngineThreadCtxInit`'s `RunmodeIsUnittests()`
    /// escape hatch.
    pub fn init(
        thread_handle: u64,
        registry: &MasterRegistry,
        fallback: Option<Arc<EngineSnapshot>>,
        unittest_run_mode: bool,
    ) -> Result<Self, ThreadContextError> {
        let snapshot = match registry.get_current() {
            Some(snapshot) => snapshot,
            None if unittest_run_mode => fallback.ok_or(ThreadContextError::NoSnapshotAvailable)?,
            None => return Err(ThreadContextError::NoSnapshotAvailable),
        };
        Self::build(thread_handle, snapshot)
    }

    /// Reload path: bind directly to the freshly built snapshot
    /// rather than consulting the registry, mirroring
    /// `DetectEngineThreadCtxInitForReload`.
    pub fn init_for_reload(thread_handle: u64, snapshot: Arc<EngineSnapshot>) -> Result<Self, ThreadContextError> {
        Self::build(thread_handle, snapshot)
    }

    fn build(thread_handle: u64, snapshot: Arc<EngineSnapshot>) -> Result<Self, ThreadContextError> {
        let mut ctx = ThreadContext {
            thread_handle,
            payload_mpm: MpmScratch::default(),
            stream_mpm: MpmScratch::default(),
            uri_mpm: MpmScratch::default(),
            match_queue: Vec::new(),
            non_mpm_id_array: Vec::new(),
            ip_only_state: IpOnlyState,
            de_state_sig_array: Vec::new(),
            match_array: Vec::new(),
            bj_values: Vec::new(),
            header_buffers: Vec::new(),
            client_body_buffers: Vec::new(),
            server_body_buffers: Vec::new(),
            keyword_sub_contexts: Vec::new(),
            adopted: AtomicBool::new(false),
            counters: ThreadCounters::default(),
            snapshot,
        };

        if !ctx.snapshot.minimal {
            let sig_count = ctx.snapshot.signature_count();
            ctx.payload_mpm.capacity = sig_count;
            ctx.stream_mpm.capacity = sig_count;
            ctx.uri_mpm.capacity = sig_count;
            ctx.match_queue = vec![0; sig_count];
            ctx.non_mpm_id_array = vec![0; sig_count];
            ctx.de_state_sig_array = vec![false; sig_count];
            ctx.match_array = vec![0; sig_count];
            ctx.bj_values = vec![0; ctx.snapshot.max_local_id + 1];
            ctx.header_buffers = vec![AppBuffer::default(); sig_count];
            ctx.client_body_buffers = vec![AppBuffer::default(); sig_count];
            ctx.server_body_buffers = vec![AppBuffer::default(); sig_count];

            ctx.keyword_sub_contexts =
                ctx.snapshot.thread_keywords.init_all().ok_or(ThreadContextError::KeywordInitFailed)?;
        }

        tracing::debug!(
            thread_handle,
            snapshot_id = ctx.snapshot.id.0,
            signature_count = ctx.snapshot.signature_count(),
            "thread context initialized"
        );
        Ok(ctx)
    }

    pub fn snapshot(&self) -> &Arc<EngineSnapshot> {
        &self.snapshot
    }

    /// True once a worker has processed at least one packet through
    /// this context. Release/acquire across the worker→control
    /// boundary per spec.md §5.
    pub fn is_adopted(&self) -> bool {
        self.adopted.load(Ordering::Acquire)
    }

    /// Called by the worker on first use of a freshly published
    /// context. Idempotent: later calls are no-ops.
    pub fn mark_adopted(&self) {
        self.adopted.store(true, Ordering::Release);
    }

    /// Returns the sub-context registered for `keyword_id`, or `None`
    /// if out of range — mirrors `Get(thread_ctx, id)` returning null
    /// rather than panicking on a bad id.
    pub fn keyword_sub_context(&self, keyword_id: u32) -> Option<&(dyn Any + Send)> {
        self.keyword_sub_contexts.get(keyword_id as usize).map(|b| b.as_ref())
    }
}

impl Drop for ThreadContext {
    fn drop(&mut self) {
        let sub_contexts = std::mem::take(&mut self.keyword_sub_contexts);
        self.snapshot.thread_keywords.free_all(sub_contexts);
        tracing::debug!(thread_handle = self.thread_handle, snapshot_id = self.snapshot.id.0, "thread context destroyed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warden_detect_types::SnapshotId;

    fn minimal_registry_with_snapshot(id: u64) -> (MasterRegistry, Arc<EngineSnapshot>) {
        let registry = MasterRegistry::new();
        let snapshot = Arc::new(EngineSnapshot::init_minimal(SnapshotId(id)));
        registry.add_to_master(snapshot.clone());
        (registry, snapshot)
    }

    #[test]
    fn init_prefers_current_snapshot() {
        let (registry, snapshot) = minimal_registry_with_snapshot(1);
        let ctx = ThreadContext::init(7, &registry, None, false).unwrap();
        assert_eq!(ctx.snapshot().id, snapshot.id);
        assert!(!ctx.is_adopted());
    }

    #[test]
    fn init_without_current_snapshot_fails_outside_unittests() {
        let registry = MasterRegistry::new();
        let err = ThreadContext::init(7, &registry, None, false).unwrap_err();
        assert!(matches!(err, ThreadContextError::NoSnapshotAvailable));
    }

    #[test]
    fn init_falls_back_in_unittest_run_mode() {
        let registry = MasterRegistry::new();
        let fallback = Arc::new(EngineSnapshot::init_minimal(SnapshotId(9)));
        let ctx = ThreadContext::init(7, &registry, Some(fallback.clone()), true).unwrap();
        assert_eq!(ctx.snapshot().id, fallback.id);
    }

    #[test]
    fn mark_adopted_is_observable() {
        let (registry, _snapshot) = minimal_registry_with_snapshot(1);
        let ctx = ThreadContext::init(7, &registry, None, false).unwrap();
        assert!(!ctx.is_adopted());
        ctx.mark_adopted();
        assert!(ctx.is_adopted());
    }
}

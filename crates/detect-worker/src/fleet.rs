//! Simulated packet-processing fleet: detection slots and input
//! packet queues (spec.md §5).
//!
//! The packet-processing pipeline itself is out of scope per spec.md
//! §1 — this models only the contract the orchestrator and a worker
//! loop need: a slot holding an atomically-swappable `ThreadContext`,
//! and a queue a worker can block on and the control thread can wake.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use parking_lot::{Condvar, Mutex};

use crate::thread_context::ThreadContext;

/// Whether a queued packet is real traffic or the synthetic wakeup
/// the orchestrator injects during adoption (spec.md §4.6 phase 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Data,
    PseudoStreamEnd,
}

/// A worker's input packet queue.
#[derive(Default)]
pub struct PacketQueue {
    packets: Mutex<VecDeque<PacketKind>>,
    cond: Condvar,
}

impl PacketQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&self, packet: PacketKind) {
        let mut packets = self.packets.lock();
        packets.push_back(packet);
        self.cond.notify_one();
    }

    /// Blocks until a packet is queued, then pops and returns it.
    pub fn dequeue_blocking(&self) -> PacketKind {
        let mut packets = self.packets.lock();
        while packets.is_empty() {
            self.cond.wait(&mut packets);
        }
        packets.pop_front().expect("just observed non-empty under the same lock")
    }

    pub fn is_empty(&self) -> bool {
        self.packets.lock().is_empty()
    }
}

/// One detection slot: the worker's detection thread-context pointer,
/// swappable by the control thread without the worker holding a lock.
///
/// `ArcSwap` is the single-pointer-store the original relies on
/// (`SC_ATOMIC_SET(slots->slot_data, ...)`): a worker's `load` never
/// observes a torn value, only the context as it stood before or
/// after a given `store`.
pub struct DetectionSlot {
    context: ArcSwap<ThreadContext>,
    pub queue: Arc<PacketQueue>,
    running_done: AtomicBool,
}

impl DetectionSlot {
    pub fn new(initial: Arc<ThreadContext>) -> Self {
        DetectionSlot { context: ArcSwap::new(initial), queue: Arc::new(PacketQueue::new()), running_done: AtomicBool::new(false) }
    }

    /// Worker-side read: one load per packet, no lock.
    pub fn load(&self) -> Arc<ThreadContext> {
        self.context.load_full()
    }

    /// Control-thread-side publish: a single atomic pointer store.
    /// Returns the previous context so the caller can retire it.
    pub fn publish(&self, new: Arc<ThreadContext>) -> Arc<ThreadContext> {
        self.context.swap(new)
    }

    pub fn is_running_done(&self) -> bool {
        self.running_done.load(Ordering::Acquire)
    }

    pub fn mark_running_done(&self) {
        self.running_done.store(true, Ordering::Release);
    }
}

/// One simulated worker: a thread handle id, its detection slot, and
/// a shutdown flag it honors between packets.
pub struct Worker {
    pub thread_handle: u64,
    pub slot: Arc<DetectionSlot>,
}

/// A fixed set of simulated workers, standing in for
/// `tv_root[TVT_PPT]`'s walk over detect-flagged thread-module slots.
#[derive(Default)]
pub struct Fleet {
    workers: Vec<Worker>,
}

impl Fleet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, thread_handle: u64, initial_context: Arc<ThreadContext>) -> Arc<DetectionSlot> {
        let slot = Arc::new(DetectionSlot::new(initial_context));
        self.workers.push(Worker { thread_handle, slot: slot.clone() });
        slot
    }

    pub fn workers(&self) -> &[Worker] {
        &self.workers
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

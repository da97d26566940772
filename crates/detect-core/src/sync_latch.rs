//! Three-state control/control reload handshake (spec.md §4.1).

use parking_lot::Mutex;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LatchState {
    Idle,
    Reload,
    Done,
}

/// Decouples the thread that wants a reload from the thread that
/// executes it. An embedder drives both ends from its own event loop;
/// neither side blocks waiting on the other.
#[derive(Debug)]
pub struct SyncLatch {
    state: Mutex<LatchState>,
}

impl Default for SyncLatch {
    fn default() -> Self {
        Self { state: Mutex::new(LatchState::Idle) }
    }
}

impl SyncLatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// `Idle -> Reload`. Any other state is left unchanged and this
    /// returns `false`.
    pub fn request_reload(&self) -> bool {
        let mut state = self.state.lock();
        if *state == LatchState::Idle {
            *state = LatchState::Reload;
            true
        } else {
            false
        }
    }

    pub fn is_reload_requested(&self) -> bool {
        *self.state.lock() == LatchState::Reload
    }

    /// The executor always has the right to publish completion,
    /// regardless of the latch's current state.
    pub fn mark_done(&self) {
        *self.state.lock() = LatchState::Done;
    }

    /// `Done -> Idle` and returns `true`, or leaves the state untouched
    /// and returns `false`.
    pub fn consume_done(&self) -> bool {
        let mut state = self.state.lock();
        if *state == LatchState::Done {
            *state = LatchState::Idle;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_round_trip() {
        let latch = SyncLatch::new();
        assert!(!latch.is_reload_requested());
        assert!(latch.request_reload());
        assert!(latch.is_reload_requested());
        latch.mark_done();
        assert!(latch.consume_done());
        assert!(!latch.consume_done(), "consume_done must be true exactly once per episode");
    }

    #[test]
    fn request_reload_rejected_unless_idle() {
        let latch = SyncLatch::new();
        assert!(latch.request_reload());
        assert!(!latch.request_reload(), "Reload -> Reload must fail");
        latch.mark_done();
        assert!(!latch.request_reload(), "Done -> Reload must fail");
    }

    #[test]
    fn consume_done_false_when_not_done() {
        let latch = SyncLatch::new();
        assert!(!latch.consume_done());
        latch.request_reload();
        assert!(!latch.consume_done());
    }
}

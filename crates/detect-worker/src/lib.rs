//! Per-worker thread contexts and the reload orchestrator that drives
//! a live rule swap across a fleet of them (spec.md §4.4, §4.6).

mod error;
mod fleet;
mod orchestrator;
mod thread_context;

pub use error::{ReloadError, ThreadContextError};
pub use fleet::{DetectionSlot, Fleet, PacketKind, PacketQueue, Worker};
pub use orchestrator::{ReloadOrchestrator, ReloadReport};
pub use thread_context::{AppBuffer, IpOnlyState, MpmScratch, ThreadContext, ThreadCounters};

//! Snapshots, registries, and the sync latch: the control-plane state
//! that `warden-detect-worker`'s orchestrator drives through a reload.

mod app_inspection;
mod builtins;
mod master_registry;
mod snapshot;
mod sync_latch;
mod thread_keyword;

pub use app_inspection::{AppInspectionEntry, AppInspectionRegistry, InspectCallback, SmList, SM_LIST_MATCH, SM_LIST_MAX};
pub use builtins::{register_builtins, Builtin};
pub use master_registry::MasterRegistry;
pub use snapshot::{ClassificationConfig, CompiledSignatureId, EngineSnapshot, MpmMatcher, ReferenceConfig, ReputationContext};
pub use sync_latch::SyncLatch;
pub use thread_keyword::{KeywordFreeFn, KeywordInitFn, KeywordMode, ThreadKeywordRegistry};

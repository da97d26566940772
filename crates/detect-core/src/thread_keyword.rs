//! Per-snapshot registry of thread-local keyword sub-contexts
//! (spec.md §4.7).
//!
//! The original keeps an intrusive singly-linked list and finds
//! duplicates by walking it; here each item's `id` doubles as its
//! index, so lookups are O(1) and "prepend" collapses to "push" —
//! insertion order never mattered to callers, only the id mapping did.

use std::any::Any;
use std::sync::Arc;

/// Whether a keyword's per-thread sub-context is shared across
/// registrations of the same name, or a fresh instance per
/// registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeywordMode {
    Shared,
    Unique,
}

/// A registered keyword's init/free pair, type-erased over the
/// sub-context it produces. `init_fn` returns `None` on failure, the
/// way the original's per-keyword `ThreadInit` returns a failure code.
pub type KeywordInitFn = Arc<dyn Fn(&(dyn Any + Send + Sync)) -> Option<Box<dyn Any + Send>> + Send + Sync>;
pub type KeywordFreeFn = Arc<dyn Fn(Box<dyn Any + Send>) + Send + Sync>;

struct KeywordItem {
    name: String,
    init_fn: KeywordInitFn,
    free_fn: KeywordFreeFn,
    init_data: Arc<dyn Any + Send + Sync>,
    #[allow(dead_code)]
    mode: KeywordMode,
}

/// Per-snapshot list of registered thread keywords, plus the
/// monotonic id counter that sizes every thread context's sub-context
/// array.
#[derive(Default)]
pub struct ThreadKeywordRegistry {
    items: Vec<KeywordItem>,
}

impl ThreadKeywordRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a keyword, returning its id.
    ///
    /// `snapshot`/`init_fn`/`free_fn`/`init_data` being null is a fatal
    /// invariant violation in the original; here `init_fn`, `free_fn`
    /// and `init_data` are owned, non-optional values so the type
    /// system rules that case out. There is no `snapshot` parameter —
    /// the registry itself is owned by exactly one snapshot, so the
    /// association is structural rather than a pointer to validate.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        init_fn: KeywordInitFn,
        init_data: Arc<dyn Any + Send + Sync>,
        free_fn: KeywordFreeFn,
        mode: KeywordMode,
    ) -> u32 {
        let name = name.into();
        if mode == KeywordMode::Shared {
            if let Some(existing) = self.items.iter().position(|item| item.name == name) {
                return existing as u32;
            }
        }
        let id = self.items.len() as u32;
        self.items.push(KeywordItem { name, init_fn, free_fn, init_data, mode });
        id
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Builds a fresh thread-local sub-context array by calling each
    /// registered keyword's init function in id order. If any init
    /// fails, every sub-context built so far is torn down via its own
    /// free function and `None` is returned — mirrors the original's
    /// "any failure aborts init and cleans up".
    pub fn init_all(&self) -> Option<Vec<Box<dyn Any + Send>>> {
        let mut built = Vec::with_capacity(self.items.len());
        for item in &self.items {
            match (item.init_fn)(item.init_data.as_ref()) {
                Some(sub_ctx) => built.push(sub_ctx),
                None => {
                    for (item, sub_ctx) in self.items.iter().zip(built) {
                        (item.free_fn)(sub_ctx);
                    }
                    return None;
                }
            }
        }
        Some(built)
    }

    /// Frees each sub-context by calling its keyword's free function.
    pub fn free_all(&self, sub_contexts: Vec<Box<dyn Any + Send>>) {
        for (item, sub_ctx) in self.items.iter().zip(sub_contexts) {
            (item.free_fn)(sub_ctx);
        }
    }
}

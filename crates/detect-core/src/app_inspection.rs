//! Three-dimensional registry of per-protocol inspection callbacks
//! (spec.md §4.5 and §6).
//!
//! The original keys a table by `(FlowProtoMapping(ipproto), alproto,
//! direction)` and stores each cell as the head of a singly-linked
//! chain of entries; here each cell is a `Vec<AppInspectionEntry>`
//! under one lock, which gives the same "append at tail, walk to
//! check duplicates" semantics without hand-rolled list nodes.

use std::collections::HashMap;

use parking_lot::Mutex;
use warden_detect_types::{AlProto, Direction, IpProto};

/// Submatch-list selector. The actual submatch lists (URI text,
/// header text, ...) are the signature engine's concern; this crate
/// only needs stable, distinct ids to enforce the no-duplicate
/// invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum SmList {
    Match = 0,
    Uri,
    RequestLine,
    ClientBody,
    Headers,
    RawHeaders,
    Method,
    Cookie,
    RawUri,
    File,
    UserAgent,
    HostHeader,
    RawHostHeader,
    DnsQueryName,
    FileData,
    ModbusMatch,
    StatMsg,
    StatCode,
    Max,
}

pub const SM_LIST_MATCH: i32 = SmList::Match as i32;
pub const SM_LIST_MAX: i32 = SmList::Max as i32;

/// The callback invoked to inspect a transaction against a submatch
/// list. The actual inspection logic lives in the signature engine;
/// the core only stores and calls it.
pub type InspectCallback = fn(tx_id: u64) -> i32;

/// A single node in an app-inspection chain.
#[derive(Debug, Clone)]
pub struct AppInspectionEntry {
    pub ipproto: IpProto,
    pub alproto: AlProto,
    pub direction: Direction,
    pub sm_list: i32,
    pub inspect_flags: u32,
    pub callback: InspectCallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ChainKey {
    ipproto: IpProto,
    alproto: AlProto,
    direction: Direction,
}

/// Process-level table of inspection chains.
#[derive(Default)]
pub struct AppInspectionRegistry {
    chains: Mutex<HashMap<ChainKey, Vec<AppInspectionEntry>>>,
}

impl AppInspectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` against `(ipproto, alproto, direction)`.
    ///
    /// Validation, idempotence, and duplicate-rejection failures are
    /// all fatal configuration errors per spec.md §4.5 and panic
    /// rather than returning `Result` — there is no recovery path at
    /// startup for a misconfigured registry.
    pub fn register(
        &self,
        ipproto: IpProto,
        alproto: AlProto,
        direction: Direction,
        sm_list: i32,
        inspect_flags: u32,
        callback: InspectCallback,
    ) {
        assert!(alproto.is_registrable(), "app-inspection: alproto {alproto} is not registrable");
        assert!(
            (SM_LIST_MATCH..SM_LIST_MAX).contains(&sm_list),
            "app-inspection: sm_list {sm_list} out of range [{SM_LIST_MATCH}, {SM_LIST_MAX})"
        );

        let key = ChainKey { ipproto, alproto, direction };
        let mut chains = self.chains.lock();
        let chain = chains.entry(key).or_default();

        if chain.iter().any(|e| e.sm_list == sm_list && e.callback == callback) {
            // Idempotent re-registration: no-op.
            return;
        }
        if let Some(clash) = chain.iter().find(|e| e.sm_list == sm_list || e.inspect_flags == inspect_flags) {
            panic!(
                "app-inspection duplicate: ({ipproto:?}, {alproto}, {direction:?}) already has sm_list={} or inspect_flags={:#x} (new entry sm_list={sm_list}, inspect_flags={inspect_flags:#x})",
                clash.sm_list, clash.inspect_flags
            );
        }

        chain.push(AppInspectionEntry { ipproto, alproto, direction, sm_list, inspect_flags, callback });
    }

    /// Returns a clone of the chain at `(ipproto, alproto, direction)`,
    /// or an empty vector if the cell has never been registered into.
    pub fn chain(&self, ipproto: IpProto, alproto: AlProto, direction: Direction) -> Vec<AppInspectionEntry> {
        let key = ChainKey { ipproto, alproto, direction };
        self.chains.lock().get(&key).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cb_a(_tx_id: u64) -> i32 {
        1
    }
    fn cb_b(_tx_id: u64) -> i32 {
        2
    }

    #[test]
    fn s4_single_registration() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Uri as i32, 1, cb_a);

        let chain = reg.chain(IpProto::Tcp, AlProto::Http, Direction::ToServer);
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].sm_list, SmList::Uri as i32);
        assert_eq!(chain[0].inspect_flags, 1);
        assert_eq!(chain[0].callback, cb_a);

        assert!(reg.chain(IpProto::Tcp, AlProto::Http, Direction::ToClient).is_empty());
        assert!(reg.chain(IpProto::Udp, AlProto::Http, Direction::ToServer).is_empty());
    }

    #[test]
    fn s5_both_directions_are_independent_chains() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Uri as i32, 1, cb_a);
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToClient, SmList::Uri as i32, 1, cb_b);

        let ts = reg.chain(IpProto::Tcp, AlProto::Http, Direction::ToServer);
        let tc = reg.chain(IpProto::Tcp, AlProto::Http, Direction::ToClient);
        assert_eq!(ts.len(), 1);
        assert_eq!(tc.len(), 1);
        assert_eq!(ts[0].callback, cb_a);
        assert_eq!(tc[0].callback, cb_b);
    }

    #[test]
    fn idempotent_reregistration_is_a_no_op() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Modbus, Direction::ToServer, SmList::ModbusMatch as i32, 9, cb_a);
        reg.register(IpProto::Tcp, AlProto::Modbus, Direction::ToServer, SmList::ModbusMatch as i32, 9, cb_a);
        assert_eq!(reg.chain(IpProto::Tcp, AlProto::Modbus, Direction::ToServer).len(), 1);
    }

    #[test]
    #[should_panic(expected = "duplicate")]
    fn same_sm_list_different_callback_is_fatal() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Uri as i32, 1, cb_a);
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Uri as i32, 2, cb_b);
    }

    #[test]
    #[should_panic(expected = "duplicate")]
    fn same_inspect_flags_different_sm_list_is_fatal() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Uri as i32, 1, cb_a);
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Method as i32, 1, cb_b);
    }

    #[test]
    #[should_panic(expected = "not registrable")]
    fn unknown_alproto_is_rejected() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Unknown, Direction::ToServer, SmList::Uri as i32, 1, cb_a);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn out_of_range_sm_list_is_rejected() {
        let reg = AppInspectionRegistry::new();
        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, SmList::Max as i32, 1, cb_a);
    }

    mod prop {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// For any sequence of registrations into one chain, every
            /// entry that actually lands (panics caught and discarded)
            /// keeps the chain free of two distinct `sm_list`s sharing
            /// an `inspect_flags`, or two entries sharing an `sm_list`
            /// with different callbacks — the same invariant
            /// `register` enforces one call at a time.
            #[test]
            fn registered_entries_never_violate_the_duplicate_invariant(
                ops in proptest::collection::vec((0i32..5, 0u32..3, any::<bool>()), 1..20)
            ) {
                let reg = AppInspectionRegistry::new();
                for (sm_list, inspect_flags, use_cb_a) in ops {
                    let callback = if use_cb_a { cb_a } else { cb_b };
                    let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                        reg.register(IpProto::Tcp, AlProto::Http, Direction::ToServer, sm_list, inspect_flags, callback);
                    }));
                }

                let chain = reg.chain(IpProto::Tcp, AlProto::Http, Direction::ToServer);
                for (i, a) in chain.iter().enumerate() {
                    for b in &chain[i + 1..] {
                        prop_assert!(a.sm_list != b.sm_list, "two entries share sm_list {}", a.sm_list);
                        prop_assert!(
                            a.inspect_flags != b.inspect_flags,
                            "two entries share inspect_flags {:#x}",
                            a.inspect_flags
                        );
                    }
                }
            }
        }
    }
}

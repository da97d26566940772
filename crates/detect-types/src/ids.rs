//! Small identity types used across the lifecycle core.

use std::fmt;

/// Monotonic id assigned to an engine snapshot at build time. Ids are
/// never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SnapshotId(pub u64);

impl fmt::Display for SnapshotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport protocol an app-inspection entry is registered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IpProto {
    Tcp,
    Udp,
}

/// Application-layer protocol selector.
///
/// Mirrors the original's `ALPROTO_UNKNOWN < alproto < ALPROTO_FAILED`
/// bound: `Unknown` and `Failed` are reserved sentinels that
/// `AppInspectionRegistry::register` rejects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AlProto {
    Unknown,
    Http,
    Dns,
    Smtp,
    Modbus,
    Failed,
}

impl fmt::Display for AlProto {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AlProto::Unknown => "unknown",
            AlProto::Http => "http",
            AlProto::Dns => "dns",
            AlProto::Smtp => "smtp",
            AlProto::Modbus => "modbus",
            AlProto::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl AlProto {
    /// True for protocols registrable with the app-inspection registry;
    /// `Unknown` and `Failed` are bounds, not valid protocols.
    pub fn is_registrable(self) -> bool {
        !matches!(self, AlProto::Unknown | AlProto::Failed)
    }
}

/// Flow direction. `0` means client→server, `1` means server→client,
/// per spec.md's glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    ToServer = 0,
    ToClient = 1,
}

impl Direction {
    pub fn as_index(self) -> usize {
        self as usize
    }
}

//! Data types shared by the detect-engine lifecycle crates.
//!
//! This crate holds no control-flow logic: ids, small enums, the
//! group-limit profile table, the [`ConfigSource`] external-collaborator
//! trait, and the shared error type live here so that `detect-core` and
//! `detect-worker` can depend on one common vocabulary without a cycle.

mod config;
mod error;
mod ids;
mod profile;

pub use config::{ConfigSource, MapConfigSource};
pub use error::DetectError;
pub use ids::{AlProto, Direction, IpProto, SnapshotId};
pub use profile::{GroupLimits, Profile, SghMpmContext};

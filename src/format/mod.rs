//! JSON snapshot I/O.

pub mod snapshot;

pub use crate::types::PostSnapshot;
pub use snapshot::EventSnapshot;

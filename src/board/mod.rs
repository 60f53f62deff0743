//! Event ownership and snapshot rehydration.

pub mod event;
pub mod rehydrate;

pub use event::Event;
pub use rehydrate::{RehydrateMode, Rehydrator};

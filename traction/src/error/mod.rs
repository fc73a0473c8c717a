//! Error types

mod event;
mod fetch;

pub use event::*;
pub use fetch::*;

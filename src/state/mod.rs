mod action;
mod board;
mod snapshot;

pub use action::*;
pub use board::*;
pub use snapshot::*;

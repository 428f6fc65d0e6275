mod deadline;
mod kind;
mod ledger;
mod request;

pub use deadline::*;
pub use kind::*;
pub use ledger::*;
pub use request::*;

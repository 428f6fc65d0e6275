mod actor;
mod command;
mod handle;
mod info;

pub use actor::*;
pub use command::*;
pub use handle::*;
pub use info::*;

mod analysis;
mod catalogue;
mod definition;

pub use analysis::*;
pub use catalogue::*;
pub use definition::*;

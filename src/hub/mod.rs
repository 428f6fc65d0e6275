mod registry;
mod routing;

pub use registry::*;
pub use routing::*;

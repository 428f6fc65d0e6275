mod bridge;
mod server;

pub use bridge::*;
pub use server::*;

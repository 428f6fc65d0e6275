mod codec;
mod library;
mod playback;
mod recorder;
mod replay;

pub use codec::*;
pub use library::*;
pub use playback::*;
pub use recorder::*;
pub use replay::*;

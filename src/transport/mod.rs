mod dispatcher;
mod frame;
mod login;
mod loopback;
mod remote;
mod session;
mod sessions;
mod socket;

pub use dispatcher::*;
pub use frame::*;
pub use login::*;
pub use loopback::*;
pub use remote::*;
pub use session::*;
pub use sessions::*;
pub use socket::*;

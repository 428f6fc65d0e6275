mod event;
mod info;
mod mailbox;

pub use event::*;
pub use info::*;
pub use mailbox::*;

use crate::ID;
use crate::storage::User;

/// Clients are keyed by the account they act for. A second live
/// connection for the same account is a duplicate registration.
pub type ClientId = ID<User>;

/// A participant in the protocol, human over a transport or programmatic.
///
/// The hub and games only ever push [`Event`]s at a client; decisions
/// and actions flow back through the hub's and games' public API, the
/// same way for every variant.
pub trait Client: Send + Sync {
    fn id(&self) -> ClientId;
    fn name(&self) -> &str;
    /// Delivers a notification. Must not block.
    fn notify(&self, event: Event);
    /// False once the underlying channel is gone.
    fn alive(&self) -> bool {
        true
    }
    fn info(&self) -> ClientInfo {
        ClientInfo {
            id: self.id(),
            name: self.name().to_string(),
        }
    }
}

mod entity;
mod memory;
mod password;

pub use entity::*;
pub use memory::*;
pub use password::*;

use crate::ID;
use crate::game::Game;

/// Persistence collaborator. The session core only performs these
/// narrow lookups and writes and never builds queries itself.
///
/// Writes that take an entity with the zero id insert it and return
/// the stored copy with its assigned id; any other id replaces.
#[async_trait::async_trait]
pub trait Storage: Send + Sync {
    async fn find_user(&self, id: ID<User>) -> anyhow::Result<Option<User>>;
    async fn find_user_by_name(&self, name: &str) -> anyhow::Result<Option<User>>;
    /// Creates an account. A `None` password creates one that cannot log in.
    async fn create_user(&self, name: &str, password: Option<&str>) -> anyhow::Result<User>;
    async fn verify_password(&self, name: &str, password: &str) -> anyhow::Result<Option<User>>;

    async fn find_deck(&self, id: ID<Deck>) -> anyhow::Result<Option<Deck>>;
    /// Decks owned by `user`, oldest first.
    async fn find_decks(&self, user: ID<User>) -> anyhow::Result<Vec<Deck>>;
    async fn save_deck(&self, deck: Deck) -> anyhow::Result<Deck>;
    async fn delete_deck(&self, id: ID<Deck>) -> anyhow::Result<bool>;

    async fn find_match(&self, id: ID<Game>) -> anyhow::Result<Option<Match>>;
    async fn save_match(&self, record: Match) -> anyhow::Result<()>;

    async fn find_replay(&self, id: ID<ReplayRecord>) -> anyhow::Result<Option<ReplayRecord>>;
    /// Replays owned by `user`, newest first, optionally filtered by a
    /// case-insensitive name fragment. Pages count from zero.
    async fn find_replays(
        &self,
        user: ID<User>,
        query: Option<&str>,
        page: usize,
        size: usize,
    ) -> anyhow::Result<Page<ReplayRecord>>;
    async fn save_replay(&self, record: ReplayRecord) -> anyhow::Result<ReplayRecord>;
    async fn delete_replay(&self, id: ID<ReplayRecord>) -> anyhow::Result<bool>;
}

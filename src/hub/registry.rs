use crate::ID;
use crate::client::Client;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::game::Game;
use crate::game::GameHandle;
use crate::game::GameInfo;
use serde::Serialize;
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::sync::Arc;

/// A connected client and the games it holds a seat in.
pub struct Member {
    pub client: Arc<dyn Client>,
    pub games: BTreeSet<ID<Game>>,
}

impl Member {
    pub fn new(client: Arc<dyn Client>) -> Self {
        Self {
            client,
            games: BTreeSet::new(),
        }
    }
}

/// Everything the hub tracks, guarded by one lock.
#[derive(Default)]
pub struct Registry {
    pub clients: HashMap<ClientId, Member>,
    pub games: HashMap<ID<Game>, GameHandle>,
}

impl Registry {
    pub fn recipients(&self) -> Vec<Arc<dyn Client>> {
        self.clients.values().map(|m| m.client.clone()).collect()
    }
    /// Forgets `game` in every membership.
    pub fn unlink(&mut self, game: ID<Game>) {
        self.clients.values_mut().for_each(|m| {
            m.games.remove(&game);
        });
    }
}

/// Lobby snapshot returned to clients asking what is going on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreInfo {
    pub clients: Vec<ClientInfo>,
    pub games: Vec<GameInfo>,
}

use super::Game;
use crate::ID;
use crate::client::ClientInfo;
use crate::records::Replay;
use crate::state::Outcome;
use crate::state::Phase;
use serde::Deserialize;
use serde::Serialize;

/// Lobby listing entry for one game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: ID<Game>,
    pub phase: Phase,
    pub version: u64,
    pub seats: usize,
    pub players: Vec<ClientInfo>,
}

/// Sent once when a game reaches its end.
#[derive(Debug, Clone)]
pub struct Summary {
    pub game: ID<Game>,
    pub outcome: Option<Outcome>,
    pub replay: Replay,
}

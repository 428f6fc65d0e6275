use super::ClientInfo;
use crate::ID;
use crate::game::Game;
use crate::game::GameInfo;
use crate::prompt::Prompt;
use crate::state::State;
use serde::Serialize;

/// Notifications pushed from the hub and games to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Event {
    Connected { client: ClientInfo },
    Disconnected { client: ClientInfo },
    GameAdded { game: GameInfo },
    GameDeleted { game: ID<Game> },
    GameInfo { game: GameInfo },
    GameJoined { game: ID<Game>, client: ClientInfo },
    GameLeft { game: ID<Game>, client: ClientInfo },
    StateChanged { game: ID<Game>, state: State },
    Prompted { prompt: Prompt },
}

impl Event {
    /// Wire name of the push message carrying this event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Connected { .. } => "core:clientConnected",
            Self::Disconnected { .. } => "core:clientDisconnected",
            Self::GameAdded { .. } => "core:gameAdded",
            Self::GameDeleted { .. } => "core:gameDeleted",
            Self::GameInfo { .. } => "core:gameInfo",
            Self::GameJoined { .. } => "game:joined",
            Self::GameLeft { .. } => "game:left",
            Self::StateChanged { .. } => "game:stateChanged",
            Self::Prompted { .. } => "game:prompt",
        }
    }
    pub fn data(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StateChanged { game, state } => {
                write!(f, "{} game={} v={}", self.name(), game, state.version)
            }
            Self::Prompted { prompt } => {
                write!(f, "{} game={} prompt={}", self.name(), prompt.game, prompt.id)
            }
            other => write!(f, "{}", other.name()),
        }
    }
}

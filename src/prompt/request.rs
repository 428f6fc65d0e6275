use super::*;
use crate::ID;
use crate::Position;
use crate::client::ClientId;
use crate::game::Game;
use serde::Deserialize;
use serde::Serialize;

/// What resolving a prompt does to the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Purpose {
    /// Chosen cards leave this seat's hand for its discard pile.
    Discard { seat: Position },
    /// Informational or issued from outside the rules; the board is untouched.
    Notice,
}

/// A decision point raised by the rules engine, before it is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub seat: Position,
    pub kind: PromptKind,
    pub message: String,
    pub purpose: Purpose,
}

/// A decision request addressed to one client in one game.
/// Ids are a per-game sequence so retransmissions can be deduplicated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    pub id: ID<Prompt>,
    pub game: ID<Game>,
    pub client: ClientId,
    pub seat: Position,
    pub kind: PromptKind,
    pub message: String,
    /// Milliseconds the game waits before applying the default answer.
    pub timeout: Option<u64>,
}

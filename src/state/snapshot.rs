use super::*;
use crate::ID;
use crate::Position;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::game::Game;
use crate::prompt::Prompt;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    WaitingForPlayers,
    InProgress,
    Finished,
}

/// Whose eyes a snapshot is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// A seated participant: sees its own hand only.
    Seat(Position),
    /// A non-participant: sees no hands.
    Public,
    /// Replay capture: sees every hand.
    Omniscient,
}

/// A hand as one viewer sees it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "cards", rename_all = "snake_case")]
pub enum Hand {
    Known(Vec<String>),
    Hidden(usize),
}

impl Hand {
    pub fn len(&self) -> usize {
        match self {
            Self::Known(cards) => cards.len(),
            Self::Hidden(n) => *n,
        }
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
    pub fn cards(&self) -> Option<&[String]> {
        match self {
            Self::Known(cards) => Some(cards),
            Self::Hidden(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub client: ClientInfo,
    pub seat: Position,
    pub present: bool,
    pub deck: usize,
    pub hand: Hand,
    pub field: Vec<String>,
    pub discard: Vec<String>,
    pub prizes: usize,
}

/// Public trace of an outstanding prompt: who is being waited on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub id: ID<Prompt>,
    pub seat: Position,
}

/// Seat occupant as the game records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub client: ClientInfo,
    pub present: bool,
}

/// Immutable, versioned snapshot of one game as seen by one viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct State {
    pub game: ID<Game>,
    pub version: u64,
    pub phase: Phase,
    pub turn: u32,
    pub active: Option<Position>,
    pub players: Vec<PlayerState>,
    pub prompts: Vec<Notice>,
    pub outcome: Option<Outcome>,
}

impl State {
    /// Builds the snapshot for `view`. Hands not owned by the viewer
    /// are reduced to their size and deck order is never included.
    pub fn build(
        game: ID<Game>,
        version: u64,
        phase: Phase,
        participants: &[Participant],
        board: Option<&Board>,
        prompts: Vec<Notice>,
        view: View,
    ) -> Self {
        let players = participants
            .iter()
            .enumerate()
            .map(|(seat, p)| {
                let pile = board.and_then(|b| b.pile(seat)).cloned().unwrap_or_default();
                let visible = match view {
                    View::Seat(me) => me == seat,
                    View::Public => false,
                    View::Omniscient => true,
                };
                PlayerState {
                    client: p.client.clone(),
                    seat,
                    present: p.present,
                    deck: pile.deck.len(),
                    hand: match visible {
                        true => Hand::Known(pile.hand),
                        false => Hand::Hidden(pile.hand.len()),
                    },
                    field: pile.field,
                    discard: pile.discard,
                    prizes: pile.prizes.len(),
                }
            })
            .collect();
        Self {
            game,
            version,
            phase,
            turn: board.map(|b| b.turn).unwrap_or_default(),
            active: board.filter(|b| !b.is_over()).map(|b| b.active),
            players,
            prompts,
            outcome: board.and_then(|b| b.outcome),
        }
    }
    pub fn seat_of(&self, client: ClientId) -> Option<Position> {
        self.players
            .iter()
            .find(|p| p.client.id == client)
            .map(|p| p.seat)
    }
    pub fn player(&self, seat: Position) -> Option<&PlayerState> {
        self.players.get(seat)
    }
    pub fn is_waiting_on(&self, seat: Position) -> bool {
        self.prompts.iter().any(|n| n.seat == seat)
    }
}

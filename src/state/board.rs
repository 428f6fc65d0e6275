use crate::Position;
use serde::Deserialize;
use serde::Serialize;

/// Cards belonging to one seat, by zone.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pile {
    pub deck: Vec<String>,
    pub hand: Vec<String>,
    pub field: Vec<String>,
    pub discard: Vec<String>,
    pub prizes: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    Prizes,
    DeckOut,
    Concession,
    Forfeit,
}

/// How a match ended. No winner means a draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outcome {
    pub winner: Option<Position>,
    pub reason: Reason,
}

/// Authoritative, unredacted data of a match in progress.
/// Owned by the rules engine; the game only stores and forwards it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub turn: u32,
    pub active: Position,
    pub attacked: bool,
    pub piles: Vec<Pile>,
    pub outcome: Option<Outcome>,
}

impl Board {
    pub fn new(piles: Vec<Pile>) -> Self {
        Self {
            turn: 1,
            active: 0,
            attacked: false,
            piles,
            outcome: None,
        }
    }
    pub fn seats(&self) -> usize {
        self.piles.len()
    }
    pub fn pile(&self, seat: Position) -> Option<&Pile> {
        self.piles.get(seat)
    }
    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }
    /// Seat acting after `seat`.
    pub fn next(&self, seat: Position) -> Position {
        (seat + 1) % self.seats().max(1)
    }
    /// Ends the match with a single winner in two-seat games, a draw otherwise.
    pub fn forfeit(&mut self, loser: Position, reason: Reason) {
        let winner = (self.seats() == 2).then(|| self.next(loser));
        self.outcome = Some(Outcome { winner, reason });
    }
}

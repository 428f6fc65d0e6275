mod basic;

pub use basic::*;

use crate::GameError;
use crate::Position;
use crate::prompt::Answer;
use crate::prompt::Request;
use crate::state::Action;
use crate::state::Board;

/// Result of applying an action or answer: the next board and any
/// decisions it is now waiting on.
#[derive(Debug, Clone, PartialEq)]
pub struct Effect {
    pub board: Board,
    pub requests: Vec<Request>,
}

impl From<Board> for Effect {
    fn from(board: Board) -> Self {
        Self {
            board,
            requests: Vec::new(),
        }
    }
}

/// Interaction surface of the card-effect engine.
///
/// Implementations are pure: the same inputs always yield the same
/// board, which is what lets replays be re-simulated from actions.
pub trait Rules: Send + Sync {
    /// Deals the opening board from shuffled decks.
    fn setup(&self, decks: &[Vec<String>], seed: u64) -> Board;
    /// Applies `action` by `seat`, or explains why it is illegal.
    fn apply(&self, board: &Board, seat: Position, action: &Action) -> Result<Effect, GameError>;
    /// Continues from a decision point once `answer` is known.
    fn resolve(&self, board: &Board, request: &Request, answer: &Answer) -> Result<Effect, GameError>;
}

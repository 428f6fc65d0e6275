use crate::Position;
use crate::prompt::Answer;
use crate::prompt::Prompt;
use crate::state::Action;
use crate::state::State;

/// Decision policy behind a programmatic client.
///
/// A bot only ever sees what a human in the same seat would see:
/// its own redacted [`State`] and the prompts addressed to it.
#[async_trait::async_trait]
pub trait Strategy: Send {
    /// Choose an action. Called when it is `seat`'s turn and nothing is pending.
    async fn decide(&mut self, state: &State, seat: Position) -> Action;
    /// Answer a prompt. The answer is still validated by the game.
    async fn answer(&mut self, prompt: &Prompt) -> Answer;
}

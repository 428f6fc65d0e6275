use super::*;
use crate::ID;
use crate::Position;
use crate::prompt::Answer;
use crate::prompt::Prompt;
use crate::state::Action;
use crate::state::Outcome;
use crate::state::State;

/// Accumulates a replay while a game runs.
#[derive(Debug, Clone)]
pub struct Recorder {
    replay: Replay,
}

impl Recorder {
    /// A capture that records nothing falls back to the default.
    pub fn new(capture: Capture) -> Self {
        let capture = match capture.is_playable() {
            true => capture,
            false => {
                log::warn!("[recorder] empty capture mode, recording actions");
                Capture::default()
            }
        };
        Self {
            replay: Replay::new(capture),
        }
    }
    pub fn capture(&self) -> Capture {
        self.replay.capture
    }
    /// Stamps participants and the inputs needed to re-deal the board.
    pub fn start(&mut self, players: Vec<ReplayPlayer>, decks: Vec<Vec<String>>, seed: u64) {
        let mut players = players.into_iter();
        self.replay.player1 = players.next().unwrap_or_default();
        self.replay.player2 = players.next().unwrap_or_default();
        self.replay.decks = decks;
        self.replay.seed = seed;
        self.replay.created = crate::now();
    }
    pub fn action(&mut self, seat: Position, action: Action) {
        if self.replay.capture.actions {
            self.replay.entries.push(Entry::Action { seat, action });
        }
    }
    pub fn answer(&mut self, seat: Position, prompt: ID<Prompt>, answer: Answer, timed_out: bool) {
        if self.replay.capture.actions {
            self.replay.entries.push(Entry::Answer {
                seat,
                prompt,
                answer,
                timed_out,
            });
        }
    }
    pub fn state(&mut self, state: State) {
        if self.replay.capture.states {
            self.replay.entries.push(Entry::State { state });
        }
    }
    pub fn snapshot(&self) -> &Replay {
        &self.replay
    }
    pub fn finish(&mut self, outcome: Option<Outcome>) -> Replay {
        self.replay.winner = Winner::from(outcome);
        self.replay.clone()
    }
}

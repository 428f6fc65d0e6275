use super::*;
use crate::GameError;
use crate::prompt::Request;
use crate::rules::Rules;
use crate::state::Board;
use crate::state::State;

/// Rebuilds the course of a match from its replay.
pub struct Playback<'a> {
    replay: &'a Replay,
}

impl<'a> Playback<'a> {
    pub fn new(replay: &'a Replay) -> Self {
        Self { replay }
    }
    /// Recorded snapshots, available without any rules engine.
    pub fn states(&self) -> Vec<&'a State> {
        self.replay.states().collect()
    }
    /// Re-deals from the recorded seed and decks and replays every
    /// action and answer, returning the board after each step.
    pub fn simulate(&self, rules: &dyn Rules) -> Result<Vec<Board>, GameError> {
        if !self.replay.capture.actions {
            return Err(GameError::IllegalAction(String::from(
                "replay did not record actions",
            )));
        }
        let mut board = rules.setup(&self.replay.decks, self.replay.seed);
        let mut pending = Vec::<Request>::new();
        let mut boards = vec![board.clone()];
        for entry in &self.replay.entries {
            let effect = match entry {
                Entry::Action { seat, action } => rules.apply(&board, *seat, action)?,
                Entry::Answer { seat, answer, .. } => {
                    match pending.iter().position(|r| r.seat == *seat) {
                        Some(i) => rules.resolve(&board, &pending.remove(i), answer)?,
                        None => continue,
                    }
                }
                Entry::State { .. } => continue,
            };
            board = effect.board;
            pending.extend(effect.requests);
            boards.push(board.clone());
        }
        Ok(boards)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::Catalogue;
    use crate::prompt::Answer;
    use crate::rules::BasicRules;
    use crate::state::Action;
    use std::sync::Arc;
    #[test]
    fn resimulates_actions_and_answers() {
        let rules = BasicRules::new(Arc::new(Catalogue::standard()));
        let mut replay = Replay::new(Capture::default());
        replay.seed = 5;
        replay.decks = vec![Catalogue::starter_deck(), Catalogue::starter_deck()];
        replay.entries = vec![
            Entry::Action {
                seat: 0,
                action: Action::Pass,
            },
            Entry::Action {
                seat: 1,
                action: Action::Pass,
            },
            Entry::Action {
                seat: 0,
                action: Action::Concede,
            },
        ];
        let boards = Playback::new(&replay).simulate(&rules).unwrap();
        assert_eq!(boards.len(), 4);
        assert_eq!(boards[3].outcome.and_then(|o| o.winner), Some(1));
    }
    #[test]
    fn stray_answers_are_skipped() {
        let rules = BasicRules::new(Arc::new(Catalogue::standard()));
        let mut replay = Replay::new(Capture::default());
        replay.decks = vec![Catalogue::starter_deck(), Catalogue::starter_deck()];
        replay.entries = vec![Entry::Answer {
            seat: 1,
            prompt: crate::ID::new(1),
            answer: Answer::Ack,
            timed_out: true,
        }];
        let boards = Playback::new(&replay).simulate(&rules).unwrap();
        assert_eq!(boards.len(), 1);
    }
    #[test]
    fn state_only_replays_cannot_simulate() {
        let rules = BasicRules::new(Arc::new(Catalogue::standard()));
        let replay = Replay::new(Capture {
            states: true,
            actions: false,
        });
        assert!(Playback::new(&replay).simulate(&rules).is_err());
        assert!(Playback::new(&replay).states().is_empty());
    }
}

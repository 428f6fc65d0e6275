use super::*;
use crate::Position;
use crate::prompt::Answer;
use crate::prompt::Prompt;
use crate::prompt::PromptKind;
use crate::state::Action;
use crate::state::State;
use rand::Rng;
use rand::seq::index::sample;

/// CPU player that picks uniformly among plausible moves.
/// Illegal picks are caught by the game and answered with a pass.
pub struct Fish;

#[async_trait::async_trait]
impl Strategy for Fish {
    async fn decide(&mut self, state: &State, seat: Position) -> Action {
        let ref mut rng = rand::rng();
        let Some(me) = state.player(seat) else {
            return Action::Pass;
        };
        let hand = me.hand.len();
        let play = |rng: &mut rand::rngs::ThreadRng| match hand {
            0 => Action::Pass,
            n => Action::Play {
                card: rng.random_range(0..n),
            },
        };
        if me.field.is_empty() {
            return play(rng);
        }
        match rng.random_range(0..4) {
            0 | 1 => Action::Attack,
            2 => play(rng),
            _ => Action::Pass,
        }
    }

    async fn answer(&mut self, prompt: &Prompt) -> Answer {
        let ref mut rng = rand::rng();
        match &prompt.kind {
            PromptKind::Alert => Answer::Ack,
            PromptKind::Confirm => Answer::Confirm(rng.random_bool(0.5)),
            PromptKind::ChooseOption { options } if options.is_empty() => Answer::Option(0),
            PromptKind::ChooseOption { options } => {
                Answer::Option(rng.random_range(0..options.len()))
            }
            PromptKind::ChooseCards { cards, min, max } => {
                let lo = (*min).min(cards.len());
                let hi = (*max).min(cards.len()).max(lo);
                let n = rng.random_range(lo..=hi);
                Answer::Cards(sample(rng, cards.len(), n).into_vec())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ID;
    use crate::client::ClientInfo;
    use crate::state::Hand;
    use crate::state::Phase;
    use crate::state::PlayerState;
    fn state(hand: usize, field: usize) -> State {
        State {
            game: ID::new(1),
            version: 1,
            phase: Phase::InProgress,
            turn: 1,
            active: Some(0),
            players: vec![PlayerState {
                client: ClientInfo {
                    id: ID::new(1),
                    name: String::from("fish"),
                },
                seat: 0,
                present: true,
                deck: 10,
                hand: Hand::Known(vec![String::from("Ember Fox"); hand]),
                field: vec![String::from("Ember Fox"); field],
                discard: vec![],
                prizes: 3,
            }],
            prompts: vec![],
            outcome: None,
        }
    }
    fn prompt(kind: PromptKind) -> Prompt {
        Prompt {
            id: ID::new(1),
            game: ID::new(1),
            client: ID::new(1),
            seat: 0,
            kind,
            message: String::new(),
            timeout: None,
        }
    }
    #[tokio::test]
    async fn plays_from_hand_with_empty_field() {
        for _ in 0..32 {
            match Fish.decide(&state(5, 0), 0).await {
                Action::Play { card } => assert!(card < 5),
                other => panic!("unexpected {:?}", other),
            }
        }
        assert_eq!(Fish.decide(&state(0, 0), 0).await, Action::Pass);
    }
    #[tokio::test]
    async fn answers_always_validate() {
        let kinds = [
            PromptKind::Alert,
            PromptKind::Confirm,
            PromptKind::ChooseOption {
                options: vec!["a".into(), "b".into()],
            },
            PromptKind::ChooseCards {
                cards: vec!["a".into(), "b".into(), "c".into()],
                min: 1,
                max: 2,
            },
            PromptKind::ChooseCards {
                cards: vec!["a".into()],
                min: 2,
                max: 2,
            },
        ];
        for kind in kinds {
            for _ in 0..16 {
                let answer = Fish.answer(&prompt(kind.clone())).await;
                assert!(kind.validate(&answer).is_ok(), "{:?} {:?}", kind, answer);
            }
        }
    }
}

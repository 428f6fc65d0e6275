use crate::GameError;
use serde::Deserialize;
use serde::Serialize;

/// The shape of a decision a prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PromptKind {
    Alert,
    Confirm,
    ChooseCards {
        cards: Vec<String>,
        min: usize,
        max: usize,
    },
    ChooseOption {
        options: Vec<String>,
    },
}

/// A participant's response to a prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Ack,
    Confirm(bool),
    Cards(Vec<usize>),
    Option(usize),
}

impl PromptKind {
    /// Refuses kinds no answer could satisfy.
    pub fn check(&self) -> Result<(), GameError> {
        match self {
            Self::ChooseCards { min, max, .. } if min > max => Err(GameError::IllegalAction(
                String::from("minimum exceeds maximum"),
            )),
            Self::ChooseOption { options } if options.is_empty() => Err(
                GameError::IllegalAction(String::from("no options to choose from")),
            ),
            _ => Ok(()),
        }
    }
    /// Resolution applied when the addressee never answers.
    pub fn fallback(&self) -> Answer {
        match self {
            Self::Alert => Answer::Ack,
            Self::Confirm => Answer::Confirm(false),
            Self::ChooseCards { cards, min, max } => {
                Answer::Cards((0..least(cards, *min, *max)).collect())
            }
            Self::ChooseOption { .. } => Answer::Option(0),
        }
    }
    /// Checks that `answer` fits this prompt.
    pub fn validate(&self, answer: &Answer) -> Result<(), GameError> {
        let illegal = |s: &str| Err(GameError::IllegalAction(s.to_string()));
        match (self, answer) {
            (Self::Alert, Answer::Ack) => Ok(()),
            (Self::Confirm, Answer::Confirm(_)) => Ok(()),
            (Self::ChooseOption { options }, Answer::Option(i)) => match *i < options.len() {
                true => Ok(()),
                false => illegal("option out of range"),
            },
            (Self::ChooseCards { cards, min, max }, Answer::Cards(picks)) => {
                let mut seen = picks.clone();
                seen.sort_unstable();
                seen.dedup();
                if seen.len() != picks.len() {
                    illegal("card chosen twice")
                } else if picks.iter().any(|i| *i >= cards.len()) {
                    illegal("card out of range")
                } else if picks.len() < least(cards, *min, *max) || picks.len() > *max {
                    illegal("wrong number of cards")
                } else {
                    Ok(())
                }
            }
            _ => illegal("answer does not match prompt"),
        }
    }
}

/// Fewest picks a card choice accepts. Never more than can be picked.
fn least(cards: &[String], min: usize, max: usize) -> usize {
    min.min(max).min(cards.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    fn choose() -> PromptKind {
        PromptKind::ChooseCards {
            cards: vec!["a".into(), "b".into(), "c".into()],
            min: 1,
            max: 2,
        }
    }
    #[test]
    fn fallbacks_validate() {
        for kind in [
            PromptKind::Alert,
            PromptKind::Confirm,
            choose(),
            PromptKind::ChooseOption {
                options: vec!["x".into()],
            },
        ] {
            assert!(kind.validate(&kind.fallback()).is_ok(), "{:?}", kind);
        }
    }
    #[test]
    fn unsatisfiable_kinds() {
        let inverted = PromptKind::ChooseCards {
            cards: vec!["a".into(), "b".into(), "c".into()],
            min: 3,
            max: 1,
        };
        assert!(inverted.check().is_err());
        assert!(inverted.validate(&inverted.fallback()).is_ok());
        let empty = PromptKind::ChooseOption { options: vec![] };
        assert!(empty.check().is_err());
        assert!(choose().check().is_ok());
    }
    #[test]
    fn rejects_bad_picks() {
        let kind = choose();
        assert!(kind.validate(&Answer::Cards(vec![])).is_err());
        assert!(kind.validate(&Answer::Cards(vec![0, 0])).is_err());
        assert!(kind.validate(&Answer::Cards(vec![3])).is_err());
        assert!(kind.validate(&Answer::Cards(vec![0, 1, 2])).is_err());
        assert!(kind.validate(&Answer::Confirm(true)).is_err());
        assert!(kind.validate(&Answer::Cards(vec![2, 0])).is_ok());
    }
    #[test]
    fn answer_wire_shape() {
        let json = serde_json::to_string(&Answer::Cards(vec![1])).unwrap();
        assert_eq!(json, r#"{"type":"cards","value":[1]}"#);
        let ack: Answer = serde_json::from_str(r#"{"type":"ack"}"#).unwrap();
        assert_eq!(ack, Answer::Ack);
    }
}

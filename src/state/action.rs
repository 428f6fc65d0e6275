use serde::Deserialize;
use serde::Serialize;

/// A move submitted by the active participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Put the card at this hand index into play.
    Play { card: usize },
    Attack,
    /// End the turn.
    Pass,
    /// Give up the match. Allowed out of turn.
    Concede,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Play { card } => write!(f, "play {}", card),
            Self::Attack => write!(f, "attack"),
            Self::Pass => write!(f, "pass"),
            Self::Concede => write!(f, "concede"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn wire_shape() {
        let json = serde_json::to_string(&Action::Play { card: 2 }).unwrap();
        assert_eq!(json, r#"{"type":"play","card":2}"#);
        let back: Action = serde_json::from_str(r#"{"type":"pass"}"#).unwrap();
        assert_eq!(back, Action::Pass);
    }
}

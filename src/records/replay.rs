use crate::ID;
use crate::Position;
use crate::client::ClientId;
use crate::prompt::Answer;
use crate::prompt::Prompt;
use crate::state::Action;
use crate::state::Outcome;
use crate::state::State;
use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    #[default]
    None,
    Player1,
    Player2,
    Draw,
}

impl From<Option<Outcome>> for Winner {
    fn from(outcome: Option<Outcome>) -> Self {
        match outcome.map(|o| o.winner) {
            None => Self::None,
            Some(None) => Self::Draw,
            Some(Some(0)) => Self::Player1,
            Some(Some(_)) => Self::Player2,
        }
    }
}

/// Which entries a replay records. At least one must be on for playback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capture {
    pub states: bool,
    pub actions: bool,
}

impl Default for Capture {
    fn default() -> Self {
        Self {
            states: false,
            actions: true,
        }
    }
}

impl Capture {
    pub fn is_playable(&self) -> bool {
        self.states || self.actions
    }
    /// Comma-separated modes, e.g. `states,actions`. Naming no mode is refused.
    pub fn parse(s: &str) -> Option<Self> {
        let mut capture = Self {
            states: false,
            actions: false,
        };
        for mode in s.split(',').map(str::trim).filter(|m| !m.is_empty()) {
            match mode {
                "states" => capture.states = true,
                "actions" => capture.actions = true,
                _ => return None,
            }
        }
        Some(capture).filter(Self::is_playable)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ReplayPlayer {
    pub user: ClientId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Entry {
    Action {
        seat: Position,
        action: Action,
    },
    Answer {
        seat: Position,
        prompt: ID<Prompt>,
        answer: Answer,
        timed_out: bool,
    },
    State {
        state: State,
    },
}

impl Entry {
    pub fn tag(&self) -> u8 {
        match self {
            Self::Action { .. } => 1,
            Self::Answer { .. } => 2,
            Self::State { .. } => 3,
        }
    }
}

/// Ordered log of a match plus its metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Replay {
    pub player1: ReplayPlayer,
    pub player2: ReplayPlayer,
    pub winner: Winner,
    /// Unix milliseconds.
    pub created: i64,
    pub capture: Capture,
    pub seed: u64,
    pub decks: Vec<Vec<String>>,
    pub entries: Vec<Entry>,
}

impl Replay {
    pub fn new(capture: Capture) -> Self {
        Self {
            player1: ReplayPlayer::default(),
            player2: ReplayPlayer::default(),
            winner: Winner::None,
            created: crate::now(),
            capture,
            seed: 0,
            decks: Vec::new(),
            entries: Vec::new(),
        }
    }
    pub fn actions(&self) -> impl Iterator<Item = (Position, &Action)> {
        self.entries.iter().filter_map(|e| match e {
            Entry::Action { seat, action } => Some((*seat, action)),
            _ => None,
        })
    }
    pub fn states(&self) -> impl Iterator<Item = &State> {
        self.entries.iter().filter_map(|e| match e {
            Entry::State { state } => Some(state),
            _ => None,
        })
    }
}

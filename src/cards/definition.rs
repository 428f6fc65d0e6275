use serde::Deserialize;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Water,
    Grass,
    Lightning,
    Psychic,
    Fighting,
    Colorless,
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Fire => "fire",
            Self::Water => "water",
            Self::Grass => "grass",
            Self::Lightning => "lightning",
            Self::Psychic => "psychic",
            Self::Fighting => "fighting",
            Self::Colorless => "colorless",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Basic,
    Stage1,
    Stage2,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Kind {
    Creature { stage: Stage, element: Element, hp: u16 },
    Trainer,
    Energy { element: Element, basic: bool },
}

/// One catalogue entry. Cards in decks and hands are referenced by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Definition {
    pub name: String,
    pub kind: Kind,
}

impl Definition {
    pub fn creature(name: &str, stage: Stage, element: Element, hp: u16) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Creature { stage, element, hp },
        }
    }
    pub fn trainer(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Trainer,
        }
    }
    pub fn energy(name: &str, element: Element, basic: bool) -> Self {
        Self {
            name: name.to_string(),
            kind: Kind::Energy { element, basic },
        }
    }
    pub fn is_basic_creature(&self) -> bool {
        matches!(
            self.kind,
            Kind::Creature {
                stage: Stage::Basic,
                ..
            }
        )
    }
    pub fn is_basic_energy(&self) -> bool {
        matches!(self.kind, Kind::Energy { basic: true, .. })
    }
    pub fn is_creature(&self) -> bool {
        matches!(self.kind, Kind::Creature { .. })
    }
    pub fn is_trainer(&self) -> bool {
        matches!(self.kind, Kind::Trainer)
    }
    pub fn element(&self) -> Option<Element> {
        match self.kind {
            Kind::Creature { element, .. } => Some(element),
            Kind::Energy { element, .. } => Some(element),
            Kind::Trainer => None,
        }
    }
}

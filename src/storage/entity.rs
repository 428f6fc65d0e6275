use crate::ID;
use crate::cards::Element;
use crate::game::Game;
use crate::records::ReplayPlayer;
use crate::records::Winner;
use serde::Deserialize;
use serde::Serialize;

/// An account. Clients act on behalf of exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: ID<User>,
    pub name: String,
    #[serde(skip_serializing, default)]
    pub hashword: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: ID<Deck>,
    pub user: ID<User>,
    pub name: String,
    pub cards: Vec<String>,
    #[serde(rename = "isValid")]
    pub valid: bool,
    #[serde(rename = "cardTypes")]
    pub types: Vec<Element>,
}

/// An archived match: the serialized replay plus what is needed to list it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub id: ID<Game>,
    pub created: i64,
    pub player1: Option<ID<User>>,
    pub player2: Option<ID<User>>,
    pub winner: Winner,
    pub replay: Vec<u8>,
}

impl Match {
    pub fn involves(&self, user: ID<User>) -> bool {
        self.player1 == Some(user) || self.player2 == Some(user)
    }
}

/// A replay a user chose to keep, named by them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub id: ID<ReplayRecord>,
    pub user: ID<User>,
    pub name: String,
    pub created: i64,
    pub player1: ReplayPlayer,
    pub player2: ReplayPlayer,
    pub winner: Winner,
    #[serde(skip_serializing, default)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub total: usize,
}

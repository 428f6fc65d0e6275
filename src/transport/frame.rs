use crate::client::Event;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Message acknowledging success in a [`Frame::Reply`].
pub const OK: &str = "ok";

/// One JSON message on a connection.
///
/// Requests are answered by exactly one reply with the same id.
/// Pushes are unsolicited and carry an [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Frame {
    Request {
        id: u64,
        name: String,
        #[serde(default)]
        payload: Value,
    },
    Reply {
        id: u64,
        message: String,
        #[serde(default)]
        data: Value,
    },
    Push {
        event: String,
        #[serde(default)]
        data: Value,
    },
}

impl Frame {
    pub fn ok(id: u64, data: Value) -> Self {
        Self::Reply {
            id,
            message: OK.to_string(),
            data,
        }
    }
    pub fn err(id: u64, code: &str) -> Self {
        Self::Reply {
            id,
            message: code.to_string(),
            data: Value::Null,
        }
    }
}

impl From<&Event> for Frame {
    fn from(event: &Event) -> Self {
        Self::Push {
            event: event.name().to_string(),
            data: event.data(),
        }
    }
}

impl TryFrom<&str> for Frame {
    type Error = serde_json::Error;
    fn try_from(text: &str) -> Result<Self, Self::Error> {
        serde_json::from_str(text)
    }
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match serde_json::to_string(self) {
            Ok(json) => write!(f, "{}", json),
            Err(_) => Err(std::fmt::Error),
        }
    }
}

use crate::GameError;
use crate::ID;
use crate::client::Client;
use crate::client::ClientId;
use crate::prompt::Answer;
use crate::prompt::Prompt;
use crate::prompt::PromptKind;
use crate::state::Action;
use crate::state::State;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;

use super::GameInfo;

pub type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Messages processed one at a time by a game's task.
pub enum Command {
    Join {
        client: Arc<dyn Client>,
        deck: Vec<String>,
        reply: Reply<()>,
    },
    Rebind {
        client: Arc<dyn Client>,
        reply: Reply<bool>,
    },
    Leave {
        client: ClientId,
        reply: Reply<usize>,
    },
    Play {
        client: ClientId,
        action: Action,
        reply: Reply<u64>,
    },
    Issue {
        client: ClientId,
        kind: PromptKind,
        message: String,
        timeout: Option<Duration>,
        reply: Reply<Prompt>,
    },
    Resolve {
        client: ClientId,
        prompt: ID<Prompt>,
        answer: Answer,
        reply: Reply<u64>,
    },
    Expire {
        client: ClientId,
        prompt: ID<Prompt>,
    },
    Inspect {
        viewer: Option<ClientId>,
        reply: Reply<State>,
    },
    Info {
        reply: Reply<GameInfo>,
    },
    Shutdown,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Join { client, .. } => write!(f, "Join({})", client.id()),
            Self::Rebind { client, .. } => write!(f, "Rebind({})", client.id()),
            Self::Leave { client, .. } => write!(f, "Leave({})", client),
            Self::Play { client, action, .. } => write!(f, "Play({}, {})", client, action),
            Self::Issue { client, message, .. } => write!(f, "Issue({}, {})", client, message),
            Self::Resolve { client, prompt, .. } => write!(f, "Resolve({}, {})", client, prompt),
            Self::Expire { client, prompt } => write!(f, "Expire({}, {})", client, prompt),
            Self::Inspect { viewer, .. } => write!(f, "Inspect({:?})", viewer),
            Self::Info { .. } => write!(f, "Info"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

use super::*;
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
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;

/// Cloneable address of a running game. Every call is serialized
/// through the game's task; a stopped game answers `GameNotFound`.
#[derive(Debug, Clone)]
pub struct GameHandle {
    id: ID<Game>,
    tx: UnboundedSender<Command>,
}

impl GameHandle {
    pub fn new(id: ID<Game>, tx: UnboundedSender<Command>) -> Self {
        Self { id, tx }
    }
    pub fn id(&self) -> ID<Game> {
        self.id
    }
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
    async fn ask<T, F>(&self, command: F) -> Result<T, GameError>
    where
        F: FnOnce(Reply<T>) -> Command,
    {
        let (reply, answer) = oneshot::channel();
        self.tx
            .send(command(reply))
            .map_err(|_| GameError::GameNotFound)?;
        answer.await.map_err(|_| GameError::GameNotFound)?
    }
    pub async fn join(&self, client: Arc<dyn Client>, deck: Vec<String>) -> Result<(), GameError> {
        self.ask(|reply| Command::Join {
            client,
            deck,
            reply,
        })
        .await
    }
    /// Swaps in a new connection for a seated client. False if not seated.
    pub async fn rebind(&self, client: Arc<dyn Client>) -> Result<bool, GameError> {
        self.ask(|reply| Command::Rebind { client, reply }).await
    }
    /// Returns how many participants remain.
    pub async fn leave(&self, client: ClientId) -> Result<usize, GameError> {
        self.ask(|reply| Command::Leave { client, reply }).await
    }
    /// Returns the version of the state after the action.
    pub async fn play(&self, client: ClientId, action: Action) -> Result<u64, GameError> {
        self.ask(|reply| Command::Play {
            client,
            action,
            reply,
        })
        .await
    }
    /// Addresses a prompt to `client`. `None` uses the configured timeout.
    pub async fn issue_prompt(
        &self,
        client: ClientId,
        kind: PromptKind,
        message: &str,
        timeout: Option<Duration>,
    ) -> Result<Prompt, GameError> {
        self.ask(|reply| Command::Issue {
            client,
            kind,
            message: message.to_string(),
            timeout,
            reply,
        })
        .await
    }
    pub async fn resolve_prompt(
        &self,
        client: ClientId,
        prompt: ID<Prompt>,
        answer: Answer,
    ) -> Result<u64, GameError> {
        self.ask(|reply| Command::Resolve {
            client,
            prompt,
            answer,
            reply,
        })
        .await
    }
    /// Snapshot for `viewer`; `None` sees every hand.
    pub async fn state(&self, viewer: Option<ClientId>) -> Result<State, GameError> {
        self.ask(|reply| Command::Inspect { viewer, reply }).await
    }
    pub async fn info(&self) -> Result<GameInfo, GameError> {
        self.ask(|reply| Command::Info { reply }).await
    }
    pub fn shutdown(&self) {
        let _ = self.tx.send(Command::Shutdown);
    }
}

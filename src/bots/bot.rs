use super::*;
use crate::ID;
use crate::client::Client;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::client::Event;
use crate::client::Mailbox;
use crate::game::Game;
use crate::hub::Core;
use crate::prompt::Prompt;
use crate::state::Action;
use crate::state::Phase;
use crate::state::State;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Weak;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;

/// A programmatic client. It registers with the hub like any other
/// client and acts through the same game handles a transport would.
pub struct BotClient {
    client: Arc<Mailbox>,
    task: JoinHandle<()>,
}

impl BotClient {
    pub fn spawn(info: ClientInfo, strategy: Box<dyn Strategy>, core: Weak<Core>) -> Self {
        let (client, rx) = Mailbox::pair(info.id, &info.name);
        let brain = Brain {
            id: info.id,
            strategy,
            core,
            acted: HashMap::new(),
        };
        let task = tokio::spawn(brain.run(rx));
        Self { client, task }
    }
    pub fn id(&self) -> ClientId {
        self.client.id()
    }
    pub fn name(&self) -> &str {
        self.client.name()
    }
    pub fn client(&self) -> Arc<dyn Client> {
        self.client.clone()
    }
}

impl Drop for BotClient {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Event loop behind a bot's mailbox.
struct Brain {
    id: ClientId,
    strategy: Box<dyn Strategy>,
    core: Weak<Core>,
    acted: HashMap<ID<Game>, u64>,
}

impl Brain {
    async fn run(mut self, mut rx: UnboundedReceiver<Event>) {
        while let Some(event) = rx.recv().await {
            match event {
                Event::StateChanged { game, state } => self.act(game, state).await,
                Event::Prompted { prompt } => self.reply(prompt).await,
                Event::GameLeft { game, client } if client.id == self.id => {
                    self.acted.remove(&game);
                }
                _ => {}
            }
        }
        log::debug!("[bot {}] mailbox closed", self.id);
    }

    async fn act(&mut self, game: ID<Game>, state: State) {
        if state.phase == Phase::Finished {
            self.acted.remove(&game);
            return;
        }
        let Some(seat) = state.seat_of(self.id) else {
            return;
        };
        if state.phase != Phase::InProgress
            || state.active != Some(seat)
            || !state.prompts.is_empty()
            || self.acted.get(&game).is_some_and(|v| *v >= state.version)
        {
            return;
        }
        self.acted.insert(game, state.version);
        let action = self.strategy.decide(&state, seat).await;
        let Some(core) = self.core.upgrade() else {
            return;
        };
        let Ok(handle) = core.game(game).await else {
            return;
        };
        if let Err(e) = handle.play(self.id, action).await {
            log::debug!("[bot {}] {} rejected ({}), passing", self.id, action, e);
            if let Err(e) = handle.play(self.id, Action::Pass).await {
                log::debug!("[bot {}] pass rejected: {}", self.id, e);
            }
        }
    }

    async fn reply(&mut self, prompt: Prompt) {
        let answer = self.strategy.answer(&prompt).await;
        let Some(core) = self.core.upgrade() else {
            return;
        };
        let result = match core.game(prompt.game).await {
            Ok(handle) => handle.resolve_prompt(self.id, prompt.id, answer).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            log::debug!("[bot {}] prompt {} not resolved: {}", self.id, prompt.id, e);
        }
    }
}

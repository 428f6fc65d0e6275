use super::*;
use crate::Config;
use crate::GameError;
use crate::ID;
use crate::Sequence;
use crate::cards::Catalogue;
use crate::client::Client;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::client::Event;
use crate::game::Game;
use crate::game::GameHandle;
use crate::game::GameInfo;
use crate::game::Summary;
use crate::records::Winner;
use crate::rules::Rules;
use crate::storage::Match;
use crate::storage::Storage;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Process-wide hub of connected clients and live games.
///
/// The registry lock is never held while waiting on a game. Every side
/// effect on clients is a notification; games are only ever driven
/// through their handles.
pub struct Core {
    config: Config,
    rules: Arc<dyn Rules>,
    catalogue: Arc<Catalogue>,
    storage: Arc<dyn Storage>,
    registry: RwLock<Registry>,
    sequence: Sequence<Game>,
}

impl Core {
    pub fn new(
        config: Config,
        rules: Arc<dyn Rules>,
        catalogue: Arc<Catalogue>,
        storage: Arc<dyn Storage>,
    ) -> Self {
        Self {
            config,
            rules,
            catalogue,
            storage,
            registry: RwLock::new(Registry::default()),
            sequence: Sequence::default(),
        }
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    pub fn catalogue(&self) -> &Arc<Catalogue> {
        &self.catalogue
    }
    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }
    pub fn rules(&self) -> &Arc<dyn Rules> {
        &self.rules
    }
}

impl Core {
    /// Registers a client. Games that already seat it are re-bound to
    /// the new connection and re-announce themselves to it. A registration
    /// whose channel is gone is taken over along with its memberships.
    pub async fn connect(&self, client: Arc<dyn Client>) -> Result<(), GameError> {
        let id = client.id();
        let (recipients, games) = {
            let mut registry = self.registry.write().await;
            let Registry { clients, games: handles } = &mut *registry;
            match clients.get_mut(&id) {
                Some(member) if member.client.alive() => {
                    log::warn!("[core] rejected duplicate connection for {}", id);
                    return Err(GameError::DuplicateClient);
                }
                Some(member) => {
                    log::info!("[core] {} takes over a dead connection", id);
                    member.client = client.clone();
                }
                None => drop(clients.insert(id, Member::new(client.clone()))),
            }
            let games = handles.values().cloned().collect::<Vec<_>>();
            (registry.recipients(), games)
        };
        log::info!("[core] {} connected as {}", client.name(), id);
        Self::fan(&recipients, Event::Connected {
            client: client.info(),
        });
        for handle in games {
            if let Ok(true) = handle.rebind(client.clone()).await {
                self.link(id, handle.id()).await;
            }
        }
        Ok(())
    }

    /// Replaces a live registration for the same account. The replaced
    /// connection is told it was disconnected; seats carry over.
    pub async fn reconnect(&self, client: Arc<dyn Client>) -> Result<(), GameError> {
        let id = client.id();
        let replaced = {
            let mut registry = self.registry.write().await;
            let Registry { clients, games: handles } = &mut *registry;
            match clients.get_mut(&id) {
                Some(member) => {
                    let old = std::mem::replace(&mut member.client, client.clone());
                    let games = member
                        .games
                        .iter()
                        .filter_map(|g| handles.get(g).cloned())
                        .collect::<Vec<_>>();
                    Some((old, games))
                }
                None => None,
            }
        };
        let Some((old, games)) = replaced else {
            return self.connect(client).await;
        };
        log::info!("[core] {} reconnected", id);
        old.notify(Event::Disconnected { client: old.info() });
        client.notify(Event::Connected {
            client: client.info(),
        });
        for handle in games {
            let _ = handle.rebind(client.clone()).await;
        }
        Ok(())
    }

    /// Unregisters a client and leaves every game it was in. Games with
    /// participants left keep running; emptied ones are deleted.
    pub async fn disconnect(&self, id: ClientId) -> Result<(), GameError> {
        let (member, games) = {
            let mut registry = self.registry.write().await;
            let member = registry
                .clients
                .remove(&id)
                .ok_or(GameError::ClientNotConnected)?;
            let games = member
                .games
                .iter()
                .filter_map(|g| registry.games.get(g).cloned())
                .collect::<Vec<_>>();
            (member, games)
        };
        log::info!("[core] {} disconnected", id);
        for handle in games {
            match handle.leave(id).await {
                Ok(0) => drop(self.delete_game(handle.id()).await),
                Ok(_) => self.publish(handle.id()).await,
                Err(e) => log::debug!("[core] {} leaving game {}: {}", id, handle.id(), e),
            }
        }
        let info = member.client.info();
        let recipients = self.registry.read().await.recipients();
        Self::fan(&recipients, Event::Disconnected {
            client: info.clone(),
        });
        member.client.notify(Event::Disconnected { client: info });
        Ok(())
    }

    /// Disconnects `client` only if it is still the registered connection
    /// for its account, so a replaced transport cannot evict its successor.
    pub async fn detach(&self, client: &Arc<dyn Client>) -> Result<(), GameError> {
        let current = self
            .registry
            .read()
            .await
            .clients
            .get(&client.id())
            .map(|m| Arc::as_ptr(&m.client) as *const () == Arc::as_ptr(client) as *const ());
        match current {
            Some(true) => self.disconnect(client.id()).await,
            Some(false) => Ok(()),
            None => Err(GameError::ClientNotConnected),
        }
    }
}

impl Core {
    /// Opens a game, seats its creator and announces it to the lobby.
    /// A finished game retires itself from the registry and is archived.
    pub async fn create_game(
        self: &Arc<Self>,
        creator: ClientId,
        deck: Vec<String>,
    ) -> Result<ID<Game>, GameError> {
        if !self.is_connected(creator).await {
            return Err(GameError::ClientNotConnected);
        }
        let id = self.sequence.next();
        let (handle, done) = Game::spawn(id, &self.config, self.rules.clone(), self.catalogue.clone());
        self.registry.write().await.games.insert(id, handle.clone());
        let core = Arc::downgrade(self);
        tokio::spawn(async move {
            if let Ok(summary) = done.await {
                if let Some(core) = core.upgrade() {
                    core.retire(summary).await;
                }
            }
        });
        log::info!("[core] {} created game {}", creator, id);
        if let Ok(info) = handle.info().await {
            self.broadcast(Event::GameAdded { game: info }).await;
        }
        match self.join(creator, id, deck).await {
            Ok(()) => Ok(id),
            Err(e) => {
                let _ = self.delete_game(id).await;
                Err(e)
            }
        }
    }

    pub async fn game(&self, id: ID<Game>) -> Result<GameHandle, GameError> {
        self.registry
            .read()
            .await
            .games
            .get(&id)
            .cloned()
            .ok_or(GameError::GameNotFound)
    }

    /// Stops a game and removes it from the lobby.
    pub async fn delete_game(&self, id: ID<Game>) -> Result<(), GameError> {
        let (handle, recipients) = {
            let mut registry = self.registry.write().await;
            let handle = registry.games.remove(&id).ok_or(GameError::GameNotFound)?;
            registry.unlink(id);
            (handle, registry.recipients())
        };
        handle.shutdown();
        log::info!("[core] deleted game {}", id);
        Self::fan(&recipients, Event::GameDeleted { game: id });
        Ok(())
    }

    pub async fn join(&self, client: ClientId, game: ID<Game>, deck: Vec<String>) -> Result<(), GameError> {
        let (member, handle) = {
            let registry = self.registry.read().await;
            let member = registry
                .clients
                .get(&client)
                .map(|m| m.client.clone())
                .ok_or(GameError::ClientNotConnected)?;
            let handle = registry.games.get(&game).cloned().ok_or(GameError::GameNotFound)?;
            (member, handle)
        };
        handle.join(member, deck).await?;
        self.link(client, game).await;
        self.publish(game).await;
        Ok(())
    }

    /// Leaves a game; a game left empty is deleted.
    pub async fn leave(&self, client: ClientId, game: ID<Game>) -> Result<(), GameError> {
        let handle = self.game(game).await?;
        let remaining = handle.leave(client).await?;
        if let Some(member) = self.registry.write().await.clients.get_mut(&client) {
            member.games.remove(&game);
        }
        match remaining {
            0 => self.delete_game(game).await,
            _ => Ok(self.publish(game).await),
        }
    }

    /// Takes a finished game out of the live registry and archives its replay.
    async fn retire(&self, summary: Summary) {
        let id = summary.game;
        let recipients = {
            let mut registry = self.registry.write().await;
            registry.games.remove(&id);
            registry.unlink(id);
            registry.recipients()
        };
        Self::fan(&recipients, Event::GameDeleted { game: id });
        let replay = summary.replay;
        let seated = |user: ID<_>| (user != ID::default()).then_some(user);
        let record = Match {
            id,
            created: replay.created,
            player1: seated(replay.player1.user),
            player2: seated(replay.player2.user),
            winner: Winner::from(summary.outcome),
            replay: replay.serialize(),
        };
        match self.storage.save_match(record).await {
            Ok(()) => log::info!("[core] archived game {}", id),
            Err(e) => log::error!("[core] failed to archive game {}: {}", id, e),
        }
    }
}

impl Core {
    pub async fn is_connected(&self, id: ClientId) -> bool {
        self.registry.read().await.clients.contains_key(&id)
    }
    pub async fn client(&self, id: ClientId) -> Option<Arc<dyn Client>> {
        self.registry
            .read()
            .await
            .clients
            .get(&id)
            .map(|m| m.client.clone())
    }
    pub async fn clients(&self) -> Vec<ClientInfo> {
        let mut clients = self
            .registry
            .read()
            .await
            .clients
            .values()
            .map(|m| m.client.info())
            .collect::<Vec<_>>();
        clients.sort_by_key(|c| c.id);
        clients
    }
    pub async fn games(&self) -> Vec<GameInfo> {
        let handles = self
            .registry
            .read()
            .await
            .games
            .values()
            .cloned()
            .collect::<Vec<_>>();
        let mut games = Vec::with_capacity(handles.len());
        for handle in handles {
            if let Ok(info) = handle.info().await {
                games.push(info);
            }
        }
        games.sort_by_key(|g| g.id);
        games
    }
    pub async fn games_of(&self, id: ClientId) -> Vec<ID<Game>> {
        self.registry
            .read()
            .await
            .clients
            .get(&id)
            .map(|m| m.games.iter().copied().collect())
            .unwrap_or_default()
    }
    pub async fn info(&self) -> CoreInfo {
        CoreInfo {
            clients: self.clients().await,
            games: self.games().await,
        }
    }
}

impl Core {
    async fn link(&self, client: ClientId, game: ID<Game>) {
        if let Some(member) = self.registry.write().await.clients.get_mut(&client) {
            member.games.insert(game);
        }
    }
    /// Sends the lobby the current listing of one game.
    async fn publish(&self, game: ID<Game>) {
        if let Ok(handle) = self.game(game).await {
            if let Ok(info) = handle.info().await {
                self.broadcast(Event::GameInfo { game: info }).await;
            }
        }
    }
    async fn broadcast(&self, event: Event) {
        let recipients = self.registry.read().await.recipients();
        Self::fan(&recipients, event);
    }
    fn fan(recipients: &[Arc<dyn Client>], event: Event) {
        recipients.iter().for_each(|c| c.notify(event.clone()));
    }
}

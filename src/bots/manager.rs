use super::*;
use crate::Config;
use crate::GameError;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::hub::Core;
use crate::storage::User;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::sync::RwLock;

/// Pool of programmatic clients, owned by the process entry point.
///
/// Bots are registered by name before [`BotManager::init`], which gives
/// each one an account, connects it to the hub, and starts arranging
/// matches among idle bots. Calling `init` again only picks up bots
/// registered since the last call.
pub struct BotManager {
    config: Config,
    pending: Mutex<Vec<(String, Box<dyn Strategy>)>>,
    bots: RwLock<BTreeMap<String, BotClient>>,
    roster: Arc<RwLock<Vec<ClientId>>>,
    arranger: Mutex<Option<Arranger>>,
}

impl BotManager {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            pending: Mutex::new(Vec::new()),
            bots: RwLock::new(BTreeMap::new()),
            roster: Arc::new(RwLock::new(Vec::new())),
            arranger: Mutex::new(None),
        }
    }

    pub async fn register(&self, name: &str, strategy: Box<dyn Strategy>) {
        self.pending.lock().await.push((name.to_string(), strategy));
    }

    /// Brings every queued bot online. A bot whose account cannot be
    /// looked up or created stays queued, together with every bot behind
    /// it, so a later `init` resumes where this one stopped.
    pub async fn init(&self, core: &Arc<Core>) -> anyhow::Result<()> {
        let admitted = self.admit(core).await;
        let mut arranger = self.arranger.lock().await;
        if arranger.is_none() {
            *arranger = Some(Arranger::spawn(
                Arc::downgrade(core),
                self.roster.clone(),
                self.config.arrange_interval,
            ));
        }
        admitted
    }

    async fn admit(&self, core: &Arc<Core>) -> anyhow::Result<()> {
        loop {
            let next = {
                let mut pending = self.pending.lock().await;
                match pending.is_empty() {
                    true => None,
                    false => Some(pending.remove(0)),
                }
            };
            let Some((name, strategy)) = next else {
                return Ok(());
            };
            if self.bots.read().await.contains_key(&name) {
                log::debug!("[bots] {} already running", name);
                continue;
            }
            let user = match self.account(core, &name).await {
                Ok(user) => user,
                Err(e) => {
                    log::warn!("[bots] {} stays queued: {}", name, e);
                    self.pending.lock().await.insert(0, (name, strategy));
                    return Err(e);
                }
            };
            let info = ClientInfo {
                id: user.id,
                name: user.name,
            };
            let bot = BotClient::spawn(info, strategy, Arc::downgrade(core));
            if let Err(e) = core.connect(bot.client()).await {
                log::debug!("[bots] {} keeps its existing connection: {}", name, e);
            }
            log::info!("[bots] {} online as {}", name, bot.id());
            self.roster.write().await.push(bot.id());
            self.bots.write().await.insert(name, bot);
        }
    }

    async fn account(&self, core: &Arc<Core>, name: &str) -> anyhow::Result<User> {
        match core.storage().find_user_by_name(name).await? {
            Some(user) => Ok(user),
            None => {
                let password = self.config.bot_password.as_deref();
                core.storage().create_user(name, password).await
            }
        }
    }

    /// The named bot's client info.
    pub async fn get(&self, name: &str) -> Result<ClientInfo, GameError> {
        if let Some(bot) = self.bots.read().await.get(name) {
            return Ok(ClientInfo {
                id: bot.id(),
                name: bot.name().to_string(),
            });
        }
        match self.pending.lock().await.iter().any(|(n, _)| n == name) {
            true => Err(GameError::BotNotInitialized),
            false => Err(GameError::BotNotFound),
        }
    }

    pub async fn len(&self) -> usize {
        self.bots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.bots.read().await.is_empty()
    }
}

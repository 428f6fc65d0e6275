use crate::cards::Catalogue;
use crate::client::ClientId;
use crate::hub::Core;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Periodically pairs idle bots into fresh games.
/// Stops when dropped or when the hub goes away.
pub struct Arranger {
    task: JoinHandle<()>,
}

impl Arranger {
    pub fn spawn(core: Weak<Core>, roster: Arc<RwLock<Vec<ClientId>>>, every: Duration) -> Self {
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                let Some(core) = core.upgrade() else {
                    break;
                };
                let bots = roster.read().await.clone();
                Self::round(&core, &bots).await;
            }
            log::debug!("[arranger] hub gone, stopping");
        });
        Self { task }
    }

    /// One scheduling pass: idle bots are matched two at a time.
    pub async fn round(core: &Arc<Core>, bots: &[ClientId]) -> usize {
        let mut idle = Vec::new();
        for bot in bots.iter().copied() {
            if core.is_connected(bot).await && core.games_of(bot).await.is_empty() {
                idle.push(bot);
            }
        }
        let mut arranged = 0;
        for pair in idle.chunks_exact(2) {
            let (host, guest) = (pair[0], pair[1]);
            let game = match core.create_game(host, Catalogue::starter_deck()).await {
                Ok(game) => game,
                Err(e) => {
                    log::warn!("[arranger] {} could not host: {}", host, e);
                    continue;
                }
            };
            match core.join(guest, game, Catalogue::starter_deck()).await {
                Ok(()) => {
                    log::info!("[arranger] game {} {} vs {}", game, host, guest);
                    arranged += 1;
                }
                Err(e) => {
                    log::warn!("[arranger] {} could not join {}: {}", guest, game, e);
                    let _ = core.leave(host, game).await;
                }
            }
        }
        arranged
    }
}

impl Drop for Arranger {
    fn drop(&mut self) {
        self.task.abort();
    }
}

use super::*;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    users: BTreeMap<ID<User>, User>,
    decks: BTreeMap<ID<Deck>, Deck>,
    matches: BTreeMap<ID<Game>, Match>,
    replays: BTreeMap<ID<ReplayRecord>, ReplayRecord>,
}

/// Process-local storage. Everything is lost on exit.
pub struct MemoryStorage {
    tables: RwLock<Tables>,
    count: AtomicU64,
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            count: AtomicU64::new(1),
        }
    }
}

impl MemoryStorage {
    fn allocate<T>(&self) -> ID<T> {
        ID::new(self.count.fetch_add(1, Ordering::Relaxed))
    }
    pub async fn matches(&self) -> Vec<Match> {
        self.tables.read().await.matches.values().cloned().collect()
    }
}

#[async_trait::async_trait]
impl Storage for MemoryStorage {
    async fn find_user(&self, id: ID<User>) -> anyhow::Result<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
    async fn find_user_by_name(&self, name: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .tables
            .read()
            .await
            .users
            .values()
            .find(|u| u.name == name)
            .cloned())
    }
    async fn create_user(&self, name: &str, password: Option<&str>) -> anyhow::Result<User> {
        let hashword = password
            .map(hash)
            .transpose()
            .map_err(|e| anyhow::anyhow!("{}", e))?;
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.name == name) {
            return Err(anyhow::anyhow!("user {} already exists", name));
        }
        let user = User {
            id: self.allocate(),
            name: name.to_string(),
            hashword,
        };
        tables.users.insert(user.id, user.clone());
        log::debug!("[storage] created user {} ({})", user.name, user.id);
        Ok(user)
    }
    async fn verify_password(&self, name: &str, password: &str) -> anyhow::Result<Option<User>> {
        Ok(self
            .find_user_by_name(name)
            .await?
            .filter(|u| u.hashword.as_deref().is_some_and(|h| verify(password, h))))
    }

    async fn find_deck(&self, id: ID<Deck>) -> anyhow::Result<Option<Deck>> {
        Ok(self.tables.read().await.decks.get(&id).cloned())
    }
    async fn find_decks(&self, user: ID<User>) -> anyhow::Result<Vec<Deck>> {
        Ok(self
            .tables
            .read()
            .await
            .decks
            .values()
            .filter(|d| d.user == user)
            .cloned()
            .collect())
    }
    async fn save_deck(&self, mut deck: Deck) -> anyhow::Result<Deck> {
        if deck.id == ID::default() {
            deck.id = self.allocate();
        }
        self.tables.write().await.decks.insert(deck.id, deck.clone());
        Ok(deck)
    }
    async fn delete_deck(&self, id: ID<Deck>) -> anyhow::Result<bool> {
        Ok(self.tables.write().await.decks.remove(&id).is_some())
    }

    async fn find_match(&self, id: ID<Game>) -> anyhow::Result<Option<Match>> {
        Ok(self.tables.read().await.matches.get(&id).cloned())
    }
    async fn save_match(&self, record: Match) -> anyhow::Result<()> {
        self.tables.write().await.matches.insert(record.id, record);
        Ok(())
    }

    async fn find_replay(&self, id: ID<ReplayRecord>) -> anyhow::Result<Option<ReplayRecord>> {
        Ok(self.tables.read().await.replays.get(&id).cloned())
    }
    async fn find_replays(
        &self,
        user: ID<User>,
        query: Option<&str>,
        page: usize,
        size: usize,
    ) -> anyhow::Result<Page<ReplayRecord>> {
        let needle = query.map(str::to_lowercase);
        let tables = self.tables.read().await;
        let mut matching = tables
            .replays
            .values()
            .filter(|r| r.user == user)
            .filter(|r| {
                needle
                    .as_deref()
                    .is_none_or(|q| r.name.to_lowercase().contains(q))
            })
            .cloned()
            .collect::<Vec<_>>();
        matching.sort_by(|a, b| b.created.cmp(&a.created).then(b.id.cmp(&a.id)));
        let total = matching.len();
        let items = matching
            .into_iter()
            .skip(page.saturating_mul(size))
            .take(size)
            .collect();
        Ok(Page { items, page, total })
    }
    async fn save_replay(&self, mut record: ReplayRecord) -> anyhow::Result<ReplayRecord> {
        if record.id == ID::default() {
            record.id = self.allocate();
        }
        self.tables
            .write()
            .await
            .replays
            .insert(record.id, record.clone());
        Ok(record)
    }
    async fn delete_replay(&self, id: ID<ReplayRecord>) -> anyhow::Result<bool> {
        Ok(self.tables.write().await.replays.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::ReplayPlayer;
    use crate::records::Winner;
    fn record(user: ID<User>, name: &str, created: i64) -> ReplayRecord {
        ReplayRecord {
            id: ID::default(),
            user,
            name: name.to_string(),
            created,
            player1: ReplayPlayer::default(),
            player2: ReplayPlayer::default(),
            winner: Winner::None,
            data: vec![],
        }
    }
    #[tokio::test]
    async fn users_are_unique_by_name() {
        let storage = MemoryStorage::default();
        let user = storage.create_user("ash", None).await.unwrap();
        assert!(storage.create_user("ash", None).await.is_err());
        assert_eq!(storage.find_user(user.id).await.unwrap(), Some(user));
    }
    #[tokio::test]
    async fn passwordless_users_cannot_log_in() {
        let storage = MemoryStorage::default();
        storage.create_user("bot", None).await.unwrap();
        assert!(storage.verify_password("bot", "").await.unwrap().is_none());
    }
    #[tokio::test]
    async fn replays_page_newest_first() {
        let storage = MemoryStorage::default();
        let me = ID::new(100);
        for (i, name) in ["alpha", "beta", "Alpaca", "gamma"].iter().enumerate() {
            storage
                .save_replay(record(me, name, i as i64))
                .await
                .unwrap();
        }
        storage
            .save_replay(record(ID::new(200), "alpha", 9))
            .await
            .unwrap();
        let page = storage.find_replays(me, Some("al"), 0, 1).await.unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].name, "Alpaca");
        let page = storage.find_replays(me, Some("al"), 1, 1).await.unwrap();
        assert_eq!(page.items[0].name, "alpha");
        let page = storage.find_replays(me, None, 0, 10).await.unwrap();
        assert_eq!(page.total, 4);
    }
}

use super::*;
use crate::ApiError;
use crate::ID;
use crate::NAME_MAX;
use crate::NAME_MIN;
use crate::cards::Catalogue;
use crate::game::Game;
use crate::storage::Deck;
use crate::storage::Page;
use crate::storage::ReplayRecord;
use crate::storage::Storage;
use crate::storage::User;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;

/// Saved decks and replays of one server, with validation and
/// ownership checks. Foreign resources are reported with the same
/// error as missing ones.
#[derive(Clone)]
pub struct Library {
    storage: Arc<dyn Storage>,
    catalogue: Arc<Catalogue>,
}

impl Library {
    pub fn new(storage: Arc<dyn Storage>, catalogue: Arc<Catalogue>) -> Self {
        Self { storage, catalogue }
    }

    /// Creates a deck, or replaces one the user owns when `id` is given.
    pub async fn save_deck(
        &self,
        user: ID<User>,
        id: Option<ID<Deck>>,
        name: &str,
        cards: Vec<String>,
    ) -> Result<Deck, ApiError> {
        let name = Self::name(name)?;
        if let Some(card) = cards.iter().find(|c| !self.catalogue.is_card_defined(c)) {
            log::debug!("[library] unknown card {}", card);
            return Err(ApiError::param("cards"));
        }
        if let Some(id) = id {
            self.storage
                .find_deck(id)
                .await?
                .filter(|d| d.user == user)
                .ok_or(ApiError::DeckInvalid)?;
        }
        let analysis = self.catalogue.analyse(&cards);
        let deck = Deck {
            id: id.unwrap_or_default(),
            user,
            name,
            valid: analysis.is_valid(),
            types: analysis.deck_type(),
            cards,
        };
        Ok(self.storage.save_deck(deck).await?)
    }

    /// The user's saved decks, re-checked against the current catalogue.
    pub async fn decks(&self, user: ID<User>) -> Result<Vec<Deck>, ApiError> {
        Ok(self
            .storage
            .find_decks(user)
            .await?
            .into_iter()
            .map(|mut deck| {
                let analysis = self.catalogue.analyse(&deck.cards);
                deck.valid = analysis.is_valid();
                deck.types = analysis.deck_type();
                deck
            })
            .collect())
    }

    pub async fn delete_deck(&self, user: ID<User>, id: ID<Deck>) -> Result<(), ApiError> {
        self.storage
            .find_deck(id)
            .await?
            .filter(|d| d.user == user)
            .ok_or(ApiError::DeckInvalid)?;
        self.storage.delete_deck(id).await?;
        Ok(())
    }

    /// Lists the user's saved replays. A zero `size` means the default page size.
    pub async fn replays(
        &self,
        user: ID<User>,
        query: Option<&str>,
        page: usize,
        size: usize,
    ) -> Result<Page<ReplayRecord>, ApiError> {
        let size = match size {
            0 => crate::PAGE_SIZE,
            n => n.min(100),
        };
        Ok(self
            .storage
            .find_replays(user, query.filter(|q| !q.trim().is_empty()), page, size)
            .await?)
    }

    pub async fn replay(&self, user: ID<User>, id: ID<ReplayRecord>) -> Result<ReplayRecord, ApiError> {
        self.storage
            .find_replay(id)
            .await?
            .filter(|r| r.user == user)
            .ok_or(ApiError::ReplayInvalid)
    }

    /// Base64 of a saved replay's bytes.
    pub async fn replay_data(&self, user: ID<User>, id: ID<ReplayRecord>) -> Result<String, ApiError> {
        self.replay(user, id).await.map(|r| STANDARD.encode(r.data))
    }

    /// Base64 of an archived match's replay bytes.
    pub async fn match_data(&self, id: ID<Game>) -> Result<String, ApiError> {
        self.storage
            .find_match(id)
            .await?
            .map(|m| STANDARD.encode(m.replay))
            .ok_or(ApiError::GameInvalidId)
    }

    /// Keeps an archived match the user played in under a name of their choosing.
    pub async fn save_replay(
        &self,
        user: ID<User>,
        game: ID<Game>,
        name: &str,
    ) -> Result<ReplayRecord, ApiError> {
        let name = Self::name(name)?;
        let record = self
            .storage
            .find_match(game)
            .await?
            .filter(|m| m.involves(user))
            .ok_or(ApiError::GameInvalidId)?;
        let replay = Replay::deserialize(&record.replay).map_err(|e| {
            log::warn!("[library] match {} has unreadable replay: {}", game, e);
            ApiError::ReplayInvalid
        })?;
        let saved = self
            .storage
            .save_replay(ReplayRecord {
                id: ID::default(),
                user,
                name,
                created: replay.created,
                player1: replay.player1,
                player2: replay.player2,
                winner: replay.winner,
                data: record.replay,
            })
            .await?;
        log::info!("[library] user {} saved replay {}", user, saved.id);
        Ok(saved)
    }

    pub async fn rename_replay(
        &self,
        user: ID<User>,
        id: ID<ReplayRecord>,
        name: &str,
    ) -> Result<ReplayRecord, ApiError> {
        let name = Self::name(name)?;
        let mut record = self.replay(user, id).await?;
        record.name = name;
        Ok(self.storage.save_replay(record).await?)
    }

    pub async fn delete_replay(&self, user: ID<User>, id: ID<ReplayRecord>) -> Result<(), ApiError> {
        self.replay(user, id).await?;
        self.storage.delete_replay(id).await?;
        Ok(())
    }

    fn name(name: &str) -> Result<String, ApiError> {
        let name = name.trim();
        match (NAME_MIN..=NAME_MAX).contains(&name.chars().count()) {
            true => Ok(name.to_string()),
            false => Err(ApiError::param("name")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Match;
    use crate::storage::MemoryStorage;
    fn library() -> (Library, Arc<MemoryStorage>) {
        let storage = Arc::new(MemoryStorage::default());
        let library = Library::new(storage.clone(), Arc::new(Catalogue::standard()));
        (library, storage)
    }
    async fn archive(storage: &MemoryStorage, id: u64, a: ID<User>, b: ID<User>) {
        let mut replay = Replay::new(Capture::default());
        replay.player1 = ReplayPlayer {
            user: a,
            name: String::from("ash"),
        };
        replay.player2 = ReplayPlayer {
            user: b,
            name: String::from("misty"),
        };
        replay.winner = Winner::Player1;
        storage
            .save_match(Match {
                id: ID::new(id),
                created: replay.created,
                player1: Some(a),
                player2: Some(b),
                winner: replay.winner,
                replay: replay.serialize(),
            })
            .await
            .unwrap();
    }
    #[tokio::test]
    async fn deck_validation() {
        let (library, _) = library();
        let me = ID::new(1);
        assert_eq!(
            library.save_deck(me, None, "ab", vec![]).await,
            Err(ApiError::param("name"))
        );
        assert_eq!(
            library
                .save_deck(me, None, "mine", vec![String::from("Nope")])
                .await,
            Err(ApiError::param("cards"))
        );
        let deck = library
            .save_deck(me, None, "starter", Catalogue::starter_deck())
            .await
            .unwrap();
        assert!(deck.valid);
        let partial = library
            .save_deck(me, None, "draft", vec![String::from("Ember Fox")])
            .await
            .unwrap();
        assert!(!partial.valid);
    }
    #[tokio::test]
    async fn lists_only_own_decks() {
        let (library, _) = library();
        let (me, you) = (ID::new(1), ID::new(2));
        library
            .save_deck(me, None, "starter", Catalogue::starter_deck())
            .await
            .unwrap();
        library
            .save_deck(me, None, "draft", vec![String::from("Ember Fox")])
            .await
            .unwrap();
        library
            .save_deck(you, None, "theirs", Catalogue::starter_deck())
            .await
            .unwrap();
        let decks = library.decks(me).await.unwrap();
        let names = decks.iter().map(|d| d.name.as_str()).collect::<Vec<_>>();
        assert_eq!(names, vec!["starter", "draft"]);
        assert!(decks[0].valid);
        assert!(!decks[1].valid);
        assert!(library.decks(ID::new(3)).await.unwrap().is_empty());
    }
    #[tokio::test]
    async fn foreign_deck_is_invalid() {
        let (library, _) = library();
        let deck = library
            .save_deck(ID::new(1), None, "starter", Catalogue::starter_deck())
            .await
            .unwrap();
        assert_eq!(
            library.delete_deck(ID::new(2), deck.id).await,
            Err(ApiError::DeckInvalid)
        );
        assert_eq!(
            library
                .save_deck(ID::new(2), Some(deck.id), "stolen", vec![])
                .await,
            Err(ApiError::DeckInvalid)
        );
        assert!(library.delete_deck(ID::new(1), deck.id).await.is_ok());
    }
    #[tokio::test]
    async fn save_replay_from_match() {
        let (library, storage) = library();
        let (a, b, c) = (ID::new(1), ID::new(2), ID::new(3));
        archive(&storage, 7, a, b).await;
        assert_eq!(
            library.save_replay(c, ID::new(7), "spy").await,
            Err(ApiError::GameInvalidId)
        );
        let saved = library.save_replay(b, ID::new(7), "my loss").await.unwrap();
        assert_eq!(saved.player1.name, "ash");
        assert_eq!(saved.winner, Winner::Player1);
        assert_eq!(
            library.rename_replay(a, saved.id, "mine now").await,
            Err(ApiError::ReplayInvalid)
        );
        let renamed = library.rename_replay(b, saved.id, "rematch").await.unwrap();
        assert_eq!(renamed.name, "rematch");
        let page = library.replays(b, Some("re"), 0, 0).await.unwrap();
        assert_eq!(page.total, 1);
        let data = library.replay_data(b, saved.id).await.unwrap();
        let bytes = STANDARD.decode(data).unwrap();
        assert!(Replay::deserialize(&bytes).is_ok());
        assert!(library.delete_replay(b, saved.id).await.is_ok());
        assert_eq!(
            library.replay(b, saved.id).await,
            Err(ApiError::ReplayInvalid)
        );
    }
    #[tokio::test]
    async fn unreadable_match_is_replay_invalid() {
        let (library, storage) = library();
        storage
            .save_match(Match {
                id: ID::new(9),
                created: 0,
                player1: Some(ID::new(1)),
                player2: Some(ID::new(2)),
                winner: Winner::None,
                replay: vec![1, 2, 3],
            })
            .await
            .unwrap();
        assert_eq!(
            library.save_replay(ID::new(1), ID::new(9), "broken").await,
            Err(ApiError::ReplayInvalid)
        );
        assert_eq!(
            library.match_data(ID::new(10)).await,
            Err(ApiError::GameInvalidId)
        );
    }
}

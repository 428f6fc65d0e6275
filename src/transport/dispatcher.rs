use crate::ApiError;
use crate::GameError;
use crate::ID;
use crate::client::ClientId;
use crate::game::Game;
use crate::hub::Core;
use crate::prompt::Answer;
use crate::prompt::Prompt;
use crate::records::Library;
use crate::state::Action;
use crate::storage::Deck;
use crate::storage::ReplayRecord;
use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use serde_json::json;
use std::sync::Arc;

/// Why a request was refused. Rendered as the reply's message code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fault {
    Game(GameError),
    Api(ApiError),
    Unknown(String),
}

impl Fault {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Game(e) => e.code(),
            Self::Api(e) => e.code(),
            Self::Unknown(_) => "UNKNOWN_REQUEST",
        }
    }
    pub fn data(&self) -> Value {
        match self {
            Self::Api(ApiError::Validation { param }) => json!({ "param": param }),
            _ => Value::Null,
        }
    }
}

impl From<GameError> for Fault {
    fn from(e: GameError) -> Self {
        Self::Game(e)
    }
}

impl From<ApiError> for Fault {
    fn from(e: ApiError) -> Self {
        Self::Api(e)
    }
}

impl std::fmt::Display for Fault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Game(e) => write!(f, "{}", e),
            Self::Api(e) => write!(f, "{}", e),
            Self::Unknown(name) => write!(f, "unknown request {}", name),
        }
    }
}

impl std::error::Error for Fault {}

/// A deck given inline or by the id of one the caller saved.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeckRef {
    #[serde(default)]
    deck: Option<Vec<String>>,
    #[serde(default)]
    deck_id: Option<ID<Deck>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GameRef {
    game_id: ID<Game>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct JoinGame {
    game_id: ID<Game>,
    #[serde(flatten)]
    deck: DeckRef,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayAction {
    game_id: ID<Game>,
    action: Action,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResolvePrompt {
    game_id: ID<Game>,
    id: ID<Prompt>,
    answer: Answer,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveDeck {
    #[serde(default)]
    id: Option<ID<Deck>>,
    name: String,
    cards: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DeckId {
    id: ID<Deck>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListReplays {
    #[serde(default)]
    query: Option<String>,
    #[serde(default)]
    page: usize,
    #[serde(default)]
    page_size: usize,
}

#[derive(Debug, Deserialize)]
struct ReplayId {
    id: ID<ReplayRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveReplay {
    game_id: ID<Game>,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RenameReplay {
    id: ID<ReplayRecord>,
    name: String,
}

/// Routes request names to hub, game and library operations
/// on behalf of one authenticated client.
pub struct Dispatcher {
    core: Arc<Core>,
    library: Library,
    client: ClientId,
}

impl Dispatcher {
    pub fn new(core: Arc<Core>, library: Library, client: ClientId) -> Self {
        Self {
            core,
            library,
            client,
        }
    }

    pub async fn handle(&self, name: &str, payload: Value) -> Result<Value, Fault> {
        let me = self.client;
        match name {
            "core:getInfo" => reply(self.core.info().await),
            "core:createGame" => {
                let deck = self.deck(parse::<DeckRef>(payload)?).await?;
                let game = self.core.create_game(me, deck).await?;
                Ok(json!({ "gameId": game }))
            }
            "game:join" => {
                let JoinGame { game_id, deck } = parse(payload)?;
                let deck = self.deck(deck).await?;
                self.core.join(me, game_id, deck).await?;
                Ok(Value::Null)
            }
            "game:leave" => {
                let GameRef { game_id } = parse(payload)?;
                self.core.leave(me, game_id).await?;
                Ok(Value::Null)
            }
            "game:action" => {
                let PlayAction { game_id, action } = parse(payload)?;
                let version = self.core.game(game_id).await?.play(me, action).await?;
                Ok(json!({ "version": version }))
            }
            "game:resolvePrompt" => {
                let ResolvePrompt {
                    game_id,
                    id,
                    answer,
                } = parse(payload)?;
                let version = self
                    .core
                    .game(game_id)
                    .await?
                    .resolve_prompt(me, id, answer)
                    .await?;
                Ok(json!({ "version": version }))
            }
            "game:getState" => {
                let GameRef { game_id } = parse(payload)?;
                reply(self.core.game(game_id).await?.state(Some(me)).await?)
            }
            "game:getInfo" => {
                let GameRef { game_id } = parse(payload)?;
                reply(self.core.game(game_id).await?.info().await?)
            }
            "deck:save" => {
                let SaveDeck { id, name, cards } = parse(payload)?;
                reply(self.library.save_deck(me, id, &name, cards).await?)
            }
            "deck:list" => reply(self.library.decks(me).await?),
            "deck:delete" => {
                let DeckId { id } = parse(payload)?;
                self.library.delete_deck(me, id).await?;
                Ok(Value::Null)
            }
            "replay:list" => {
                let ListReplays {
                    query,
                    page,
                    page_size,
                } = parse(payload)?;
                reply(
                    self.library
                        .replays(me, query.as_deref(), page, page_size)
                        .await?,
                )
            }
            "replay:get" => {
                let ReplayId { id } = parse(payload)?;
                let data = self.library.replay_data(me, id).await?;
                Ok(json!({ "replayData": data }))
            }
            "replay:match" => {
                let GameRef { game_id } = parse(payload)?;
                let data = self.library.match_data(game_id).await?;
                Ok(json!({ "replayData": data }))
            }
            "replay:save" => {
                let SaveReplay { game_id, name } = parse(payload)?;
                reply(self.library.save_replay(me, game_id, &name).await?)
            }
            "replay:rename" => {
                let RenameReplay { id, name } = parse(payload)?;
                reply(self.library.rename_replay(me, id, &name).await?)
            }
            "replay:delete" => {
                let ReplayId { id } = parse(payload)?;
                self.library.delete_replay(me, id).await?;
                Ok(Value::Null)
            }
            unknown => Err(Fault::Unknown(unknown.to_string())),
        }
    }

    /// Resolves a deck reference. Saved decks must belong to the caller.
    async fn deck(&self, deck: DeckRef) -> Result<Vec<String>, Fault> {
        match deck {
            DeckRef {
                deck: Some(cards), ..
            } => Ok(cards),
            DeckRef {
                deck_id: Some(id), ..
            } => self
                .core
                .storage()
                .find_deck(id)
                .await
                .map_err(ApiError::from)?
                .filter(|d| d.user == self.client)
                .map(|d| d.cards)
                .ok_or(Fault::Api(ApiError::DeckInvalid)),
            _ => Err(Fault::Api(ApiError::param("deck"))),
        }
    }
}

fn parse<T: DeserializeOwned>(payload: Value) -> Result<T, Fault> {
    serde_json::from_value(payload).map_err(|e| {
        log::debug!("[dispatch] malformed payload: {}", e);
        Fault::Api(ApiError::param("payload"))
    })
}

fn reply<T: Serialize>(value: T) -> Result<Value, Fault> {
    serde_json::to_value(value).map_err(|e| Fault::Api(ApiError::Storage(e.to_string())))
}

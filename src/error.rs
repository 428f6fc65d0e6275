/// Errors raised by the session core: game protocol violations and
/// registry lookups. Each carries a stable wire code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    GameFull,
    AlreadyJoined,
    NotJoined,
    GameNotStarted,
    GameFinished,
    NotYourTurn,
    IllegalAction(String),
    ActionInProgress,
    PromptAlreadyPending,
    PromptNotFound,
    PromptAlreadyResolved,
    ForeignPrompt,
    InvalidDeck,
    GameNotFound,
    BotNotFound,
    BotNotInitialized,
    ClientNotConnected,
    DuplicateClient,
}

impl GameError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::GameFull => "MAX_PLAYERS_REACHED",
            Self::AlreadyJoined => "ALREADY_JOINED",
            Self::NotJoined => "NOT_JOINED",
            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::GameFinished => "GAME_FINISHED",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::IllegalAction(_) => "ILLEGAL_ACTION",
            Self::ActionInProgress => "ACTION_IN_PROGRESS",
            Self::PromptAlreadyPending => "PROMPT_ALREADY_PENDING",
            Self::PromptNotFound => "PROMPT_NOT_FOUND",
            Self::PromptAlreadyResolved => "PROMPT_ALREADY_RESOLVED",
            Self::ForeignPrompt => "PROMPT_FOREIGN",
            Self::InvalidDeck => "CANNOT_PLAY_THIS_DECK",
            Self::GameNotFound => "GAME_NOT_FOUND",
            Self::BotNotFound => "BOT_NOT_FOUND",
            Self::BotNotInitialized => "BOT_NOT_INITIALIZED",
            Self::ClientNotConnected => "CLIENT_NOT_CONNECTED",
            Self::DuplicateClient => "CLIENT_ALREADY_CONNECTED",
        }
    }
}

impl std::fmt::Display for GameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IllegalAction(s) => write!(f, "illegal action: {}", s),
            Self::GameFull => write!(f, "game is full"),
            Self::AlreadyJoined => write!(f, "already joined"),
            Self::NotJoined => write!(f, "not joined"),
            Self::GameNotStarted => write!(f, "game not started"),
            Self::GameFinished => write!(f, "game finished"),
            Self::NotYourTurn => write!(f, "not your turn"),
            Self::ActionInProgress => write!(f, "action in progress"),
            Self::PromptAlreadyPending => write!(f, "prompt already pending"),
            Self::PromptNotFound => write!(f, "prompt not found"),
            Self::PromptAlreadyResolved => write!(f, "prompt already resolved"),
            Self::ForeignPrompt => write!(f, "prompt addressed to another client"),
            Self::InvalidDeck => write!(f, "invalid deck"),
            Self::GameNotFound => write!(f, "game not found"),
            Self::BotNotFound => write!(f, "bot not found"),
            Self::BotNotInitialized => write!(f, "bot not initialized"),
            Self::ClientNotConnected => write!(f, "client not connected"),
            Self::DuplicateClient => write!(f, "client already connected"),
        }
    }
}

impl std::error::Error for GameError {}

/// Errors raised by the deck and replay library. Authorization failures
/// use generic codes that do not reveal whether the resource exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    Validation { param: String },
    Unauthorized,
    ProfileInvalid,
    DeckInvalid,
    ReplayInvalid,
    GameInvalidId,
    Storage(String),
}

impl ApiError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_INVALID_PARAM",
            Self::Unauthorized => "AUTH_TOKEN_INVALID",
            Self::ProfileInvalid => "PROFILE_INVALID",
            Self::DeckInvalid => "DECK_INVALID",
            Self::ReplayInvalid => "REPLAY_INVALID",
            Self::GameInvalidId => "GAME_INVALID_ID",
            Self::Storage(_) => "INTERNAL_ERROR",
        }
    }
    pub fn param<S: Into<String>>(param: S) -> Self {
        Self::Validation {
            param: param.into(),
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation { param } => write!(f, "invalid parameter: {}", param),
            Self::Storage(s) => write!(f, "storage failure: {}", s),
            other => write!(f, "{}", other.code()),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Errors observed by the client side of the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    Timeout,
    Disconnected,
    Rejected(String),
    UnsupportedApiVersion { server: u32, client: u32 },
    Unauthorized,
    Aborted,
    Decode(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "request timed out"),
            Self::Disconnected => write!(f, "channel disconnected"),
            Self::Rejected(code) => write!(f, "rejected: {}", code),
            Self::UnsupportedApiVersion { server, client } => {
                write!(f, "unsupported api version {} (client {})", server, client)
            }
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Aborted => write!(f, "aborted"),
            Self::Decode(s) => write!(f, "malformed payload: {}", s),
        }
    }
}

impl std::error::Error for TransportError {}

/// Replay decoding failure. Every stage reports the same kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplayError {
    Corrupt(String),
}

impl std::fmt::Display for ReplayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Corrupt(s) => write!(f, "replay corrupt: {}", s),
        }
    }
}

impl std::error::Error for ReplayError {}

impl From<std::io::Error> for ReplayError {
    fn from(e: std::io::Error) -> Self {
        Self::Corrupt(e.to_string())
    }
}

impl From<serde_json::Error> for ReplayError {
    fn from(e: serde_json::Error) -> Self {
        Self::Corrupt(e.to_string())
    }
}

use crate::records::Capture;
use std::time::Duration;

// ============================================================================
// PROTOCOL
// ============================================================================
/// Wire protocol version. Clients reporting another version must re-authenticate.
pub const API_VERSION: u32 = 1;
/// Page size for replay listings when the caller does not pass one.
pub const PAGE_SIZE: usize = 20;

// ============================================================================
// TABLE PARAMETERS
// ============================================================================
/// Seats per game.
pub const SEATS: usize = 2;
/// Exact number of cards in a legal deck.
pub const DECK_SIZE: usize = 60;
/// Maximum copies of one card in a deck (basic energy exempt).
pub const MAX_COPIES: usize = 4;
/// Opening hand size.
pub const HAND_SIZE: usize = 7;
/// Prize cards set aside at setup; taking the last one wins.
pub const PRIZES: usize = 3;
/// Cards a player may keep in play at once.
pub const FIELD_LIMIT: usize = 5;

// ============================================================================
// LIBRARY VALIDATION
// ============================================================================
pub const NAME_MIN: usize = 3;
pub const NAME_MAX: usize = 32;

// ============================================================================
// RUNTIME CONFIGURATION
// ============================================================================
/// Runtime configuration shared by the hub, games, bots and transport.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP bind address for hosting.
    pub bind: String,
    /// Seats per game.
    pub seats: usize,
    /// How long a prompt may stay unanswered before its default applies.
    pub prompt_timeout: Duration,
    /// Bound on one request/acknowledgment round trip.
    pub request_timeout: Duration,
    /// Bound on profile fetch plus channel readiness during login.
    pub login_timeout: Duration,
    /// Interval between bot match arrangement rounds.
    pub arrange_interval: Duration,
    /// Which entries match replays record.
    pub capture: Capture,
    /// Password given to bot accounts on creation.
    pub bot_password: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind: String::from("127.0.0.1:8080"),
            seats: SEATS,
            prompt_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(10),
            login_timeout: Duration::from_secs(10),
            arrange_interval: Duration::from_secs(5),
            capture: Capture::default(),
            bot_password: None,
        }
    }
}

impl Config {
    /// Defaults overridden by process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }
    /// Defaults overridden by whatever `lookup` returns for each key.
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(bind) = lookup("BIND_ADDR") {
            config.bind = bind;
        }
        for (key, slot) in [
            ("PROMPT_TIMEOUT", &mut config.prompt_timeout),
            ("REQUEST_TIMEOUT", &mut config.request_timeout),
            ("LOGIN_TIMEOUT", &mut config.login_timeout),
            ("ARRANGE_INTERVAL", &mut config.arrange_interval),
        ] {
            match lookup(key).map(|s| (parse_duration(&s), s)) {
                Some((Some(duration), _)) => *slot = duration,
                Some((None, raw)) => log::warn!("[config] ignoring {}={}", key, raw),
                None => {}
            }
        }
        if let Some(raw) = lookup("CAPTURE") {
            match Capture::parse(&raw) {
                Some(capture) => config.capture = capture,
                None => log::warn!("[config] ignoring CAPTURE={}", raw),
            }
        }
        config.bot_password = lookup("BOT_PASSWORD").filter(|s| !s.is_empty());
        config
    }
}

/// Parse duration string like "250ms", "30s", "5m", "2h", "1d" into Duration.
pub fn parse_duration(s: &str) -> Option<Duration> {
    let s = s.trim();
    if let Some(ms) = s.strip_suffix("ms") {
        return ms.parse().ok().map(Duration::from_millis);
    }
    let (at, unit) = s.char_indices().last()?;
    let value: u64 = s[..at].parse().ok()?;
    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86400,
        _ => return None,
    };
    value.checked_mul(scale).map(Duration::from_secs)
}

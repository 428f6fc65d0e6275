use cardroom::bots::BotManager;
use cardroom::bots::Fish;
use cardroom::cards::Catalogue;
use cardroom::client::Client;
use cardroom::client::Event;
use cardroom::client::Mailbox;
use cardroom::hub::Core;
use cardroom::prompt::Answer;
use cardroom::prompt::PromptKind;
use cardroom::records::Capture;
use cardroom::records::Entry;
use cardroom::records::Playback;
use cardroom::records::Replay;
use cardroom::records::Winner;
use cardroom::rules::BasicRules;
use cardroom::state::Action;
use cardroom::state::Phase;
use cardroom::storage::MemoryStorage;
use cardroom::storage::Storage;
use cardroom::transport::Gateway;
use cardroom::transport::Grant;
use cardroom::transport::LocalGateway;
use cardroom::transport::Login;
use cardroom::transport::Loopback;
use cardroom::transport::Profile;
use cardroom::transport::Sessions;
use cardroom::transport::Socket;
use cardroom::*;
use serde_json::json;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

struct Table {
    core: Arc<Core>,
    storage: Arc<MemoryStorage>,
}

impl Table {
    fn new(config: Config) -> Self {
        let catalogue = Arc::new(Catalogue::standard());
        let storage = Arc::new(MemoryStorage::default());
        let core = Arc::new(Core::new(
            config,
            Arc::new(BasicRules::new(catalogue.clone())),
            catalogue,
            storage.clone(),
        ));
        Self { core, storage }
    }
    async fn sit(&self, id: u64, name: &str) -> (Arc<Mailbox>, UnboundedReceiver<Event>) {
        let (client, rx) = Mailbox::pair(ID::new(id), name);
        self.core.connect(client.clone()).await.unwrap();
        (client, rx)
    }
}

fn versions(rx: &mut UnboundedReceiver<Event>) -> Vec<u64> {
    let mut seen = Vec::new();
    while let Ok(event) = rx.try_recv() {
        if let Event::StateChanged { state, .. } = event {
            seen.push(state.version);
        }
    }
    seen
}

async fn eventually<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..200 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition never held");
}

#[tokio::test]
async fn second_join_starts_and_turn_order_is_enforced() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, _rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    assert_eq!(handle.info().await.unwrap().phase, Phase::WaitingForPlayers);
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let before = handle.state(None).await.unwrap();
    assert_eq!(before.phase, Phase::InProgress);
    assert_eq!(before.active, Some(0));
    assert_eq!(
        handle.play(b.id(), Action::Pass).await,
        Err(GameError::NotYourTurn)
    );
    assert_eq!(handle.state(None).await.unwrap().version, before.version);
    assert_eq!(
        handle.play(a.id(), Action::Pass).await,
        Ok(before.version + 1)
    );
    assert_eq!(handle.state(None).await.unwrap().active, Some(1));
}

#[tokio::test]
async fn join_beyond_capacity_is_refused() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, _rb) = table.sit(2, "misty").await;
    let (c, _rc) = table.sit(3, "brock").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    let before = handle.state(None).await.unwrap();
    assert_eq!(
        table.core.join(c.id(), game, Catalogue::starter_deck()).await,
        Err(GameError::GameFull)
    );
    assert_eq!(handle.state(None).await.unwrap(), before);
    assert!(table.core.games_of(c.id()).await.is_empty());
}

#[tokio::test]
async fn invalid_deck_removes_the_new_game() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    assert_eq!(
        table
            .core
            .create_game(a.id(), vec![String::from("Ember Fox")])
            .await,
        Err(GameError::InvalidDeck)
    );
    assert!(table.core.games().await.is_empty());
}

#[tokio::test]
async fn versions_are_ordered_identically_for_every_seat() {
    let table = Table::new(Config::default());
    let (a, mut ra) = table.sit(1, "ash").await;
    let (b, mut rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    for _ in 0..3 {
        handle.play(a.id(), Action::Pass).await.unwrap();
        handle.play(b.id(), Action::Pass).await.unwrap();
    }
    handle.state(None).await.unwrap();
    let seen_a = versions(&mut ra);
    let seen_b = versions(&mut rb);
    assert!(seen_a.windows(2).all(|w| w[0] < w[1]));
    assert!(seen_b.windows(2).all(|w| w[0] < w[1]));
    assert!(seen_a.ends_with(&seen_b));
    assert_eq!(seen_b.len(), 7);
}

#[tokio::test(start_paused = true)]
async fn unanswered_prompt_defaults_once_after_deadline() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, mut rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    let prompt = handle
        .issue_prompt(
            b.id(),
            PromptKind::Confirm,
            "continue?",
            Some(Duration::from_secs(5)),
        )
        .await
        .unwrap();
    assert_eq!(prompt.timeout, Some(5000));
    let issued = handle.state(None).await.unwrap();
    assert!(issued.is_waiting_on(1));
    assert_eq!(
        handle.play(a.id(), Action::Pass).await,
        Err(GameError::ActionInProgress)
    );
    tokio::time::sleep(Duration::from_secs(4)).await;
    assert_eq!(handle.state(None).await.unwrap().version, issued.version);
    tokio::time::sleep(Duration::from_secs(2)).await;
    let expired = handle.state(None).await.unwrap();
    assert!(expired.prompts.is_empty());
    assert_eq!(expired.version, issued.version + 1);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(handle.state(None).await.unwrap().version, expired.version);
    assert_eq!(
        handle
            .resolve_prompt(b.id(), prompt.id, Answer::Confirm(true))
            .await,
        Err(GameError::PromptAlreadyResolved)
    );
    let prompted = std::iter::from_fn(|| rb.try_recv().ok())
        .filter(|e| matches!(e, Event::Prompted { .. }))
        .count();
    assert_eq!(prompted, 1);
}

#[tokio::test]
async fn second_resolution_is_refused() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, _rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    let prompt = handle
        .issue_prompt(b.id(), PromptKind::Alert, "heads up", None)
        .await
        .unwrap();
    assert_eq!(
        handle.resolve_prompt(a.id(), prompt.id, Answer::Ack).await,
        Err(GameError::ForeignPrompt)
    );
    assert_eq!(
        handle
            .resolve_prompt(b.id(), prompt.id, Answer::Confirm(true))
            .await,
        Err(GameError::IllegalAction(String::from(
            "answer does not match prompt"
        )))
    );
    let first = handle
        .resolve_prompt(b.id(), prompt.id, Answer::Ack)
        .await
        .unwrap();
    assert_eq!(
        handle.resolve_prompt(b.id(), prompt.id, Answer::Ack).await,
        Err(GameError::PromptAlreadyResolved)
    );
    assert_eq!(handle.state(None).await.unwrap().version, first);
}

#[tokio::test]
async fn disconnect_mid_match_forfeits_and_archives() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, mut rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    table.core.disconnect(a.id()).await.unwrap();
    assert!(!table.core.is_connected(a.id()).await);
    eventually(|| async { table.core.games().await.is_empty() }).await;
    eventually(|| async { !table.storage.matches().await.is_empty() }).await;
    assert!(table.core.games_of(b.id()).await.is_empty());
    let record = table.storage.find_match(game).await.unwrap().unwrap();
    assert_eq!(record.winner, Winner::Player2);
    let replay = Replay::deserialize(&record.replay).unwrap();
    assert_eq!(replay.player1.user, a.id());
    assert_eq!(replay.player2.user, b.id());
    assert_eq!(replay.player2.name, "misty");
    assert_eq!(replay.winner, Winner::Player2);
    assert_eq!(replay.created, record.created);
    let last = std::iter::from_fn(|| rb.try_recv().ok())
        .filter_map(|e| match e {
            Event::StateChanged { state, .. } => Some(state),
            _ => None,
        })
        .last()
        .unwrap();
    assert_eq!(last.phase, Phase::Finished);
    assert_eq!(last.outcome.and_then(|o| o.winner), Some(1));
    let mut corrupt = record.replay.clone();
    corrupt[0] ^= 0xff;
    assert!(matches!(
        Replay::deserialize(&corrupt),
        Err(ReplayError::Corrupt(_))
    ));
    assert!(Replay::deserialize(&record.replay[..record.replay.len() - 1]).is_err());
}

#[tokio::test]
async fn states_only_capture_archives_snapshots() {
    let snapshots = Capture {
        states: true,
        actions: false,
    };
    let table = Table::new(Config {
        capture: snapshots,
        ..Config::default()
    });
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, _rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    handle.play(a.id(), Action::Concede).await.unwrap();
    eventually(|| async { !table.storage.matches().await.is_empty() }).await;
    let record = table.storage.find_match(game).await.unwrap().unwrap();
    let replay = Replay::deserialize(&record.replay).unwrap();
    assert_eq!(replay.capture, snapshots);
    assert_eq!(replay.winner, Winner::Player2);
    assert!(replay.entries.iter().all(|e| matches!(e, Entry::State { .. })));
    let states = Playback::new(&replay).states();
    assert!(!states.is_empty());
    assert!(states.windows(2).all(|w| w[0].version < w[1].version));
    assert_eq!(states.last().map(|s| s.phase), Some(Phase::Finished));
}

#[tokio::test]
async fn leaving_a_waiting_game_withdraws_its_prompt() {
    let table = Table::new(Config {
        seats: 3,
        ..Config::default()
    });
    let (a, _ra) = table.sit(1, "ash").await;
    let (b, _rb) = table.sit(2, "misty").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table
        .core
        .join(b.id(), game, Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    handle
        .issue_prompt(b.id(), PromptKind::Confirm, "ready?", Some(Duration::from_secs(60)))
        .await
        .unwrap();
    assert_eq!(handle.state(Some(a.id())).await.unwrap().prompts.len(), 1);
    table.core.leave(b.id(), game).await.unwrap();
    let state = handle.state(Some(a.id())).await.unwrap();
    assert_eq!(state.phase, Phase::WaitingForPlayers);
    assert!(state.prompts.is_empty());
}

#[tokio::test]
async fn unsatisfiable_prompt_is_refused() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    let handle = table.core.game(game).await.unwrap();
    let inverted = PromptKind::ChooseCards {
        cards: vec![String::from("Ember Fox")],
        min: 2,
        max: 1,
    };
    assert!(matches!(
        handle.issue_prompt(a.id(), inverted, "pick", None).await,
        Err(GameError::IllegalAction(_))
    ));
}

#[tokio::test]
async fn dead_registration_is_taken_over_on_connect() {
    let table = Table::new(Config::default());
    let (a, ra) = table.sit(1, "ash").await;
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    drop(ra);
    let (again, mut fresh) = Mailbox::pair(a.id(), "ash");
    table.core.connect(again.clone()).await.unwrap();
    assert_eq!(table.core.games_of(a.id()).await, vec![game]);
    let events = std::iter::from_fn(|| fresh.try_recv().ok()).collect::<Vec<_>>();
    assert!(
        events
            .iter()
            .any(|e| matches!(e, Event::GameJoined { game: g, .. } if *g == game))
    );
    let (third, _rt) = Mailbox::pair(a.id(), "ash");
    assert_eq!(
        table.core.connect(third).await,
        Err(GameError::DuplicateClient)
    );
}

#[tokio::test]
async fn duplicate_connection_is_refused_but_reconnect_replaces() {
    let table = Table::new(Config::default());
    let (a, _ra) = table.sit(1, "ash").await;
    let (again, mut fresh) = Mailbox::pair(a.id(), "ash");
    assert_eq!(
        table.core.connect(again.clone()).await,
        Err(GameError::DuplicateClient)
    );
    let game = table
        .core
        .create_game(a.id(), Catalogue::starter_deck())
        .await
        .unwrap();
    table.core.reconnect(again.clone()).await.unwrap();
    let events = std::iter::from_fn(|| fresh.try_recv().ok()).collect::<Vec<_>>();
    assert!(events.iter().any(|e| matches!(e, Event::GameJoined { game: g, .. } if *g == game)));
    assert!(events.iter().any(|e| matches!(e, Event::StateChanged { .. })));
    let stale: Arc<dyn Client> = a.clone();
    table.core.detach(&stale).await.unwrap();
    assert!(table.core.is_connected(a.id()).await);
}

#[tokio::test]
async fn bot_init_twice_registers_once() {
    let table = Table::new(Config::default());
    let manager = BotManager::new(Config::default());
    manager.register("fish01", Box::new(Fish)).await;
    manager.register("fish02", Box::new(Fish)).await;
    manager.init(&table.core).await.unwrap();
    manager.init(&table.core).await.unwrap();
    assert_eq!(manager.len().await, 2);
    assert_eq!(table.core.clients().await.len(), 2);
    assert!(table.storage.find_user_by_name("fish01").await.unwrap().is_some());
    assert_eq!(
        manager.get("fish03").await.map(|_| ()),
        Err(GameError::BotNotFound)
    );
}

#[tokio::test(start_paused = true)]
async fn bots_play_matches_to_the_end() {
    let config = Config {
        prompt_timeout: Duration::from_secs(1),
        arrange_interval: Duration::from_secs(1),
        ..Config::default()
    };
    let table = Table::new(config.clone());
    let manager = BotManager::new(config);
    manager.register("fish01", Box::new(Fish)).await;
    manager.register("fish02", Box::new(Fish)).await;
    manager.init(&table.core).await.unwrap();
    eventually(|| async { !table.storage.matches().await.is_empty() }).await;
    let record = &table.storage.matches().await[0];
    assert_ne!(record.winner, Winner::None);
    assert!(Replay::deserialize(&record.replay).unwrap().actions().count() > 0);
}

struct Network {
    table: Table,
    sessions: Arc<Sessions>,
}

impl Network {
    async fn new() -> Self {
        let table = Table::new(Config::default());
        for (name, password) in [("ash", "pikachu"), ("misty", "starmie")] {
            table
                .storage
                .create_user(name, Some(password))
                .await
                .unwrap();
        }
        Self {
            table,
            sessions: Arc::new(Sessions::default()),
        }
    }
    fn socket(&self) -> Arc<Socket> {
        let loopback = Loopback::new(self.table.core.clone(), self.sessions.clone());
        Arc::new(Socket::new(Arc::new(loopback), Duration::from_secs(1)))
    }
    fn gateway(&self) -> LocalGateway {
        LocalGateway::new(self.table.storage.clone(), self.sessions.clone())
    }
}

#[tokio::test]
async fn login_then_play_over_sockets() {
    let net = Network::new().await;
    let (sa, sb) = (net.socket(), net.socket());
    let la = Login::new(Arc::new(net.gateway()), sa.clone(), Duration::from_secs(1));
    let lb = Login::new(Arc::new(net.gateway()), sb.clone(), Duration::from_secs(1));
    let ash = la
        .login("ash", "pikachu", std::future::pending())
        .await
        .unwrap();
    lb.login("misty", "starmie", std::future::pending())
        .await
        .unwrap();
    assert_eq!(ash.profile.name, "ash");
    let pushes = Arc::new(AtomicUsize::new(0));
    let counter = pushes.clone();
    sa.on(
        "game:stateChanged",
        Arc::new(move |_: serde_json::Value| {
            counter.fetch_add(1, Ordering::SeqCst);
        }),
    )
    .await;
    let created = sa
        .emit(
            "core:createGame",
            json!({ "deck": Catalogue::starter_deck() }),
        )
        .await
        .unwrap();
    sb.emit(
        "game:join",
        json!({ "gameId": created["gameId"], "deck": Catalogue::starter_deck() }),
    )
    .await
    .unwrap();
    assert_eq!(
        sb.emit(
            "game:action",
            json!({ "gameId": created["gameId"], "action": { "type": "pass" } }),
        )
        .await,
        Err(TransportError::Rejected(String::from("NOT_YOUR_TURN")))
    );
    let played = sa
        .emit(
            "game:action",
            json!({ "gameId": created["gameId"], "action": { "type": "pass" } }),
        )
        .await
        .unwrap();
    assert!(played["version"].as_u64().is_some());
    eventually(|| async { pushes.load(Ordering::SeqCst) >= 3 }).await;
    let info = net.table.core.info().await;
    assert_eq!(info.clients.len(), 2);
    assert_eq!(info.games.len(), 1);
    la.logout(&ash).await.unwrap();
    eventually(|| async { net.table.core.clients().await.len() == 1 }).await;
}

#[tokio::test]
async fn bad_credentials_are_unauthorized() {
    let net = Network::new().await;
    let login = Login::new(Arc::new(net.gateway()), net.socket(), Duration::from_secs(1));
    assert_eq!(
        login
            .login("ash", "raichu", std::future::pending())
            .await,
        Err(TransportError::Unauthorized)
    );
    assert!(net.sessions.is_empty().await);
}

#[tokio::test]
async fn version_mismatch_revokes_the_token() {
    let net = Network::new().await;
    let socket = net.socket();
    let gateway = net.gateway().with_version(API_VERSION + 1);
    let login = Login::new(Arc::new(gateway), socket.clone(), Duration::from_secs(1));
    assert_eq!(
        login
            .login("ash", "pikachu", std::future::pending())
            .await,
        Err(TransportError::UnsupportedApiVersion {
            server: API_VERSION + 1,
            client: API_VERSION,
        })
    );
    assert!(net.sessions.is_empty().await);
    assert!(!socket.is_live());
}

/// Issues tokens but never answers profile requests.
struct Stalling(LocalGateway);

#[async_trait::async_trait]
impl Gateway for Stalling {
    async fn login(&self, name: &str, password: &str) -> Result<Grant, TransportError> {
        self.0.login(name, password).await
    }
    async fn profile(&self, _: &str) -> Result<Profile, TransportError> {
        std::future::pending().await
    }
    async fn logout(&self, token: &str) -> Result<(), TransportError> {
        self.0.logout(token).await
    }
}

#[tokio::test]
async fn aborted_login_disables_the_socket() {
    let net = Network::new().await;
    let socket = net.socket();
    let login = Login::new(
        Arc::new(Stalling(net.gateway())),
        socket.clone(),
        Duration::from_secs(60),
    );
    let abort = tokio::time::sleep(Duration::from_millis(100));
    assert_eq!(
        login.login("ash", "pikachu", abort).await,
        Err(TransportError::Aborted)
    );
    assert!(!socket.is_live());
    assert!(net.sessions.is_empty().await);
    eventually(|| async { net.table.core.clients().await.is_empty() }).await;
}

#[tokio::test(start_paused = true)]
async fn stalled_login_times_out() {
    let net = Network::new().await;
    let socket = net.socket();
    let login = Login::new(
        Arc::new(Stalling(net.gateway())),
        socket.clone(),
        Duration::from_secs(10),
    );
    assert_eq!(
        login
            .login("ash", "pikachu", std::future::pending())
            .await,
        Err(TransportError::Timeout)
    );
    assert!(!socket.is_live());
    assert!(net.sessions.is_empty().await);
}

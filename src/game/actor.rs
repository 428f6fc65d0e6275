use super::*;
use crate::Config;
use crate::GameError;
use crate::ID;
use crate::Position;
use crate::Unique;
use crate::cards::Catalogue;
use crate::client::Client;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::client::Event;
use crate::prompt::Answer;
use crate::prompt::Deadline;
use crate::prompt::Entry;
use crate::prompt::Ledger;
use crate::prompt::Prompt;
use crate::prompt::PromptKind;
use crate::prompt::Purpose;
use crate::prompt::Request;
use crate::records::Recorder;
use crate::records::ReplayPlayer;
use crate::rules::Effect;
use crate::rules::Rules;
use crate::state::Action;
use crate::state::Board;
use crate::state::Participant;
use crate::state::Phase;
use crate::state::Reason;
use crate::state::State;
use crate::state::View;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::sync::mpsc::unbounded_channel;
use tokio::sync::oneshot;

struct Seat {
    client: Arc<dyn Client>,
    info: ClientInfo,
    deck: Vec<String>,
    present: bool,
}

/// Authoritative state machine for one match.
///
/// Runs as its own task and owns everything mutable about the match,
/// so commands for one game never interleave. Every transition bumps
/// the version by one and sends each present seat its own view, in
/// seat order. A pending prompt suspends play until it is resolved or
/// its deadline applies the default answer.
pub struct Game {
    id: ID<Self>,
    capacity: usize,
    timeout: Duration,
    rules: Arc<dyn Rules>,
    catalogue: Arc<Catalogue>,
    seats: Vec<Seat>,
    board: Option<Board>,
    phase: Phase,
    version: u64,
    ledger: Ledger,
    recorder: Recorder,
    inbox: UnboundedReceiver<Command>,
    outbox: WeakUnboundedSender<Command>,
    done: Option<oneshot::Sender<Summary>>,
}

impl Game {
    /// Starts the game task. The receiver fires once when the match ends.
    pub fn spawn(
        id: ID<Self>,
        config: &Config,
        rules: Arc<dyn Rules>,
        catalogue: Arc<Catalogue>,
    ) -> (GameHandle, oneshot::Receiver<Summary>) {
        let (tx, rx) = unbounded_channel();
        let (done_tx, done_rx) = oneshot::channel();
        let game = Self {
            id,
            capacity: config.seats,
            timeout: config.prompt_timeout,
            rules,
            catalogue,
            seats: Vec::new(),
            board: None,
            phase: Phase::WaitingForPlayers,
            version: 0,
            ledger: Ledger::default(),
            recorder: Recorder::new(config.capture),
            inbox: rx,
            outbox: tx.downgrade(),
            done: Some(done_tx),
        };
        tokio::spawn(game.run());
        (GameHandle::new(id, tx), done_rx)
    }

    async fn run(mut self) {
        log::debug!("[game {}] open", self.id);
        while let Some(command) = self.inbox.recv().await {
            log::trace!("[game {}] {:?}", self.id, command);
            match command {
                Command::Shutdown => break,
                Command::Join {
                    client,
                    deck,
                    reply,
                } => drop(reply.send(self.join(client, deck))),
                Command::Rebind { client, reply } => drop(reply.send(Ok(self.rebind(client)))),
                Command::Leave { client, reply } => drop(reply.send(self.leave(client))),
                Command::Play {
                    client,
                    action,
                    reply,
                } => drop(reply.send(self.play(client, action))),
                Command::Issue {
                    client,
                    kind,
                    message,
                    timeout,
                    reply,
                } => drop(reply.send(self.issue(client, kind, message, timeout))),
                Command::Resolve {
                    client,
                    prompt,
                    answer,
                    reply,
                } => drop(reply.send(self.resolve(client, prompt, answer))),
                Command::Expire { client, prompt } => self.expire(client, prompt),
                Command::Inspect { viewer, reply } => drop(reply.send(Ok(self.inspect(viewer)))),
                Command::Info { reply } => drop(reply.send(Ok(self.info()))),
            }
        }
        self.ledger.clear();
        log::debug!("[game {}] closed", self.id);
    }
}

impl Game {
    fn join(&mut self, client: Arc<dyn Client>, deck: Vec<String>) -> Result<(), GameError> {
        if self.phase == Phase::Finished {
            return Err(GameError::GameFinished);
        }
        if self.seat_of(client.id()).is_some() {
            return Err(GameError::AlreadyJoined);
        }
        if self.phase == Phase::InProgress || self.seats.len() >= self.capacity {
            return Err(GameError::GameFull);
        }
        if !self.catalogue.analyse(&deck).is_valid() {
            return Err(GameError::InvalidDeck);
        }
        let info = client.info();
        log::info!("[game {}] {} takes seat {}", self.id, info.name, self.seats.len());
        self.seats.push(Seat {
            client,
            info: info.clone(),
            deck,
            present: true,
        });
        self.announce(Event::GameJoined {
            game: self.id,
            client: info,
        });
        match self.seats.len() == self.capacity {
            true => self.start(),
            false => self.commit(),
        }
        Ok(())
    }

    fn start(&mut self) {
        let seed = rand::random::<u64>();
        let decks = self.seats.iter().map(|s| s.deck.clone()).collect::<Vec<_>>();
        let players = self
            .seats
            .iter()
            .map(|s| ReplayPlayer {
                user: s.info.id,
                name: s.info.name.clone(),
            })
            .collect();
        self.board = Some(self.rules.setup(&decks, seed));
        self.recorder.start(players, decks, seed);
        self.phase = Phase::InProgress;
        log::info!("[game {}] match starts", self.id);
        self.commit();
    }

    fn rebind(&mut self, client: Arc<dyn Client>) -> bool {
        let Some(seat) = self.seat_of(client.id()) else {
            return false;
        };
        let info = client.info();
        log::debug!("[game {}] {} rebinds seat {}", self.id, info.name, seat);
        self.seats[seat].client = client.clone();
        self.seats[seat].info = info.clone();
        client.notify(Event::GameJoined {
            game: self.id,
            client: info,
        });
        client.notify(Event::StateChanged {
            game: self.id,
            state: self.view(View::Seat(seat)),
        });
        if let Some(prompt) = self.ledger.pending_for(client.id()) {
            client.notify(Event::Prompted {
                prompt: prompt.clone(),
            });
        }
        true
    }

    fn leave(&mut self, client: ClientId) -> Result<usize, GameError> {
        let seat = self.seat_of(client).ok_or(GameError::NotJoined)?;
        let leaver = self.seats[seat].client.clone();
        let info = self.seats[seat].info.clone();
        log::info!("[game {}] {} leaves seat {}", self.id, info.name, seat);
        if let Some(prompt) = self.ledger.withdraw(client) {
            log::debug!("[game {}] prompt {} withdrawn", self.id, prompt.id);
        }
        match self.phase {
            Phase::WaitingForPlayers => drop(self.seats.remove(seat)),
            Phase::InProgress | Phase::Finished => self.seats[seat].present = false,
        }
        let event = Event::GameLeft {
            game: self.id,
            client: info,
        };
        leaver.notify(event.clone());
        self.announce(event);
        match self.phase {
            Phase::InProgress => {
                if let Some(board) = self.board.as_mut() {
                    board.forfeit(seat, Reason::Forfeit);
                }
                self.recorder.action(seat, Action::Concede);
                self.finish();
            }
            _ => self.commit(),
        }
        Ok(self.remaining())
    }

    fn play(&mut self, client: ClientId, action: Action) -> Result<u64, GameError> {
        let seat = self.seat_of(client).ok_or(GameError::NotJoined)?;
        let board = match (self.phase, self.board.as_ref()) {
            (Phase::InProgress, Some(board)) => board,
            (Phase::Finished, _) => return Err(GameError::GameFinished),
            _ => return Err(GameError::GameNotStarted),
        };
        if action != Action::Concede {
            if !self.ledger.is_empty() {
                return Err(GameError::ActionInProgress);
            }
            if board.active != seat {
                return Err(GameError::NotYourTurn);
            }
        }
        let effect = self.rules.apply(board, seat, &action)?;
        log::debug!("[game {}] seat {} {}", self.id, seat, action);
        self.recorder.action(seat, action);
        self.advance(effect);
        Ok(self.version)
    }

    fn issue(
        &mut self,
        client: ClientId,
        kind: PromptKind,
        message: String,
        timeout: Option<Duration>,
    ) -> Result<Prompt, GameError> {
        let seat = self.seat_of(client).ok_or(GameError::NotJoined)?;
        if self.phase == Phase::Finished {
            return Err(GameError::GameFinished);
        }
        kind.check()?;
        let request = Request {
            seat,
            kind,
            message,
            purpose: Purpose::Notice,
        };
        self.raise(request, timeout.unwrap_or(self.timeout))
    }

    fn resolve(&mut self, client: ClientId, prompt: ID<Prompt>, answer: Answer) -> Result<u64, GameError> {
        self.ledger.check(client, prompt)?.prompt.kind.validate(&answer)?;
        let entry = self.ledger.take(client, prompt)?;
        log::debug!("[game {}] prompt {} resolved by {}", self.id, prompt, client);
        self.settle(entry, answer, false);
        Ok(self.version)
    }

    fn expire(&mut self, client: ClientId, prompt: ID<Prompt>) {
        if let Some(entry) = self.ledger.expire(client, prompt) {
            let answer = entry.prompt.kind.fallback();
            log::info!(
                "[game {}] prompt {} for {} timed out, applying {:?}",
                self.id,
                prompt,
                client,
                answer
            );
            self.settle(entry, answer, true);
        }
    }

    fn inspect(&self, viewer: Option<ClientId>) -> State {
        let view = match viewer {
            Some(client) => self.seat_of(client).map(View::Seat).unwrap_or(View::Public),
            None => View::Omniscient,
        };
        self.view(view)
    }

    fn info(&self) -> GameInfo {
        GameInfo {
            id: self.id,
            phase: self.phase,
            version: self.version,
            seats: self.capacity,
            players: self
                .seats
                .iter()
                .filter(|s| s.present)
                .map(|s| s.info.clone())
                .collect(),
        }
    }
}

impl Game {
    /// Installs the next board and raises whatever it is waiting on.
    fn advance(&mut self, effect: Effect) {
        self.board = Some(effect.board);
        if self.board.as_ref().is_some_and(Board::is_over) {
            return self.finish();
        }
        self.commit();
        for request in effect.requests {
            if let Err(e) = self.raise(request, self.timeout) {
                log::warn!("[game {}] dropped rules prompt: {}", self.id, e);
            }
        }
    }

    fn raise(&mut self, request: Request, timeout: Duration) -> Result<Prompt, GameError> {
        let client = self
            .seats
            .get(request.seat)
            .filter(|s| s.present)
            .map(|s| s.client.clone())
            .ok_or(GameError::NotJoined)?;
        if self.ledger.pending_for(client.id()).is_some() {
            return Err(GameError::PromptAlreadyPending);
        }
        let id = self.ledger.next_id();
        let prompt = Prompt {
            id,
            game: self.id,
            client: client.id(),
            seat: request.seat,
            kind: request.kind.clone(),
            message: request.message.clone(),
            timeout: Some(timeout.as_millis() as u64),
        };
        let deadline = self.arm(client.id(), id, timeout);
        self.ledger.insert(Entry {
            prompt: prompt.clone(),
            request,
            deadline: Some(deadline),
        })?;
        log::debug!(
            "[game {}] prompt {} {} to {}",
            self.id,
            id,
            prompt.message,
            client.id()
        );
        self.commit();
        client.notify(Event::Prompted {
            prompt: prompt.clone(),
        });
        Ok(prompt)
    }

    fn arm(&self, client: ClientId, prompt: ID<Prompt>, timeout: Duration) -> Deadline {
        let outbox = self.outbox.clone();
        Deadline::arm(self.id, client, prompt.inner(), timeout, move || {
            if let Some(tx) = outbox.upgrade() {
                let _ = tx.send(Command::Expire { client, prompt });
            }
        })
    }

    /// Applies an answer taken from the ledger and resumes play.
    fn settle(&mut self, entry: Entry, answer: Answer, timed_out: bool) {
        let Entry {
            prompt,
            request,
            deadline,
        } = entry;
        if let Some(deadline) = deadline {
            log::trace!("[game {}] disarming deadline {:?}", self.id, deadline.key());
        }
        self.recorder
            .answer(prompt.seat, prompt.id, answer.clone(), timed_out);
        let effect = self
            .board
            .as_ref()
            .map(|board| self.rules.resolve(board, &request, &answer));
        match effect {
            Some(Ok(effect)) => self.advance(effect),
            Some(Err(e)) => {
                log::warn!("[game {}] answer to {} had no effect: {}", self.id, prompt.id, e);
                self.commit();
            }
            None => self.commit(),
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        for prompt in self.ledger.clear() {
            log::debug!("[game {}] prompt {} withdrawn", self.id, prompt.id);
        }
        self.commit();
        let outcome = self.board.as_ref().and_then(|b| b.outcome);
        let replay = self.recorder.finish(outcome);
        log::info!("[game {}] finished {:?}", self.id, outcome);
        if let Some(done) = self.done.take() {
            let _ = done.send(Summary {
                game: self.id,
                outcome,
                replay,
            });
        }
    }

    /// Publishes a new version to every present seat.
    fn commit(&mut self) {
        self.version += 1;
        for (seat, s) in self.seats.iter().enumerate().filter(|(_, s)| s.present) {
            s.client.notify(Event::StateChanged {
                game: self.id,
                state: self.view(View::Seat(seat)),
            });
        }
        if self.recorder.capture().states && self.board.is_some() {
            let state = self.view(View::Omniscient);
            self.recorder.state(state);
        }
    }

    fn announce(&self, event: Event) {
        self.seats
            .iter()
            .filter(|s| s.present)
            .for_each(|s| s.client.notify(event.clone()));
    }

    fn view(&self, view: View) -> State {
        let participants = self
            .seats
            .iter()
            .map(|s| Participant {
                client: s.info.clone(),
                present: s.present,
            })
            .collect::<Vec<_>>();
        State::build(
            self.id,
            self.version,
            self.phase,
            &participants,
            self.board.as_ref(),
            self.ledger.notices(),
            view,
        )
    }

    fn seat_of(&self, client: ClientId) -> Option<Position> {
        self.seats
            .iter()
            .position(|s| s.present && s.info.id == client)
    }

    fn remaining(&self) -> usize {
        self.seats.iter().filter(|s| s.present).count()
    }
}

impl Unique for Game {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

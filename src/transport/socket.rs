use super::*;
use crate::TransportError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Both directions of an open connection, seen from the client.
pub struct Link {
    pub tx: UnboundedSender<Frame>,
    pub rx: UnboundedReceiver<Frame>,
}

/// Opens connections for a [`Socket`].
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, token: &str) -> Result<Link, TransportError>;
}

/// Callback for one push event name.
pub type Handler = Arc<dyn Fn(Value) + Send + Sync>;

/// Ticket returned by [`Socket::on`], used to remove exactly that handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    id: u64,
    event: String,
}

impl Subscription {
    pub fn event(&self) -> &str {
        &self.event
    }
}

type Pending = Mutex<HashMap<u64, oneshot::Sender<(String, Value)>>>;
type Handlers = Mutex<Vec<(Subscription, Handler)>>;

/// Client side of the wire protocol.
///
/// Subscriptions belong to the socket, not to a connection, so they
/// keep working across `disable` and a later `enable`.
pub struct Socket {
    connector: Arc<dyn Connector>,
    timeout: Duration,
    counter: AtomicU64,
    pending: Arc<Pending>,
    handlers: Arc<Handlers>,
    live: Arc<watch::Sender<bool>>,
    link: Mutex<Option<(UnboundedSender<Frame>, JoinHandle<()>)>>,
}

impl Socket {
    pub fn new(connector: Arc<dyn Connector>, timeout: Duration) -> Self {
        Self {
            connector,
            timeout,
            counter: AtomicU64::new(1),
            pending: Arc::new(Mutex::new(HashMap::new())),
            handlers: Arc::new(Mutex::new(Vec::new())),
            live: Arc::new(watch::channel(false).0),
            link: Mutex::new(None),
        }
    }

    /// Opens a connection authenticated by `token`, replacing any open one.
    pub async fn enable(&self, token: &str) -> Result<(), TransportError> {
        self.disable().await;
        let Link { tx, mut rx } = self.connector.connect(token).await?;
        let pending = self.pending.clone();
        let handlers = self.handlers.clone();
        let live = self.live.clone();
        let reader = tokio::spawn(async move {
            while let Some(frame) = rx.recv().await {
                match frame {
                    Frame::Reply { id, message, data } => {
                        if let Some(waiter) = pending.lock().await.remove(&id) {
                            let _ = waiter.send((message, data));
                        }
                    }
                    Frame::Push { event, data } => {
                        let matching = handlers
                            .lock()
                            .await
                            .iter()
                            .filter(|(s, _)| s.event == event)
                            .map(|(_, h)| h.clone())
                            .collect::<Vec<_>>();
                        matching.into_iter().for_each(|h| h(data.clone()));
                    }
                    Frame::Request { name, .. } => {
                        log::debug!("[socket] unexpected request {}", name)
                    }
                }
            }
            log::debug!("[socket] connection closed by peer");
            pending.lock().await.clear();
            live.send_replace(false);
        });
        *self.link.lock().await = Some((tx, reader));
        self.live.send_replace(true);
        log::debug!("[socket] enabled");
        Ok(())
    }

    /// Closes the connection. Requests in flight fail with `Disconnected`.
    pub async fn disable(&self) {
        if let Some((_, reader)) = self.link.lock().await.take() {
            reader.abort();
            log::debug!("[socket] disabled");
        }
        self.pending.lock().await.clear();
        self.live.send_replace(false);
    }

    /// Sends a request and waits for its single reply.
    pub async fn emit(&self, name: &str, payload: Value) -> Result<Value, TransportError> {
        let tx = self
            .link
            .lock()
            .await
            .as_ref()
            .map(|(tx, _)| tx.clone())
            .ok_or(TransportError::Disconnected)?;
        let id = self.counter.fetch_add(1, Ordering::Relaxed);
        let (waiter, reply) = oneshot::channel();
        self.pending.lock().await.insert(id, waiter);
        let request = Frame::Request {
            id,
            name: name.to_string(),
            payload,
        };
        if tx.send(request).is_err() {
            self.pending.lock().await.remove(&id);
            return Err(TransportError::Disconnected);
        }
        match tokio::time::timeout(self.timeout, reply).await {
            Err(_) => {
                self.pending.lock().await.remove(&id);
                log::warn!("[socket] {} timed out after {:?}", name, self.timeout);
                Err(TransportError::Timeout)
            }
            Ok(Err(_)) => Err(TransportError::Disconnected),
            Ok(Ok((message, data))) if message == OK => Ok(data),
            Ok(Ok((message, _))) => Err(TransportError::Rejected(message)),
        }
    }

    /// [`Socket::emit`], decoding the reply payload.
    pub async fn request<T: DeserializeOwned>(&self, name: &str, payload: Value) -> Result<T, TransportError> {
        let data = self.emit(name, payload).await?;
        serde_json::from_value(data).map_err(|e| TransportError::Decode(e.to_string()))
    }

    pub async fn on(&self, event: &str, handler: Handler) -> Subscription {
        let subscription = Subscription {
            id: self.counter.fetch_add(1, Ordering::Relaxed),
            event: event.to_string(),
        };
        self.handlers
            .lock()
            .await
            .push((subscription.clone(), handler));
        subscription
    }

    /// Removes every handler for `event`, or every handler at all.
    pub async fn off(&self, event: Option<&str>) {
        let mut handlers = self.handlers.lock().await;
        match event {
            Some(event) => handlers.retain(|(s, _)| s.event != event),
            None => handlers.clear(),
        }
    }

    pub async fn unsubscribe(&self, subscription: &Subscription) {
        self.handlers
            .lock()
            .await
            .retain(|(s, _)| s != subscription);
    }

    pub async fn subscriptions(&self) -> usize {
        self.handlers.lock().await.len()
    }

    /// Liveness of the connection, updated on enable, disable and peer close.
    pub fn connection(&self) -> watch::Receiver<bool> {
        self.live.subscribe()
    }

    pub fn is_live(&self) -> bool {
        *self.live.borrow()
    }
}

impl Drop for Socket {
    fn drop(&mut self) {
        if let Some((_, reader)) = self.link.get_mut().take() {
            reader.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::mpsc::unbounded_channel;

    /// Accepts connections and answers requests with a fixed reply, or never.
    struct Echo {
        answer: Option<&'static str>,
        peers: std::sync::Mutex<Vec<UnboundedSender<Frame>>>,
    }

    impl Echo {
        fn new(answer: Option<&'static str>) -> Arc<Self> {
            Arc::new(Self {
                answer,
                peers: std::sync::Mutex::new(Vec::new()),
            })
        }
        fn push(&self, event: &str) {
            for peer in self.peers.lock().unwrap().iter() {
                let _ = peer.send(Frame::Push {
                    event: event.to_string(),
                    data: Value::Null,
                });
            }
        }
    }

    #[async_trait::async_trait]
    impl Connector for Echo {
        async fn connect(&self, _: &str) -> Result<Link, TransportError> {
            let (client_tx, mut server_rx) = unbounded_channel::<Frame>();
            let (server_tx, client_rx) = unbounded_channel::<Frame>();
            self.peers.lock().unwrap().push(server_tx.clone());
            let answer = self.answer;
            tokio::spawn(async move {
                while let Some(frame) = server_rx.recv().await {
                    if let (Frame::Request { id, .. }, Some(message)) = (frame, answer) {
                        let _ = server_tx.send(Frame::Reply {
                            id,
                            message: message.to_string(),
                            data: Value::from(id),
                        });
                    }
                }
            });
            Ok(Link {
                tx: client_tx,
                rx: client_rx,
            })
        }
    }

    fn counter() -> (Arc<AtomicUsize>, Handler) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = count.clone();
        let handler: Handler = Arc::new(move |_: Value| {
            inner.fetch_add(1, Ordering::SeqCst);
        });
        (count, handler)
    }

    #[tokio::test]
    async fn emit_before_enable_is_disconnected() {
        let socket = Socket::new(Echo::new(Some(OK)), Duration::from_secs(1));
        assert_eq!(
            socket.emit("core:getInfo", Value::Null).await,
            Err(TransportError::Disconnected)
        );
    }

    #[tokio::test]
    async fn emit_gets_one_answer() {
        let socket = Socket::new(Echo::new(Some(OK)), Duration::from_secs(1));
        socket.enable("token").await.unwrap();
        assert!(socket.is_live());
        assert!(socket.emit("core:getInfo", Value::Null).await.is_ok());
        let refusing = Socket::new(Echo::new(Some("NOT_YOUR_TURN")), Duration::from_secs(1));
        refusing.enable("token").await.unwrap();
        assert_eq!(
            refusing.emit("game:action", Value::Null).await,
            Err(TransportError::Rejected(String::from("NOT_YOUR_TURN")))
        );
    }

    #[tokio::test(start_paused = true)]
    async fn emit_times_out() {
        let socket = Socket::new(Echo::new(None), Duration::from_secs(3));
        socket.enable("token").await.unwrap();
        assert_eq!(
            socket.emit("core:getInfo", Value::Null).await,
            Err(TransportError::Timeout)
        );
        assert!(socket.pending.lock().await.is_empty());
    }

    #[tokio::test]
    async fn off_removes_only_selected_handlers() {
        let echo = Echo::new(Some(OK));
        let socket = Socket::new(echo.clone(), Duration::from_secs(1));
        let (joined, on_joined) = counter();
        let (left, on_left) = counter();
        socket.on("game:joined", on_joined).await;
        socket.on("game:left", on_left).await;
        socket.enable("token").await.unwrap();
        socket.off(Some("game:joined")).await;
        echo.push("game:joined");
        echo.push("game:left");
        // a request round trip orders us behind the pushes
        socket.emit("core:getInfo", Value::Null).await.unwrap();
        assert_eq!(joined.load(Ordering::SeqCst), 0);
        assert_eq!(left.load(Ordering::SeqCst), 1);
        assert_eq!(socket.subscriptions().await, 1);
    }

    #[tokio::test]
    async fn subscriptions_survive_reconnect() {
        let echo = Echo::new(Some(OK));
        let socket = Socket::new(echo.clone(), Duration::from_secs(1));
        let (count, handler) = counter();
        let subscription = socket.on("core:gameAdded", handler).await;
        socket.enable("token").await.unwrap();
        socket.disable().await;
        assert!(!socket.is_live());
        socket.enable("token").await.unwrap();
        echo.push("core:gameAdded");
        socket.emit("core:getInfo", Value::Null).await.unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        socket.unsubscribe(&subscription).await;
        assert_eq!(socket.subscriptions().await, 0);
    }
}

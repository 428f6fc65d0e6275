use super::*;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;
use tokio::sync::mpsc::unbounded_channel;

/// Client whose notifications land in an in-process channel.
/// Whoever holds the receiver drives the participant.
pub struct Mailbox {
    info: ClientInfo,
    tx: UnboundedSender<Event>,
}

impl Mailbox {
    pub fn pair(id: ClientId, name: &str) -> (std::sync::Arc<Self>, UnboundedReceiver<Event>) {
        let (tx, rx) = unbounded_channel();
        let info = ClientInfo {
            id,
            name: name.to_string(),
        };
        (std::sync::Arc::new(Self { info, tx }), rx)
    }
}

impl Client for Mailbox {
    fn id(&self) -> ClientId {
        self.info.id
    }
    fn name(&self) -> &str {
        &self.info.name
    }
    fn notify(&self, event: Event) {
        if self.tx.send(event).is_err() {
            log::trace!("[client {}] mailbox closed", self.info.id);
        }
    }
    fn alive(&self) -> bool {
        !self.tx.is_closed()
    }
    fn info(&self) -> ClientInfo {
        self.info.clone()
    }
}

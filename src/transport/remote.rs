use super::*;
use crate::client::Client;
use crate::client::ClientId;
use crate::client::ClientInfo;
use crate::client::Event;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedSender;

/// Client on the far side of a connection. Events become push frames
/// on the connection's outbound channel.
pub struct TransportClient {
    info: ClientInfo,
    tx: UnboundedSender<Frame>,
}

impl TransportClient {
    pub fn new(info: ClientInfo, tx: UnboundedSender<Frame>) -> Arc<Self> {
        Arc::new(Self { info, tx })
    }
}

impl Client for TransportClient {
    fn id(&self) -> ClientId {
        self.info.id
    }
    fn name(&self) -> &str {
        &self.info.name
    }
    fn notify(&self, event: Event) {
        log::trace!("[remote {}] {}", self.info.id, event);
        if self.tx.send(Frame::from(&event)).is_err() {
            log::debug!("[remote {}] connection gone, dropped {}", self.info.id, event.name());
        }
    }
    fn alive(&self) -> bool {
        !self.tx.is_closed()
    }
    fn info(&self) -> ClientInfo {
        self.info.clone()
    }
}

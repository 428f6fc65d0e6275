use super::*;
use crate::TransportError;
use crate::client::ClientInfo;
use crate::hub::Core;
use crate::records::Library;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

/// Connects a [`Socket`] straight to an in-process hub, with a
/// [`Session`] on the far end of a pair of channels.
pub struct Loopback {
    core: Arc<Core>,
    sessions: Arc<Sessions>,
    library: Library,
}

impl Loopback {
    pub fn new(core: Arc<Core>, sessions: Arc<Sessions>) -> Self {
        let library = Library::new(core.storage().clone(), core.catalogue().clone());
        Self {
            core,
            sessions,
            library,
        }
    }
}

#[async_trait::async_trait]
impl Connector for Loopback {
    async fn connect(&self, token: &str) -> Result<Link, TransportError> {
        let id = self
            .sessions
            .resolve(token)
            .await
            .ok_or(TransportError::Unauthorized)?;
        let user = self
            .core
            .storage()
            .find_user(id)
            .await
            .map_err(|e| TransportError::Rejected(e.to_string()))?
            .ok_or(TransportError::Unauthorized)?;
        let info = ClientInfo {
            id: user.id,
            name: user.name,
        };
        let (client_tx, server_rx) = unbounded_channel();
        let (server_tx, client_rx) = unbounded_channel();
        tokio::spawn(Session::serve(
            self.core.clone(),
            self.library.clone(),
            info,
            server_rx,
            server_tx,
        ));
        Ok(Link {
            tx: client_tx,
            rx: client_rx,
        })
    }
}

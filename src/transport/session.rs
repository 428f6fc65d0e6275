use super::*;
use crate::client::Client;
use crate::client::ClientInfo;
use crate::hub::Core;
use crate::records::Library;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::UnboundedSender;

/// Server side of one authenticated connection.
pub struct Session;

impl Session {
    /// Registers the connection's client, answers its requests in order,
    /// and disconnects it when the inbound side closes. A newer connection
    /// for the same account replaces this one instead of failing.
    pub async fn serve(
        core: Arc<Core>,
        library: Library,
        info: ClientInfo,
        mut inbound: UnboundedReceiver<Frame>,
        outbound: UnboundedSender<Frame>,
    ) {
        let id = info.id;
        let client: Arc<dyn Client> = TransportClient::new(info, outbound.clone());
        if let Err(e) = core.reconnect(client.clone()).await {
            log::warn!("[session {}] could not register: {}", id, e);
            return;
        }
        let dispatcher = Dispatcher::new(core.clone(), library, id);
        log::debug!("[session {}] open", id);
        while let Some(frame) = inbound.recv().await {
            let Frame::Request { id: seq, name, payload } = frame else {
                log::debug!("[session {}] ignoring non-request frame", id);
                continue;
            };
            let reply = match dispatcher.handle(&name, payload).await {
                Ok(data) => Frame::ok(seq, data),
                Err(fault) => {
                    log::debug!("[session {}] {} refused: {}", id, name, fault);
                    Frame::Reply {
                        id: seq,
                        message: fault.code().to_string(),
                        data: fault.data(),
                    }
                }
            };
            if outbound.send(reply).is_err() {
                break;
            }
        }
        log::debug!("[session {}] closed", id);
        if let Err(e) = core.detach(&client).await {
            log::debug!("[session {}] detach: {}", id, e);
        }
    }
}

use crate::client::ClientInfo;
use crate::hub::Core;
use crate::records::Library;
use crate::transport::Frame;
use crate::transport::Session;
use std::sync::Arc;
use tokio::sync::mpsc::unbounded_channel;

/// Spawns the pump between one WebSocket and a transport session.
/// Text messages are frames; anything unparseable is dropped.
pub fn bridge(
    core: Arc<Core>,
    library: Library,
    info: ClientInfo,
    mut session: actix_ws::Session,
    mut stream: actix_ws::MessageStream,
) {
    use futures::StreamExt;
    let id = info.id;
    let (inbound_tx, inbound_rx) = unbounded_channel::<Frame>();
    let (outbound_tx, mut outbound_rx) = unbounded_channel::<Frame>();
    actix_web::rt::spawn(Session::serve(core, library, info, inbound_rx, outbound_tx));
    actix_web::rt::spawn(async move {
        log::info!("[bridge {}] socket open", id);
        'sesh: loop {
            tokio::select! {
                biased;
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => if session.text(frame.to_string()).await.is_err() { break 'sesh },
                    None => break 'sesh,
                },
                msg = stream.next() => match msg {
                    Some(Ok(actix_ws::Message::Text(text))) => match Frame::try_from(&*text) {
                        Ok(frame) => if inbound_tx.send(frame).is_err() { break 'sesh },
                        Err(e) => log::debug!("[bridge {}] bad frame: {}", id, e),
                    },
                    Some(Ok(actix_ws::Message::Ping(bytes))) => if session.pong(&bytes).await.is_err() { break 'sesh },
                    Some(Ok(actix_ws::Message::Close(_))) => break 'sesh,
                    Some(Err(_)) => break 'sesh,
                    None => break 'sesh,
                    _ => continue 'sesh,
                },
            }
        }
        drop(inbound_tx);
        let _ = session.close(None).await;
        log::info!("[bridge {}] socket closed", id);
    });
}

//! RPCHub (§4.9): snapshot-on-connect plus incremental fan-out to websocket
//! subscribers.
//!
//! Grounded on `crates/server/src/live.rs`'s `ws_upgrade`/`handle_ws` pair —
//! same split-socket, `tokio::sync::broadcast`-subscriber, select-on-either-
//! task shape, generalized from one hardcoded stats message to the RPC
//! method framing in [`crate::frame`].

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::State;
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use tokio::sync::{broadcast, oneshot};
use tracing::warn;

use sdnmpi_bus::Mailbox;
use sdnmpi_control::messages::{ProcessManagerMsg, RouterMsg, TopologyManagerMsg};

const SUBSCRIBER_CHANNEL_CAPACITY: usize = 1024;

/// Shared state behind the `/ws` route: mailboxes to query a fresh snapshot
/// from, and the broadcast sender every mutation event is published on.
pub struct RpcHub {
    router: Mailbox<RouterMsg>,
    process_manager: Mailbox<ProcessManagerMsg>,
    topology: Mailbox<TopologyManagerMsg>,
    tx: broadcast::Sender<String>,
}

impl RpcHub {
    pub fn new(
        router: Mailbox<RouterMsg>,
        process_manager: Mailbox<ProcessManagerMsg>,
        topology: Mailbox<TopologyManagerMsg>,
    ) -> Arc<Self> {
        let (tx, _rx) = broadcast::channel(SUBSCRIBER_CHANNEL_CAPACITY);
        Arc::new(RpcHub { router, process_manager, topology, tx })
    }

    /// Publish an already-framed RPC message to every connected subscriber.
    /// Called from the closures wired onto the DBs' signals at startup.
    pub fn publish(&self, message: String) {
        let _ = self.tx.send(message);
    }

    async fn snapshot_frames(&self) -> Vec<String> {
        let (fdb_reply, fdb_rx) = oneshot::channel();
        let (rank_reply, rank_rx) = oneshot::channel();
        let (topo_reply, topo_rx) = oneshot::channel();

        let _ = self.router.send(RouterMsg::CurrentForwarding { reply_to: fdb_reply }).await;
        let _ = self
            .process_manager
            .send(ProcessManagerMsg::CurrentAllocation { reply_to: rank_reply })
            .await;
        let _ = self.topology.send(TopologyManagerMsg::CurrentTopology { reply_to: topo_reply }).await;

        let mut frames = Vec::with_capacity(3);
        if let Ok(entries) = fdb_rx.await {
            frames.push(crate::frame::init_fdb(&entries));
        }
        if let Ok(ranks) = rank_rx.await {
            frames.push(crate::frame::init_rankdb(&ranks));
        }
        if let Ok(snapshot) = topo_rx.await {
            frames.push(crate::frame::init_topologydb(&snapshot));
        }
        frames
    }
}

pub async fn ws_upgrade(ws: WebSocketUpgrade, State(hub): State<Arc<RpcHub>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, hub))
}

async fn handle_ws(socket: WebSocket, hub: Arc<RpcHub>) {
    let (mut sender, mut receiver) = socket.split();
    let mut rx = hub.tx.subscribe();

    for frame in hub.snapshot_frames().await {
        if sender.send(Message::Text(frame.into())).await.is_err() {
            return;
        }
    }

    let send_task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(msg) => {
                    if sender.send(Message::Text(msg.into())).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "rpc subscriber lagged, snapshot on reconnect will resync it");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    // Malformed or unexpected client frames are logged and ignored — §4.9's
    // RPC interface expects no reply, only a close frame ends the session.
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            match msg {
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    warn!(%err, "malformed frame from rpc subscriber, keeping the connection");
                }
            }
        }
    });

    tokio::select! {
        _ = send_task => {},
        _ = recv_task => {},
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn publish_before_any_subscriber_is_not_an_error() {
        let (router_mailbox, _router_inbox) = sdnmpi_bus::mailbox(1);
        let (pm_mailbox, _pm_inbox) = sdnmpi_bus::mailbox(1);
        let (topo_mailbox, _topo_inbox) = sdnmpi_bus::mailbox(1);
        let hub = RpcHub::new(router_mailbox, pm_mailbox, topo_mailbox);
        hub.publish(crate::frame::delete_process(7));
    }
}

//! Router (§4.7): the packet-in decision core. Classifies each frame,
//! resolves MPI virtual MACs, and installs flows along the computed path.
//!
//! Grounded on `sdnmpi/router.py::_packet_in_handler`.

use sdnmpi_bus::{Inbox, Mailbox};
use sdnmpi_core::{Dpid, MacAddress};
use sdnmpi_fdb::ForwardingDb;
use tokio::sync::oneshot;

use crate::flow::{FlowAction, FlowMatch, FlowMod, PacketOut};
use crate::messages::{ProcessManagerMsg, RouterMsg, TopologyManagerMsg};

pub struct Router {
    fdb: ForwardingDb,
    inbox: Inbox<RouterMsg>,
    topology: Mailbox<TopologyManagerMsg>,
    process_manager: Mailbox<ProcessManagerMsg>,
}

impl Router {
    pub fn new(
        inbox: Inbox<RouterMsg>,
        topology: Mailbox<TopologyManagerMsg>,
        process_manager: Mailbox<ProcessManagerMsg>,
    ) -> Self {
        Router { fdb: ForwardingDb::new(), inbox, topology, process_manager }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.inbox.recv().await {
            self.handle(msg).await;
        }
        tracing::info!("router inbox closed, shutting down");
    }

    async fn handle(&mut self, msg: RouterMsg) {
        match msg {
            RouterMsg::PacketIn { dpid, in_port, buffer_id, frame, data } => {
                if frame.is_lldp() || frame.dst.is_broadcast() || frame.dst.is_ipv6_multicast() {
                    return;
                }
                if frame.dst.is_mpi_virtual() {
                    self.handle_mpi(dpid, buffer_id, frame.src, frame.dst, data).await;
                } else {
                    self.handle_unicast(dpid, in_port, buffer_id, frame.src, frame.dst, data).await;
                }
            }
            RouterMsg::CurrentForwarding { reply_to } => {
                let _ = reply_to.send(self.fdb.snapshot_as_list());
            }
        }
    }

    async fn handle_unicast(
        &mut self,
        dpid: Dpid,
        in_port: u16,
        buffer_id: Option<u32>,
        src: MacAddress,
        dst: MacAddress,
        data: Vec<u8>,
    ) {
        let route = self.find_route(src, dst).await;
        if route.is_empty() {
            let _ = self
                .topology
                .send(TopologyManagerMsg::Broadcast { data, src_dpid: dpid, src_port: in_port })
                .await;
            return;
        }
        self.install_path(&route, src, dst, None).await;
        self.packet_out_ingress(dpid, buffer_id, data, route[0].1).await;
    }

    async fn handle_mpi(
        &mut self,
        dpid: Dpid,
        buffer_id: Option<u32>,
        src: MacAddress,
        virtual_dst: MacAddress,
        data: Vec<u8>,
    ) {
        let (_src_rank, dst_rank) = match virtual_dst.mpi_ranks() {
            Some(ranks) => ranks,
            None => return,
        };
        let (reply_to, reply) = oneshot::channel();
        if self.process_manager.send(ProcessManagerMsg::ResolveRank { rank: dst_rank, reply_to }).await.is_err() {
            return;
        }
        let true_mac = match reply.await {
            Ok(Some(mac)) => mac,
            _ => {
                tracing::warn!(rank = dst_rank, "dropping MPI packet for unresolved rank");
                return;
            }
        };

        let route = self.find_route(src, true_mac).await;
        if route.is_empty() {
            tracing::warn!(rank = dst_rank, "no route to resolved MPI host, dropping");
            return;
        }
        self.install_path(&route, src, virtual_dst, Some(true_mac)).await;
        self.packet_out_ingress(dpid, buffer_id, data, route[0].1).await;
    }

    async fn find_route(&self, src: MacAddress, dst: MacAddress) -> Vec<(Dpid, u16)> {
        let (reply_to, reply) = oneshot::channel();
        if self.topology.send(TopologyManagerMsg::FindRoute { src, dst, reply_to }).await.is_err() {
            return vec![];
        }
        reply.await.unwrap_or_default()
    }

    /// Install a `FlowMod` at every hop matching `(dl_src=src, dl_dst=match_dst)`.
    /// On the terminal hop, if `rewrite_to` is set, prepend `SetDlDst` before
    /// `Output` (§4.7's MPI rewrite). Skips hops ForwardingDB already knows.
    async fn install_path(
        &mut self,
        route: &[(Dpid, u16)],
        src: MacAddress,
        match_dst: MacAddress,
        rewrite_to: Option<MacAddress>,
    ) {
        let last = route.len() - 1;
        for (i, &(dpid, out_port)) in route.iter().enumerate() {
            if self.fdb.has(dpid, src, match_dst) {
                continue;
            }
            let (reply_to, reply) = oneshot::channel();
            if self.topology.send(TopologyManagerMsg::Session { dpid, reply_to }).await.is_err() {
                continue;
            }
            let Ok(Some(session)) = reply.await else { continue };

            let mut actions = Vec::new();
            if i == last {
                if let Some(true_mac) = rewrite_to {
                    actions.push(FlowAction::SetDlDst(true_mac));
                }
            }
            actions.push(FlowAction::Output(out_port));

            session.send_flow_mod(&FlowMod::forwarding(
                FlowMatch { dl_src: Some(src), dl_dst: Some(match_dst), ..FlowMatch::match_all() },
                actions,
            ));
            self.fdb.record(dpid, src, match_dst, out_port);
        }
    }

    pub fn connect_fdb_updated(&mut self, f: impl Fn(&sdnmpi_fdb::ForwardingEntry) + Send + Sync + 'static) {
        self.fdb.updated.connect(f);
    }

    /// Emit the `PacketOut` that delivers the triggering frame without
    /// waiting for flows to populate. `in_port` is `NONE` once flows have
    /// been installed for the whole path (§4.7).
    async fn packet_out_ingress(
        &self,
        dpid: Dpid,
        buffer_id: Option<u32>,
        data: Vec<u8>,
        out_port: u16,
    ) {
        let (reply_to, reply) = oneshot::channel();
        if self.topology.send(TopologyManagerMsg::Session { dpid, reply_to }).await.is_err() {
            return;
        }
        let Ok(Some(session)) = reply.await else { return };
        let has_buffer = buffer_id.is_some_and(|b| b != crate::flow::NO_BUFFER);
        session.send_packet_out(&PacketOut {
            buffer_id,
            in_port: Some(sdnmpi_core::reserved_ports::NONE),
            actions: vec![FlowAction::Output(out_port)],
            data: if has_buffer { None } else { Some(data) },
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::EthernetFrame;
    use crate::session::SwitchSession;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    struct RecordedSession {
        flow_mods: Mutex<Vec<FlowMod>>,
        packet_outs: AtomicUsize,
        dpid: Dpid,
    }

    impl RecordedSession {
        fn with_dpid(dpid: Dpid) -> Arc<Self> {
            Arc::new(RecordedSession { dpid, flow_mods: Mutex::new(Vec::new()), packet_outs: AtomicUsize::new(0) })
        }
    }

    impl SwitchSession for RecordedSession {
        fn dpid(&self) -> Dpid {
            self.dpid
        }
        fn send_flow_mod(&self, flow: &FlowMod) {
            self.flow_mods.lock().unwrap().push(flow.clone());
        }
        fn send_packet_out(&self, _out: &PacketOut) {
            self.packet_outs.fetch_add(1, Ordering::SeqCst);
        }
        fn request_port_stats(&self) {}
    }

    fn host_mac(last: u8) -> MacAddress {
        MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, last])
    }

    /// Stub TopologyManager: a fixed two-hop route for (host0, host1) and a
    /// session per dpid, enough to drive the S4 scenario end to end.
    async fn stub_topology(
        mut inbox: Inbox<TopologyManagerMsg>,
        sessions: [Arc<RecordedSession>; 2],
        route: Vec<(Dpid, u16)>,
    ) {
        while let Some(msg) = inbox.recv().await {
            match msg {
                TopologyManagerMsg::FindRoute { reply_to, .. } => {
                    let _ = reply_to.send(route.clone());
                }
                TopologyManagerMsg::Session { dpid, reply_to } => {
                    let session = sessions.iter().find(|s| s.dpid == dpid).cloned();
                    let _ = reply_to.send(session.map(|s| s as crate::messages::Session));
                }
                _ => {}
            }
        }
    }

    async fn stub_process_manager(mut inbox: Inbox<ProcessManagerMsg>, rank1_mac: MacAddress) {
        while let Some(msg) = inbox.recv().await {
            if let ProcessManagerMsg::ResolveRank { rank, reply_to } = msg {
                let _ = reply_to.send(if rank == 1 { Some(rank1_mac) } else { None });
            }
        }
    }

    #[tokio::test]
    async fn s4_mpi_rewrite_installs_flows_on_both_hops() {
        let host0 = host_mac(1);
        let host1 = host_mac(2);
        let sw1 = RecordedSession::with_dpid(Dpid(1));
        let sw2 = RecordedSession::with_dpid(Dpid(2));

        let (topo_mailbox, topo_inbox) = sdnmpi_bus::mailbox(8);
        let (pm_mailbox, pm_inbox) = sdnmpi_bus::mailbox(8);
        let (router_mailbox, router_inbox) = sdnmpi_bus::mailbox(8);

        let route = vec![(Dpid(1), 2u16), (Dpid(2), 1u16)];
        tokio::spawn(stub_topology(topo_inbox, [sw1.clone(), sw2.clone()], route));
        tokio::spawn(stub_process_manager(pm_inbox, host1));

        let router = Router::new(router_inbox, topo_mailbox, pm_mailbox);
        tokio::spawn(router.run());

        let virtual_dst = MacAddress::mpi_virtual(0, 1);
        router_mailbox
            .send(RouterMsg::PacketIn {
                dpid: Dpid(1),
                in_port: 1,
                buffer_id: Some(crate::flow::NO_BUFFER),
                frame: EthernetFrame { src: host0, dst: virtual_dst, ethertype: 0x0800, udp_dst_port: None },
                data: vec![1, 2, 3],
            })
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;

        let sw1_flows = sw1.flow_mods.lock().unwrap();
        assert_eq!(sw1_flows.len(), 1);
        assert_eq!(sw1_flows[0].actions, vec![FlowAction::Output(2)]);

        let sw2_flows = sw2.flow_mods.lock().unwrap();
        assert_eq!(sw2_flows.len(), 1);
        assert_eq!(sw2_flows[0].actions, vec![FlowAction::SetDlDst(host1), FlowAction::Output(1)]);

        assert_eq!(sw1.packet_outs.load(Ordering::SeqCst), 1);
    }
}

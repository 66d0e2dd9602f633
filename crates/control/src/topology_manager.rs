//! TopologyManager (§4.5): owns TopologyDB, installs the broadcast
//! catch-all flow on switch-connect, and floods broadcast frames along the
//! spanning tree.
//!
//! Grounded on `sdnmpi/topology.py`'s `EventSwitchEnter`/`_packet_in_handler`
//! handlers, generalized onto an async `Inbox`.

use sdnmpi_bus::Inbox;
use sdnmpi_core::{reserved_ports, MacAddress};
use sdnmpi_topology::TopologyDb;

use crate::flow::{FlowAction, FlowMatch, FlowMod, PacketOut, DEFAULT_PRIORITY_PLUS_ONE, NO_BUFFER};
use crate::messages::{Session, TopologyManagerMsg, TopologySnapshot};

pub struct TopologyManager {
    db: TopologyDb<Session>,
    inbox: Inbox<TopologyManagerMsg>,
}

impl TopologyManager {
    pub fn new(inbox: Inbox<TopologyManagerMsg>) -> Self {
        TopologyManager { db: TopologyDb::new(), inbox }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.inbox.recv().await {
            self.handle(msg);
        }
        tracing::info!("topology manager inbox closed, shutting down");
    }

    fn handle(&mut self, msg: TopologyManagerMsg) {
        match msg {
            TopologyManagerMsg::SwitchUp { dpid, ports, session } => {
                tracing::info!(%dpid, "switch connected");
                self.install_broadcast_catch_all(&session);
                self.db.add_switch(dpid, ports, session);
            }
            TopologyManagerMsg::SwitchDown { dpid } => {
                tracing::info!(%dpid, "switch disconnected");
                self.db.delete_switch(dpid);
            }
            TopologyManagerMsg::LinkUp { link } => self.db.add_link(link),
            TopologyManagerMsg::LinkDown { src, dst } => self.db.delete_link(src, dst),
            TopologyManagerMsg::HostUp { host } => self.db.add_host(host),
            TopologyManagerMsg::BroadcastPacketIn { dpid, in_port, frame, data } => {
                self.handle_broadcast(dpid, in_port, frame.dst, &data, frame.is_announcement());
            }
            TopologyManagerMsg::FindRoute { src, dst, reply_to } => {
                let _ = reply_to.send(self.db.find_route(src, dst));
            }
            TopologyManagerMsg::CurrentTopology { reply_to } => {
                let _ = reply_to.send(TopologySnapshot {
                    switches: self.db.switches(),
                    links: self.db.links(),
                    hosts: self.db.hosts(),
                });
            }
            TopologyManagerMsg::Broadcast { data, src_dpid, src_port } => {
                self.flood(src_dpid, src_port, &data);
            }
            TopologyManagerMsg::Session { dpid, reply_to } => {
                let _ = reply_to.send(self.db.session(dpid));
            }
        }
    }

    fn install_broadcast_catch_all(&self, session: &Session) {
        let pattern = FlowMatch { dl_dst: Some(MacAddress::BROADCAST), ..FlowMatch::match_all() };
        session.send_flow_mod(&FlowMod {
            pattern,
            priority: DEFAULT_PRIORITY_PLUS_ONE,
            idle_timeout: 0,
            hard_timeout: 0,
            send_flow_rem: false,
            actions: vec![FlowAction::Output(reserved_ports::CONTROLLER)],
        });
    }

    /// §4.5: skip IPv6 multicast (install a drop flow for the exact dst) and
    /// announcement traffic (ProcessManager's concern), otherwise flood.
    fn handle_broadcast(&self, dpid: sdnmpi_core::Dpid, in_port: u16, dst: MacAddress, data: &[u8], is_announcement: bool) {
        if dst.is_ipv6_multicast() {
            if let Some(session) = self.db.session(dpid) {
                session.send_flow_mod(&FlowMod {
                    pattern: FlowMatch { dl_dst: Some(dst), ..FlowMatch::match_all() },
                    priority: crate::flow::DEFAULT_PRIORITY,
                    idle_timeout: 0,
                    hard_timeout: 0,
                    send_flow_rem: false,
                    actions: vec![],
                });
            }
            return;
        }
        if is_announcement {
            return;
        }
        self.flood(dpid, in_port, data);
    }

    /// Emit one `PacketOut` per switch, directing the frame out of every
    /// edge port plus `LOCAL`. The ingress port is never suppressed since
    /// the frame has already left the wire.
    fn flood(&self, _src_dpid: sdnmpi_core::Dpid, _src_port: u16, data: &[u8]) {
        for switch in self.db.switches() {
            let Some(session) = self.db.session(switch.dpid) else { continue };
            let mut actions: Vec<FlowAction> = switch
                .ports
                .iter()
                .copied()
                .filter(|&p| self.db.is_edge_port(switch.dpid, p))
                .map(FlowAction::Output)
                .collect();
            actions.push(FlowAction::Output(reserved_ports::LOCAL));
            session.send_packet_out(&PacketOut {
                buffer_id: Some(NO_BUFFER),
                in_port: None,
                actions,
                data: Some(data.to_vec()),
            });
        }
    }

    pub fn connect_switch_added(&mut self, f: impl Fn(&sdnmpi_topology::SwitchView) + Send + Sync + 'static) {
        self.db.switch_added.connect(f);
    }

    pub fn connect_switch_deleted(&mut self, f: impl Fn(&sdnmpi_topology::SwitchView) + Send + Sync + 'static) {
        self.db.switch_deleted.connect(f);
    }

    pub fn connect_link_added(&mut self, f: impl Fn(&sdnmpi_topology::Link) + Send + Sync + 'static) {
        self.db.link_added.connect(f);
    }

    pub fn connect_link_deleted(&mut self, f: impl Fn(&sdnmpi_topology::Link) + Send + Sync + 'static) {
        self.db.link_deleted.connect(f);
    }

    pub fn connect_host_added(&mut self, f: impl Fn(&sdnmpi_topology::Host) + Send + Sync + 'static) {
        self.db.host_added.connect(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SwitchSession;
    use sdnmpi_core::Dpid;
    use sdnmpi_topology::{Host, Link, Port};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSession {
        dpid: Dpid,
        flow_mods: AtomicUsize,
        packet_outs: AtomicUsize,
    }

    impl CountingSession {
        fn new(dpid: Dpid) -> Arc<Self> {
            Arc::new(CountingSession { dpid, flow_mods: AtomicUsize::new(0), packet_outs: AtomicUsize::new(0) })
        }
    }

    impl SwitchSession for CountingSession {
        fn dpid(&self) -> Dpid {
            self.dpid
        }
        fn send_flow_mod(&self, _flow: &FlowMod) {
            self.flow_mods.fetch_add(1, Ordering::SeqCst);
        }
        fn send_packet_out(&self, _out: &PacketOut) {
            self.packet_outs.fetch_add(1, Ordering::SeqCst);
        }
        fn request_port_stats(&self) {}
    }

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x02, 0, 0, 0, 0, last])
    }

    fn ring() -> (TopologyManager, [Arc<CountingSession>; 4]) {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut tm = TopologyManager::new(inbox);
        let sessions: [Arc<CountingSession>; 4] =
            std::array::from_fn(|i| CountingSession::new(Dpid((i + 1) as u64)));
        for (i, session) in sessions.iter().enumerate() {
            let dpid = Dpid((i + 1) as u64);
            tm.handle(TopologyManagerMsg::SwitchUp { dpid, ports: vec![1, 2, 3], session: session.clone() });
        }
        let ring = [(1u64, 2u64, 2u16, 3u16), (2, 3, 3, 2), (3, 4, 2, 3), (4, 1, 3, 2)];
        for (a, b, pa, pb) in ring {
            tm.handle(TopologyManagerMsg::LinkUp {
                link: Link { src: Port::new(Dpid(a), pa), dst: Port::new(Dpid(b), pb) },
            });
            tm.handle(TopologyManagerMsg::LinkUp {
                link: Link { src: Port::new(Dpid(b), pb), dst: Port::new(Dpid(a), pa) },
            });
        }
        for dpid in 1..=4u64 {
            tm.handle(TopologyManagerMsg::HostUp { host: Host { mac: mac(dpid as u8), port: Port::new(Dpid(dpid), 1) } });
        }
        (tm, sessions)
    }

    #[test]
    fn switch_connect_installs_the_broadcast_catch_all() {
        let (_tm, sessions) = ring();
        for session in sessions {
            assert_eq!(session.flow_mods.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn s6_flood_emits_one_packet_out_per_switch() {
        let (mut tm, sessions) = ring();
        tm.handle(TopologyManagerMsg::Broadcast { data: vec![1, 2, 3], src_dpid: Dpid(1), src_port: 1 });
        for session in sessions {
            assert_eq!(session.packet_outs.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn find_route_across_the_ring_matches_s1() {
        let (tm, _sessions) = ring();
        let route = tm.db.find_route(mac(1), mac(2));
        assert_eq!(route[0], (Dpid(1), 2));
        assert_eq!(route.last().unwrap(), &(Dpid(2), 1));
    }
}

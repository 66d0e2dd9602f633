//! ProcessManager (§4.6): installs the announcement-capture flow, tracks
//! MPI rank → host MAC via RankDB, and answers rank queries.
//!
//! Grounded on `sdnmpi/process.py`.

use sdnmpi_bus::Inbox;
use sdnmpi_core::MacAddress;
use sdnmpi_rankdb::{codec, RankDb};

use crate::flow::{FlowAction, FlowMatch, FlowMod, PRIORITY_MAX};
use crate::frame::{ANNOUNCEMENT_UDP_PORT, ETH_TYPE_IPV4, IP_PROTO_UDP};
use crate::messages::ProcessManagerMsg;

pub struct ProcessManager {
    rankdb: RankDb,
    inbox: Inbox<ProcessManagerMsg>,
}

impl ProcessManager {
    pub fn new(inbox: Inbox<ProcessManagerMsg>) -> Self {
        ProcessManager { rankdb: RankDb::new(), inbox }
    }

    pub async fn run(mut self) {
        while let Some(msg) = self.inbox.recv().await {
            self.handle(msg);
        }
        tracing::info!("process manager inbox closed, shutting down");
    }

    fn handle(&mut self, msg: ProcessManagerMsg) {
        match msg {
            ProcessManagerMsg::SwitchUp { dpid: _, session } => {
                session.send_flow_mod(&FlowMod {
                    pattern: FlowMatch {
                        dl_type: Some(ETH_TYPE_IPV4),
                        nw_proto: Some(IP_PROTO_UDP),
                        tp_dst: Some(ANNOUNCEMENT_UDP_PORT),
                        ..FlowMatch::match_all()
                    },
                    priority: PRIORITY_MAX,
                    idle_timeout: 0,
                    hard_timeout: 0,
                    send_flow_rem: false,
                    actions: vec![FlowAction::Output(sdnmpi_core::reserved_ports::CONTROLLER)],
                });
            }
            ProcessManagerMsg::PacketIn { src, data } => self.handle_announcement(src, &data),
            ProcessManagerMsg::ResolveRank { rank, reply_to } => {
                let _ = reply_to.send(self.rankdb.resolve(rank));
            }
            ProcessManagerMsg::CurrentAllocation { reply_to } => {
                let _ = reply_to.send(self.rankdb.snapshot());
            }
        }
    }

    fn handle_announcement(&mut self, src: MacAddress, payload: &[u8]) {
        let announcement = match codec::decode(payload) {
            Ok(a) => a,
            Err(err) => {
                tracing::warn!(%err, "dropping malformed announcement");
                return;
            }
        };
        match announcement.kind {
            codec::AnnouncementKind::Launch => {
                tracing::info!(rank = announcement.rank, %src, "MPI process started");
                self.rankdb.add(announcement.rank, src);
            }
            codec::AnnouncementKind::Exit => {
                tracing::info!(rank = announcement.rank, %src, "MPI process exited");
                self.rankdb.remove(announcement.rank);
            }
        }
    }

    pub fn connect_process_added(&mut self, f: impl Fn(&(i32, MacAddress)) + Send + Sync + 'static) {
        self.rankdb.process_added.connect(f);
    }

    pub fn connect_process_deleted(&mut self, f: impl Fn(&i32) + Send + Sync + 'static) {
        self.rankdb.process_deleted.connect(f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowMod, PacketOut};
    use crate::session::SwitchSession;
    use sdnmpi_core::Dpid;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct NullSession(AtomicUsize);
    impl SwitchSession for NullSession {
        fn dpid(&self) -> Dpid {
            Dpid(1)
        }
        fn send_flow_mod(&self, _flow: &FlowMod) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
        fn send_packet_out(&self, _out: &PacketOut) {}
        fn request_port_stats(&self) {}
    }

    fn src_mac() -> MacAddress {
        MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0x07])
    }

    #[test]
    fn s5_launch_then_exit_resolves_and_clears() {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut pm = ProcessManager::new(inbox);
        let launch = [0x00, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00];
        pm.handle(ProcessManagerMsg::PacketIn { src: src_mac(), data: launch.to_vec() });
        assert_eq!(pm.rankdb.resolve(7), Some(src_mac()));

        let exit = [0x01, 0x00, 0x00, 0x00, 0x07, 0x00, 0x00, 0x00];
        pm.handle(ProcessManagerMsg::PacketIn { src: src_mac(), data: exit.to_vec() });
        assert_eq!(pm.rankdb.resolve(7), None);
    }

    #[test]
    fn switch_up_installs_one_flow_mod() {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut pm = ProcessManager::new(inbox);
        let session: Arc<NullSession> = Arc::new(NullSession(AtomicUsize::new(0)));
        pm.handle(ProcessManagerMsg::SwitchUp { dpid: Dpid(1), session: session.clone() });
        assert_eq!(session.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn malformed_announcement_is_dropped_silently() {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut pm = ProcessManager::new(inbox);
        pm.handle(ProcessManagerMsg::PacketIn { src: src_mac(), data: vec![0u8; 3] });
        assert_eq!(pm.rankdb.snapshot().len(), 0);
    }
}

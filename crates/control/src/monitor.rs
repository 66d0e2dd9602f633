//! Monitor (§4.8): periodic per-switch port-stats polling and rate
//! computation.
//!
//! Grounded on `sdnmpi/monitor.py`: a 1-second tick loop, one
//! `PortStatsRequest` per connected switch, and a snapshot diffed against
//! the previous reply to compute rates.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sdnmpi_bus::Inbox;
use sdnmpi_core::Dpid;

use crate::messages::{MonitorMsg, PortStat, Session};

struct LastSample {
    at: Instant,
    stat: PortStat,
}

#[derive(Debug, Clone, Copy)]
pub struct PortRates {
    pub rx_pps: f64,
    pub rx_bps: f64,
    pub tx_pps: f64,
    pub tx_bps: f64,
}

pub struct Monitor {
    sessions: HashMap<Dpid, Session>,
    samples: HashMap<(Dpid, u16), LastSample>,
    inbox: Inbox<MonitorMsg>,
    poll_interval: Duration,
}

impl Monitor {
    pub fn new(inbox: Inbox<MonitorMsg>, poll_interval: Duration) -> Self {
        Monitor { sessions: HashMap::new(), samples: HashMap::new(), inbox, poll_interval }
    }

    pub async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            tokio::select! {
                msg = self.inbox.recv() => {
                    match msg {
                        Some(msg) => self.handle(msg),
                        None => {
                            tracing::info!("monitor inbox closed, shutting down");
                            return;
                        }
                    }
                }
                _ = ticker.tick() => self.poll_all(),
            }
        }
    }

    fn poll_all(&self) {
        for session in self.sessions.values() {
            session.request_port_stats();
        }
    }

    fn handle(&mut self, msg: MonitorMsg) {
        match msg {
            MonitorMsg::SwitchUp { dpid, session } => {
                self.sessions.insert(dpid, session);
            }
            MonitorMsg::SwitchDown { dpid } => {
                self.sessions.remove(&dpid);
                self.samples.retain(|(d, _), _| *d != dpid);
            }
            MonitorMsg::PortStatsReply { dpid, port_no, stat } => {
                self.record_reply(dpid, port_no, stat);
            }
        }
    }

    /// First observation for a port records counters without emitting
    /// rates; subsequent ones compute floating-point per-second deltas.
    fn record_reply(&mut self, dpid: Dpid, port_no: u16, stat: PortStat) -> Option<PortRates> {
        let now = Instant::now();
        let key = (dpid, port_no);
        let rates = if let Some(last) = self.samples.get(&key) {
            let elapsed = (now - last.at).as_secs_f64();
            if elapsed > 0.0 {
                Some(PortRates {
                    rx_pps: (stat.rx_packets.saturating_sub(last.stat.rx_packets)) as f64 / elapsed,
                    rx_bps: (stat.rx_bytes.saturating_sub(last.stat.rx_bytes)) as f64 / elapsed,
                    tx_pps: (stat.tx_packets.saturating_sub(last.stat.tx_packets)) as f64 / elapsed,
                    tx_bps: (stat.tx_bytes.saturating_sub(last.stat.tx_bytes)) as f64 / elapsed,
                })
            } else {
                None
            }
        } else {
            None
        };
        if let Some(r) = rates {
            tracing::info!(%dpid, port_no, rx_pps = r.rx_pps, tx_pps = r.tx_pps, "port stats");
        }
        self.samples.insert(key, LastSample { at: now, stat });
        rates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowMod, PacketOut};
    use crate::session::SwitchSession;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSession(AtomicUsize);
    impl SwitchSession for CountingSession {
        fn dpid(&self) -> Dpid {
            Dpid(1)
        }
        fn send_flow_mod(&self, _flow: &FlowMod) {}
        fn send_packet_out(&self, _out: &PacketOut) {}
        fn request_port_stats(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn first_reply_for_a_port_records_without_rates() {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut monitor = Monitor::new(inbox, Duration::from_secs(1));
        let rates = monitor.record_reply(Dpid(1), 1, PortStat { rx_packets: 10, rx_bytes: 100, tx_packets: 0, tx_bytes: 0 });
        assert!(rates.is_none());
    }

    #[tokio::test]
    async fn poll_all_requests_stats_on_every_known_session() {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut monitor = Monitor::new(inbox, Duration::from_secs(1));
        let session: Arc<CountingSession> = Arc::new(CountingSession(AtomicUsize::new(0)));
        monitor.handle(MonitorMsg::SwitchUp { dpid: Dpid(1), session: session.clone() });
        monitor.poll_all();
        assert_eq!(session.0.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn switch_down_forgets_its_samples() {
        let (_mailbox, inbox) = sdnmpi_bus::mailbox(8);
        let mut monitor = Monitor::new(inbox, Duration::from_secs(1));
        monitor.record_reply(Dpid(1), 1, PortStat::default());
        monitor.handle(MonitorMsg::SwitchDown { dpid: Dpid(1) });
        assert!(monitor.samples.is_empty());
    }
}

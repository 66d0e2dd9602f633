//! Cross-component envelopes (§9 "polymorphic events", generalized per
//! SPEC_FULL §4.0). One tagged enum per destination component rather than a
//! single universal envelope — each component's run loop only ever needs to
//! match its own variants, and request/reply variants carry a
//! `tokio::sync::oneshot::Sender` for the suspension point §5 describes.

use std::collections::HashMap;
use std::sync::Arc;

use sdnmpi_core::{Dpid, MacAddress};
use sdnmpi_topology::{Host, Link, SwitchView};
use tokio::sync::oneshot;

use crate::frame::EthernetFrame;
use crate::session::SwitchSession;

pub type Session = Arc<dyn SwitchSession>;

#[derive(Debug, Clone, serde::Serialize)]
pub struct TopologySnapshot {
    pub switches: Vec<SwitchView>,
    pub links: Vec<Link>,
    pub hosts: Vec<Host>,
}

pub enum TopologyManagerMsg {
    SwitchUp { dpid: Dpid, ports: Vec<u16>, session: Session },
    SwitchDown { dpid: Dpid },
    LinkUp { link: Link },
    LinkDown { src: Dpid, dst: Dpid },
    HostUp { host: Host },
    /// A broadcast-destined frame arrived at `dpid` on `in_port`.
    BroadcastPacketIn { dpid: Dpid, in_port: u16, frame: EthernetFrame, data: Vec<u8> },
    FindRoute {
        src: MacAddress,
        dst: MacAddress,
        reply_to: oneshot::Sender<Vec<(Dpid, u16)>>,
    },
    CurrentTopology { reply_to: oneshot::Sender<TopologySnapshot> },
    /// Router has no route for a unicast destination; flood along the tree.
    Broadcast { data: Vec<u8>, src_dpid: Dpid, src_port: u16 },
    Session { dpid: Dpid, reply_to: oneshot::Sender<Option<Session>> },
}

pub enum ProcessManagerMsg {
    SwitchUp { dpid: Dpid, session: Session },
    /// A broadcast IPv4/UDP frame that might carry an announcement.
    PacketIn { src: MacAddress, data: Vec<u8> },
    ResolveRank { rank: i32, reply_to: oneshot::Sender<Option<MacAddress>> },
    CurrentAllocation { reply_to: oneshot::Sender<HashMap<i32, MacAddress>> },
}

pub enum RouterMsg {
    PacketIn {
        dpid: Dpid,
        in_port: u16,
        buffer_id: Option<u32>,
        frame: EthernetFrame,
        data: Vec<u8>,
    },
    CurrentForwarding { reply_to: oneshot::Sender<Vec<sdnmpi_fdb::ForwardingEntry>> },
}

#[derive(Debug, Clone, Default)]
pub struct PortStat {
    pub rx_packets: u64,
    pub rx_bytes: u64,
    pub tx_packets: u64,
    pub tx_bytes: u64,
}

pub enum MonitorMsg {
    SwitchUp { dpid: Dpid, session: Session },
    SwitchDown { dpid: Dpid },
    PortStatsReply { dpid: Dpid, port_no: u16, stat: PortStat },
}

//! The "opaque session handle" §3 says switches carry. Control components
//! depend only on this trait, never on `rust_ofp` directly — the southbound
//! adapter is the sole implementor, which keeps Router/TopologyManager/
//! ProcessManager/Monitor testable with a fake session.

use sdnmpi_core::Dpid;

use crate::flow::{FlowMod, PacketOut};

pub trait SwitchSession: Send + Sync {
    fn dpid(&self) -> Dpid;
    fn send_flow_mod(&self, flow: &FlowMod);
    fn send_packet_out(&self, out: &PacketOut);
    fn request_port_stats(&self);
}

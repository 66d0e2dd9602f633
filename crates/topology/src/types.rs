//! Topology domain types (§4.4): switches, inter-switch links and hosts.

use sdnmpi_core::{Dpid, MacAddress};
use serde::Serialize;

/// A single port on a switch, identified by the switch's DPID and a port
/// number local to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Port {
    pub dpid: Dpid,
    pub port_no: u16,
}

impl Port {
    pub fn new(dpid: Dpid, port_no: u16) -> Self {
        Port { dpid, port_no }
    }
}

/// A switch known to the topology. Carries an opaque session handle `H`
/// the control plane uses to address it — the topology layer never
/// interprets `H`, it only stores and returns it (§3, Ownership).
#[derive(Clone)]
pub struct Switch<H> {
    pub dpid: Dpid,
    pub ports: Vec<u16>,
    pub session: H,
}

/// Directed edge between two ports, discovered via LLDP-style probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Link {
    pub src: Port,
    pub dst: Port,
}

/// A host attached to a switch port, identified by its MAC. Hosts are
/// learned once and never mutated in place — only added or cleared on a
/// full topology reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Host {
    pub mac: MacAddress,
    pub port: Port,
}

/// Switch view with the session handle stripped, suitable for RPC
/// snapshots and signal payloads.
#[derive(Debug, Clone, Serialize)]
pub struct SwitchView {
    pub dpid: Dpid,
    pub ports: Vec<u16>,
}

impl<H> From<&Switch<H>> for SwitchView {
    fn from(s: &Switch<H>) -> Self {
        SwitchView {
            dpid: s.dpid,
            ports: s.ports.clone(),
        }
    }
}

//! Minimal Ethernet/IPv4/UDP header inspection (§4.7's filter/classify step).
//!
//! This is core classification logic, not the OpenFlow wire codec the
//! specification puts out of scope — the original used `ryu.lib.packet` for
//! exactly this, peeking at `eth.ethertype`, `eth.dst`, and a UDP header's
//! destination port.

use sdnmpi_core::{MacAddress, SdnError};

pub const ETH_TYPE_LLDP: u16 = 0x88cc;
pub const ETH_TYPE_IPV4: u16 = 0x0800;
pub const IP_PROTO_UDP: u8 = 17;
pub const ANNOUNCEMENT_UDP_PORT: u16 = 61000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EthernetFrame {
    pub src: MacAddress,
    pub dst: MacAddress,
    pub ethertype: u16,
    /// `Some(port)` when this is an IPv4/UDP packet, carrying the UDP
    /// destination port.
    pub udp_dst_port: Option<u16>,
}

impl EthernetFrame {
    pub fn is_lldp(&self) -> bool {
        self.ethertype == ETH_TYPE_LLDP
    }

    pub fn is_announcement(&self) -> bool {
        self.dst.is_broadcast() && self.udp_dst_port == Some(ANNOUNCEMENT_UDP_PORT)
    }
}

/// Parse the Ethernet header and, if present, an IPv4/UDP header, out of a
/// raw frame. Fails if the frame is shorter than a bare Ethernet header.
pub fn parse(bytes: &[u8]) -> Result<EthernetFrame, SdnError> {
    if bytes.len() < 14 {
        return Err(SdnError::MalformedPacket(format!(
            "frame too short for an Ethernet header: {} bytes",
            bytes.len()
        )));
    }
    let dst = MacAddress::new(bytes[0..6].try_into().unwrap());
    let src = MacAddress::new(bytes[6..12].try_into().unwrap());
    let ethertype = u16::from_be_bytes([bytes[12], bytes[13]]);

    let mut udp_dst_port = None;
    if ethertype == ETH_TYPE_IPV4 && bytes.len() >= 34 {
        let ip = &bytes[14..];
        let ihl = (ip[0] & 0x0f) as usize * 4;
        let proto = ip[9];
        if proto == IP_PROTO_UDP && bytes.len() >= 14 + ihl + 4 {
            let udp = &bytes[14 + ihl..];
            udp_dst_port = Some(u16::from_be_bytes([udp[2], udp[3]]));
        }
    }

    Ok(EthernetFrame { src, dst, ethertype, udp_dst_port })
}

/// The bytes after the UDP header — the announcement payload for an
/// IPv4/UDP frame, if the frame actually is one.
pub fn udp_payload(bytes: &[u8]) -> Option<&[u8]> {
    if bytes.len() < 34 {
        return None;
    }
    let ip = &bytes[14..];
    let ihl = (ip[0] & 0x0f) as usize * 4;
    let proto = ip[9];
    if proto != IP_PROTO_UDP {
        return None;
    }
    let udp_start = 14 + ihl;
    bytes.get(udp_start + 8..)
}

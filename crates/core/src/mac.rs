//! Ethernet MAC addresses and datapath identifiers.
//!
//! Grounded on the MAC-as-DPID coercion and virtual-MAC layout described in
//! the specification: a MAC is read as six big-endian octets whenever it is
//! compared against a switch DPID, and a destination MAC beginning with
//! `02:00` carries an MPI rank pair in its last four octets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A 64-bit OpenFlow datapath identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Dpid(pub u64);

impl fmt::Display for Dpid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl From<u64> for Dpid {
    fn from(v: u64) -> Self {
        Dpid(v)
    }
}

/// A six-octet Ethernet address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

/// The prefix marking a destination MAC as an MPI virtual address (§3).
const VIRTUAL_MAC_PREFIX: [u8; 2] = [0x02, 0x00];

impl MacAddress {
    pub const BROADCAST: MacAddress = MacAddress([0xff; 6]);

    pub fn new(octets: [u8; 6]) -> Self {
        MacAddress(octets)
    }

    pub fn is_broadcast(&self) -> bool {
        self.0 == Self::BROADCAST.0
    }

    /// IPv6 multicast MACs begin with `33:33`.
    pub fn is_ipv6_multicast(&self) -> bool {
        self.0[0] == 0x33 && self.0[1] == 0x33
    }

    /// `02:00 | src_rank(16 LE) | dst_rank(16 LE)` per §3.
    pub fn is_mpi_virtual(&self) -> bool {
        self.0[0] == VIRTUAL_MAC_PREFIX[0] && self.0[1] == VIRTUAL_MAC_PREFIX[1]
    }

    /// Decode the (src_rank, dst_rank) pair carried by a virtual MAC.
    /// Returns `None` if this address is not a virtual MAC.
    pub fn mpi_ranks(&self) -> Option<(i32, i32)> {
        if !self.is_mpi_virtual() {
            return None;
        }
        let src_rank = i16::from_le_bytes([self.0[2], self.0[3]]) as i32;
        let dst_rank = i16::from_le_bytes([self.0[4], self.0[5]]) as i32;
        Some((src_rank, dst_rank))
    }

    /// Build a virtual MAC encoding the given (src_rank, dst_rank) pair.
    /// Ranks are truncated to 16 bits, matching the wire layout.
    pub fn mpi_virtual(src_rank: i32, dst_rank: i32) -> MacAddress {
        let src = (src_rank as i16).to_le_bytes();
        let dst = (dst_rank as i16).to_le_bytes();
        MacAddress([
            VIRTUAL_MAC_PREFIX[0],
            VIRTUAL_MAC_PREFIX[1],
            src[0],
            src[1],
            dst[0],
            dst[1],
        ])
    }

    /// Interpret this address as a 64-bit big-endian integer and compare it
    /// against a switch DPID — the "MAC-as-DPID coercion" from the design
    /// notes. Used to recognise switch-local endpoints in route search.
    pub fn as_dpid(&self) -> Dpid {
        let mut buf = [0u8; 8];
        buf[2..8].copy_from_slice(&self.0);
        Dpid(u64::from_be_bytes(buf))
    }

    /// Pack into the 48-bit-in-a-`u64` representation the `rust_ofp` wire
    /// types use for `dl_src`/`dl_dst`.
    pub fn to_u64(&self) -> u64 {
        self.as_dpid().0
    }

    /// Inverse of [`MacAddress::to_u64`].
    pub fn from_u64(v: u64) -> MacAddress {
        let be = v.to_be_bytes();
        let mut octets = [0u8; 6];
        octets.copy_from_slice(&be[2..8]);
        MacAddress(octets)
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}", a, b, c, d, e, g)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("malformed MAC address: {0}")]
pub struct MacParseError(String);

impl FromStr for MacAddress {
    type Err = MacParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 6 {
            return Err(MacParseError(s.to_string()));
        }
        let mut octets = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            octets[i] = u8::from_str_radix(part, 16).map_err(|_| MacParseError(s.to_string()))?;
        }
        Ok(MacAddress(octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_displays_round_trip() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:01".parse().unwrap();
        assert_eq!(mac.to_string(), "aa:bb:cc:dd:ee:01");
    }

    #[test]
    fn rejects_malformed_mac() {
        assert!("not-a-mac".parse::<MacAddress>().is_err());
        assert!("aa:bb:cc".parse::<MacAddress>().is_err());
    }

    #[test]
    fn mac_as_dpid_is_big_endian() {
        let mac: MacAddress = "00:00:00:00:00:01".parse().unwrap();
        assert_eq!(mac.as_dpid(), Dpid(1));
        let mac: MacAddress = "00:00:00:00:01:00".parse().unwrap();
        assert_eq!(mac.as_dpid(), Dpid(256));
    }

    #[test]
    fn u64_packing_matches_dpid_coercion() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:ff".parse().unwrap();
        assert_eq!(mac.to_u64(), mac.as_dpid().0);
        assert_eq!(MacAddress::from_u64(mac.to_u64()), mac);
    }

    #[test]
    fn virtual_mac_round_trips_ranks() {
        let mac = MacAddress::mpi_virtual(0, 1);
        assert!(mac.is_mpi_virtual());
        assert_eq!(mac.mpi_ranks(), Some((0, 1)));
        assert_eq!(mac.to_string(), "02:00:00:00:01:00");
    }

    #[test]
    fn non_virtual_mac_has_no_ranks() {
        let mac: MacAddress = "aa:bb:cc:dd:ee:01".parse().unwrap();
        assert_eq!(mac.mpi_ranks(), None);
    }

    #[test]
    fn classifies_broadcast_and_ipv6_multicast() {
        assert!(MacAddress::BROADCAST.is_broadcast());
        let mac: MacAddress = "33:33:00:00:00:01".parse().unwrap();
        assert!(mac.is_ipv6_multicast());
    }
}

//! ForwardingDB (§4.3): per-switch memo of installed flow entries, keyed by
//! `(dpid, src_mac, dst_mac) -> egress_port`. Lets the Router skip
//! redundant `FlowMod` messages for triples it has already programmed.

use std::collections::HashMap;

use sdnmpi_bus::Signal;
use sdnmpi_core::{Dpid, MacAddress};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    dpid: Dpid,
    src: MacAddress,
    dst: MacAddress,
}

#[derive(Debug, Clone, Serialize)]
pub struct ForwardingEntry {
    pub dpid: Dpid,
    pub src: MacAddress,
    pub dst: MacAddress,
    pub out_port: u16,
}

#[derive(Default)]
pub struct ForwardingDb {
    table: HashMap<Key, u16>,
    pub updated: Signal<ForwardingEntry>,
}

impl ForwardingDb {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, dpid: Dpid, src: MacAddress, dst: MacAddress) -> bool {
        self.table.contains_key(&Key { dpid, src, dst })
    }

    /// Record that a flow rule for `(dpid, src, dst)` has been installed,
    /// egressing on `out_port`. At most one entry per key (§3) — a later
    /// `record` for the same key overwrites the port.
    pub fn record(&mut self, dpid: Dpid, src: MacAddress, dst: MacAddress, out_port: u16) {
        self.table.insert(Key { dpid, src, dst }, out_port);
        self.updated.fire(&ForwardingEntry { dpid, src, dst, out_port });
    }

    /// Flattened list for RPC snapshotting.
    pub fn snapshot_as_list(&self) -> Vec<ForwardingEntry> {
        self.table
            .iter()
            .map(|(k, &out_port)| ForwardingEntry {
                dpid: k.dpid,
                src: k.src,
                dst: k.dst,
                out_port,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, last])
    }

    #[test]
    fn has_is_false_until_recorded() {
        let mut fdb = ForwardingDb::new();
        assert!(!fdb.has(Dpid(1), mac(1), mac(2)));
        fdb.record(Dpid(1), mac(1), mac(2), 3);
        assert!(fdb.has(Dpid(1), mac(1), mac(2)));
    }

    #[test]
    fn record_overwrites_the_port_for_the_same_key() {
        let mut fdb = ForwardingDb::new();
        fdb.record(Dpid(1), mac(1), mac(2), 3);
        fdb.record(Dpid(1), mac(1), mac(2), 4);
        let snap = fdb.snapshot_as_list();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].out_port, 4);
    }

    #[test]
    fn distinct_switches_keep_independent_entries() {
        let mut fdb = ForwardingDb::new();
        fdb.record(Dpid(1), mac(1), mac(2), 3);
        fdb.record(Dpid(2), mac(1), mac(2), 9);
        assert!(fdb.has(Dpid(1), mac(1), mac(2)));
        assert!(fdb.has(Dpid(2), mac(1), mac(2)));
        assert_eq!(fdb.snapshot_as_list().len(), 2);
    }
}

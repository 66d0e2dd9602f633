//! RankDB (§4.2): rank → host MAC, with synchronous add/delete signals.

use std::collections::HashMap;

use sdnmpi_bus::Signal;
use sdnmpi_core::MacAddress;

pub struct RankDb {
    rank_to_mac: HashMap<i32, MacAddress>,
    pub process_added: Signal<(i32, MacAddress)>,
    pub process_deleted: Signal<i32>,
}

impl Default for RankDb {
    fn default() -> Self {
        RankDb {
            rank_to_mac: HashMap::new(),
            process_added: Signal::new(),
            process_deleted: Signal::new(),
        }
    }
}

impl RankDb {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite the mapping for `rank`. A duplicate LAUNCH for
    /// the same rank overwrites the previous MAC (§3).
    pub fn add(&mut self, rank: i32, mac: MacAddress) {
        self.rank_to_mac.insert(rank, mac);
        self.process_added.fire(&(rank, mac));
    }

    /// Remove `rank` if present. Deleting an absent rank is silent (§9d)
    /// but still fires `process_deleted` — the original always fired the
    /// signal regardless of whether the rank existed.
    pub fn remove(&mut self, rank: i32) {
        self.rank_to_mac.remove(&rank);
        self.process_deleted.fire(&rank);
    }

    pub fn resolve(&self, rank: i32) -> Option<MacAddress> {
        self.rank_to_mac.get(&rank).copied()
    }

    pub fn snapshot(&self) -> HashMap<i32, MacAddress> {
        self.rank_to_mac.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0xaa, 0xbb, 0xcc, 0xdd, 0xee, last])
    }

    #[test]
    fn add_overwrites_and_remove_clears() {
        let mut db = RankDb::new();
        db.add(7, mac(1));
        assert_eq!(db.resolve(7), Some(mac(1)));
        db.add(7, mac(2));
        assert_eq!(db.resolve(7), Some(mac(2)));
        db.remove(7);
        assert_eq!(db.resolve(7), None);
    }

    #[test]
    fn removing_unknown_rank_is_silent() {
        let mut db = RankDb::new();
        db.remove(42);
        assert_eq!(db.resolve(42), None);
    }

    #[test]
    fn fires_add_and_delete_signals() {
        let mut db = RankDb::new();
        let adds = Arc::new(AtomicUsize::new(0));
        let deletes = Arc::new(AtomicUsize::new(0));
        {
            let adds = Arc::clone(&adds);
            db.process_added.connect(move |_| {
                adds.fetch_add(1, Ordering::SeqCst);
            });
        }
        {
            let deletes = Arc::clone(&deletes);
            db.process_deleted.connect(move |_| {
                deletes.fetch_add(1, Ordering::SeqCst);
            });
        }
        db.add(7, mac(1));
        db.remove(7);
        assert_eq!(adds.load(Ordering::SeqCst), 1);
        assert_eq!(deletes.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn snapshot_reflects_current_state() {
        let mut db = RankDb::new();
        db.add(1, mac(1));
        db.add(2, mac(2));
        let snap = db.snapshot();
        assert_eq!(snap.len(), 2);
        assert_eq!(snap.get(&1), Some(&mac(1)));
    }
}

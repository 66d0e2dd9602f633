//! TopologyDB (§4.4): the switch/link/host graph, its spanning tree and
//! route search.
//!
//! Grounded on the original's `TopologyDB._calculate_spanning_tree` and
//! `_find_route`, with two deliberate departures: adjacency is stored in
//! an [`indexmap::IndexMap`] so iteration order matches link-discovery
//! order (the original relied on accidental dict ordering), and the
//! spanning tree root is always the smallest DPID rather than whichever
//! switch happened to be inserted first.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use sdnmpi_bus::Signal;
use sdnmpi_core::{reserved_ports, Dpid, MacAddress};

use crate::types::{Host, Link, Port, Switch, SwitchView};

enum Endpoint {
    Host(Host),
    Switch(Dpid),
}

impl Endpoint {
    fn dpid(&self) -> Dpid {
        match self {
            Endpoint::Host(h) => h.port.dpid,
            Endpoint::Switch(dpid) => *dpid,
        }
    }

    fn terminal_port(&self) -> u16 {
        match self {
            Endpoint::Host(h) => h.port.port_no,
            Endpoint::Switch(_) => reserved_ports::LOCAL,
        }
    }
}

pub struct TopologyDb<H> {
    switches: IndexMap<Dpid, Switch<H>>,
    links: IndexMap<Dpid, IndexMap<Dpid, Link>>,
    hosts: IndexMap<MacAddress, Host>,
    /// All ports that are an endpoint of some discovered link.
    link_ports: HashMap<Dpid, HashSet<u16>>,
    /// Link-ports not on the current spanning tree — the set a broadcast
    /// must skip.
    disabled_ports: HashMap<Dpid, HashSet<u16>>,

    pub switch_added: Signal<SwitchView>,
    pub switch_deleted: Signal<SwitchView>,
    pub link_added: Signal<Link>,
    pub link_deleted: Signal<Link>,
    pub host_added: Signal<Host>,
}

impl<H> Default for TopologyDb<H> {
    fn default() -> Self {
        TopologyDb {
            switches: IndexMap::new(),
            links: IndexMap::new(),
            hosts: IndexMap::new(),
            link_ports: HashMap::new(),
            disabled_ports: HashMap::new(),
            switch_added: Signal::new(),
            switch_deleted: Signal::new(),
            link_added: Signal::new(),
            link_deleted: Signal::new(),
            host_added: Signal::new(),
        }
    }
}

impl<H: Clone> TopologyDb<H> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_switch(&mut self, dpid: Dpid, ports: Vec<u16>, session: H) {
        let switch = Switch { dpid, ports, session };
        let view = SwitchView::from(&switch);
        self.switches.insert(dpid, switch);
        self.update_spanning_tree();
        self.switch_added.fire(&view);
    }

    /// Silent if `dpid` is unknown (§9d).
    pub fn delete_switch(&mut self, dpid: Dpid) {
        if let Some(switch) = self.switches.shift_remove(&dpid) {
            self.links.shift_remove(&dpid);
            for adj in self.links.values_mut() {
                adj.shift_remove(&dpid);
            }
            let view = SwitchView::from(&switch);
            self.update_spanning_tree();
            self.switch_deleted.fire(&view);
        }
    }

    pub fn add_link(&mut self, link: Link) {
        self.links
            .entry(link.src.dpid)
            .or_default()
            .insert(link.dst.dpid, link);
        self.update_spanning_tree();
        self.link_added.fire(&link);
    }

    /// Silent if no link exists from `src_dpid` to `dst_dpid` (§9d).
    pub fn delete_link(&mut self, src_dpid: Dpid, dst_dpid: Dpid) {
        let removed = self
            .links
            .get_mut(&src_dpid)
            .and_then(|adj| adj.shift_remove(&dst_dpid));
        if let Some(link) = removed {
            self.update_spanning_tree();
            self.link_deleted.fire(&link);
        }
    }

    pub fn add_host(&mut self, host: Host) {
        self.hosts.insert(host.mac, host);
        self.host_added.fire(&host);
    }

    /// Clear all switches, links and hosts.
    pub fn reset(&mut self) {
        self.switches.clear();
        self.links.clear();
        self.hosts.clear();
        self.link_ports.clear();
        self.disabled_ports.clear();
    }

    pub fn session(&self, dpid: Dpid) -> Option<H> {
        self.switches.get(&dpid).map(|s| s.session.clone())
    }

    pub fn has_switch(&self, dpid: Dpid) -> bool {
        self.switches.contains_key(&dpid)
    }

    pub fn is_edge_port(&self, dpid: Dpid, port_no: u16) -> bool {
        !self
            .link_ports
            .get(&dpid)
            .map(|ports| ports.contains(&port_no))
            .unwrap_or(false)
    }

    pub fn disabled_ports(&self, dpid: Dpid) -> HashSet<u16> {
        self.disabled_ports.get(&dpid).cloned().unwrap_or_default()
    }

    pub fn switches(&self) -> Vec<SwitchView> {
        self.switches.values().map(SwitchView::from).collect()
    }

    pub fn links(&self) -> Vec<Link> {
        self.links.values().flat_map(|adj| adj.values().copied()).collect()
    }

    pub fn hosts(&self) -> Vec<Host> {
        self.hosts.values().copied().collect()
    }

    fn resolve_endpoint(&self, mac: MacAddress) -> Option<Endpoint> {
        if let Some(host) = self.hosts.get(&mac) {
            return Some(Endpoint::Host(*host));
        }
        let dpid = mac.as_dpid();
        if self.switches.contains_key(&dpid) {
            return Some(Endpoint::Switch(dpid));
        }
        None
    }

    /// Resolve `src_mac` and `dst_mac` to switches and search for a
    /// loop-free path between them. Returns `[]` if either endpoint is
    /// unknown or no path exists (§9c). Otherwise returns the sequence of
    /// `(dpid, out_port)` hops a packet must take.
    pub fn find_route(&self, src_mac: MacAddress, dst_mac: MacAddress) -> Vec<(Dpid, u16)> {
        let src_ep = match self.resolve_endpoint(src_mac) {
            Some(ep) => ep,
            None => return vec![],
        };
        let dst_ep = match self.resolve_endpoint(dst_mac) {
            Some(ep) => ep,
            None => return vec![],
        };

        let path = self.find_dpid_path(src_ep.dpid(), dst_ep.dpid());
        if path.is_empty() {
            return vec![];
        }

        let mut hops = Vec::with_capacity(path.len());
        for window in path.windows(2) {
            let (a, b) = (window[0], window[1]);
            let port = self
                .links
                .get(&a)
                .and_then(|adj| adj.get(&b))
                .map(|link| link.src.port_no);
            match port {
                Some(p) => hops.push((a, p)),
                None => return vec![],
            }
        }
        hops.push((*path.last().unwrap(), dst_ep.terminal_port()));
        hops
    }

    /// LIFO-stack DFS over directed links, marking nodes visited as they
    /// are pushed. Deterministic because `links` adjacency iterates in
    /// link-discovery order.
    fn find_dpid_path(&self, src: Dpid, dst: Dpid) -> Vec<Dpid> {
        let mut visited = HashSet::new();
        visited.insert(src);
        let mut stack: Vec<Vec<Dpid>> = vec![vec![src]];

        while let Some(path) = stack.pop() {
            let current = *path.last().unwrap();
            if current == dst {
                return path;
            }
            if let Some(adj) = self.links.get(&current) {
                for &next in adj.keys() {
                    if visited.insert(next) {
                        let mut extended = path.clone();
                        extended.push(next);
                        stack.push(extended);
                    }
                }
            }
        }
        vec![]
    }

    /// Recompute `link_ports` (every port that terminates a link) and
    /// `disabled_ports` (the subset not on the spanning tree rooted at the
    /// smallest-DPID switch).
    fn update_spanning_tree(&mut self) {
        let mut link_ports: HashMap<Dpid, HashSet<u16>> = HashMap::new();
        for adj in self.links.values() {
            for link in adj.values() {
                link_ports.entry(link.src.dpid).or_default().insert(link.src.port_no);
                link_ports.entry(link.dst.dpid).or_default().insert(link.dst.port_no);
            }
        }
        let mut disabled = link_ports.clone();

        if let Some(&root) = self.switches.keys().min() {
            let mut visited = HashSet::new();
            self.mark_tree_edges(root, &mut disabled, &mut visited);
        }

        self.link_ports = link_ports;
        self.disabled_ports = disabled;
    }

    fn mark_tree_edges(
        &self,
        at: Dpid,
        disabled: &mut HashMap<Dpid, HashSet<u16>>,
        visited: &mut HashSet<Dpid>,
    ) {
        visited.insert(at);
        let Some(adj) = self.links.get(&at) else {
            return;
        };
        for (&next, link) in adj.iter() {
            if !visited.contains(&next) {
                if let Some(ports) = disabled.get_mut(&at) {
                    ports.remove(&link.src.port_no);
                }
                if let Some(ports) = disabled.get_mut(&next) {
                    ports.remove(&link.dst.port_no);
                }
                self.mark_tree_edges(next, disabled, visited);
            }
        }
    }
}

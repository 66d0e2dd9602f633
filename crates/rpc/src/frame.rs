//! Per-method RPC framing (§4.9, §6): `{"method": "...", "args": [...]}`,
//! recovering `rpc_interface.py`'s `_rpc_call`/`_rpc_broadcall` framing on
//! top of a plain JSON transport.

use std::collections::HashMap;

use sdnmpi_core::MacAddress;
use sdnmpi_fdb::ForwardingEntry;
use sdnmpi_topology::{Host, Link, SwitchView};
use sdnmpi_control::messages::TopologySnapshot;
use serde::Serialize;

#[derive(Serialize)]
struct RpcFrame {
    method: &'static str,
    args: Vec<serde_json::Value>,
}

fn frame(method: &'static str, args: Vec<serde_json::Value>) -> String {
    serde_json::to_string(&RpcFrame { method, args }).unwrap_or_default()
}

fn value(v: impl Serialize) -> serde_json::Value {
    serde_json::to_value(v).unwrap_or(serde_json::Value::Null)
}

pub fn init_fdb(entries: &[ForwardingEntry]) -> String {
    frame("init_fdb", vec![value(entries)])
}

pub fn init_rankdb(ranks: &HashMap<i32, MacAddress>) -> String {
    frame("init_rankdb", vec![value(ranks)])
}

pub fn init_topologydb(snapshot: &TopologySnapshot) -> String {
    frame("init_topologydb", vec![value(snapshot)])
}

pub fn add_process(rank: i32, mac: MacAddress) -> String {
    frame("add_process", vec![value(rank), value(mac)])
}

pub fn delete_process(rank: i32) -> String {
    frame("delete_process", vec![value(rank)])
}

pub fn add_switch(switch: &SwitchView) -> String {
    frame("add_switch", vec![value(switch)])
}

pub fn delete_switch(switch: &SwitchView) -> String {
    frame("delete_switch", vec![value(switch)])
}

pub fn add_link(link: &Link) -> String {
    frame("add_link", vec![value(link)])
}

pub fn delete_link(link: &Link) -> String {
    frame("delete_link", vec![value(link)])
}

pub fn add_host(host: &Host) -> String {
    frame("add_host", vec![value(host)])
}

pub fn update_fdb(entry: &ForwardingEntry) -> String {
    frame("update_fdb", vec![value(entry.dpid), value(entry.src), value(entry.dst), value(entry.out_port)])
}

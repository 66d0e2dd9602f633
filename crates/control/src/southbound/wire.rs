//! Translation between our `FlowMod`/`PacketOut`/`FlowAction` value types
//! and `rust_ofp::openflow0x01`'s wire types.
//!
//! Grounded on `examples/other_examples/.../baxtersa-rust_ofp__src-learning_switch.rs`,
//! the only `rust_ofp` usage available in the retrieval pack. That file
//! only exercises `PseudoPort::PhysicalPort`/`AllPorts` and
//! `Pattern::match_all()`'s `dl_src`/`dl_dst` fields; the remaining
//! `Pattern` fields and pseudo-port variants used below are inferred from
//! the OpenFlow 1.0 match/port model and may need adjusting against the
//! crate's real field names.

use rust_ofp::openflow0x01::{Action, Pattern, PseudoPort};
use sdnmpi_core::reserved_ports;

use crate::flow::{FlowAction, FlowMatch, PacketOut as SdnPacketOut};

pub fn to_ofp_pattern(m: &FlowMatch) -> Pattern {
    let mut pattern = Pattern::match_all();
    pattern.in_port = m.in_port;
    pattern.dl_src = m.dl_src.map(|mac| mac.to_u64());
    pattern.dl_dst = m.dl_dst.map(|mac| mac.to_u64());
    pattern.dl_type = m.dl_type;
    pattern.nw_proto = m.nw_proto;
    pattern.tp_dst = m.tp_dst;
    pattern
}

fn to_pseudo_port(port_no: u16) -> PseudoPort {
    match port_no {
        p if p == reserved_ports::FLOOD => PseudoPort::Flood,
        p if p == reserved_ports::ALL => PseudoPort::AllPorts,
        p if p == reserved_ports::CONTROLLER => PseudoPort::Controller,
        p if p == reserved_ports::LOCAL => PseudoPort::Local,
        p if p == reserved_ports::IN_PORT => PseudoPort::InPort,
        p if p == reserved_ports::NORMAL => PseudoPort::Normal,
        _ => PseudoPort::PhysicalPort(port_no),
    }
}

pub fn to_ofp_actions(actions: &[FlowAction]) -> Vec<Action> {
    actions
        .iter()
        .map(|a| match a {
            FlowAction::Output(port) => Action::Output(to_pseudo_port(*port)),
            FlowAction::SetDlDst(mac) => Action::SetDlDst(mac.to_u64()),
        })
        .collect()
}

pub fn to_ofp_packet_out(out: &SdnPacketOut) -> rust_ofp::openflow0x01::PacketOut {
    rust_ofp::openflow0x01::PacketOut {
        output_payload: out.data.clone().unwrap_or_default(),
        port_id: out.in_port,
        apply_actions: to_ofp_actions(&out.actions),
    }
}

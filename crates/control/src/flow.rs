//! OpenFlow 1.0 flow/packet value types (§6), independent of any particular
//! wire codec. The southbound adapter is the only place that translates
//! these into `rust_ofp`'s own types.

use sdnmpi_core::MacAddress;

/// `OFP_DEFAULT_PRIORITY` in OpenFlow 1.0.
pub const DEFAULT_PRIORITY: u16 = 0x8000;
pub const DEFAULT_PRIORITY_PLUS_ONE: u16 = 0x8001;
pub const PRIORITY_NEAR_MAX: u16 = 0xfffe;
pub const PRIORITY_MAX: u16 = 0xffff;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlowMatch {
    pub in_port: Option<u16>,
    pub dl_src: Option<MacAddress>,
    pub dl_dst: Option<MacAddress>,
    pub dl_type: Option<u16>,
    pub nw_proto: Option<u8>,
    pub tp_dst: Option<u16>,
}

impl FlowMatch {
    pub fn match_all() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowAction {
    Output(u16),
    SetDlDst(MacAddress),
}

#[derive(Debug, Clone)]
pub struct FlowMod {
    pub pattern: FlowMatch,
    pub priority: u16,
    pub idle_timeout: u16,
    pub hard_timeout: u16,
    pub send_flow_rem: bool,
    pub actions: Vec<FlowAction>,
}

impl FlowMod {
    /// The flow-install policy used for ordinary and MPI forwarding (§4.7):
    /// default priority, no timeouts, `SEND_FLOW_REM` set.
    pub fn forwarding(pattern: FlowMatch, actions: Vec<FlowAction>) -> Self {
        FlowMod {
            pattern,
            priority: DEFAULT_PRIORITY,
            idle_timeout: 0,
            hard_timeout: 0,
            send_flow_rem: true,
            actions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct PacketOut {
    pub buffer_id: Option<u32>,
    pub in_port: Option<u16>,
    pub actions: Vec<FlowAction>,
    pub data: Option<Vec<u8>>,
}

/// `OFP_NO_BUFFER`, the sentinel `buffer_id` meaning "no buffer held, data is
/// attached".
pub const NO_BUFFER: u32 = 0xffffffff;

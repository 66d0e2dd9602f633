//! OpenFlow 1.0 reserved port numbers (`ofp_port` pseudo-ports), used
//! wherever a port number refers to something other than a physical switch
//! port.

/// Send out the physical port the packet arrived on.
pub const IN_PORT: u16 = 0xfff8;
/// Perform table lookup / normal pipeline processing.
pub const TABLE: u16 = 0xfff9;
/// Process as if through a legacy learning switch.
pub const NORMAL: u16 = 0xfffa;
/// Flood along the active spanning tree, excluding the input port.
pub const FLOOD: u16 = 0xfffb;
/// All physical ports, excluding the input port.
pub const ALL: u16 = 0xfffc;
/// Send to the controller.
pub const CONTROLLER: u16 = 0xfffd;
/// The switch's local networking stack.
pub const LOCAL: u16 = 0xfffe;
/// Not a valid port; used to indicate "no port".
pub const NONE: u16 = 0xffff;

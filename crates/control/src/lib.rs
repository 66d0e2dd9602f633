pub mod flow;
pub mod frame;
pub mod messages;
pub mod monitor;
pub mod process_manager;
pub mod router;
pub mod session;
pub mod southbound;
pub mod topology_manager;

pub use messages::{MonitorMsg, ProcessManagerMsg, RouterMsg, Session, TopologyManagerMsg};
pub use monitor::Monitor;
pub use process_manager::ProcessManager;
pub use router::Router;
pub use session::SwitchSession;
pub use topology_manager::TopologyManager;

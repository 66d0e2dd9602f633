pub mod config;
pub mod error;
pub mod mac;
pub mod reserved_ports;

pub use config::Config;
pub use error::*;
pub use mac::{Dpid, MacAddress};

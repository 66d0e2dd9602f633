pub mod frame;
pub mod hub;

pub use hub::{ws_upgrade, RpcHub};

pub mod db;
pub mod types;

pub use db::TopologyDb;
pub use types::{Host, Link, Port, Switch, SwitchView};

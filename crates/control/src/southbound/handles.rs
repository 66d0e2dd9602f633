//! Injects the bus mailboxes into [`super::SdnMpiController`].
//!
//! `rust_ofp`'s `OF0x01Controller::new` takes no arguments, so the
//! controller can't be constructed with its collaborators directly. The
//! server binary calls [`install`] once, before handing the listener to
//! `rust_ofp`, and every `SdnMpiController::new()` call picks the handles
//! back up from here.

use std::sync::OnceLock;

use sdnmpi_bus::Mailbox;

use crate::messages::{MonitorMsg, ProcessManagerMsg, RouterMsg, TopologyManagerMsg};

#[derive(Clone)]
pub struct ControlPlaneHandles {
    pub topology: Mailbox<TopologyManagerMsg>,
    pub process_manager: Mailbox<ProcessManagerMsg>,
    pub router: Mailbox<RouterMsg>,
    pub monitor: Mailbox<MonitorMsg>,
}

static HANDLES: OnceLock<ControlPlaneHandles> = OnceLock::new();

/// Must be called exactly once, before the southbound listener starts.
pub fn install(handles: ControlPlaneHandles) {
    HANDLES
        .set(handles)
        .unwrap_or_else(|_| panic!("southbound control-plane handles installed twice"));
}

pub fn handles() -> ControlPlaneHandles {
    HANDLES
        .get()
        .expect("southbound::handles::install was not called before the controller started")
        .clone()
}

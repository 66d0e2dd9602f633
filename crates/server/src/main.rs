//! Process entry point: loads config, wires the four control-plane
//! components to the RPCHub's broadcast feed, installs the southbound
//! OpenFlow handles, and serves the northbound websocket.
//!
//! Grounded on `crates/server/src/main.rs`'s bootstrap shape (config load,
//! state construction, axum router with a websocket route, CORS layer,
//! `tokio::net::TcpListener` bind, background task spawning, `axum::serve`)
//! — everything graph/ingestion/scheduler-specific in that file has no
//! counterpart here and was left behind.

use std::net::SocketAddr;

use axum::routing::get;
use axum::Router;
use rust_ofp::ofp_controller::openflow0x01::OF0x01Controller;
use tower_http::cors::CorsLayer;

use sdnmpi_control::southbound::{self, SdnMpiController};
use sdnmpi_control::{Monitor, ProcessManager, Router as MpiRouter, TopologyManager};
use sdnmpi_core::Config;
use sdnmpi_rpc::RpcHub;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    sdnmpi_core::config::load_dotenv();
    let config = Config::from_env();
    config.log_summary();

    let (topology_mailbox, topology_inbox) = sdnmpi_bus::mailbox(256);
    let (process_manager_mailbox, process_manager_inbox) = sdnmpi_bus::mailbox(256);
    let (router_mailbox, router_inbox) = sdnmpi_bus::mailbox(256);
    let (monitor_mailbox, monitor_inbox) = sdnmpi_bus::mailbox(256);

    let rpc_hub = RpcHub::new(router_mailbox.clone(), process_manager_mailbox.clone(), topology_mailbox.clone());

    let mut topology = TopologyManager::new(topology_inbox);
    {
        let hub = rpc_hub.clone();
        topology.connect_switch_added(move |s| hub.publish(sdnmpi_rpc::frame::add_switch(s)));
    }
    {
        let hub = rpc_hub.clone();
        topology.connect_switch_deleted(move |s| hub.publish(sdnmpi_rpc::frame::delete_switch(s)));
    }
    {
        let hub = rpc_hub.clone();
        topology.connect_link_added(move |l| hub.publish(sdnmpi_rpc::frame::add_link(l)));
    }
    {
        let hub = rpc_hub.clone();
        topology.connect_link_deleted(move |l| hub.publish(sdnmpi_rpc::frame::delete_link(l)));
    }
    {
        let hub = rpc_hub.clone();
        topology.connect_host_added(move |h| hub.publish(sdnmpi_rpc::frame::add_host(h)));
    }

    let mut process_manager = ProcessManager::new(process_manager_inbox);
    {
        let hub = rpc_hub.clone();
        process_manager.connect_process_added(move |(rank, mac)| hub.publish(sdnmpi_rpc::frame::add_process(*rank, *mac)));
    }
    {
        let hub = rpc_hub.clone();
        process_manager.connect_process_deleted(move |rank| hub.publish(sdnmpi_rpc::frame::delete_process(*rank)));
    }

    let mut router = MpiRouter::new(router_inbox, topology_mailbox.clone(), process_manager_mailbox.clone());
    {
        let hub = rpc_hub.clone();
        router.connect_fdb_updated(move |entry| hub.publish(sdnmpi_rpc::frame::update_fdb(entry)));
    }

    let monitor = Monitor::new(monitor_inbox, std::time::Duration::from_millis(config.monitor.poll_interval_ms));

    tokio::spawn(topology.run());
    tokio::spawn(process_manager.run());
    tokio::spawn(router.run());
    tokio::spawn(monitor.run());

    southbound::install(southbound::Handles {
        topology: topology_mailbox,
        process_manager: process_manager_mailbox,
        router: router_mailbox,
        monitor: monitor_mailbox,
    });

    let openflow_addr = format!("{}:{}", config.openflow.host, config.openflow.port);
    tracing::info!(addr = %openflow_addr, "starting southbound OpenFlow listener");
    let openflow_port = config.openflow.port;
    std::thread::spawn(move || {
        SdnMpiController::listen(openflow_port);
    });

    let cors = if config.rpc.cors_origin == "*" {
        CorsLayer::permissive()
    } else {
        CorsLayer::new().allow_origin(
            config
                .rpc
                .cors_origin
                .parse::<axum::http::HeaderValue>()
                .expect("RPC_CORS_ORIGIN must be a valid header value"),
        )
    };

    let app = Router::new()
        .route("/ws", get(sdnmpi_rpc::ws_upgrade))
        .layer(cors)
        .with_state(rpc_hub);

    let rpc_addr: SocketAddr = format!("{}:{}", config.rpc.host, config.rpc.port).parse()?;
    tracing::info!(addr = %rpc_addr, "starting northbound RPC listener");
    let listener = tokio::net::TcpListener::bind(rpc_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

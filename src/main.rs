//! Terra Quest · Geography Quiz Backend
//!
//! - Axum HTTP + WebSocket API driving the quiz engine server-side
//! - Map datasets fetched in the background (or schematic maps offline)
//! - Optional records/auth API for persistence (guests play without it)
//! - Static SPA fallback (./static/index.html)
//!
//! Important env variables:
//!   PORT             : u16 (default 3000)
//!   GAME_CONFIG_PATH : path to TOML config (tunables, dataset URLs, records API, catalog extras)
//!   RECORDS_API_URL  : base URL of the auth/records API; overrides the config file
//!   MAPS_OFFLINE     : "1"/"true" skips dataset downloads
//!   LOG_LEVEL        : tracing filter, e.g. "debug" or full directives
//!   LOG_FORMAT       : "pretty" (default) or "json"

mod alias;
mod catalog;
mod config;
mod domain;
mod error;
mod geo;
mod logic;
mod map;
mod modes;
mod orchestrator;
mod protocol;
mod records;
mod routes;
mod scoring;
mod seeds;
mod session;
mod state;
mod telemetry;
mod util;

use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tracing::{info, instrument};

use crate::routes::build_router;
use crate::state::AppState;

#[instrument(level = "info", skip_all)]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
  telemetry::init_tracing();

  // Catalog, records client and loading map templates.
  let state = Arc::new(AppState::new());

  // Modes needing a map report "still loading" until this finishes.
  let loader = state.clone();
  tokio::spawn(async move { loader.load_maps().await });

  // Idle HTTP sessions expire.
  let sweeper = state.clone();
  tokio::spawn(async move { sweeper.run_session_sweeper().await });

  let app = build_router(state.clone());

  let addr: SocketAddr = std::env::var("PORT")
    .ok()
    .and_then(|p| p.parse::<u16>().ok())
    .map(|port| SocketAddr::from(([0, 0, 0, 0], port)))
    .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

  let listener = TcpListener::bind(addr).await?;
  info!(target: "terra_quest", %addr, "HTTP server listening");
  axum::serve(listener, app).await?;
  Ok(())
}

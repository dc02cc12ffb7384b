//! # Fleetwatch - Status dashboard for a fleet of blockchain nodes
//!
//! This library polls the REST status endpoints of every node in a fleet,
//! merges the answers into one record per node and classifies each attribute
//! by which nodes agree on it, so a renderer can highlight the odd ones out.
//!
//! ## Overview
//!
//! Nodes fail independently: one may time out, another may return a malformed
//! body. A failing request never aborts a polling pass. It turns into a
//! fallback record holding the failure text (or a `???` placeholder for miner
//! info), and that text is classified like any other value.
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - `registry`: Static node list loaded once at startup
//! - `fetch`: Per-category status requests and response shaping
//! - `aggregate`: Fleet-wide fan-out and per-node merging
//! - `classify`: Per-attribute distinct values and group ids
//! - `scheduler`: One-off or periodic passes behind a start/stop toggle
//! - `render`: Text table and JSON sinks
//! - `config` / `config_loader`: YAML configuration and live re-reading
//! - `settings`: Credential and interval as read at pass/toggle time
//! - `record`: Attribute names, values and ordered records
//! - `utils`: Utility functions and helpers
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use fleetwatch::{aggregate::SnapshotAggregator, config_loader, fetch, registry};
//! use fleetwatch::settings::PollContext;
//! use std::path::Path;
//! use std::sync::Arc;
//!
//! # async fn run() -> color_eyre::Result<()> {
//! let config = config_loader::load_config(Path::new("fleet.yaml"))?;
//! let registry = Arc::new(registry::load_nodes(&config.nodes)?);
//! let transport = Arc::new(fetch::HttpTransport::new(config.request_timeout)?);
//!
//! let aggregator = SnapshotAggregator::new(transport, registry, config.categories());
//! let snapshot = aggregator.build_snapshot(&PollContext::new(config.api_key)).await;
//!
//! for attr in &snapshot.attributes {
//!     println!("{}: {} distinct values", attr, snapshot.group_count(*attr));
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration Format
//!
//! ```yaml
//! nodes: data/nodes.json   # node id -> address
//! api_key: ""
//! interval: "30s"          # "0" or negative: single pass
//! request_timeout: "10s"
//! include_seed: false
//! log_level: info
//! ```
//!
//! ## Error Handling
//!
//! Library components use `thiserror` enums. Startup paths (configuration and
//! node list loading) return `color_eyre` reports, since failing there is
//! fatal. Per-node request failures are data, not errors.

pub mod aggregate;
pub mod classify;
pub mod config;
pub mod config_loader;
pub mod fetch;
pub mod record;
pub mod registry;
pub mod render;
pub mod scheduler;
pub mod settings;
pub mod utils;

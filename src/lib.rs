//! confdesk - conference desk backend.
//!
//! Thin HTTP handlers in front of hosted services: PDF analysis with a chat
//! model, LINE Login bridged to backend magic links, the LINE webhook, and
//! participant notifications, plus the catalog reads the front-ends need.

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod line;
pub mod metrics;
pub mod model;
pub mod pdf;
pub mod state;
pub mod store;
pub mod telemetry;
pub mod upstream;

//! mintdash library
//!
//! Paginated fetching, TTL caching and aggregation for an on-chain minting
//! platform's analytics backend. The binary renders the results as a terminal
//! dashboard or a JSON report; the modules are exposed for integration tests.

pub mod aggregate;
pub mod app;
pub mod cache;
pub mod cli;
pub mod config;
pub mod data;
pub mod fetch;
pub mod loader;
pub mod logging;
pub mod present;
pub mod refresh;
pub mod report;
pub mod ui;

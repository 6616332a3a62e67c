pub mod catalog;
pub mod config;
pub mod constants;
pub mod discovery;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod metrics;
pub mod overlap;
pub mod store;
pub mod types;

// Orchestration and its adapters
pub mod app;
pub mod infra;

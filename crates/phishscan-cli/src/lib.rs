//! Phishscan command line and prediction server.

pub mod cli;
pub mod config;
pub mod server;

// ABOUTME: Library root for kit-deployer - exposes public types for testing.
// ABOUTME: The main binary is in main.rs.

pub mod codec;
pub mod config;
pub mod deploy;
pub mod error;
pub mod observer;
pub mod output;
pub mod store;
pub mod types;

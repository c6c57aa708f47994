//! Logging middleware
//!
//! Request-level log lines for every served connection.

use log::info;
use std::net::SocketAddr;

/// Log a client connection
pub fn log_connection(addr: &SocketAddr) {
    info!("Client connected: {}", addr);
}

/// Log one handled request
pub fn log_request(addr: &SocketAddr, method: &str, path: &str, status: u16) {
    info!("{} {} {} -> {}", addr, method, path, status);
}

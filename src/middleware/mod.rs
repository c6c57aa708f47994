//! Server middleware
//!
//! Request and connection logging.

pub mod logging;

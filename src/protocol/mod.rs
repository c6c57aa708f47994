//! HTTP protocol implementation
//!
//! Handles request parsing, routing, response generation, and the
//! multipart upload format.

pub mod handlers;
pub mod multipart;
pub mod request;
pub mod responses;
pub mod routes;

pub use handlers::{HandlerContext, handle_request};
pub use request::{Method, Request, read_request};
pub use responses::Response;
pub use routes::{Route, resolve_route};

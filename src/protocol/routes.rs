//! Request routing
//!
//! Maps method + path pairs onto the server's operations. Anything
//! outside /api/ resolves to static asset serving.

use crate::protocol::request::Method;

/// The operations the server exposes
#[derive(Debug, PartialEq)]
pub enum Route {
    Preflight,
    ListDirectory,
    ReadFile,
    EditFile,
    DeleteEntry,
    EnumerateFolders,
    Upload,
    Login,
    Asset(String),
    NotFound,
}

/// Resolves a request to a route
pub fn resolve_route(method: Method, path: &str) -> Route {
    if method == Method::Options {
        return Route::Preflight;
    }

    match (method, path) {
        (Method::Get, "/api/list") => Route::ListDirectory,
        (Method::Get, "/api/file") => Route::ReadFile,
        (Method::Post, "/api/edit") => Route::EditFile,
        (Method::Post, "/api/delete") => Route::DeleteEntry,
        (Method::Get, "/api/folders") => Route::EnumerateFolders,
        (Method::Post, "/api/upload") => Route::Upload,
        (Method::Post, "/api/login") => Route::Login,
        (Method::Get, p) if !p.starts_with("/api/") => {
            Route::Asset(p.trim_start_matches('/').to_string())
        }
        _ => Route::NotFound,
    }
}

//! Request handlers
//!
//! One handler per route. Each handler validates its input, performs a
//! single storage operation, and maps the outcome onto a JSON response.
//! Mutating routes require an admin token minted by the login handler.

use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::auth::{TokenRegistry, validate_password};
use crate::config::{SharedRuntimeConfig, StartupConfig};
use crate::error::handlers::handle_error;
use crate::error::types::{AuthError, ProtocolError, ServerError};
use crate::protocol::multipart::{boundary_from_content_type, parse_multipart};
use crate::protocol::request::Request;
use crate::protocol::responses::{Response, content_type_for};
use crate::protocol::routes::{Route, resolve_route};
use crate::storage::validation::extension_of;
use crate::storage::{FileKind, operations, resolve_virtual_path};

/// Shared state every handler sees
pub struct HandlerContext {
    pub startup: Arc<StartupConfig>,
    pub runtime: SharedRuntimeConfig,
    pub tokens: Arc<Mutex<TokenRegistry>>,
}

/// Dispatches a request to its handler
pub async fn handle_request(request: &Request, ctx: &HandlerContext) -> Response {
    match resolve_route(request.method, &request.path) {
        Route::Preflight => Response::preflight(),
        Route::ListDirectory => handle_list(request, ctx),
        Route::ReadFile => handle_file(request, ctx),
        Route::EditFile => handle_edit(request, ctx).await,
        Route::DeleteEntry => handle_delete(request, ctx).await,
        Route::EnumerateFolders => handle_folders(ctx),
        Route::Upload => handle_upload(request, ctx).await,
        Route::Login => handle_login(request, ctx).await,
        Route::Asset(path) => handle_asset(&path, ctx),
        Route::NotFound => Response::error(404, "Endpoint not found"),
    }
}

/// GET /api/list
fn handle_list(request: &Request, ctx: &HandlerContext) -> Response {
    let path = request.query_param("path").unwrap_or("");

    match operations::list_directory(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
        path,
    ) {
        Ok(listing) => Response::json(200, &json!(listing)),
        Err(e) => fail("Failed to list directory", e.into()),
    }
}

/// GET /api/file
fn handle_file(request: &Request, ctx: &HandlerContext) -> Response {
    let Some(path) = request.query_param("path") else {
        return Response::error(400, "File path required");
    };

    match operations::read_file(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
        path,
    ) {
        Ok(record) if record.kind == FileKind::Binary => Response::json(
            200,
            &json!({ "content": null, "kind": "binary", "path": path }),
        ),
        Ok(record) => Response::json(200, &json!(record)),
        Err(e) => fail("Failed to read file", e.into()),
    }
}

#[derive(Deserialize)]
struct EditBody {
    path: Option<String>,
    content: Option<String>,
}

/// POST /api/edit
async fn handle_edit(request: &Request, ctx: &HandlerContext) -> Response {
    if let Err(e) = require_admin(request, ctx).await {
        return fail("Failed to edit file", e.into());
    }

    let body: EditBody = match parse_json_body(request) {
        Ok(body) => body,
        Err(e) => return fail("Failed to edit file", e.into()),
    };

    let Some(path) = body.path.filter(|p| !p.is_empty()) else {
        return Response::error(400, "File path required");
    };
    // Empty content is a legal edit; a missing field is not
    let Some(content) = body.content else {
        return Response::error(400, "File content required");
    };

    match operations::write_file(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
        &path,
        &content,
    ) {
        Ok(()) => Response::json(
            200,
            &json!({
                "success": true,
                "message": "File updated successfully",
                "path": path,
            }),
        ),
        Err(e) => fail("Failed to edit file", e.into()),
    }
}

#[derive(Deserialize)]
struct DeleteBody {
    path: Option<String>,
}

/// POST /api/delete
async fn handle_delete(request: &Request, ctx: &HandlerContext) -> Response {
    if let Err(e) = require_admin(request, ctx).await {
        return fail("Failed to delete item", e.into());
    }

    let body: DeleteBody = match parse_json_body(request) {
        Ok(body) => body,
        Err(e) => return fail("Failed to delete item", e.into()),
    };

    let Some(path) = body.path.filter(|p| !p.is_empty()) else {
        return Response::error(400, "Path required");
    };

    match operations::delete_entry(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
        &path,
    ) {
        Ok(()) => Response::json(
            200,
            &json!({
                "success": true,
                "message": "Item deleted successfully",
                "path": path,
            }),
        ),
        Err(e) => fail("Failed to delete item", e.into()),
    }
}

/// GET /api/folders
fn handle_folders(ctx: &HandlerContext) -> Response {
    match operations::enumerate_folders(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
    ) {
        Ok(folders) => Response::json(200, &json!({ "folders": folders })),
        Err(e) => fail("Failed to get folders", e.into()),
    }
}

/// POST /api/upload
async fn handle_upload(request: &Request, ctx: &HandlerContext) -> Response {
    if let Err(e) = require_admin(request, ctx).await {
        return fail("Failed to upload file", e.into());
    }

    let max_bytes = ctx.runtime.read().await.max_file_size_bytes();
    let max_mb = ctx.runtime.read().await.max_file_size_mb;

    let Some(boundary) = request
        .header("content-type")
        .and_then(boundary_from_content_type)
    else {
        return fail(
            "Failed to upload file",
            ProtocolError::MalformedMultipart("expected multipart/form-data".into()).into(),
        );
    };

    let form = match parse_multipart(&request.body, &boundary) {
        Ok(form) => form,
        Err(e) => return fail("Failed to upload file", e.into()),
    };

    let Some(file) = form.file else {
        return Response::error(400, "No file uploaded");
    };

    if file.data.len() as u64 > max_bytes {
        return fail(
            "Failed to upload file",
            ProtocolError::BodyTooLarge(max_mb).into(),
        );
    }

    let target = form
        .fields
        .get("path")
        .map(String::as_str)
        .unwrap_or("");

    match operations::store_upload(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
        target,
        &file.filename,
        &file.data,
    ) {
        Ok(receipt) => Response::json(
            200,
            &json!({
                "success": true,
                "message": "File uploaded successfully",
                "path": receipt.path,
                "filename": receipt.filename,
                "size": receipt.size,
            }),
        ),
        Err(e) => fail("Failed to upload file", e.into()),
    }
}

#[derive(Deserialize)]
struct LoginBody {
    password: Option<String>,
}

/// POST /api/login
async fn handle_login(request: &Request, ctx: &HandlerContext) -> Response {
    let body: LoginBody = match parse_json_body(request) {
        Ok(body) => body,
        Err(e) => return fail("Failed to log in", e.into()),
    };

    let Some(password) = body.password else {
        return Response::error(400, "Password required");
    };

    match validate_password(&password, &ctx.startup) {
        Ok(()) => {
            let token = ctx.tokens.lock().await.issue();
            Response::json(200, &json!({ "success": true, "token": token }))
        }
        Err(e) => fail("Failed to log in", e.into()),
    }
}

/// GET fallback: serve a library asset directly (how binary files reach
/// the client)
fn handle_asset(path: &str, ctx: &HandlerContext) -> Response {
    let resolved = match resolve_virtual_path(
        &ctx.startup.library_root_path(),
        &ctx.startup.virtual_root(),
        path,
    ) {
        Ok(resolved) => resolved,
        Err(e) => return fail("Failed to serve file", e.into()),
    };

    if !resolved.real.is_file() {
        return Response::error(404, "Endpoint not found");
    }

    match std::fs::read(&resolved.real) {
        Ok(data) => {
            let extension = extension_of(&resolved.virtual_path).unwrap_or_default();
            Response::bytes(content_type_for(&extension), data)
        }
        Err(e) => fail("Failed to serve file", ServerError::from(e)),
    }
}

/// Verify the admin token on a mutating request
async fn require_admin(request: &Request, ctx: &HandlerContext) -> Result<(), AuthError> {
    let token = request.header("x-auth-token");
    ctx.tokens.lock().await.verify(token)
}

/// Deserialize a JSON request body
fn parse_json_body<T: for<'de> Deserialize<'de>>(request: &Request) -> Result<T, ProtocolError> {
    serde_json::from_slice(&request.body).map_err(|e| ProtocolError::InvalidJson(e.to_string()))
}

/// Log and convert an error into its response
fn fail(context: &str, err: ServerError) -> Response {
    handle_error(&err);
    Response::from_error(context, &err)
}

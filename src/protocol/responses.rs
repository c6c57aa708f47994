//! HTTP response handling
//!
//! Assembles responses with permissive CORS headers. Bodies are JSON
//! except for static assets.

use serde_json::{Value, json};

use crate::error::handlers::error_to_status_code;
use crate::error::types::ServerError;

/// One HTTP response ready to serialize
#[derive(Debug)]
pub struct Response {
    pub status: u16,
    content_type: String,
    body: Vec<u8>,
}

impl Response {
    /// JSON response with the given status
    pub fn json(status: u16, value: &Value) -> Self {
        Self {
            status,
            content_type: "application/json".to_string(),
            body: value.to_string().into_bytes(),
        }
    }

    /// JSON error body `{"error": ...}`
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, &json!({ "error": message }))
    }

    /// Map a server error onto its status and body. Internal failures
    /// carry both a context line and the underlying message.
    pub fn from_error(context: &str, err: &ServerError) -> Self {
        let status = error_to_status_code(err);
        if status == 500 {
            Self::json(
                500,
                &json!({ "error": context, "message": err.to_string() }),
            )
        } else {
            Self::error(status, &err.to_string())
        }
    }

    /// Raw bytes with an explicit content type (static assets)
    pub fn bytes(content_type: &str, body: Vec<u8>) -> Self {
        Self {
            status: 200,
            content_type: content_type.to_string(),
            body,
        }
    }

    /// Empty 200 for the CORS preflight no-op
    pub fn preflight() -> Self {
        Self {
            status: 200,
            content_type: "text/plain".to_string(),
            body: Vec::new(),
        }
    }

    /// Serialize status line, headers, and body
    pub fn into_bytes(self) -> Vec<u8> {
        let head = format!(
            "HTTP/1.1 {} {}\r\n\
             Content-Type: {}\r\n\
             Content-Length: {}\r\n\
             Access-Control-Allow-Origin: *\r\n\
             Access-Control-Allow-Methods: GET, POST, OPTIONS\r\n\
             Access-Control-Allow-Headers: Content-Type, X-Auth-Token\r\n\
             Connection: close\r\n\
             \r\n",
            self.status,
            reason_phrase(self.status),
            self.content_type,
            self.body.len()
        );

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Reason phrase for the status line
pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}

/// Content type for a static asset by extension
pub fn content_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "mp4" => "video/mp4",
        "mp3" => "audio/mpeg",
        "html" => "text/html; charset=utf-8",
        "css" => "text/css",
        "js" => "text/javascript",
        "json" => "application/json",
        "md" | "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::types::StorageError;

    #[test]
    fn serialized_response_carries_cors_headers() {
        let bytes = Response::error(403, "Access denied").into_bytes();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.starts_with("HTTP/1.1 403 Forbidden\r\n"));
        assert!(text.contains("Access-Control-Allow-Origin: *"));
        assert!(text.ends_with("{\"error\":\"Access denied\"}"));
    }

    #[test]
    fn internal_errors_echo_the_message() {
        let err = ServerError::from(StorageError::IoError(std::io::Error::other("disk gone")));
        let response = Response::from_error("Failed to list directory", &err);
        assert_eq!(response.status, 500);
        let text = String::from_utf8(response.into_bytes()).unwrap();
        assert!(text.contains("Failed to list directory"));
        assert!(text.contains("disk gone"));
    }
}

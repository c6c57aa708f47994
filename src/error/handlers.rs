//! Error handlers
//!
//! Maps server errors onto HTTP status codes and logs them.

use crate::error::types::{AuthError, ProtocolError, ServerError, StorageError};
use log::error;

/// Log a server error
pub fn handle_error(err: &ServerError) {
    error!("Server error: {}", err);
}

/// Convert an error to an HTTP status code
pub fn error_to_status_code(err: &ServerError) -> u16 {
    match err {
        ServerError::Auth(e) => match e {
            AuthError::MalformedInput(_) => 400,
            _ => 403,
        },
        ServerError::Storage(e) => match e {
            StorageError::FileNotFound(_)
            | StorageError::DirectoryNotFound(_)
            | StorageError::NotFound(_)
            | StorageError::NotAFile(_)
            | StorageError::NotADirectory(_) => 404,
            StorageError::PathTraversal(_) | StorageError::RootDeletion => 403,
            StorageError::NotEditable(_) | StorageError::InvalidPath(_) => 400,
            StorageError::NotUtf8(_) | StorageError::IoError(_) => 500,
        },
        ServerError::Protocol(e) => match e {
            ProtocolError::MalformedRequest(_)
            | ProtocolError::MissingField(_)
            | ProtocolError::InvalidJson(_)
            | ProtocolError::BodyTooLarge(_)
            | ProtocolError::MalformedMultipart(_)
            | ProtocolError::NoFileUploaded => 400,
        },
        ServerError::Navigate(_) => 400,
        ServerError::IoError(_) => 500,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traversal_maps_to_forbidden() {
        let err = ServerError::from(StorageError::PathTraversal("../etc".into()));
        assert_eq!(error_to_status_code(&err), 403);
    }

    #[test]
    fn missing_file_maps_to_not_found() {
        let err = ServerError::from(StorageError::FileNotFound("x.txt".into()));
        assert_eq!(error_to_status_code(&err), 404);
    }

    #[test]
    fn non_editable_maps_to_bad_request() {
        let err = ServerError::from(StorageError::NotEditable("x.exe".into()));
        assert_eq!(error_to_status_code(&err), 400);
    }
}

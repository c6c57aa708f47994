//! Error types
//!
//! Defines domain-specific error types for each module of the library server.

use std::fmt;
use std::io;

/// Authentication module errors
#[derive(Debug)]
pub enum AuthError {
    InvalidPassword,
    MissingToken,
    InvalidToken,
    MalformedInput(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::InvalidPassword => write!(f, "Invalid password"),
            AuthError::MissingToken => write!(f, "Access denied"),
            AuthError::InvalidToken => write!(f, "Access denied"),
            AuthError::MalformedInput(s) => write!(f, "Malformed input: {}", s),
        }
    }
}

impl std::error::Error for AuthError {}

/// Storage module errors
#[derive(Debug)]
pub enum StorageError {
    FileNotFound(String),
    DirectoryNotFound(String),
    NotFound(String),
    NotAFile(String),
    NotADirectory(String),
    NotEditable(String),
    InvalidPath(String),
    PathTraversal(String),
    RootDeletion,
    NotUtf8(String),
    IoError(io::Error),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::FileNotFound(_) => write!(f, "File not found"),
            StorageError::DirectoryNotFound(_) => write!(f, "Directory not found"),
            StorageError::NotFound(_) => write!(f, "File or folder not found"),
            StorageError::NotAFile(p) => write!(f, "Not a file: {}", p),
            StorageError::NotADirectory(p) => write!(f, "Not a directory: {}", p),
            StorageError::NotEditable(_) => write!(f, "File type is not editable"),
            StorageError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            StorageError::PathTraversal(_) => write!(f, "Access denied"),
            StorageError::RootDeletion => write!(f, "Cannot delete LibraryFolder root"),
            StorageError::NotUtf8(p) => write!(f, "File is not valid UTF-8: {}", p),
            StorageError::IoError(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

impl From<io::Error> for StorageError {
    fn from(error: io::Error) -> Self {
        StorageError::IoError(error)
    }
}

/// Protocol module errors
#[derive(Debug)]
pub enum ProtocolError {
    MalformedRequest(String),
    MissingField(String),
    InvalidJson(String),
    BodyTooLarge(u64),
    MalformedMultipart(String),
    NoFileUploaded,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::MalformedRequest(s) => write!(f, "Malformed request: {}", s),
            ProtocolError::MissingField(field) => write!(f, "{} required", field),
            ProtocolError::InvalidJson(s) => write!(f, "Invalid JSON body: {}", s),
            ProtocolError::BodyTooLarge(limit) => {
                write!(f, "File too large. Maximum size is {}MB.", limit)
            }
            ProtocolError::MalformedMultipart(s) => write!(f, "Upload error: {}", s),
            ProtocolError::NoFileUploaded => write!(f, "No file uploaded"),
        }
    }
}

impl std::error::Error for ProtocolError {}

/// Navigate module errors
#[derive(Debug)]
pub enum NavigateError {
    InvalidPath(String),
    EmptyHistory,
    NoOpenFile,
}

impl fmt::Display for NavigateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NavigateError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
            NavigateError::EmptyHistory => write!(f, "Navigation history is empty"),
            NavigateError::NoOpenFile => write!(f, "No file is open"),
        }
    }
}

impl std::error::Error for NavigateError {}

/// General server error that encompasses all error types
#[derive(Debug)]
pub enum ServerError {
    Auth(AuthError),
    Storage(StorageError),
    Protocol(ProtocolError),
    Navigate(NavigateError),
    IoError(io::Error),
}

impl fmt::Display for ServerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerError::Auth(e) => write!(f, "{}", e),
            ServerError::Storage(e) => write!(f, "{}", e),
            ServerError::Protocol(e) => write!(f, "{}", e),
            ServerError::Navigate(e) => write!(f, "Navigate error: {}", e),
            ServerError::IoError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

impl From<AuthError> for ServerError {
    fn from(error: AuthError) -> Self {
        ServerError::Auth(error)
    }
}

impl From<StorageError> for ServerError {
    fn from(error: StorageError) -> Self {
        ServerError::Storage(error)
    }
}

impl From<ProtocolError> for ServerError {
    fn from(error: ProtocolError) -> Self {
        ServerError::Protocol(error)
    }
}

impl From<NavigateError> for ServerError {
    fn from(error: NavigateError) -> Self {
        ServerError::Navigate(error)
    }
}

impl From<io::Error> for ServerError {
    fn from(error: io::Error) -> Self {
        ServerError::IoError(error)
    }
}

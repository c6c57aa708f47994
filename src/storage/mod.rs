//! File system storage management
//!
//! Handles the library's file operations, path resolution, and containment
//! checks.

pub mod operations;
pub mod results;
pub mod validation;

pub use results::{DirectoryListing, FileKind, FileRecord, FolderEntry, UploadReceipt};
pub use validation::{ResolvedPath, resolve_virtual_path};

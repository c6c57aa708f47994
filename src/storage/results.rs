//! Result types for storage operations

use serde::Serialize;

/// One directory level, folders and files partitioned and sorted
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DirectoryListing {
    pub folders: Vec<String>,
    pub files: Vec<String>,
}

/// How a file's content is delivered to the client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Text,
    Markdown,
    Binary,
}

/// Content of a single file read. Binary files carry no content; the
/// client fetches those directly by their static path.
#[derive(Debug, Clone, Serialize)]
pub struct FileRecord {
    pub content: Option<String>,
    pub kind: FileKind,
}

/// One directory in the library tree, virtual-path prefixed
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FolderEntry {
    pub name: String,
    pub path: String,
}

/// Result of a completed upload
#[derive(Debug, Clone)]
pub struct UploadReceipt {
    pub path: String,
    pub filename: String,
    pub size: u64,
}

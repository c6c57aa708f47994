//! Storage operations
//!
//! Filesystem actions behind the API endpoints: list, read, write, delete,
//! folder enumeration, and upload storage. Every operation resolves and
//! validates its path before touching the filesystem.

use log::{error, info, warn};
use std::fs;
use std::path::Path;

use crate::error::StorageError;
use crate::storage::results::{
    DirectoryListing, FileKind, FileRecord, FolderEntry, UploadReceipt,
};
use crate::storage::validation::{
    extension_of, is_binary_extension, is_editable_extension, resolve_virtual_path,
    sanitize_filename,
};

/// Lists one directory level, folders and files partitioned and sorted
pub fn list_directory(
    library_root: &Path,
    virtual_root: &str,
    virtual_path: &str,
) -> Result<DirectoryListing, StorageError> {
    let resolved = resolve_virtual_path(library_root, virtual_root, virtual_path)?;

    if !resolved.real.is_dir() {
        return Err(StorageError::DirectoryNotFound(resolved.virtual_path));
    }

    let mut folders = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(&resolved.real)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_string();
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => folders.push(name),
            Ok(_) => files.push(name),
            Err(e) => {
                warn!("Skipping unreadable entry in {}: {}", resolved.virtual_path, e);
            }
        }
    }

    folders.sort();
    files.sort();

    info!(
        "Listed {} ({} folders, {} files)",
        resolved.virtual_path,
        folders.len(),
        files.len()
    );

    Ok(DirectoryListing { folders, files })
}

/// Reads a file, classifying it as text, markdown, or binary.
///
/// Binary extensions return no content; the client fetches those directly
/// by their static path.
pub fn read_file(
    library_root: &Path,
    virtual_root: &str,
    virtual_path: &str,
) -> Result<FileRecord, StorageError> {
    let resolved = resolve_virtual_path(library_root, virtual_root, virtual_path)?;

    if !resolved.real.is_file() {
        return Err(StorageError::FileNotFound(resolved.virtual_path));
    }

    let extension = extension_of(&resolved.virtual_path).unwrap_or_default();

    if is_binary_extension(&extension) {
        info!("Read {} (binary, content withheld)", resolved.virtual_path);
        return Ok(FileRecord {
            content: None,
            kind: FileKind::Binary,
        });
    }

    let bytes = fs::read(&resolved.real)?;
    let content = String::from_utf8(bytes)
        .map_err(|_| StorageError::NotUtf8(resolved.virtual_path.clone()))?;

    let kind = if extension == "md" {
        FileKind::Markdown
    } else {
        FileKind::Text
    };

    info!("Read {} ({} bytes)", resolved.virtual_path, content.len());

    Ok(FileRecord {
        content: Some(content),
        kind,
    })
}

/// Overwrites an existing editable file.
///
/// Content lands in a temporary sibling first and is renamed into place,
/// so readers never observe a half-written file.
pub fn write_file(
    library_root: &Path,
    virtual_root: &str,
    virtual_path: &str,
    content: &str,
) -> Result<(), StorageError> {
    let resolved = resolve_virtual_path(library_root, virtual_root, virtual_path)?;

    if !resolved.real.is_file() {
        return Err(StorageError::FileNotFound(resolved.virtual_path));
    }

    let extension = extension_of(&resolved.virtual_path).unwrap_or_default();
    if !is_editable_extension(&extension) {
        return Err(StorageError::NotEditable(resolved.virtual_path));
    }

    write_via_temp(&resolved.real, content.as_bytes())?;

    info!(
        "Wrote {} ({} bytes)",
        resolved.virtual_path,
        content.len()
    );

    Ok(())
}

/// Deletes a file or a whole directory tree.
///
/// The library root itself is never deletable.
pub fn delete_entry(
    library_root: &Path,
    virtual_root: &str,
    virtual_path: &str,
) -> Result<(), StorageError> {
    let resolved = resolve_virtual_path(library_root, virtual_root, virtual_path)?;

    if resolved.is_root {
        return Err(StorageError::RootDeletion);
    }

    let metadata = match fs::symlink_metadata(&resolved.real) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(StorageError::NotFound(resolved.virtual_path));
        }
        Err(e) => return Err(StorageError::from(e)),
    };

    let result = if metadata.is_dir() {
        fs::remove_dir_all(&resolved.real)
    } else {
        fs::remove_file(&resolved.real)
    };

    match result {
        Ok(()) => {
            info!("Deleted {}", resolved.virtual_path);
            Ok(())
        }
        // A concurrent delete finishing first still counts as deleted
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("Deleted {} (already gone)", resolved.virtual_path);
            Ok(())
        }
        Err(e) => {
            error!("Failed to delete {}: {}", resolved.virtual_path, e);
            Err(StorageError::from(e))
        }
    }
}

/// Enumerates every directory in the library, root first, pre-order.
///
/// Traversal uses an explicit worklist rather than recursion, so tree
/// depth is bounded only by memory. Unreadable subdirectories are logged
/// and skipped.
pub fn enumerate_folders(
    library_root: &Path,
    virtual_root: &str,
) -> Result<Vec<FolderEntry>, StorageError> {
    let root = resolve_virtual_path(library_root, virtual_root, "")?;

    let mut entries = Vec::new();
    let mut worklist = vec![FolderEntry {
        name: virtual_root.to_string(),
        path: root.virtual_path.clone(),
    }];

    while let Some(folder) = worklist.pop() {
        let resolved = resolve_virtual_path(library_root, virtual_root, &folder.path)?;

        let children = match fs::read_dir(&resolved.real) {
            Ok(children) => children,
            Err(e) => {
                if entries.is_empty() {
                    return Err(StorageError::from(e));
                }
                warn!("Skipping unreadable directory {}: {}", folder.path, e);
                entries.push(folder);
                continue;
            }
        };

        let parent_path = folder.path.clone();
        entries.push(folder);

        let mut subfolders: Vec<String> = children
            .flatten()
            .filter(|entry| entry.file_type().map(|t| t.is_dir()).unwrap_or(false))
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();

        // LIFO worklist: reverse-sorted push yields sorted pre-order
        subfolders.sort();
        for name in subfolders.into_iter().rev() {
            worklist.push(FolderEntry {
                path: format!("{}/{}", parent_path, name),
                name,
            });
        }
    }

    info!("Enumerated {} folders", entries.len());

    Ok(entries)
}

/// Stores uploaded bytes under a target directory, creating it if absent.
/// The original filename is preserved, reduced to its final component.
pub fn store_upload(
    library_root: &Path,
    virtual_root: &str,
    target_path: &str,
    filename: &str,
    data: &[u8],
) -> Result<UploadReceipt, StorageError> {
    let resolved = resolve_virtual_path(library_root, virtual_root, target_path)?;

    let name = sanitize_filename(filename)
        .ok_or_else(|| StorageError::InvalidPath(filename.to_string()))?;

    fs::create_dir_all(&resolved.real)?;

    let destination = resolved.real.join(&name);
    write_via_temp(&destination, data)?;

    let receipt = UploadReceipt {
        path: format!("{}/{}", resolved.virtual_path, name),
        filename: name,
        size: data.len() as u64,
    };

    info!("Stored upload {} ({} bytes)", receipt.path, receipt.size);

    Ok(receipt)
}

/// Write to a temporary sibling, then rename into place
fn write_via_temp(destination: &Path, data: &[u8]) -> Result<(), StorageError> {
    let extension = destination
        .extension()
        .map(|ext| format!("{}.tmp", ext.to_string_lossy()))
        .unwrap_or_else(|| "tmp".to_string());
    let temp_path = destination.with_extension(extension);

    fs::write(&temp_path, data)?;

    if let Err(e) = fs::rename(&temp_path, destination) {
        let _ = fs::remove_file(&temp_path);
        return Err(StorageError::from(e));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir()
            .join(format!("library-operations-{}-{}", tag, std::process::id()))
            .join("LibraryFolder");
        let _ = fs::remove_dir_all(root.parent().unwrap());
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn list_partitions_and_sorts() {
        let root = test_root("list");
        fs::write(root.join("b.txt"), "b").unwrap();
        fs::write(root.join("a.txt"), "a").unwrap();
        fs::create_dir(root.join("Z")).unwrap();

        let listing = list_directory(&root, "LibraryFolder", "LibraryFolder").unwrap();
        assert_eq!(listing.folders, vec!["Z"]);
        assert_eq!(listing.files, vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn list_empty_directory() {
        let root = test_root("list-empty");
        fs::create_dir(root.join("fresh")).unwrap();

        let listing = list_directory(&root, "LibraryFolder", "LibraryFolder/fresh").unwrap();
        assert!(listing.folders.is_empty());
        assert!(listing.files.is_empty());
    }

    #[test]
    fn list_missing_directory_is_not_found() {
        let root = test_root("list-missing");
        let result = list_directory(&root, "LibraryFolder", "LibraryFolder/ghost");
        assert!(matches!(result, Err(StorageError::DirectoryNotFound(_))));
    }

    #[test]
    fn read_classifies_markdown_and_text() {
        let root = test_root("read");
        fs::write(root.join("notes.md"), "# heading").unwrap();
        fs::write(root.join("plain.txt"), "plain").unwrap();

        let md = read_file(&root, "LibraryFolder", "LibraryFolder/notes.md").unwrap();
        assert_eq!(md.kind, FileKind::Markdown);
        assert_eq!(md.content.as_deref(), Some("# heading"));

        let txt = read_file(&root, "LibraryFolder", "LibraryFolder/plain.txt").unwrap();
        assert_eq!(txt.kind, FileKind::Text);
    }

    #[test]
    fn read_binary_withholds_content() {
        let root = test_root("read-binary");
        fs::write(root.join("scan.pdf"), [0x25, 0x50, 0x44, 0x46]).unwrap();

        let record = read_file(&root, "LibraryFolder", "LibraryFolder/scan.pdf").unwrap();
        assert_eq!(record.kind, FileKind::Binary);
        assert!(record.content.is_none());
    }

    #[test]
    fn write_then_read_round_trips() {
        let root = test_root("roundtrip");
        fs::write(root.join("doc.txt"), "old").unwrap();

        write_file(&root, "LibraryFolder", "LibraryFolder/doc.txt", "new content").unwrap();

        let record = read_file(&root, "LibraryFolder", "LibraryFolder/doc.txt").unwrap();
        assert_eq!(record.content.as_deref(), Some("new content"));
    }

    #[test]
    fn write_rejects_non_editable_extension() {
        let root = test_root("write-exe");
        fs::write(root.join("x.exe"), "bin").unwrap();

        let result = write_file(&root, "LibraryFolder", "LibraryFolder/x.exe", "hi");
        assert!(matches!(result, Err(StorageError::NotEditable(_))));
        assert_eq!(fs::read_to_string(root.join("x.exe")).unwrap(), "bin");
    }

    #[test]
    fn write_rejects_missing_file() {
        let root = test_root("write-missing");
        let result = write_file(&root, "LibraryFolder", "LibraryFolder/ghost.txt", "hi");
        assert!(matches!(result, Err(StorageError::FileNotFound(_))));
    }

    #[test]
    fn delete_file_and_directory() {
        let root = test_root("delete");
        fs::write(root.join("doomed.txt"), "x").unwrap();
        fs::create_dir_all(root.join("nest/inner")).unwrap();
        fs::write(root.join("nest/inner/deep.txt"), "y").unwrap();

        delete_entry(&root, "LibraryFolder", "LibraryFolder/doomed.txt").unwrap();
        assert!(!root.join("doomed.txt").exists());

        delete_entry(&root, "LibraryFolder", "LibraryFolder/nest").unwrap();
        assert!(!root.join("nest").exists());
    }

    #[test]
    fn delete_root_is_refused() {
        let root = test_root("delete-root");
        let result = delete_entry(&root, "LibraryFolder", "LibraryFolder");
        assert!(matches!(result, Err(StorageError::RootDeletion)));
        assert!(root.exists());
    }

    #[test]
    fn delete_missing_is_not_found() {
        let root = test_root("delete-missing");
        let result = delete_entry(&root, "LibraryFolder", "LibraryFolder/ghost");
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn enumerate_is_preorder_with_prefixes() {
        let root = test_root("enumerate");
        fs::create_dir_all(root.join("A/B")).unwrap();

        let folders = enumerate_folders(&root, "LibraryFolder").unwrap();
        let paths: Vec<&str> = folders.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["LibraryFolder", "LibraryFolder/A", "LibraryFolder/A/B"]
        );
        assert_eq!(folders[1].name, "A");
    }

    #[test]
    fn enumerate_sorts_siblings() {
        let root = test_root("enumerate-sort");
        fs::create_dir(root.join("beta")).unwrap();
        fs::create_dir(root.join("alpha")).unwrap();

        let folders = enumerate_folders(&root, "LibraryFolder").unwrap();
        let names: Vec<&str> = folders.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["LibraryFolder", "alpha", "beta"]);
    }

    #[test]
    fn upload_creates_target_and_preserves_name() {
        let root = test_root("upload");
        let receipt = store_upload(
            &root,
            "LibraryFolder",
            "LibraryFolder/incoming",
            "report.pdf",
            b"%PDF",
        )
        .unwrap();

        assert_eq!(receipt.path, "LibraryFolder/incoming/report.pdf");
        assert_eq!(receipt.filename, "report.pdf");
        assert_eq!(receipt.size, 4);
        assert_eq!(fs::read(root.join("incoming/report.pdf")).unwrap(), b"%PDF");
    }

    #[test]
    fn upload_strips_path_components_from_filename() {
        let root = test_root("upload-name");
        let receipt = store_upload(
            &root,
            "LibraryFolder",
            "LibraryFolder",
            "../escape.txt",
            b"x",
        )
        .unwrap();

        assert_eq!(receipt.filename, "escape.txt");
        assert!(root.join("escape.txt").exists());
        assert!(!root.parent().unwrap().join("escape.txt").exists());
    }

    #[test]
    fn traversal_never_mutates() {
        let root = test_root("traversal");
        let outside = root.parent().unwrap().join("outside.txt");
        fs::write(&outside, "safe").unwrap();

        let result = write_file(
            &root,
            "LibraryFolder",
            "LibraryFolder/../outside.txt",
            "clobbered",
        );
        assert!(result.is_err());
        assert_eq!(fs::read_to_string(&outside).unwrap(), "safe");
    }
}

//! Path validation
//!
//! Resolves virtual request paths against the library root and enforces
//! containment. Resolution is lexical first (every `..` must stay inside
//! the root), then the nearest existing ancestor is canonicalized and
//! compared against the canonicalized root component-by-component, so
//! sibling-prefix collisions and symlinks cannot escape.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Extensions served as opaque binary assets rather than inline content
pub const BINARY_EXTENSIONS: [&str; 7] = ["pdf", "jpg", "jpeg", "png", "gif", "mp4", "mp3"];

/// Extensions the edit endpoint is willing to overwrite
pub const EDITABLE_EXTENSIONS: [&str; 7] = ["txt", "md", "json", "js", "css", "html", "xml"];

/// A virtual path resolved against the library root
#[derive(Debug, Clone)]
pub struct ResolvedPath {
    /// Real filesystem path under the library root
    pub real: PathBuf,
    /// Normalized virtual path, always prefixed with the virtual root name
    pub virtual_path: String,
    /// Whether the path denotes the library root itself
    pub is_root: bool,
}

/// Resolve a client-supplied virtual path to a real path under the root.
///
/// The leading virtual-root segment ("LibraryFolder") is optional on
/// input. Absolute paths and any path whose `..` segments would climb
/// above the root are rejected outright.
pub fn resolve_virtual_path(
    library_root: &Path,
    virtual_root: &str,
    input: &str,
) -> Result<ResolvedPath, StorageError> {
    if input.contains('\0') {
        return Err(StorageError::InvalidPath(input.into()));
    }

    if input.starts_with('/') || input.starts_with('\\') || input.contains(':') {
        return Err(StorageError::PathTraversal(input.into()));
    }

    let mut segments: Vec<&str> = Vec::new();
    let mut raw = input.split('/').peekable();

    // The first segment may name the virtual root; skip it if so
    if raw.peek() == Some(&virtual_root) {
        raw.next();
    }

    for segment in raw {
        match segment {
            "" | "." => continue,
            ".." => {
                if segments.pop().is_none() {
                    return Err(StorageError::PathTraversal(input.into()));
                }
            }
            s if s.contains('\\') => {
                return Err(StorageError::InvalidPath(input.into()));
            }
            s => segments.push(s),
        }
    }

    let mut real = library_root.to_path_buf();
    for segment in &segments {
        real.push(segment);
    }

    containment_check(library_root, &real)?;

    let virtual_path = if segments.is_empty() {
        virtual_root.to_string()
    } else {
        format!("{}/{}", virtual_root, segments.join("/"))
    };

    Ok(ResolvedPath {
        real,
        virtual_path,
        is_root: segments.is_empty(),
    })
}

/// Verify that `candidate` cannot escape `library_root` through symlinks.
///
/// Canonicalizes the nearest existing ancestor of the candidate and
/// requires it to be a descendant of (or equal to) the canonical root.
/// `Path::starts_with` compares whole components, never raw strings.
fn containment_check(library_root: &Path, candidate: &Path) -> Result<(), StorageError> {
    let canonical_root = library_root
        .canonicalize()
        .map_err(StorageError::IoError)?;

    let mut probe = candidate.to_path_buf();
    loop {
        match probe.canonicalize() {
            Ok(canonical) => {
                if canonical.starts_with(&canonical_root) {
                    return Ok(());
                }
                return Err(StorageError::PathTraversal(
                    candidate.to_string_lossy().to_string(),
                ));
            }
            Err(_) => match probe.parent() {
                Some(parent) => probe = parent.to_path_buf(),
                None => {
                    return Err(StorageError::PathTraversal(
                        candidate.to_string_lossy().to_string(),
                    ));
                }
            },
        }
    }
}

/// Lowercased extension of a virtual path, if any
pub fn extension_of(path: &str) -> Option<String> {
    Path::new(path)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Whether the extension is delivered as an opaque binary asset
pub fn is_binary_extension(ext: &str) -> bool {
    BINARY_EXTENSIONS.contains(&ext)
}

/// Whether the extension is accepted by the edit endpoint
pub fn is_editable_extension(ext: &str) -> bool {
    EDITABLE_EXTENSIONS.contains(&ext)
}

/// Reduce an uploaded filename to a safe final component
pub fn sanitize_filename(filename: &str) -> Option<String> {
    let name = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim();

    if name.is_empty() || name == "." || name == ".." || name.contains('\0') {
        None
    } else {
        Some(name.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn test_root(tag: &str) -> PathBuf {
        let root = std::env::temp_dir()
            .join(format!("library-validation-{}-{}", tag, std::process::id()))
            .join("LibraryFolder");
        let _ = fs::remove_dir_all(root.parent().unwrap());
        fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn root_prefix_is_optional() {
        let root = test_root("prefix");
        fs::create_dir_all(root.join("sub")).unwrap();

        let with = resolve_virtual_path(&root, "LibraryFolder", "LibraryFolder/sub").unwrap();
        let without = resolve_virtual_path(&root, "LibraryFolder", "sub").unwrap();

        assert_eq!(with.real, without.real);
        assert_eq!(with.virtual_path, "LibraryFolder/sub");
        assert!(!with.is_root);
    }

    #[test]
    fn empty_path_is_the_root() {
        let root = test_root("empty");
        let resolved = resolve_virtual_path(&root, "LibraryFolder", "").unwrap();
        assert!(resolved.is_root);
        assert_eq!(resolved.virtual_path, "LibraryFolder");
    }

    #[test]
    fn dotdot_escape_is_rejected() {
        let root = test_root("dotdot");
        let result = resolve_virtual_path(&root, "LibraryFolder", "LibraryFolder/../secret.txt");
        assert!(matches!(result, Err(StorageError::PathTraversal(_))));
    }

    #[test]
    fn interior_dotdot_stays_contained() {
        let root = test_root("interior");
        fs::create_dir_all(root.join("a")).unwrap();
        let resolved =
            resolve_virtual_path(&root, "LibraryFolder", "LibraryFolder/a/../a").unwrap();
        assert_eq!(resolved.virtual_path, "LibraryFolder/a");
    }

    #[test]
    fn absolute_path_is_rejected() {
        let root = test_root("absolute");
        let result = resolve_virtual_path(&root, "LibraryFolder", "/etc/passwd");
        assert!(matches!(result, Err(StorageError::PathTraversal(_))));
    }

    #[test]
    fn sibling_prefix_directory_is_rejected() {
        let root = test_root("sibling");
        let sibling = root.parent().unwrap().join("LibraryFolder2");
        fs::create_dir_all(&sibling).unwrap();

        let result =
            resolve_virtual_path(&root, "LibraryFolder", "LibraryFolder/../LibraryFolder2/x");
        assert!(result.is_err());
    }

    #[test]
    fn extension_classification() {
        assert!(is_binary_extension("pdf"));
        assert!(is_binary_extension("jpeg"));
        assert!(!is_binary_extension("txt"));
        assert!(is_editable_extension("md"));
        assert!(!is_editable_extension("exe"));
        assert_eq!(extension_of("LibraryFolder/Notes.MD"), Some("md".into()));
        assert_eq!(extension_of("LibraryFolder/README"), None);
    }

    #[test]
    fn filename_sanitizing() {
        assert_eq!(sanitize_filename("report.pdf"), Some("report.pdf".into()));
        assert_eq!(sanitize_filename("dir/report.pdf"), Some("report.pdf".into()));
        assert_eq!(sanitize_filename("..\\..\\evil"), Some("evil".into()));
        assert_eq!(sanitize_filename(".."), None);
        assert_eq!(sanitize_filename(""), None);
    }
}

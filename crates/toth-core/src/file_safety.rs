//! Storage root resolution and filename validation for uploaded documents.
//!
//! Two layers of protection against path escape:
//! 1. Lexical: [`StorageRoot::resolve_name`] rejects any name containing `..`
//!    before it is ever joined to a path.
//! 2. Structural: [`StorageRoot::to_absolute`] joins, normalizes, and then
//!    requires the result to be a direct child of the root.

use std::io;
use std::path::{Component, Path, PathBuf};

use tracing::{debug, error, info};

use crate::defaults::FALLBACK_CONTENT_TYPE;
use crate::error::{Error, Result};

/// The absolute directory every blob lives in.
///
/// Built once at startup and handed to the storage layer; immutable afterwards.
#[derive(Debug, Clone)]
pub struct StorageRoot {
    root: PathBuf,
    degraded: bool,
}

impl StorageRoot {
    /// Resolve `configured` to an absolute, normalized directory and create it
    /// (with parents) if missing.
    ///
    /// # Errors
    ///
    /// Returns `Error::StorageInit` if the directory cannot be created. An
    /// already existing directory is not an error.
    pub fn initialize(configured: impl AsRef<Path>) -> Result<Self> {
        let configured = configured.as_ref();
        let root = absolute_normalized(configured).map_err(|e| {
            Error::StorageInit(format!("resolve({}): {}", configured.display(), e))
        })?;

        if let Err(e) = std::fs::create_dir_all(&root) {
            if !(e.kind() == io::ErrorKind::AlreadyExists && root.is_dir()) {
                return Err(Error::StorageInit(format!(
                    "create_dir_all({}): {}",
                    root.display(),
                    e
                )));
            }
        }

        info!(
            subsystem = "storage",
            component = "path_resolver",
            op = "initialize",
            storage_path = %root.display(),
            "Storage root ready"
        );
        Ok(Self {
            root,
            degraded: false,
        })
    }

    /// Like [`initialize`](Self::initialize), but never fails: on error the
    /// failure is logged and a degraded root is returned, on which every
    /// store/load fails with `Error::Io`.
    pub fn initialize_or_degraded(configured: impl AsRef<Path>) -> Self {
        let configured = configured.as_ref();
        match Self::initialize(configured) {
            Ok(root) => root,
            Err(e) => {
                error!(
                    subsystem = "storage",
                    component = "path_resolver",
                    op = "initialize",
                    storage_path = %configured.display(),
                    error = %e,
                    "Could not create the upload directory; file storage is degraded"
                );
                Self {
                    root: absolute_normalized(configured)
                        .unwrap_or_else(|_| configured.to_path_buf()),
                    degraded: true,
                }
            }
        }
    }

    /// Absolute root path.
    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    /// Fails with `Error::Io` when the root could not be created at startup.
    pub fn ensure_available(&self) -> Result<()> {
        if self.degraded {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("storage root {} is unavailable", self.root.display()),
            )));
        }
        Ok(())
    }

    /// Validate a caller-supplied filename and return its cleaned form.
    ///
    /// Any occurrence of `..` is rejected, whatever separators surround it.
    /// Backslashes become `/`; empty and `.` segments are dropped.
    pub fn resolve_name(&self, raw: &str) -> Result<String> {
        clean_filename(raw)
    }

    /// Join a cleaned name under the root and re-validate the result.
    ///
    /// The normalized path must be a direct child of the root (flat layout).
    /// Deeper descendants are `InvalidInput`; anything else is `PathTraversal`.
    pub fn to_absolute(&self, clean_name: &str) -> Result<PathBuf> {
        let candidate = Path::new(clean_name);
        if clean_name.is_empty() || candidate.has_root() || candidate.is_absolute() {
            return Err(Error::PathTraversal(clean_name.to_string()));
        }

        let joined = normalize_lexically(&self.root.join(candidate));
        if joined.parent() != Some(self.root.as_path()) {
            if joined.starts_with(&self.root) && joined != self.root {
                return Err(Error::InvalidInput(format!(
                    "nested filename not supported: {}",
                    clean_name
                )));
            }
            return Err(Error::PathTraversal(clean_name.to_string()));
        }

        debug!(
            subsystem = "storage",
            component = "path_resolver",
            op = "to_absolute",
            filename = %clean_name,
            storage_path = %joined.display(),
            "Resolved blob path"
        );
        Ok(joined)
    }
}

/// Lexical filename cleaning shared by upload validation.
pub fn clean_filename(raw: &str) -> Result<String> {
    if raw.contains("..") {
        return Err(Error::PathTraversal(raw.to_string()));
    }
    if raw.contains('\0') {
        return Err(Error::InvalidInput(
            "filename must not contain NUL bytes".to_string(),
        ));
    }

    let unified = raw.replace('\\', "/");
    let segments: Vec<&str> = unified
        .split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".")
        .collect();
    if segments.is_empty() {
        return Err(Error::InvalidInput("filename must not be empty".to_string()));
    }

    let mut clean = segments.join("/");
    if unified.starts_with('/') {
        clean.insert(0, '/');
    }
    Ok(clean)
}

/// Make `path` absolute against the working directory and normalize it.
fn absolute_normalized(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    Ok(normalize_lexically(&absolute))
}

/// Resolve `.` and `..` without touching the filesystem. `..` never climbs
/// above the filesystem root.
fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                if out.parent().is_some() {
                    out.pop();
                }
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

/// Content type served for a stored filename, by extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let ext = match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => return FALLBACK_CONTENT_TYPE,
    };
    match ext.as_str() {
        // Plain text
        "txt" | "log" => "text/plain",
        "csv" => "text/csv",
        "md" | "markdown" => "text/markdown",
        "html" | "htm" => "text/html",
        "xml" => "application/xml",
        "json" => "application/json",
        // Course material
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "odt" => "application/vnd.oasis.opendocument.text",
        "zip" => "application/zip",
        // Media
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => FALLBACK_CONTENT_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn root_in(dir: &TempDir) -> StorageRoot {
        StorageRoot::initialize(dir.path().join("uploads")).unwrap()
    }

    #[test]
    fn test_initialize_creates_missing_directories() {
        let dir = TempDir::new().unwrap();
        let configured = dir.path().join("a/b/c");
        let root = StorageRoot::initialize(&configured).unwrap();
        assert!(configured.is_dir());
        assert!(root.path().is_absolute());
        assert!(!root.is_degraded());
    }

    #[test]
    fn test_initialize_accepts_existing_directory() {
        let dir = TempDir::new().unwrap();
        let first = StorageRoot::initialize(dir.path()).unwrap();
        let second = StorageRoot::initialize(dir.path()).unwrap();
        assert_eq!(first.path(), second.path());
    }

    #[test]
    fn test_initialize_normalizes_dot_segments() {
        let dir = TempDir::new().unwrap();
        let configured = dir.path().join("x/./y/../z");
        let root = StorageRoot::initialize(&configured).unwrap();
        assert_eq!(root.path(), normalize_lexically(&dir.path().join("x/z")));
    }

    #[test]
    fn test_initialize_fails_when_path_is_a_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"not a directory").unwrap();

        let err = StorageRoot::initialize(&file).unwrap_err();
        assert!(matches!(err, Error::StorageInit(_)));
    }

    #[test]
    fn test_degraded_root_reports_io_error() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("occupied");
        std::fs::write(&file, b"not a directory").unwrap();

        let root = StorageRoot::initialize_or_degraded(&file);
        assert!(root.is_degraded());
        assert!(matches!(root.ensure_available(), Err(Error::Io(_))));
    }

    #[test]
    fn test_resolve_name_accepts_plain_names() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        assert_eq!(root.resolve_name("notes.txt").unwrap(), "notes.txt");
        assert_eq!(root.resolve_name("./notes.txt").unwrap(), "notes.txt");
        assert_eq!(root.resolve_name("my file (1).pdf").unwrap(), "my file (1).pdf");
    }

    #[test]
    fn test_resolve_name_rejects_parent_segments_in_any_style() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        for name in [
            "..",
            "../../etc/passwd",
            "a/../b.txt",
            "..\\..\\windows\\win.ini",
            "docs\\..\\secret",
            "trailing/..",
            "report..pdf",
        ] {
            assert!(
                matches!(root.resolve_name(name), Err(Error::PathTraversal(_))),
                "expected traversal rejection for {:?}",
                name
            );
        }
    }

    #[test]
    fn test_resolve_name_rejects_empty_and_nul() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        assert!(matches!(root.resolve_name(""), Err(Error::InvalidInput(_))));
        assert!(matches!(root.resolve_name("./"), Err(Error::InvalidInput(_))));
        assert!(matches!(root.resolve_name("/"), Err(Error::InvalidInput(_))));
        assert!(matches!(
            root.resolve_name("a\0b.txt"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_resolve_name_unifies_backslashes() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        assert_eq!(root.resolve_name("dir\\file.txt").unwrap(), "dir/file.txt");
    }

    #[test]
    fn test_to_absolute_stays_under_root() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        let path = root.to_absolute("notes.txt").unwrap();
        assert_eq!(path, root.path().join("notes.txt"));
    }

    #[test]
    fn test_to_absolute_rejects_nested_names_as_invalid_input() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        for name in ["dir/file.txt", "a/b/c.pdf"] {
            assert!(
                matches!(root.to_absolute(name), Err(Error::InvalidInput(_))),
                "expected invalid input for {:?}",
                name
            );
        }
    }

    #[test]
    fn test_to_absolute_rejects_escaping_names() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        for name in ["/etc/passwd", "../outside", "", "a/../../b", "a/.."] {
            assert!(
                matches!(root.to_absolute(name), Err(Error::PathTraversal(_))),
                "expected traversal rejection for {:?}",
                name
            );
        }
    }

    #[test]
    fn test_resolve_then_absolute_rejects_leading_slash() {
        let dir = TempDir::new().unwrap();
        let root = root_in(&dir);
        let clean = root.resolve_name("/etc/passwd").unwrap();
        assert!(matches!(
            root.to_absolute(&clean),
            Err(Error::PathTraversal(_))
        ));
    }

    #[test]
    fn test_content_type_for() {
        assert_eq!(content_type_for("notes.txt"), "text/plain");
        assert_eq!(content_type_for("Slides.PDF"), "application/pdf");
        assert_eq!(content_type_for("archive.tar.zip"), "application/zip");
        assert_eq!(content_type_for("README"), FALLBACK_CONTENT_TYPE);
        assert_eq!(content_type_for("data.unknownext"), FALLBACK_CONTENT_TYPE);
    }
}

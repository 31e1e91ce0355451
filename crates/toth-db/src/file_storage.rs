//! Document file storage: a flat local-filesystem blob store bound to
//! `Document` records.
//!
//! This module provides:
//! - [`StorageBackend`]: write/open primitives over absolute blob paths
//! - [`FilesystemBackend`]: atomic temp-file + rename writes under a [`StorageRoot`]
//! - [`DocumentFileStorage`]: ties a stored filename to `Document.filename`
//!
//! ## Example
//!
//! ```rust,ignore
//! use toth_db::file_storage::{DocumentFileStorage, FilesystemBackend};
//! use toth_core::StorageRoot;
//!
//! let root = StorageRoot::initialize_or_degraded("/var/lib/toth/uploads");
//! let files = DocumentFileStorage::new(documents, FilesystemBackend::new(root), 50 << 20);
//!
//! let stored = files.store(7, b"hello", "notes.txt").await?;
//! let file = files.load(7).await?;
//! let bytes = file.reader.read_to_end().await?;
//! ```

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream};
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing::{debug, info, warn};
use uuid::Uuid;

use toth_core::defaults::BLOB_READ_CHUNK_BYTES;
use toth_core::{content_type_for, DocumentRepository, Error, Result, StorageRoot};

/// Storage backend trait over absolute blob paths.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// The root every path handed to this backend must live directly under.
    fn root(&self) -> &StorageRoot;

    /// Create or atomically replace the file at `path` with `data`.
    ///
    /// Readers never observe a partially written file; on failure any
    /// previous content at `path` is left untouched.
    async fn write(&self, path: &Path, data: &[u8]) -> Result<()>;

    /// Open the file at `path` for lazy sequential reading.
    ///
    /// Returns `Ok(None)` when nothing readable exists at `path`.
    async fn open(&self, path: &Path) -> Result<Option<BlobReader>>;
}

/// Lazily-read handle to a stored blob.
///
/// Finite and not restartable: call [`StorageBackend::open`] again to re-read.
#[derive(Debug)]
pub struct BlobReader {
    file: fs::File,
    len: u64,
}

impl BlobReader {
    /// Size of the blob in bytes at open time.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Stream the blob in chunks of at most `BLOB_READ_CHUNK_BYTES`.
    pub fn into_stream(self) -> impl Stream<Item = std::io::Result<Bytes>> + Send + 'static {
        stream::try_unfold(self.file, |mut file| async move {
            let mut buf = BytesMut::with_capacity(BLOB_READ_CHUNK_BYTES);
            let n = file.read_buf(&mut buf).await?;
            let chunk = (n > 0).then(|| (buf.freeze(), file));
            Ok::<_, std::io::Error>(chunk)
        })
    }

    /// Read the remaining content into memory. Intended for small blobs.
    pub async fn read_to_end(mut self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(self.len as usize);
        self.file.read_to_end(&mut data).await?;
        Ok(data)
    }
}

/// Filesystem storage backend.
///
/// Stores every blob directly under the storage root, named by its cleaned
/// filename.
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    root: StorageRoot,
}

impl FilesystemBackend {
    /// Create a new filesystem backend over an initialized root.
    pub fn new(root: StorageRoot) -> Self {
        Self { root }
    }

    /// Refuse paths that are not direct children of the root.
    fn check_within_root(&self, path: &Path) -> Result<()> {
        if path.parent() != Some(self.root.path()) || path.file_name().is_none() {
            return Err(Error::PathTraversal(path.display().to_string()));
        }
        Ok(())
    }

    /// Validate that the storage root can write, read, and delete files.
    ///
    /// Performs a full round-trip at startup to surface permission or mount
    /// problems early.
    pub async fn validate(&self) -> std::result::Result<(), String> {
        self.root.ensure_available().map_err(|e| e.to_string())?;

        let probe = self
            .root
            .path()
            .join(format!(".health-check-{}", Uuid::new_v4()));
        let data = b"storage-health-check";

        fs::write(&probe, data)
            .await
            .map_err(|e| format!("write({:?}): {}", probe, e))?;
        let read = fs::read(&probe)
            .await
            .map_err(|e| format!("read({:?}): {}", probe, e));
        // The probe is removed even when the read fails.
        let removed = fs::remove_file(&probe)
            .await
            .map_err(|e| format!("remove_file({:?}): {}", probe, e));

        let read_data = read?;
        removed?;
        if read_data != data {
            return Err("read-back mismatch".to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    fn root(&self) -> &StorageRoot {
        &self.root
    }

    async fn write(&self, path: &Path, data: &[u8]) -> Result<()> {
        self.check_within_root(path)?;
        debug!(
            subsystem = "storage",
            component = "blob_store",
            op = "write",
            storage_path = %path.display(),
            size_bytes = data.len(),
            "file_storage: write"
        );

        // Atomic write: uniquely named temp file in the same directory + rename
        let temp_path = self
            .root
            .path()
            .join(format!(".upload-{}.tmp", Uuid::new_v4()));

        if let Err(e) = write_synced(&temp_path, data).await {
            warn!(temp_path = %temp_path.display(), error = %e, "file_storage: temp write failed");
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, path).await {
            warn!(
                from = %temp_path.display(),
                to = %path.display(),
                error = %e,
                "file_storage: rename failed"
            );
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn open(&self, path: &Path) -> Result<Option<BlobReader>> {
        self.check_within_root(path)?;

        let file = match fs::File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let metadata = file.metadata().await?;
        if !metadata.is_file() {
            return Ok(None);
        }

        debug!(
            subsystem = "storage",
            component = "blob_store",
            op = "open",
            storage_path = %path.display(),
            size_bytes = metadata.len(),
            "file_storage: open"
        );
        Ok(Some(BlobReader {
            file,
            len: metadata.len(),
        }))
    }
}

/// Write `data` to a fresh file, flush it to disk, and set 0644 permissions.
async fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    drop(file);

    // rw-r--r--, no execute
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(0o644)).await?;
    }
    Ok(())
}

/// A stored document file ready to be served.
#[derive(Debug)]
pub struct StoredFile {
    /// Filename as recorded on the document.
    pub filename: String,
    /// Content type derived from the filename extension.
    pub content_type: &'static str,
    pub reader: BlobReader,
}

/// Binds uploaded content to `Document` records.
///
/// Each operation is a single linear sequence with early exit; there is no
/// cross-request locking. Concurrent uploads to the same document race and
/// the last committed record update wins.
#[derive(Clone)]
pub struct DocumentFileStorage {
    documents: Arc<dyn DocumentRepository>,
    backend: Arc<dyn StorageBackend>,
    max_upload_bytes: usize,
}

impl DocumentFileStorage {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        backend: impl StorageBackend + 'static,
        max_upload_bytes: usize,
    ) -> Self {
        Self {
            documents,
            backend: Arc::new(backend),
            max_upload_bytes,
        }
    }

    pub fn root(&self) -> &StorageRoot {
        self.backend.root()
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_bytes
    }

    /// Store `data` for a document under the cleaned form of `suggested_filename`.
    ///
    /// The document is looked up before anything touches the disk, so an
    /// unknown id never leaves a blob behind.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the storage root is degraded or the disk write fails
    /// - `Error::InvalidInput` if `data` exceeds the upload limit or the name is empty
    /// - `Error::DocumentNotFound` if no record has `document_id`
    /// - `Error::PathTraversal` if the name would escape the storage root
    ///
    /// If the final record update fails, the written blob stays on disk as an
    /// orphan and the error is returned.
    pub async fn store(
        &self,
        document_id: i64,
        data: &[u8],
        suggested_filename: &str,
    ) -> Result<String> {
        let root = self.backend.root();
        root.ensure_available()?;

        if data.len() > self.max_upload_bytes {
            return Err(Error::InvalidInput(format!(
                "File exceeds maximum size of {} bytes",
                self.max_upload_bytes
            )));
        }

        let mut document = self
            .documents
            .get(document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;

        let clean_name = root.resolve_name(suggested_filename)?;
        let path = root.to_absolute(&clean_name)?;

        self.backend.write(&path, data).await?;

        document.filename = Some(clean_name.clone());
        if let Err(e) = self.documents.save(&document).await {
            warn!(
                subsystem = "storage",
                component = "binder",
                op = "store",
                document_id,
                filename = %clean_name,
                storage_path = %path.display(),
                error = %e,
                "Blob written but document update failed; file is orphaned"
            );
            return Err(e);
        }

        info!(
            subsystem = "storage",
            component = "binder",
            op = "store",
            document_id,
            filename = %clean_name,
            size_bytes = data.len(),
            "Stored document file"
        );
        Ok(clean_name)
    }

    /// Resolve a document id to its stored file.
    ///
    /// # Errors
    ///
    /// - `Error::Io` if the storage root is degraded or the file cannot be opened
    /// - `Error::DocumentNotFound` if no record has `document_id`
    /// - `Error::NotFound` if the record has no filename or the file is missing
    /// - `Error::PathTraversal` if the recorded filename escapes the root
    pub async fn load(&self, document_id: i64) -> Result<StoredFile> {
        let root = self.backend.root();
        root.ensure_available()?;

        let document = self
            .documents
            .get(document_id)
            .await?
            .ok_or(Error::DocumentNotFound(document_id))?;

        let filename = document
            .stored_filename()
            .ok_or_else(|| {
                Error::NotFound(format!("Document {} has no stored file", document_id))
            })?
            .to_string();

        let path = root.to_absolute(&filename).map_err(|e| {
            warn!(
                subsystem = "storage",
                component = "binder",
                op = "load",
                document_id,
                filename = %filename,
                "Recorded filename resolves outside the storage root"
            );
            e
        })?;

        let reader = match self.backend.open(&path).await? {
            Some(reader) => reader,
            None => {
                warn!(
                    subsystem = "storage",
                    component = "binder",
                    op = "load",
                    document_id,
                    filename = %filename,
                    storage_path = %path.display(),
                    "Document references a file that is not on disk"
                );
                return Err(Error::NotFound(format!(
                    "File {} for document {} not found",
                    filename, document_id
                )));
            }
        };

        Ok(StoredFile {
            content_type: content_type_for(&filename),
            filename,
            reader,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::TryStreamExt;
    use tempfile::TempDir;

    fn backend_in(dir: &TempDir) -> FilesystemBackend {
        FilesystemBackend::new(StorageRoot::initialize(dir.path().join("blobs")).unwrap())
    }

    fn leftover_temp_files(backend: &FilesystemBackend) -> Vec<String> {
        std::fs::read_dir(backend.root().path())
            .unwrap()
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect()
    }

    #[tokio::test]
    async fn test_write_then_open_roundtrip() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("notes.txt").unwrap();

        backend.write(&path, b"hello").await.unwrap();
        let reader = backend.open(&path).await.unwrap().expect("blob exists");
        assert_eq!(reader.len(), 5);
        assert_eq!(reader.read_to_end().await.unwrap(), b"hello");
        assert!(leftover_temp_files(&backend).is_empty());
    }

    #[tokio::test]
    async fn test_write_replaces_existing_content() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("notes.txt").unwrap();

        backend.write(&path, b"first version").await.unwrap();
        backend.write(&path, b"v2").await.unwrap();

        let reader = backend.open(&path).await.unwrap().unwrap();
        assert_eq!(reader.read_to_end().await.unwrap(), b"v2");
    }

    #[tokio::test]
    async fn test_open_missing_returns_none() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("absent.bin").unwrap();
        assert!(backend.open(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_open_directory_returns_none() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("folder").unwrap();
        std::fs::create_dir(&path).unwrap();
        assert!(backend.open(&path).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_rename_cleans_up_temp_file() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("occupied").unwrap();
        std::fs::create_dir(&path).unwrap();
        std::fs::write(path.join("keep.txt"), b"keep").unwrap();

        let err = backend.write(&path, b"data").await.unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(path.is_dir());
        assert_eq!(std::fs::read(path.join("keep.txt")).unwrap(), b"keep");
        assert!(leftover_temp_files(&backend).is_empty());
    }

    #[tokio::test]
    async fn test_write_rejects_paths_outside_root() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let outside = dir.path().join("escape.txt");

        let err = backend.write(&outside, b"x").await.unwrap_err();
        assert!(matches!(err, Error::PathTraversal(_)));
        assert!(!outside.exists());
    }

    #[tokio::test]
    async fn test_stream_yields_all_bytes_in_chunks() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("large.bin").unwrap();
        let data: Vec<u8> = (0..(BLOB_READ_CHUNK_BYTES * 2 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        backend.write(&path, &data).await.unwrap();

        let reader = backend.open(&path).await.unwrap().unwrap();
        let chunks: Vec<Bytes> = reader.into_stream().try_collect().await.unwrap();
        assert!(chunks.len() >= 3);
        assert!(chunks.iter().all(|c| c.len() <= BLOB_READ_CHUNK_BYTES));
        assert_eq!(chunks.concat(), data);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_written_files_are_not_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        let path = backend.root().to_absolute("script.sh").unwrap();
        backend.write(&path, b"#!/bin/sh\n").await.unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[tokio::test]
    async fn test_validate_fails_when_root_directory_is_gone() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        std::fs::remove_dir(backend.root().path()).unwrap();

        let err = backend.validate().await.unwrap_err();
        assert!(err.contains("write("), "unexpected error: {}", err);
        assert!(!backend.root().path().exists());
    }

    #[tokio::test]
    async fn test_validate_round_trip() {
        let dir = TempDir::new().unwrap();
        let backend = backend_in(&dir);
        backend.validate().await.unwrap();
        let remaining = std::fs::read_dir(backend.root().path()).unwrap().count();
        assert_eq!(remaining, 0);
    }
}

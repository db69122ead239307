//! Directory-to-bucket synchronisation.
//!
//! [`sync`] mirrors a local directory into a bucket: every regular file under
//! the root is uploaded under its root-relative key with a content type taken
//! from its extension. Uploads are sequential and unconditional; existing
//! objects with the same key are overwritten whether or not they changed.
//!
//! # Error Handling
//! The first failure (reading a file or uploading it) aborts the walk and is
//! returned as is. No report is produced for a failed run.

use std::path::{Path, PathBuf};

use tracing::{error, info};

use crate::content_type::content_type_for;
use crate::contract::{PutObjectRequest, StorageService};
use crate::error::{Result, SiteError};
use crate::walk::{LocalFile, TreeWalker};

/// One completed upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedObject {
    pub path: PathBuf,
    pub key: String,
    pub content_type: &'static str,
    pub size: u64,
}

#[derive(Debug, Default)]
pub struct SyncReport {
    pub bucket: String,
    pub root: PathBuf,
    pub uploaded: Vec<UploadedObject>,
}

impl SyncReport {
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.uploaded.iter().map(|o| o.key.as_str())
    }
}

/// Canonical form of `root`, checked to be an existing directory.
pub fn resolve_root(root: &Path) -> Result<PathBuf> {
    let resolved = match root.canonicalize() {
        Ok(p) => p,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SiteError::PathNotFound {
                path: root.to_path_buf(),
            })
        }
        Err(e) => return Err(SiteError::io(root, e)),
    };
    if !resolved.is_dir() {
        return Err(SiteError::NotADirectory { path: resolved });
    }
    Ok(resolved)
}

/// Uploads every regular file under `root` into `bucket`.
///
/// `on_upload` is called after each successful upload, in walk order.
pub async fn sync<S, F>(storage: &S, root: &Path, bucket: &str, mut on_upload: F) -> Result<SyncReport>
where
    S: StorageService + ?Sized,
    F: FnMut(&UploadedObject),
{
    let root = resolve_root(root)?;
    info!(root = %root.display(), bucket, "[SYNC] Starting synchronisation");

    let mut report = SyncReport {
        bucket: bucket.to_string(),
        root: root.clone(),
        uploaded: Vec::new(),
    };

    for entry in TreeWalker::new(&root)? {
        let file = entry.map_err(|e| {
            error!(error = %e, "[SYNC][ERROR] Walk failed");
            e
        })?;
        let uploaded = upload_file(storage, bucket, file).await?;
        on_upload(&uploaded);
        report.uploaded.push(uploaded);
    }

    info!(
        bucket,
        uploaded = report.uploaded.len(),
        "[SYNC] Synchronisation complete"
    );
    Ok(report)
}

async fn upload_file<S>(storage: &S, bucket: &str, file: LocalFile) -> Result<UploadedObject>
where
    S: StorageService + ?Sized,
{
    let content_type = content_type_for(&file.path);
    let size = tokio::fs::metadata(&file.path)
        .await
        .map_err(|e| SiteError::io(&file.path, e))?
        .len();

    info!(key = %file.key, content_type, size, "[SYNC][UPLOAD] Uploading file");
    storage
        .put_object(PutObjectRequest {
            bucket,
            key: &file.key,
            path: &file.path,
            content_type,
        })
        .await
        .map_err(|e| {
            error!(
                path = %file.path.display(),
                key = %file.key,
                code = ?e.code,
                error = %e,
                "[SYNC][ERROR][UPLOAD] put_object failed"
            );
            e
        })?;

    Ok(UploadedObject {
        path: file.path,
        key: file.key,
        content_type,
        size,
    })
}

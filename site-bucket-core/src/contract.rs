//! # contract: the seam between site-bucket and the remote object store
//!
//! This module defines the [`StorageService`] trait and the plain data types
//! that flow across it. The provisioning and synchronisation pipelines only
//! ever talk to storage through this trait, so they can be driven by the real
//! S3 client in the CLI crate or by a `mockall` mock in tests.
//!
//! ## Error Model
//! - Every fallible call returns [`RemoteServiceError`], which keeps the
//!   provider's raw error code for logging.
//! - Bucket creation is the exception: its two recoverable failures are
//!   classified by the implementor into [`CreateBucketOutcome`] variants so
//!   callers branch on a variant instead of matching on error-code strings.
//!
//! ## Mocking & Testing
//! - The trait is annotated for `mockall`; `MockStorageService` is exported
//!   under the `test-export-mocks` feature for use by dependent crates.

use std::path::Path;

use async_trait::async_trait;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

use crate::error::RemoteServiceError;

/// Default index document for website hosting.
pub const DEFAULT_INDEX_DOCUMENT: &str = "index.html";
/// Error document served for missing keys.
pub const DEFAULT_ERROR_DOCUMENT: &str = "error.html";

/// Handle to a bucket known to exist and be owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bucket {
    pub name: String,
}

impl Bucket {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Request for a new bucket.
#[derive(Debug, Clone, Copy)]
pub struct CreateBucketRequest<'a> {
    /// Globally unique bucket name.
    pub name: &'a str,
    /// Region to pin the bucket to. `None` leaves the choice to the service.
    pub location_constraint: Option<&'a str>,
}

/// Classified result of a create-bucket call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateBucketOutcome {
    /// The bucket was created by this call.
    Created,
    /// The bucket already exists and belongs to the caller.
    AlreadyOwned,
    /// The service refused the explicit location constraint (typically the
    /// provider's default region) and the request should be repeated without one.
    NeedsRetryWithoutRegion,
    /// Any other failure. Not retried.
    Fatal(RemoteServiceError),
}

/// Website hosting documents for a bucket.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct WebsiteConfig {
    #[serde(default = "default_index_document")]
    pub index_document: String,
    #[serde(default = "default_error_document")]
    pub error_document: String,
}

fn default_index_document() -> String {
    DEFAULT_INDEX_DOCUMENT.to_string()
}

fn default_error_document() -> String {
    DEFAULT_ERROR_DOCUMENT.to_string()
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            index_document: default_index_document(),
            error_document: default_error_document(),
        }
    }
}

/// A single object upload. The body is streamed from `path`.
#[derive(Debug, Clone, Copy)]
pub struct PutObjectRequest<'a> {
    pub bucket: &'a str,
    /// Object key, `/`-separated.
    pub key: &'a str,
    pub path: &'a Path,
    pub content_type: &'a str,
}

/// Operations consumed from the remote object store.
///
/// Implementations must not retry on their own; the pipelines decide what is
/// recoverable.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Names of every bucket visible to the caller.
    async fn list_buckets(&self) -> Result<Vec<String>, RemoteServiceError>;

    /// Every object key in `bucket`.
    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, RemoteServiceError>;

    /// Create a bucket and classify the outcome.
    async fn create_bucket<'a>(&self, req: CreateBucketRequest<'a>) -> CreateBucketOutcome;

    /// Raw location constraint of `bucket`. `None` (or an empty string) means
    /// the provider's default region.
    async fn get_bucket_location(&self, bucket: &str)
        -> Result<Option<String>, RemoteServiceError>;

    /// Replace the bucket's access policy with `policy` (a JSON document).
    async fn put_bucket_policy(&self, bucket: &str, policy: &str)
        -> Result<(), RemoteServiceError>;

    /// Replace the bucket's website configuration.
    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), RemoteServiceError>;

    /// Store an object, overwriting any existing object at the same key.
    async fn put_object<'a>(&self, req: PutObjectRequest<'a>) -> Result<(), RemoteServiceError>;
}

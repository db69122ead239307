#![doc = "S3 integration for CLI and core: implements the core storage contract on top of aws-sdk-s3."]
//
//! # Storage Integration (CLI <-> Core)
//!
//! This module provides [`S3Storage`], the only implementation of
//! [`site_bucket_core::contract::StorageService`] that talks to a real
//! object store. Everything provider-specific lives here: request building,
//! pagination, and turning SDK errors into [`RemoteServiceError`] values that
//! keep the provider's raw error code.
//!
//! Bucket creation errors are classified here as well, so the core only sees
//! [`CreateBucketOutcome`] variants and never matches on error-code strings.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::operation::create_bucket::CreateBucketError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{
    BucketLocationConstraint, CreateBucketConfiguration, ErrorDocument, IndexDocument,
    WebsiteConfiguration,
};
use site_bucket_core::contract::{
    CreateBucketOutcome, CreateBucketRequest, PutObjectRequest, StorageService, WebsiteConfig,
};
use site_bucket_core::RemoteServiceError;

/// Error codes S3 uses when a region does not accept an explicit location
/// constraint (the default region rejects its own name).
const LOCATION_CONSTRAINT_CODES: &[&str] = &[
    "InvalidLocationConstraint",
    "IllegalLocationConstraintException",
];

#[derive(Debug, Clone)]
pub struct S3Storage {
    client: aws_sdk_s3::Client,
}

impl S3Storage {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }
}

fn remote_error<E, R>(operation: &'static str, err: SdkError<E, R>) -> RemoteServiceError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let code = err
        .as_service_error()
        .and_then(|e| e.code())
        .map(str::to_string);
    let message = DisplayErrorContext(&err).to_string();
    tracing::debug!(operation, code = ?code, error = %message, "S3 request failed");
    RemoteServiceError {
        operation,
        code,
        message,
    }
}

/// Maps a raw create-bucket error code to a recoverable outcome, if it is one.
pub fn classify_create_bucket_code(code: Option<&str>) -> Option<CreateBucketOutcome> {
    match code {
        Some("BucketAlreadyOwnedByYou") => Some(CreateBucketOutcome::AlreadyOwned),
        Some(c) if LOCATION_CONSTRAINT_CODES.contains(&c) => {
            Some(CreateBucketOutcome::NeedsRetryWithoutRegion)
        }
        _ => None,
    }
}

fn classify_create_bucket_error<R>(err: SdkError<CreateBucketError, R>) -> CreateBucketOutcome
where
    R: std::fmt::Debug,
{
    if let Some(service_err) = err.as_service_error() {
        if service_err.is_bucket_already_owned_by_you() {
            return CreateBucketOutcome::AlreadyOwned;
        }
        if let Some(outcome) = classify_create_bucket_code(service_err.code()) {
            return outcome;
        }
    }
    CreateBucketOutcome::Fatal(remote_error("create_bucket", err))
}

#[async_trait]
impl StorageService for S3Storage {
    async fn list_buckets(&self) -> Result<Vec<String>, RemoteServiceError> {
        tracing::info!("Listing buckets");
        let resp = self
            .client
            .list_buckets()
            .send()
            .await
            .map_err(|e| remote_error("list_buckets", e))?;
        let names: Vec<String> = resp
            .buckets()
            .iter()
            .filter_map(|b| b.name())
            .map(str::to_string)
            .collect();
        tracing::info!(count = names.len(), "Fetched bucket list");
        Ok(names)
    }

    async fn list_objects(&self, bucket: &str) -> Result<Vec<String>, RemoteServiceError> {
        tracing::info!(bucket, "Listing bucket objects");
        let mut keys = Vec::new();
        let mut continuation_token: Option<String> = None;
        loop {
            let mut req = self.client.list_objects_v2().bucket(bucket);
            if let Some(token) = continuation_token.take() {
                req = req.continuation_token(token);
            }
            let resp = req
                .send()
                .await
                .map_err(|e| remote_error("list_objects", e))?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|o| o.key())
                    .map(str::to_string),
            );

            if resp.is_truncated() == Some(true) {
                continuation_token = resp.next_continuation_token().map(ToOwned::to_owned);
                if continuation_token.is_none() {
                    break;
                }
            } else {
                break;
            }
        }
        tracing::info!(bucket, count = keys.len(), "Fetched object list");
        Ok(keys)
    }

    async fn create_bucket<'a>(&self, req: CreateBucketRequest<'a>) -> CreateBucketOutcome {
        tracing::info!(
            bucket = req.name,
            location_constraint = ?req.location_constraint,
            "Creating bucket"
        );
        let mut request = self.client.create_bucket().bucket(req.name);
        if let Some(region) = req.location_constraint {
            request = request.create_bucket_configuration(
                CreateBucketConfiguration::builder()
                    .location_constraint(BucketLocationConstraint::from(region))
                    .build(),
            );
        }

        match request.send().await {
            Ok(_) => CreateBucketOutcome::Created,
            Err(e) => classify_create_bucket_error(e),
        }
    }

    async fn get_bucket_location(
        &self,
        bucket: &str,
    ) -> Result<Option<String>, RemoteServiceError> {
        let resp = self
            .client
            .get_bucket_location()
            .bucket(bucket)
            .send()
            .await
            .map_err(|e| remote_error("get_bucket_location", e))?;
        let location = resp
            .location_constraint()
            .map(|c| c.as_str().to_string())
            .filter(|c| !c.is_empty());
        tracing::debug!(bucket, location = ?location, "Fetched bucket location");
        Ok(location)
    }

    async fn put_bucket_policy(&self, bucket: &str, policy: &str) -> Result<(), RemoteServiceError> {
        tracing::info!(bucket, "Putting bucket policy");
        self.client
            .put_bucket_policy()
            .bucket(bucket)
            .policy(policy)
            .send()
            .await
            .map_err(|e| remote_error("put_bucket_policy", e))?;
        Ok(())
    }

    async fn put_bucket_website(
        &self,
        bucket: &str,
        website: &WebsiteConfig,
    ) -> Result<(), RemoteServiceError> {
        tracing::info!(bucket, "Putting bucket website configuration");
        let invalid = |e: aws_sdk_s3::error::BuildError| {
            RemoteServiceError::new("put_bucket_website", None::<String>, e.to_string())
        };
        let index = IndexDocument::builder()
            .suffix(&website.index_document)
            .build()
            .map_err(invalid)?;
        let error_document = ErrorDocument::builder()
            .key(&website.error_document)
            .build()
            .map_err(invalid)?;
        let configuration = WebsiteConfiguration::builder()
            .index_document(index)
            .error_document(error_document)
            .build();

        self.client
            .put_bucket_website()
            .bucket(bucket)
            .website_configuration(configuration)
            .send()
            .await
            .map_err(|e| remote_error("put_bucket_website", e))?;
        Ok(())
    }

    async fn put_object<'a>(&self, req: PutObjectRequest<'a>) -> Result<(), RemoteServiceError> {
        tracing::debug!(bucket = req.bucket, key = req.key, "Putting object");
        let body = ByteStream::from_path(req.path).await.map_err(|e| {
            RemoteServiceError::new(
                "put_object",
                None::<String>,
                format!("failed to open {}: {e}", req.path.display()),
            )
        })?;
        self.client
            .put_object()
            .bucket(req.bucket)
            .key(req.key)
            .content_type(req.content_type)
            .body(body)
            .send()
            .await
            .map_err(|e| remote_error("put_object", e))?;
        Ok(())
    }
}

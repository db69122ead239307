//! Bucket provisioning: create-or-reuse, public-read policy, website hosting.
//!
//! Every operation here is idempotent once [`ensure_bucket`] has succeeded:
//! the policy and website configuration are overwritten unconditionally, so
//! re-running setup against an existing bucket converges on the same state.

use tracing::{error, info};

use crate::contract::{Bucket, CreateBucketOutcome, CreateBucketRequest, StorageService, WebsiteConfig};
use crate::endpoints::{self, DEFAULT_REGION};
use crate::error::{RemoteServiceError, Result};

/// Creates `name` in `region`, or returns the existing bucket if the caller
/// already owns it.
///
/// If the service rejects the explicit location constraint, the request is
/// repeated once without one. Every other failure is returned unchanged.
pub async fn ensure_bucket<S>(storage: &S, name: &str, region: Option<&str>) -> Result<Bucket>
where
    S: StorageService + ?Sized,
{
    info!(bucket = name, region = ?region, "Ensuring bucket exists");

    let outcome = storage
        .create_bucket(CreateBucketRequest {
            name,
            location_constraint: region,
        })
        .await;

    let outcome = match outcome {
        CreateBucketOutcome::NeedsRetryWithoutRegion => {
            info!(
                bucket = name,
                region = ?region,
                "Location constraint rejected, retrying without one"
            );
            storage
                .create_bucket(CreateBucketRequest {
                    name,
                    location_constraint: None,
                })
                .await
        }
        other => other,
    };

    match outcome {
        CreateBucketOutcome::Created => {
            info!(bucket = name, "Created bucket");
            Ok(Bucket::new(name))
        }
        CreateBucketOutcome::AlreadyOwned => {
            info!(bucket = name, "Bucket already exists and is owned by caller, reusing it");
            Ok(Bucket::new(name))
        }
        CreateBucketOutcome::NeedsRetryWithoutRegion => {
            let err = RemoteServiceError::new(
                "create_bucket",
                Some("InvalidLocationConstraint"),
                "location constraint rejected even without a constraint",
            );
            error!(bucket = name, code = ?err.code, "Bucket creation failed after retry");
            Err(err.into())
        }
        CreateBucketOutcome::Fatal(err) => {
            error!(bucket = name, code = ?err.code, error = %err, "Bucket creation failed");
            Err(err.into())
        }
    }
}

/// Policy document granting anonymous `s3:GetObject` on every object in `bucket`.
pub fn public_read_policy(bucket: &str) -> String {
    serde_json::json!({
        "Version": "2012-10-17",
        "Statement": [{
            "Sid": "AddPerm",
            "Effect": "Allow",
            "Principal": "*",
            "Action": ["s3:GetObject"],
            "Resource": [format!("arn:aws:s3:::{bucket}/*")],
        }]
    })
    .to_string()
}

/// Overwrites the bucket policy with [`public_read_policy`].
pub async fn apply_public_read_policy<S>(storage: &S, bucket: &Bucket) -> Result<()>
where
    S: StorageService + ?Sized,
{
    let policy = public_read_policy(&bucket.name);
    storage
        .put_bucket_policy(&bucket.name, &policy)
        .await
        .map_err(|e| {
            error!(bucket = %bucket.name, code = ?e.code, error = %e, "Failed to apply public-read policy");
            e
        })?;
    info!(bucket = %bucket.name, "Applied public-read policy");
    Ok(())
}

/// Overwrites the bucket's website configuration.
pub async fn enable_website_hosting<S>(
    storage: &S,
    bucket: &Bucket,
    website: &WebsiteConfig,
) -> Result<()>
where
    S: StorageService + ?Sized,
{
    storage
        .put_bucket_website(&bucket.name, website)
        .await
        .map_err(|e| {
            error!(bucket = %bucket.name, code = ?e.code, error = %e, "Failed to configure website hosting");
            e
        })?;
    info!(
        bucket = %bucket.name,
        index = %website.index_document,
        error_document = %website.error_document,
        "Enabled website hosting"
    );
    Ok(())
}

/// Full setup: ensure the bucket, make it public, enable website hosting.
pub async fn setup_bucket<S>(
    storage: &S,
    name: &str,
    region: Option<&str>,
    website: &WebsiteConfig,
) -> Result<Bucket>
where
    S: StorageService + ?Sized,
{
    let bucket = ensure_bucket(storage, name, region).await?;
    apply_public_read_policy(storage, &bucket).await?;
    enable_website_hosting(storage, &bucket, website).await?;
    Ok(bucket)
}

/// Maps a raw location constraint to a region id.
///
/// The default region is reported as an empty location, and the legacy `EU`
/// constraint means `eu-west-1`.
pub fn normalise_location(location: Option<&str>) -> String {
    match location.map(str::trim) {
        None | Some("") => DEFAULT_REGION.to_string(),
        Some("EU") => "eu-west-1".to_string(),
        Some(region) => region.to_string(),
    }
}

/// Region the bucket lives in.
pub async fn resolve_region<S>(storage: &S, bucket: &Bucket) -> Result<String>
where
    S: StorageService + ?Sized,
{
    let location = storage
        .get_bucket_location(&bucket.name)
        .await
        .map_err(|e| {
            error!(bucket = %bucket.name, code = ?e.code, error = %e, "Failed to get bucket location");
            e
        })?;
    let region = normalise_location(location.as_deref());
    info!(bucket = %bucket.name, region = %region, "Resolved bucket region");
    Ok(region)
}

/// Public website URL for `bucket`.
pub async fn website_url<S>(storage: &S, bucket: &Bucket) -> Result<String>
where
    S: StorageService + ?Sized,
{
    let region = resolve_region(storage, bucket).await?;
    Ok(format!(
        "http://{}.{}",
        bucket.name,
        endpoints::website_host(&region)
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::MockStorageService;
    use crate::error::SiteError;
    use mockall::predicate::eq;

    #[test]
    fn policy_grants_get_object_on_all_keys() {
        let policy: serde_json::Value = serde_json::from_str(&public_read_policy("mysite")).unwrap();
        let statement = &policy["Statement"][0];
        assert_eq!(policy["Version"], "2012-10-17");
        assert_eq!(statement["Effect"], "Allow");
        assert_eq!(statement["Principal"], "*");
        assert_eq!(statement["Action"][0], "s3:GetObject");
        assert_eq!(statement["Resource"][0], "arn:aws:s3:::mysite/*");
    }

    #[test]
    fn empty_location_is_default_region() {
        assert_eq!(normalise_location(None), "us-east-1");
        assert_eq!(normalise_location(Some("")), "us-east-1");
        assert_eq!(normalise_location(Some("EU")), "eu-west-1");
        assert_eq!(normalise_location(Some("ap-south-1")), "ap-south-1");
    }

    #[tokio::test]
    async fn invalid_location_constraint_is_retried_without_region() {
        let mut storage = MockStorageService::new();
        let mut seq = mockall::Sequence::new();
        storage
            .expect_create_bucket()
            .withf(|req| req.name == "mysite" && req.location_constraint == Some("us-east-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| CreateBucketOutcome::NeedsRetryWithoutRegion);
        storage
            .expect_create_bucket()
            .withf(|req| req.name == "mysite" && req.location_constraint.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| CreateBucketOutcome::Created);

        let bucket = ensure_bucket(&storage, "mysite", Some("us-east-1")).await.unwrap();
        assert_eq!(bucket, Bucket::new("mysite"));
    }

    #[tokio::test]
    async fn retry_that_finds_owned_bucket_succeeds() {
        let mut storage = MockStorageService::new();
        let mut seq = mockall::Sequence::new();
        storage
            .expect_create_bucket()
            .withf(|req| req.location_constraint == Some("us-east-1"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| CreateBucketOutcome::NeedsRetryWithoutRegion);
        storage
            .expect_create_bucket()
            .withf(|req| req.location_constraint.is_none())
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| CreateBucketOutcome::AlreadyOwned);

        let bucket = ensure_bucket(&storage, "mysite", Some("us-east-1")).await.unwrap();
        assert_eq!(bucket, Bucket::new("mysite"));
    }

    #[tokio::test]
    async fn second_location_rejection_is_fatal() {
        let mut storage = MockStorageService::new();
        storage
            .expect_create_bucket()
            .times(2)
            .returning(|_| CreateBucketOutcome::NeedsRetryWithoutRegion);

        let err = ensure_bucket(&storage, "mysite", Some("us-east-1")).await.unwrap_err();
        match err {
            SiteError::Remote(remote) => {
                assert_eq!(remote.operation, "create_bucket");
                assert_eq!(remote.code.as_deref(), Some("InvalidLocationConstraint"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn fatal_create_error_is_propagated_with_code() {
        let mut storage = MockStorageService::new();
        storage.expect_create_bucket().times(1).returning(|_| {
            CreateBucketOutcome::Fatal(RemoteServiceError::new(
                "create_bucket",
                Some("BucketAlreadyExists"),
                "owned by someone else",
            ))
        });

        let err = ensure_bucket(&storage, "taken", Some("eu-west-1")).await.unwrap_err();
        match err {
            SiteError::Remote(remote) => {
                assert_eq!(remote.code.as_deref(), Some("BucketAlreadyExists"))
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn setup_runs_policy_then_website() {
        let mut storage = MockStorageService::new();
        let mut seq = mockall::Sequence::new();
        storage
            .expect_create_bucket()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| CreateBucketOutcome::Created);
        storage
            .expect_put_bucket_policy()
            .withf(|bucket, policy| bucket == "mysite" && policy.contains("arn:aws:s3:::mysite/*"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));
        storage
            .expect_put_bucket_website()
            .with(eq("mysite"), eq(WebsiteConfig::default()))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(()));

        setup_bucket(&storage, "mysite", None, &WebsiteConfig::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn policy_failure_stops_setup() {
        let mut storage = MockStorageService::new();
        storage
            .expect_create_bucket()
            .returning(|_| CreateBucketOutcome::AlreadyOwned);
        storage.expect_put_bucket_policy().times(1).returning(|_, _| {
            Err(RemoteServiceError::new("put_bucket_policy", Some("AccessDenied"), "denied"))
        });
        storage.expect_put_bucket_website().never();

        let err = setup_bucket(&storage, "mysite", None, &WebsiteConfig::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("AccessDenied"));
    }
}

use mockall::predicate::eq;
use site_bucket::cli::{execute, Commands};
use site_bucket::load_config::CliConfig;
use site_bucket_core::contract::{
    CreateBucketOutcome, CreateBucketRequest, MockStorageService, PutObjectRequest,
};
use site_bucket_core::RemoteServiceError;
use std::fs;
use std::sync::{Arc, Mutex};
use tempfile::tempdir;

async fn run_command(
    command: Commands,
    storage: &MockStorageService,
    region: Option<&str>,
) -> (anyhow::Result<()>, String) {
    let mut out = Vec::new();
    let result = execute(&command, storage, region, &CliConfig::default(), &mut out).await;
    (result, String::from_utf8(out).expect("utf-8 output"))
}

#[tokio::test]
async fn list_buckets_prints_one_name_per_line() {
    let mut storage = MockStorageService::new();
    storage
        .expect_list_buckets()
        .returning(|| Ok(vec!["alpha".to_string(), "beta".to_string()]));

    let (result, out) = run_command(Commands::ListBuckets, &storage, None).await;
    result.unwrap();
    assert_eq!(out, "alpha\nbeta\n");
}

#[tokio::test]
async fn list_bucket_objects_prints_keys() {
    let mut storage = MockStorageService::new();
    storage
        .expect_list_objects()
        .with(eq("mysite"))
        .returning(|_| Ok(vec!["index.html".to_string(), "css/site.css".to_string()]));

    let (result, out) = run_command(
        Commands::ListBucketObjects {
            bucket: "mysite".into(),
        },
        &storage,
        None,
    )
    .await;
    result.unwrap();
    assert_eq!(out, "index.html\ncss/site.css\n");
}

#[tokio::test]
async fn setup_bucket_uses_session_region() {
    let mut storage = MockStorageService::new();
    storage
        .expect_create_bucket()
        .withf(|req| req.name == "mysite" && req.location_constraint == Some("eu-west-1"))
        .times(1)
        .returning(|_| CreateBucketOutcome::Created);
    storage
        .expect_put_bucket_policy()
        .times(1)
        .returning(|_, _| Ok(()));
    storage
        .expect_put_bucket_website()
        .times(1)
        .returning(|_, _| Ok(()));

    let (result, out) = run_command(
        Commands::SetupBucket {
            bucket: "mysite".into(),
        },
        &storage,
        Some("eu-west-1"),
    )
    .await;
    result.unwrap();
    assert!(out.contains("mysite"));
}

#[tokio::test]
async fn setup_bucket_surfaces_fatal_error() {
    let mut storage = MockStorageService::new();
    storage.expect_create_bucket().returning(|_: CreateBucketRequest<'_>| {
        CreateBucketOutcome::Fatal(RemoteServiceError::new(
            "create_bucket",
            Some("BucketAlreadyExists"),
            "bucket name taken",
        ))
    });
    storage.expect_put_bucket_policy().never();

    let (result, _) = run_command(
        Commands::SetupBucket {
            bucket: "taken".into(),
        },
        &storage,
        None,
    )
    .await;
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("BucketAlreadyExists"));
}

#[tokio::test]
async fn sync_prints_progress_then_website_url() {
    let site = tempdir().unwrap();
    fs::create_dir(site.path().join("css")).unwrap();
    fs::write(site.path().join("index.html"), "<h1>hi</h1>").unwrap();
    fs::write(site.path().join("css/site.css"), "body{}").unwrap();

    let keys = Arc::new(Mutex::new(Vec::new()));
    let recorded = keys.clone();
    let mut storage = MockStorageService::new();
    storage
        .expect_put_object()
        .times(2)
        .returning(move |req: PutObjectRequest<'_>| {
            recorded
                .lock()
                .unwrap()
                .push((req.key.to_string(), req.content_type.to_string()));
            Ok(())
        });
    storage
        .expect_get_bucket_location()
        .with(eq("mysite"))
        .returning(|_| Ok(None));

    let (result, out) = run_command(
        Commands::Sync {
            pathname: site.path().to_path_buf(),
            bucket: "mysite".into(),
        },
        &storage,
        None,
    )
    .await;
    result.unwrap();

    let mut keys = keys.lock().unwrap().clone();
    keys.sort();
    assert_eq!(
        keys,
        vec![
            ("css/site.css".to_string(), "text/css".to_string()),
            ("index.html".to_string(), "text/html".to_string()),
        ]
    );
    assert!(out.contains(" Key: index.html"));
    assert!(out.contains(" Key: css/site.css"));
    assert!(out.ends_with("http://mysite.s3-website-us-east-1.amazonaws.com\n"));
}

#[tokio::test]
async fn sync_missing_path_touches_no_storage() {
    let dir = tempdir().unwrap();
    let storage = MockStorageService::new();

    let (result, out) = run_command(
        Commands::Sync {
            pathname: dir.path().join("build"),
            bucket: "mysite".into(),
        },
        &storage,
        None,
    )
    .await;
    let err = result.unwrap_err();
    assert!(format!("{err:#}").contains("path does not exist"));
    assert!(out.is_empty());
}

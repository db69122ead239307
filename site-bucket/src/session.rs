//! Process-wide session context.
//!
//! A [`Session`] is built once at start-up from the command line and config
//! file, then passed by reference to every command. It owns the S3 client and
//! remembers the region that new buckets should be created in.

use aws_config::BehaviorVersion;
use aws_sdk_s3::config::Region;

use crate::load_config::CliConfig;
use crate::storage::S3Storage;

/// Inputs for building a [`Session`]. Unset fields fall back to the AWS SDK's
/// default provider chain.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SessionOptions {
    pub profile: Option<String>,
    pub region: Option<String>,
    pub endpoint_url: Option<String>,
    pub force_path_style: bool,
}

/// Environment variables the SDK reads for each setting. A config-file value
/// is only used when none of them is set.
const PROFILE_ENV: &[&str] = &["AWS_PROFILE"];
const REGION_ENV: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION"];
const ENDPOINT_ENV: &[&str] = &["AWS_ENDPOINT_URL_S3", "AWS_ENDPOINT_URL"];

fn env_is_set(names: &[&str]) -> bool {
    names
        .iter()
        .any(|name| std::env::var_os(name).is_some_and(|v| !v.is_empty()))
}

fn from_file(value: &Option<String>, env: &[&str]) -> Option<String> {
    if env_is_set(env) {
        None
    } else {
        value.clone()
    }
}

impl SessionOptions {
    /// Merges the `--profile` flag, the environment and the config file, in
    /// that order of precedence. Settings left unset here are picked up from
    /// the environment by the SDK.
    pub fn resolve(profile_flag: Option<String>, config: &CliConfig) -> Self {
        Self {
            profile: profile_flag.or_else(|| from_file(&config.profile, PROFILE_ENV)),
            region: from_file(&config.region, REGION_ENV),
            endpoint_url: from_file(&config.endpoint_url, ENDPOINT_ENV),
            force_path_style: config.force_path_style,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Session {
    storage: S3Storage,
    region: Option<String>,
}

impl Session {
    /// Resolves credentials and region, and builds the S3 client. Makes no
    /// remote calls.
    pub async fn connect(options: &SessionOptions) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(profile) = &options.profile {
            loader = loader.profile_name(profile);
        }
        if let Some(region) = &options.region {
            loader = loader.region(Region::new(region.clone()));
        }
        if let Some(endpoint_url) = &options.endpoint_url {
            loader = loader.endpoint_url(endpoint_url);
        }
        let sdk_config = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
            .force_path_style(options.force_path_style)
            .build();
        let region = sdk_config.region().map(|r| r.to_string());

        tracing::info!(
            profile = ?options.profile,
            region = ?region,
            endpoint_url = ?options.endpoint_url,
            "Initialized storage session"
        );

        Self {
            storage: S3Storage::new(aws_sdk_s3::Client::from_conf(s3_config)),
            region,
        }
    }

    pub fn storage(&self) -> &S3Storage {
        &self.storage
    }

    /// Region new buckets are created in, if one is configured.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }
}

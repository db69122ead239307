/// `load_config` module: Loads the optional static YAML config file for the CLI.
///
/// The file only carries non-secret defaults: credentials are always resolved
/// by the AWS SDK (environment, shared profile files, instance metadata).
///
/// # Accepted Schema
/// ```yaml
/// profile: deploy            # named AWS profile
/// region: eu-west-1          # region for new buckets and the S3 client
/// endpoint_url: http://localhost:4566   # S3-compatible endpoint
/// force_path_style: true
/// website:
///   index_document: index.html
///   error_document: error.html
/// ```
/// Every key is optional. An empty file is the same as no file.
///
/// # Errors
/// All errors in this module use `anyhow::Error` for context-rich diagnostics, and are surfaced at the CLI boundary.
use anyhow::Result;
use serde::Deserialize;
use site_bucket_core::contract::WebsiteConfig;
use std::fs;
use std::path::Path;
use tracing::{error, info};

#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
pub struct CliConfig {
    #[serde(default)]
    pub profile: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub endpoint_url: Option<String>,
    #[serde(default)]
    pub force_path_style: bool,
    #[serde(default)]
    pub website: WebsiteConfig,
}

/// Loads a static YAML config file. Returns the parsed config for use by the CLI.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<CliConfig> {
    let path_ref = path.as_ref();
    info!(config_path = ?path_ref, "Loading configuration from file");

    let config_content = match fs::read_to_string(path_ref) {
        Ok(content) => {
            info!(config_path = ?path_ref, "Config file read successfully");
            content
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to read config file");
            return Err(anyhow::anyhow!(
                "Failed to read config file {:?}: {}",
                path_ref,
                e
            ));
        }
    };

    if config_content.trim().is_empty() {
        info!(config_path = ?path_ref, "Config file is empty, using defaults");
        return Ok(CliConfig::default());
    }

    match serde_yaml::from_str::<CliConfig>(&config_content) {
        Ok(conf) => {
            info!(
                config_path = ?path_ref,
                profile = ?conf.profile,
                region = ?conf.region,
                endpoint_url = ?conf.endpoint_url,
                "Parsed config YAML successfully"
            );
            Ok(conf)
        }
        Err(e) => {
            error!(error = ?e, config_path = ?path_ref, "Failed to parse config YAML");
            Err(anyhow::anyhow!("Failed to parse config YAML: {e}"))
        }
    }
}

/// Loads `path` when given, otherwise returns the defaults.
pub fn load_optional_config<P: AsRef<Path>>(path: Option<P>) -> Result<CliConfig> {
    match path {
        Some(p) => load_config(p),
        None => Ok(CliConfig::default()),
    }
}

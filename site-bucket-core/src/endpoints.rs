//! Static website endpoint hosts per region.
//!
//! Older regions serve websites from a dashed host (`s3-website-<region>`),
//! newer ones from a dotted host (`s3-website.<region>`). Regions missing from
//! the table are assumed to use the dotted form.

use tracing::{debug, warn};

/// Region used by the provider when a bucket reports no location constraint.
pub const DEFAULT_REGION: &str = "us-east-1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WebsiteEndpoint {
    pub region: &'static str,
    /// Human-readable region name.
    pub name: &'static str,
    pub host: &'static str,
}

const fn endpoint(region: &'static str, name: &'static str, host: &'static str) -> WebsiteEndpoint {
    WebsiteEndpoint { region, name, host }
}

static ENDPOINTS: &[WebsiteEndpoint] = &[
    endpoint("us-east-1", "US East (N. Virginia)", "s3-website-us-east-1.amazonaws.com"),
    endpoint("us-east-2", "US East (Ohio)", "s3-website.us-east-2.amazonaws.com"),
    endpoint("us-west-1", "US West (N. California)", "s3-website-us-west-1.amazonaws.com"),
    endpoint("us-west-2", "US West (Oregon)", "s3-website-us-west-2.amazonaws.com"),
    endpoint("af-south-1", "Africa (Cape Town)", "s3-website.af-south-1.amazonaws.com"),
    endpoint("ap-east-1", "Asia Pacific (Hong Kong)", "s3-website.ap-east-1.amazonaws.com"),
    endpoint("ap-south-1", "Asia Pacific (Mumbai)", "s3-website.ap-south-1.amazonaws.com"),
    endpoint("ap-south-2", "Asia Pacific (Hyderabad)", "s3-website.ap-south-2.amazonaws.com"),
    endpoint("ap-northeast-1", "Asia Pacific (Tokyo)", "s3-website-ap-northeast-1.amazonaws.com"),
    endpoint("ap-northeast-2", "Asia Pacific (Seoul)", "s3-website.ap-northeast-2.amazonaws.com"),
    endpoint("ap-northeast-3", "Asia Pacific (Osaka)", "s3-website.ap-northeast-3.amazonaws.com"),
    endpoint("ap-southeast-1", "Asia Pacific (Singapore)", "s3-website-ap-southeast-1.amazonaws.com"),
    endpoint("ap-southeast-2", "Asia Pacific (Sydney)", "s3-website-ap-southeast-2.amazonaws.com"),
    endpoint("ap-southeast-3", "Asia Pacific (Jakarta)", "s3-website.ap-southeast-3.amazonaws.com"),
    endpoint("ca-central-1", "Canada (Central)", "s3-website.ca-central-1.amazonaws.com"),
    endpoint("cn-north-1", "China (Beijing)", "s3-website.cn-north-1.amazonaws.com.cn"),
    endpoint("cn-northwest-1", "China (Ningxia)", "s3-website.cn-northwest-1.amazonaws.com.cn"),
    endpoint("eu-central-1", "Europe (Frankfurt)", "s3-website.eu-central-1.amazonaws.com"),
    endpoint("eu-central-2", "Europe (Zurich)", "s3-website.eu-central-2.amazonaws.com"),
    endpoint("eu-north-1", "Europe (Stockholm)", "s3-website.eu-north-1.amazonaws.com"),
    endpoint("eu-south-1", "Europe (Milan)", "s3-website.eu-south-1.amazonaws.com"),
    endpoint("eu-west-1", "Europe (Ireland)", "s3-website-eu-west-1.amazonaws.com"),
    endpoint("eu-west-2", "Europe (London)", "s3-website.eu-west-2.amazonaws.com"),
    endpoint("eu-west-3", "Europe (Paris)", "s3-website.eu-west-3.amazonaws.com"),
    endpoint("me-south-1", "Middle East (Bahrain)", "s3-website.me-south-1.amazonaws.com"),
    endpoint("sa-east-1", "South America (Sao Paulo)", "s3-website-sa-east-1.amazonaws.com"),
    endpoint("us-gov-east-1", "AWS GovCloud (US-East)", "s3-website.us-gov-east-1.amazonaws.com"),
    endpoint("us-gov-west-1", "AWS GovCloud (US-West)", "s3-website-us-gov-west-1.amazonaws.com"),
];

/// Looks up the known endpoint for `region`.
pub fn known_endpoint(region: &str) -> Option<&'static WebsiteEndpoint> {
    ENDPOINTS.iter().find(|e| e.region == region)
}

/// Website endpoint host for `region`.
pub fn website_host(region: &str) -> String {
    match known_endpoint(region) {
        Some(endpoint) => {
            debug!(region, name = endpoint.name, host = endpoint.host, "Resolved website endpoint");
            endpoint.host.to_string()
        }
        None => {
            warn!(region, "Region not in website endpoint table, assuming dotted host form");
            format!("s3-website.{region}.amazonaws.com")
        }
    }
}

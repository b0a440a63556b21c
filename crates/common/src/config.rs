use std::fmt;

use crate::error::RelayError;

const DEFAULT_AWS_REGION: &str = "eu-west-1";
const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Relay configuration loaded once per process from environment variables.
#[derive(Clone)]
pub struct RelayConfig {
    /// Token sent as bearer credential to the GitHub API
    pub github_token: String,

    /// Owner of the repository whose workflow is triggered
    pub repo_owner: String,

    /// Name of the repository whose workflow is triggered
    pub repo_name: String,

    /// Region of the bucket that emits notifications (default: eu-west-1)
    pub aws_region: String,

    /// Base URL of the GitHub REST API, without trailing slash
    pub github_api_url: String,

    /// Custom S3 endpoint (S3-compatible stores, local testing)
    pub s3_endpoint_url: Option<String>,
}

impl RelayConfig {
    /// Load configuration from environment variables, honouring a `.env` file.
    pub fn from_env() -> Result<Self, RelayError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, RelayError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let required = |name: &str| {
            var(name).ok_or_else(|| {
                RelayError::Config(format!("{name} environment variable is required"))
            })
        };

        Ok(Self {
            github_token: required("GITHUB_TOKEN")?,
            repo_owner: required("REPO_OWNER")?,
            repo_name: required("REPO_NAME")?,
            aws_region: var("AWS_REGION").unwrap_or_else(|| DEFAULT_AWS_REGION.to_string()),
            github_api_url: var("GITHUB_API_URL")
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            s3_endpoint_url: var("S3_ENDPOINT_URL"),
        })
    }

    /// Full URL of the `repository_dispatch` endpoint.
    pub fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/dispatches",
            self.github_api_url, self.repo_owner, self.repo_name
        )
    }
}

impl fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelayConfig")
            .field("github_token", &"<redacted>")
            .field("repo_owner", &self.repo_owner)
            .field("repo_name", &self.repo_name)
            .field("aws_region", &self.aws_region)
            .field("github_api_url", &self.github_api_url)
            .field("s3_endpoint_url", &self.s3_endpoint_url)
            .finish()
    }
}

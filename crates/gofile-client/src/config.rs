//! Client configuration

use std::time::Duration;

/// Default API endpoint
pub const DEFAULT_API_ENDPOINT: &str = "https://api.gofile.io";

/// Default service host, upload servers live under `<server>.<host>`
pub const DEFAULT_HOST: &str = "gofile.io";

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// API endpoint URL
    pub api_endpoint: String,
    /// Service host used to build upload server URLs
    pub host: String,
    /// Fixed upload URL, overrides `https://<server>.<host>/uploadFile`
    pub upload_endpoint: Option<String>,
    /// Account access token
    pub token: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: DEFAULT_API_ENDPOINT.to_string(),
            host: DEFAULT_HOST.to_string(),
            upload_endpoint: None,
            token: String::new(),
            timeout: Duration::from_secs(30),
            user_agent: format!("gofile-client/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Config {
    /// Create a new config with the given API endpoint
    pub fn new(api_endpoint: impl Into<String>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            ..Default::default()
        }
    }

    /// Set the access token
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send uploads to a fixed URL instead of the discovered server
    pub fn with_upload_endpoint(mut self, url: impl Into<String>) -> Self {
        self.upload_endpoint = Some(url.into());
        self
    }

    /// Set the user agent
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// URL of an API operation
    pub fn api_url(&self, path: &str) -> String {
        format!("{}/{}", self.api_endpoint.trim_end_matches('/'), path)
    }

    /// Upload URL for the given server name
    pub fn upload_url(&self, server: &str) -> String {
        match &self.upload_endpoint {
            Some(url) => url.clone(),
            None => format!("https://{}.{}/uploadFile", server, self.host),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::retriever::DEFAULT_ALLOW_UNKNOWN_RESOURCE_TYPES;
use crate::transport::HttpConfig;

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub http: ClientConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

/// HTTP client settings (`[http]`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout_secs(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
        }
    }
}

impl ClientConfig {
    pub fn to_http_config(&self) -> HttpConfig {
        HttpConfig {
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            user_agent: self.user_agent.clone(),
            max_redirects: self.max_redirects,
        }
    }
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_user_agent() -> String {
    HttpConfig::default().user_agent
}

fn default_max_redirects() -> usize {
    5
}

/// Content type acceptance (`[content]`)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    /// `type/subtype` strings; empty means none are pre-approved
    #[serde(default)]
    pub allowed_content_types: Vec<String>,
    #[serde(default = "default_allow_unknown_resource_types")]
    pub allow_unknown_resource_types: bool,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            allowed_content_types: Vec::new(),
            allow_unknown_resource_types: default_allow_unknown_resource_types(),
        }
    }
}

fn default_allow_unknown_resource_types() -> bool {
    DEFAULT_ALLOW_UNKNOWN_RESOURCE_TYPES
}

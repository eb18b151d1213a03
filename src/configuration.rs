//! Environment-sourced operator configuration.
use crate::{Error, Result};
use config::{Config, Environment};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashMap;

/// Settings read from the process environment (`AUTH_URL`, `CLUSTER_URL`, `TC_CLIENT_ID`,
/// `TC_CLIENT_SECRET`, `CLUSTER_NAME`, `WATCH_NAMESPACE`).
#[derive(Deserialize, Clone, Debug, Default, PartialEq)]
pub struct Configuration {
    /// Base URL of the auth service issuing service account tokens
    #[serde(default)]
    pub auth_url: String,
    /// Base URL of the cluster management service
    #[serde(default)]
    pub cluster_url: String,
    #[serde(default)]
    pub tc_client_id: String,
    #[serde(default)]
    pub tc_client_secret: String,
    /// Used when the platform does not publish an infrastructure descriptor
    #[serde(default)]
    pub cluster_name: String,
    /// Namespace the operator is deployed to watch
    #[serde(default)]
    pub watch_namespace: Option<String>,
}

impl Configuration {
    pub fn from_env() -> Result<Self> {
        Self::load(Environment::default())
    }

    /// Same as `from_env`, with the variables taken from `vars` instead of the process.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self> {
        Self::load(Environment::default().source(Some(vars)))
    }

    fn load(source: Environment) -> Result<Self> {
        let config: Configuration = Config::builder()
            .add_source(source)
            .build()
            .and_then(Config::try_deserialize::<Configuration>)
            .map_err(|e| Error::Configuration(format!("failed to load configuration: {e}")))?;

        validate_url(&config.auth_url, "auth service")?;
        validate_url(&config.cluster_url, "cluster service")?;
        Ok(config)
    }

    /// Watch namespace, if one is configured and non-empty.
    pub fn watch_namespace(&self) -> Option<&str> {
        self.watch_namespace.as_deref().filter(|ns| !ns.is_empty())
    }
}

/// Checks that `url` has both a scheme and a host.
pub fn validate_url(url: &str, service: &str) -> Result<()> {
    if url.is_empty() {
        return Err(Error::Configuration(format!("'{service}' url is empty")));
    }
    match Url::parse(url) {
        Ok(parsed) if parsed.host_str().is_some_and(|h| !h.is_empty()) => Ok(()),
        _ => Err(Error::Configuration(format!(
            "invalid url '{url}' (missing scheme or host?) for: {service}"
        ))),
    }
}

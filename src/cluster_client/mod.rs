//! Client for the auth service token exchange and the cluster management service.
use crate::{
    Error, Result,
    cluster::{ClusterData, CreateClustersPayload},
    configuration::Configuration,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    grant_type: &'static str,
}

/// Response of `POST /api/token`
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: String,
}

/// Registers clusters with the cluster management service.
///
/// Every call exchanges the configured client credentials for a fresh
/// bearer token first. Nothing is retried here.
#[derive(Clone)]
pub struct ClusterService {
    http: Client,
    auth_url: String,
    cluster_url: String,
    client_id: String,
    client_secret: String,
}

impl std::fmt::Debug for ClusterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClusterService")
            .field("auth_url", &self.auth_url)
            .field("cluster_url", &self.cluster_url)
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl ClusterService {
    pub fn new(config: &Configuration) -> Result<Self> {
        let http = Client::builder().build()?;
        Ok(Self {
            http,
            auth_url: config.auth_url.trim_end_matches('/').to_string(),
            cluster_url: config.cluster_url.trim_end_matches('/').to_string(),
            client_id: config.tc_client_id.clone(),
            client_secret: config.tc_client_secret.clone(),
        })
    }

    /// Client credentials exchange against the auth service.
    pub async fn service_account_token(&self) -> Result<String> {
        let url = format!("{}/api/token", self.auth_url);
        debug!(%url, "requesting service account token");

        let response = self
            .http
            .post(&url)
            .form(&TokenRequest {
                client_id: &self.client_id,
                client_secret: &self.client_secret,
                grant_type: "client_credentials",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::TokenExchange {
                status: status.to_string(),
                body,
            });
        }
        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    /// Submits `data` to `POST /api/clusters`; only `201 Created` counts as success.
    pub async fn create_cluster(&self, data: &ClusterData) -> Result<()> {
        let token = self.service_account_token().await?;
        let url = format!("{}/api/clusters", self.cluster_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .json(&CreateClustersPayload { data })
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Registration {
                status: status.to_string(),
                body,
            });
        }
        info!(cluster = %data.name, "cluster registered with cluster management service");
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

/// Cluster description submitted to the cluster management service.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ClusterData {
    pub name: String,
    pub api_url: String,
    pub app_dns: String,
    pub auth_client_id: String,
    pub auth_client_secret: String,
    pub auth_client_default_scope: String,
    pub service_account_username: String,
    pub service_account_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_provider_id: Option<String>,
    #[serde(rename = "type")]
    pub cluster_type: String,
}

/// Request envelope for `POST /api/clusters`.
#[derive(Serialize, Debug)]
pub struct CreateClustersPayload<'a> {
    pub data: &'a ClusterData,
}

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Presence of a ToolChainEnabler in a namespace provisions toolchain access there
/// and registers the cluster. The spec fields are informational; the operator
/// takes its endpoints from its own configuration.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq, JsonSchema)]
#[kube(kind = "ToolChainEnabler", group = "codeready.io", version = "v1alpha1", namespaced)]
#[kube(status = "ToolChainEnablerStatus", shortname = "tce", derive = "PartialEq")]
#[serde(rename_all = "camelCase")]
pub struct ToolChainEnablerSpec {
    #[serde(default, rename = "authURL", skip_serializing_if = "Option::is_none")]
    pub auth_url: Option<String>,
    #[serde(default, rename = "clusterURL", skip_serializing_if = "Option::is_none")]
    pub cluster_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_chain_secret_name: Option<String>,
}

#[derive(Deserialize, Serialize, Clone, Default, Debug, PartialEq, JsonSchema)]
pub struct ToolChainEnablerStatus {}

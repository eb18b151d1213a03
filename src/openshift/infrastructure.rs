use kube::CustomResource;
use serde::{Deserialize, Serialize};

/// `config.openshift.io/v1` Infrastructure, a cluster singleton named `cluster`.
///
/// Older platform versions do not serve this kind at all.
#[derive(CustomResource, Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
#[kube(
    kind = "Infrastructure",
    group = "config.openshift.io",
    version = "v1",
    status = "InfrastructureStatus",
    schema = "disabled",
    derive = "PartialEq"
)]
pub struct InfrastructureSpec {}

#[derive(Deserialize, Serialize, Clone, Debug, Default, PartialEq)]
pub struct InfrastructureStatus {
    #[serde(default, rename = "apiServerURL", skip_serializing_if = "Option::is_none")]
    pub api_server_url: Option<String>,
}

//! Access for the platform's online registration component, provisioned once at startup.
use crate::{
    Result,
    enabler::{cluster_role_binding, ensure_cluster_role_binding, ensure_service_account, service_account},
    objects::ObjectClient,
};
use tracing::info;

pub const NAMESPACE: &str = "openshift-infra";
pub const SERVICE_ACCOUNT_NAME: &str = "online-registration";
pub const CLUSTER_ROLE_BINDING_NAME: &str = "online-registration";
pub const CLUSTER_ROLE_NAME: &str = "online-registration";

/// Ensures the `online-registration` service account and its cluster role binding.
///
/// Neither object has an owner; they outlive any ToolChainEnabler.
pub async fn ensure(client: &dyn ObjectClient) -> Result<()> {
    ensure_service_account(client, &service_account(NAMESPACE, SERVICE_ACCOUNT_NAME, None)).await?;
    let crb = cluster_role_binding(
        CLUSTER_ROLE_BINDING_NAME,
        CLUSTER_ROLE_NAME,
        NAMESPACE,
        SERVICE_ACCOUNT_NAME,
        None,
    );
    ensure_cluster_role_binding(client, &crb).await?;
    info!(namespace = NAMESPACE, "online-registration access in place");
    Ok(())
}

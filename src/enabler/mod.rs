mod crd;
mod reconcile;
mod resources;

pub use crd::{ToolChainEnabler, ToolChainEnablerSpec, ToolChainEnablerStatus};
pub use reconcile::{REGISTRATION_RETRY, Request, owner_request, reconcile_request, resolve_namespace, run};
pub use resources::{
    Grant, OAUTH_CLIENT_NAME, OAUTH_SECRET_BITS, REDIRECT_URI, SA_NAME, cluster_role_binding,
    ensure_cluster_role_binding, ensure_oauth_client, ensure_service_account, oauth_client, service_account,
};

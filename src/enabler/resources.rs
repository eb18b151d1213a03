//! Desired access objects and their ensure-or-create steps.
use crate::{
    Result,
    objects::{Lookup, ObjectClient},
    openshift::{GRANT_METHOD_AUTO, OAuthClient},
    secret::create_random_string,
};
use k8s_openapi::{
    api::{
        core::v1::ServiceAccount,
        rbac::v1::{ClusterRoleBinding, RoleRef, Subject},
    },
    apimachinery::pkg::apis::meta::v1::OwnerReference,
};
use kube::api::ObjectMeta;
use tracing::info;

pub const SA_NAME: &str = "toolchain-sre";
/// Also the client id presented to the cluster management service
pub const OAUTH_CLIENT_NAME: &str = "codeready-toolchain";
pub const REDIRECT_URI: &str = "https://auth.openshift.io/";
pub const OAUTH_SECRET_BITS: usize = 256;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Cluster roles granted to the toolchain service account.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Grant {
    SelfProvisioner,
    /// Needs the `dsaas-cluster-admin` ClusterRole to be provisioned out of band.
    ClusterAdmin,
}

impl Grant {
    pub const ALL: [Grant; 2] = [Grant::SelfProvisioner, Grant::ClusterAdmin];

    pub fn binding_name(self) -> &'static str {
        match self {
            Grant::SelfProvisioner => "system:toolchain-enabler:self-provisioner",
            Grant::ClusterAdmin => "system:toolchain-enabler:dsaas-cluster-admin",
        }
    }

    pub fn role(self) -> &'static str {
        match self {
            Grant::SelfProvisioner => "self-provisioner",
            Grant::ClusterAdmin => "dsaas-cluster-admin",
        }
    }
}

fn meta(name: &str, namespace: Option<&str>, owner: Option<&OwnerReference>) -> ObjectMeta {
    ObjectMeta {
        name: Some(name.to_string()),
        namespace: namespace.map(str::to_string),
        owner_references: owner.map(|o| vec![o.clone()]),
        ..ObjectMeta::default()
    }
}

pub fn service_account(namespace: &str, name: &str, owner: Option<&OwnerReference>) -> ServiceAccount {
    ServiceAccount {
        metadata: meta(name, Some(namespace), owner),
        ..ServiceAccount::default()
    }
}

/// Binds the ClusterRole `role` to the service account `sa_namespace/sa_name`.
pub fn cluster_role_binding(
    name: &str,
    role: &str,
    sa_namespace: &str,
    sa_name: &str,
    owner: Option<&OwnerReference>,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: meta(name, None, owner),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.into(),
            kind: "ClusterRole".into(),
            name: role.into(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".into(),
            name: sa_name.into(),
            namespace: Some(sa_namespace.into()),
            ..Subject::default()
        }]),
    }
}

/// A new OAuth client with a freshly generated secret.
pub fn oauth_client(owner: Option<&OwnerReference>) -> OAuthClient {
    let mut oc = OAuthClient::new(OAUTH_CLIENT_NAME);
    oc.metadata = meta(OAUTH_CLIENT_NAME, None, owner);
    oc.secret = Some(create_random_string(OAUTH_SECRET_BITS));
    oc.redirect_uris = vec![REDIRECT_URI.into()];
    oc.grant_method = Some(GRANT_METHOD_AUTO.into());
    oc.access_token_max_age_seconds = Some(0);
    oc
}

/// Creates `desired` unless a service account of that name already exists.
pub async fn ensure_service_account(client: &dyn ObjectClient, desired: &ServiceAccount) -> Result<()> {
    let ns = desired.metadata.namespace.as_deref().unwrap_or_default();
    let name = desired.metadata.name.as_deref().unwrap_or_default();
    match client.get_service_account(ns, name).await? {
        Lookup::Found(_) => info!(namespace = ns, name, "service account already exists"),
        Lookup::Absent => {
            info!(namespace = ns, name, "creating service account");
            client.create_service_account(ns, desired).await?;
        }
    }
    Ok(())
}

/// Creates `desired` unless a binding of that name already exists; existing bindings are never updated.
pub async fn ensure_cluster_role_binding(client: &dyn ObjectClient, desired: &ClusterRoleBinding) -> Result<()> {
    let name = desired.metadata.name.as_deref().unwrap_or_default();
    match client.get_cluster_role_binding(name).await? {
        Lookup::Found(_) => info!(name, "clusterrolebinding already exists"),
        Lookup::Absent => {
            info!(name, role = %desired.role_ref.name, "creating clusterrolebinding");
            client.create_cluster_role_binding(desired).await?;
        }
    }
    Ok(())
}

/// The secret is generated only when the client does not exist yet.
pub async fn ensure_oauth_client(client: &dyn ObjectClient, owner: Option<&OwnerReference>) -> Result<()> {
    match client.get_oauth_client(OAUTH_CLIENT_NAME).await? {
        Lookup::Found(_) => info!(name = OAUTH_CLIENT_NAME, "oauthclient already exists"),
        Lookup::Absent => {
            info!(name = OAUTH_CLIENT_NAME, "creating oauthclient");
            client.create_oauth_client(&oauth_client(owner)).await?;
        }
    }
    Ok(())
}

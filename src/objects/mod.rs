//! Object store capability the controller and informer are written against.
mod kube_client;

pub use kube_client::KubeObjectClient;

use crate::{
    Result,
    enabler::ToolChainEnabler,
    openshift::{Infrastructure, OAuthClient, Route},
};
use async_trait::async_trait;
use k8s_openapi::api::{
    core::v1::{Secret, ServiceAccount},
    rbac::v1::ClusterRoleBinding,
};
#[cfg(test)]
use mockall::automock;

/// Outcome of a by-name lookup; "not found" is an answer, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Lookup<T> {
    Found(T),
    Absent,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(obj) => Some(obj),
            Lookup::Absent => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(obj: Option<T>) -> Self {
        obj.map_or(Lookup::Absent, Lookup::Found)
    }
}

/// Get/create primitives for every kind the operator touches.
///
/// Failures other than "not found" come back as `Error::ObjectStore`
/// naming the kind and object.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ObjectClient: Send + Sync {
    async fn get_enabler(&self, namespace: &str, name: &str) -> Result<Lookup<ToolChainEnabler>>;

    async fn get_service_account(&self, namespace: &str, name: &str) -> Result<Lookup<ServiceAccount>>;

    async fn create_service_account(&self, namespace: &str, sa: &ServiceAccount) -> Result<ServiceAccount>;

    async fn get_cluster_role_binding(&self, name: &str) -> Result<Lookup<ClusterRoleBinding>>;

    async fn create_cluster_role_binding(&self, crb: &ClusterRoleBinding) -> Result<ClusterRoleBinding>;

    async fn get_oauth_client(&self, name: &str) -> Result<Lookup<OAuthClient>>;

    async fn create_oauth_client(&self, oc: &OAuthClient) -> Result<OAuthClient>;

    async fn get_route(&self, namespace: &str, name: &str) -> Result<Lookup<Route>>;

    /// Returns the object as stored, including the host assigned by the router.
    async fn create_route(&self, namespace: &str, route: &Route) -> Result<Route>;

    async fn delete_route(&self, namespace: &str, name: &str) -> Result<()>;

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Lookup<Secret>>;

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret>;

    /// `Absent` also covers platforms that do not serve the Infrastructure kind.
    async fn get_infrastructure(&self, name: &str) -> Result<Lookup<Infrastructure>>;
}

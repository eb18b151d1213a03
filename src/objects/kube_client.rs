use super::{Lookup, ObjectClient};
use crate::{
    Error, Result,
    enabler::ToolChainEnabler,
    openshift::{Infrastructure, OAuthClient, Route},
};
use async_trait::async_trait;
use k8s_openapi::api::{
    core::v1::{Secret, ServiceAccount},
    rbac::v1::ClusterRoleBinding,
};
use kube::{
    Client,
    api::{Api, DeleteParams, PostParams},
};
use serde::{Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use tracing::debug;

/// `ObjectClient` backed by the Kubernetes API server.
#[derive(Clone)]
pub struct KubeObjectClient {
    client: Client,
}

impl KubeObjectClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

async fn lookup<K>(api: Api<K>, kind: &'static str, name: &str) -> Result<Lookup<K>>
where
    K: Clone + DeserializeOwned + Debug,
{
    match api.get(name).await {
        Ok(obj) => Ok(Lookup::Found(obj)),
        // also what the server answers for kinds it does not serve
        Err(kube::Error::Api(ae)) if ae.code == 404 => {
            debug!(kind, name, "not found");
            Ok(Lookup::Absent)
        }
        Err(e) => Err(Error::object_store("get", kind, name, e)),
    }
}

async fn create<K>(api: Api<K>, kind: &'static str, name: &str, obj: &K) -> Result<K>
where
    K: Clone + Serialize + DeserializeOwned + Debug,
{
    api.create(&PostParams::default(), obj)
        .await
        .map_err(|e| Error::object_store("create", kind, name, e))
}

fn name_of(meta: &k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta) -> &str {
    meta.name.as_deref().unwrap_or_default()
}

#[async_trait]
impl ObjectClient for KubeObjectClient {
    async fn get_enabler(&self, namespace: &str, name: &str) -> Result<Lookup<ToolChainEnabler>> {
        lookup(Api::namespaced(self.client.clone(), namespace), "toolchainenabler", name).await
    }

    async fn get_service_account(&self, namespace: &str, name: &str) -> Result<Lookup<ServiceAccount>> {
        lookup(Api::namespaced(self.client.clone(), namespace), "service account", name).await
    }

    async fn create_service_account(&self, namespace: &str, sa: &ServiceAccount) -> Result<ServiceAccount> {
        let api = Api::namespaced(self.client.clone(), namespace);
        create(api, "service account", name_of(&sa.metadata), sa).await
    }

    async fn get_cluster_role_binding(&self, name: &str) -> Result<Lookup<ClusterRoleBinding>> {
        lookup(Api::all(self.client.clone()), "clusterrolebinding", name).await
    }

    async fn create_cluster_role_binding(&self, crb: &ClusterRoleBinding) -> Result<ClusterRoleBinding> {
        let api = Api::all(self.client.clone());
        create(api, "clusterrolebinding", name_of(&crb.metadata), crb).await
    }

    async fn get_oauth_client(&self, name: &str) -> Result<Lookup<OAuthClient>> {
        lookup(Api::all(self.client.clone()), "oauthclient", name).await
    }

    async fn create_oauth_client(&self, oc: &OAuthClient) -> Result<OAuthClient> {
        let api = Api::all(self.client.clone());
        create(api, "oauthclient", name_of(&oc.metadata), oc).await
    }

    async fn get_route(&self, namespace: &str, name: &str) -> Result<Lookup<Route>> {
        lookup(Api::namespaced(self.client.clone(), namespace), "route", name).await
    }

    async fn create_route(&self, namespace: &str, route: &Route) -> Result<Route> {
        let api = Api::namespaced(self.client.clone(), namespace);
        create(api, "route", name_of(&route.metadata), route).await
    }

    async fn delete_route(&self, namespace: &str, name: &str) -> Result<()> {
        let api: Api<Route> = Api::namespaced(self.client.clone(), namespace);
        api.delete(name, &DeleteParams::default())
            .await
            .map(|_| ())
            .map_err(|e| Error::object_store("delete", "route", name, e))
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Lookup<Secret>> {
        lookup(Api::namespaced(self.client.clone(), namespace), "secret", name).await
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        let api = Api::namespaced(self.client.clone(), namespace);
        create(api, "secret", name_of(&secret.metadata), secret).await
    }

    async fn get_infrastructure(&self, name: &str) -> Result<Lookup<Infrastructure>> {
        lookup(Api::all(self.client.clone()), "infrastructure", name).await
    }
}

//! Helper fakes, builders and stub servers for tests
use crate::{
    Context, Error, Result, State,
    cluster::ClusterData,
    cluster_client::ClusterService,
    configuration::Configuration,
    enabler::{OAUTH_CLIENT_NAME, SA_NAME, ToolChainEnabler},
    objects::{Lookup, ObjectClient},
    openshift::{Infrastructure, OAuthClient, Route},
};
use async_trait::async_trait;
use axum::{
    Router,
    extract::State as AxumState,
    http::{HeaderMap, HeaderName, StatusCode, Uri, header},
};
use k8s_openapi::{
    ByteString,
    api::{
        core::v1::{ObjectReference, Secret, ServiceAccount},
        rbac::v1::ClusterRoleBinding,
    },
};
use kube::api::ObjectMeta;
use std::{
    collections::{BTreeMap, HashMap},
    sync::{Arc, Mutex},
};

type Key = (String, String);

fn key(namespace: &str, name: &str) -> Key {
    (namespace.to_string(), name.to_string())
}

#[derive(Default)]
struct Store {
    enablers: BTreeMap<Key, ToolChainEnabler>,
    service_accounts: BTreeMap<Key, ServiceAccount>,
    bindings: BTreeMap<String, ClusterRoleBinding>,
    oauth_clients: BTreeMap<String, OAuthClient>,
    routes: BTreeMap<Key, Route>,
    secrets: BTreeMap<Key, Secret>,
    infrastructures: BTreeMap<String, Infrastructure>,
    creations: Vec<String>,
    created_routes: Vec<Route>,
    deleted_routes: Vec<String>,
    get_failures: HashMap<&'static str, String>,
    create_failures: HashMap<&'static str, String>,
    delete_route_failure: Option<String>,
}

/// In-memory object store.
///
/// Routes get a host under the configured apps domain on creation. With the
/// token controller enabled, created service accounts are given a dockercfg
/// and a token secret the way the platform does it.
#[derive(Default)]
pub struct FakeObjectClient {
    apps_domain: Option<String>,
    token_controller: bool,
    store: Mutex<Store>,
}

impl FakeObjectClient {
    pub fn with_apps_domain(mut self, domain: &str) -> Self {
        self.apps_domain = Some(domain.to_string());
        self
    }

    pub fn with_token_controller(mut self) -> Self {
        self.token_controller = true;
        self
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap()
    }

    /// Every later `get` of `kind` fails with `message`.
    pub fn fail_get(&self, kind: &'static str, message: &str) {
        self.lock().get_failures.insert(kind, message.to_string());
    }

    pub fn fail_create(&self, kind: &'static str, message: &str) {
        self.lock().create_failures.insert(kind, message.to_string());
    }

    pub fn fail_delete_route(&self, message: &str) {
        self.lock().delete_route_failure = Some(message.to_string());
    }

    pub fn add_enabler(&self, doc: ToolChainEnabler) {
        let ns = doc.metadata.namespace.clone().unwrap_or_default();
        let name = doc.metadata.name.clone().unwrap_or_default();
        self.lock().enablers.insert(key(&ns, &name), doc);
    }

    pub fn add_service_account(&self, namespace: &str, sa: ServiceAccount) {
        let name = sa.metadata.name.clone().unwrap_or_default();
        self.lock().service_accounts.insert(key(namespace, &name), sa);
    }

    pub fn add_secret(&self, namespace: &str, secret: Secret) {
        let name = secret.metadata.name.clone().unwrap_or_default();
        self.lock().secrets.insert(key(namespace, &name), secret);
    }

    pub fn add_oauth_client(&self, oc: OAuthClient) {
        let name = oc.metadata.name.clone().unwrap_or_default();
        self.lock().oauth_clients.insert(name, oc);
    }

    pub fn add_infrastructure(&self, infra: Infrastructure) {
        let name = infra.metadata.name.clone().unwrap_or_default();
        self.lock().infrastructures.insert(name, infra);
    }

    /// `"<kind> <namespace>/<name>"` or `"<kind> <name>"` per successful create, in order.
    pub fn creations(&self) -> Vec<String> {
        self.lock().creations.clone()
    }

    pub fn created_routes(&self) -> Vec<Route> {
        self.lock().created_routes.clone()
    }

    /// `"<namespace>/<name>"` per successful delete.
    pub fn deleted_routes(&self) -> Vec<String> {
        self.lock().deleted_routes.clone()
    }

    pub fn service_accounts(&self, namespace: &str) -> Vec<ServiceAccount> {
        self.lock()
            .service_accounts
            .iter()
            .filter(|((ns, _), _)| ns == namespace)
            .map(|(_, sa)| sa.clone())
            .collect()
    }

    pub fn cluster_role_bindings(&self) -> Vec<ClusterRoleBinding> {
        self.lock().bindings.values().cloned().collect()
    }

    pub fn oauth_secret(&self) -> Option<String> {
        self.lock()
            .oauth_clients
            .get(OAUTH_CLIENT_NAME)
            .and_then(|oc| oc.secret.clone())
    }

    fn get<T: Clone>(&self, kind: &'static str, name: &str, pick: impl FnOnce(&Store) -> Option<T>) -> Result<Lookup<T>> {
        let store = self.lock();
        if let Some(message) = store.get_failures.get(kind) {
            return Err(Error::object_store("get", kind, name, message.clone()));
        }
        Ok(pick(&store).into())
    }

    /// Checks injected failures and name collisions, then records the creation.
    fn admit(&self, store: &mut Store, kind: &'static str, name: &str, id: String, exists: bool) -> Result<()> {
        if let Some(message) = store.create_failures.get(kind) {
            return Err(Error::object_store("create", kind, name, message.clone()));
        }
        if exists {
            return Err(Error::object_store("create", kind, name, "already exists"));
        }
        store.creations.push(format!("{kind} {id}"));
        Ok(())
    }

    fn attach_token_secrets(&self, store: &mut Store, namespace: &str, sa: &mut ServiceAccount) {
        let account = sa.metadata.name.clone().unwrap_or_default();
        let docker = secret(&format!("{account}-dockercfg-x7k2p"), "docker-token", "kubernetes.io/dockercfg");
        let token = secret(
            &format!("{account}-token-9qv4m"),
            "sa-token",
            "kubernetes.io/service-account-token",
        );
        let mut references = Vec::new();
        for s in [docker, token] {
            let name = s.metadata.name.clone().unwrap_or_default();
            references.push(ObjectReference {
                name: Some(name.clone()),
                ..ObjectReference::default()
            });
            store.secrets.insert(key(namespace, &name), s);
        }
        sa.secrets = Some(references);
    }
}

#[async_trait]
impl ObjectClient for FakeObjectClient {
    async fn get_enabler(&self, namespace: &str, name: &str) -> Result<Lookup<ToolChainEnabler>> {
        self.get("toolchainenabler", name, |s| s.enablers.get(&key(namespace, name)).cloned())
    }

    async fn get_service_account(&self, namespace: &str, name: &str) -> Result<Lookup<ServiceAccount>> {
        self.get("service account", name, |s| {
            s.service_accounts.get(&key(namespace, name)).cloned()
        })
    }

    async fn create_service_account(&self, namespace: &str, sa: &ServiceAccount) -> Result<ServiceAccount> {
        let name = sa.metadata.name.clone().unwrap_or_default();
        let mut store = self.lock();
        let exists = store.service_accounts.contains_key(&key(namespace, &name));
        self.admit(&mut store, "service account", &name, format!("{namespace}/{name}"), exists)?;
        let mut created = sa.clone();
        if self.token_controller {
            self.attach_token_secrets(&mut store, namespace, &mut created);
        }
        store.service_accounts.insert(key(namespace, &name), created.clone());
        Ok(created)
    }

    async fn get_cluster_role_binding(&self, name: &str) -> Result<Lookup<ClusterRoleBinding>> {
        self.get("clusterrolebinding", name, |s| s.bindings.get(name).cloned())
    }

    async fn create_cluster_role_binding(&self, crb: &ClusterRoleBinding) -> Result<ClusterRoleBinding> {
        let name = crb.metadata.name.clone().unwrap_or_default();
        let mut store = self.lock();
        let exists = store.bindings.contains_key(&name);
        self.admit(&mut store, "clusterrolebinding", &name, name.clone(), exists)?;
        store.bindings.insert(name, crb.clone());
        Ok(crb.clone())
    }

    async fn get_oauth_client(&self, name: &str) -> Result<Lookup<OAuthClient>> {
        self.get("oauthclient", name, |s| s.oauth_clients.get(name).cloned())
    }

    async fn create_oauth_client(&self, oc: &OAuthClient) -> Result<OAuthClient> {
        let name = oc.metadata.name.clone().unwrap_or_default();
        let mut store = self.lock();
        let exists = store.oauth_clients.contains_key(&name);
        self.admit(&mut store, "oauthclient", &name, name.clone(), exists)?;
        store.oauth_clients.insert(name, oc.clone());
        Ok(oc.clone())
    }

    async fn get_route(&self, namespace: &str, name: &str) -> Result<Lookup<Route>> {
        self.get("route", name, |s| s.routes.get(&key(namespace, name)).cloned())
    }

    async fn create_route(&self, namespace: &str, route: &Route) -> Result<Route> {
        let name = route.metadata.name.clone().unwrap_or_default();
        let mut store = self.lock();
        let exists = store.routes.contains_key(&key(namespace, &name));
        self.admit(&mut store, "route", &name, format!("{namespace}/{name}"), exists)?;
        let domain = self.apps_domain.as_deref().unwrap_or("apps.example.com");
        let mut created = route.clone();
        created.spec.host = Some(format!("{name}-{namespace}.{domain}"));
        store.routes.insert(key(namespace, &name), created.clone());
        store.created_routes.push(created.clone());
        Ok(created)
    }

    async fn delete_route(&self, namespace: &str, name: &str) -> Result<()> {
        let mut store = self.lock();
        if let Some(message) = &store.delete_route_failure {
            return Err(Error::object_store("delete", "route", name, message.clone()));
        }
        if store.routes.remove(&key(namespace, name)).is_none() {
            return Err(Error::object_store("delete", "route", name, "not found"));
        }
        store.deleted_routes.push(format!("{namespace}/{name}"));
        Ok(())
    }

    async fn get_secret(&self, namespace: &str, name: &str) -> Result<Lookup<Secret>> {
        self.get("secret", name, |s| s.secrets.get(&key(namespace, name)).cloned())
    }

    async fn create_secret(&self, namespace: &str, secret: &Secret) -> Result<Secret> {
        let name = secret.metadata.name.clone().unwrap_or_default();
        let mut store = self.lock();
        let exists = store.secrets.contains_key(&key(namespace, &name));
        self.admit(&mut store, "secret", &name, format!("{namespace}/{name}"), exists)?;
        store.secrets.insert(key(namespace, &name), secret.clone());
        Ok(secret.clone())
    }

    async fn get_infrastructure(&self, name: &str) -> Result<Lookup<Infrastructure>> {
        self.get("infrastructure", name, |s| s.infrastructures.get(name).cloned())
    }
}

/// A ToolChainEnabler as the API server would hand it out
pub fn enabler(namespace: &str) -> ToolChainEnabler {
    let mut doc = ToolChainEnabler::new("toolchain-enabler", Default::default());
    doc.metadata.namespace = Some(namespace.into());
    doc.metadata.uid = Some("9e1c5b6a-1f0e-4a43-9d0b-8a2f6c3d7e21".into());
    doc
}

pub fn secret(name: &str, token: &str, secret_type: &str) -> Secret {
    Secret {
        metadata: ObjectMeta {
            name: Some(name.into()),
            ..ObjectMeta::default()
        },
        type_: Some(secret_type.into()),
        data: Some(BTreeMap::from([(
            "token".to_string(),
            ByteString(token.as_bytes().to_vec()),
        )])),
        ..Secret::default()
    }
}

/// The toolchain service account referencing `secrets` by name
pub fn service_account(namespace: &str, secrets: &[&str]) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMeta {
            name: Some(SA_NAME.into()),
            namespace: Some(namespace.into()),
            ..ObjectMeta::default()
        },
        secrets: Some(
            secrets
                .iter()
                .map(|name| ObjectReference {
                    name: Some(name.to_string()),
                    ..ObjectReference::default()
                })
                .collect(),
        ),
        ..ServiceAccount::default()
    }
}

pub fn oauth_client(secret: &str) -> OAuthClient {
    let mut oc = OAuthClient::new(OAUTH_CLIENT_NAME);
    oc.secret = Some(secret.into());
    oc
}

pub fn cluster_data() -> ClusterData {
    ClusterData {
        name: "dsaas-stage".into(),
        api_url: "https://api.dsaas-stage.openshift.com/".into(),
        app_dns: "8a09.starter-us-east-2.openshiftapps.com".into(),
        auth_client_id: OAUTH_CLIENT_NAME.into(),
        auth_client_secret: "oauthsecret".into(),
        auth_client_default_scope: "user:full".into(),
        service_account_username: "system:serviceaccount:ns1:toolchain-sre".into(),
        service_account_token: "mysatoken".into(),
        token_provider_id: Some("3d7b75e3-7053-4846-9b64-26cf42717692".into()),
        cluster_type: "OSD".into(),
    }
}

/// Configuration pointing both remote services at `url`
pub fn test_config(url: &str) -> Configuration {
    Configuration {
        auth_url: url.into(),
        cluster_url: url.into(),
        tc_client_id: "toolchain".into(),
        tc_client_secret: "s3cr3t".into(),
        cluster_name: "dsaas-stage".into(),
        watch_namespace: None,
    }
}

impl Context {
    pub fn test(objects: Arc<impl ObjectClient + 'static>, config: Configuration) -> Arc<Self> {
        let cluster_service = ClusterService::new(&config).unwrap();
        State::default().to_context(objects, cluster_service, config)
    }
}

#[derive(Clone, Debug)]
pub struct RecordedRequest {
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body: String,
}

struct StubState {
    requests: Mutex<Vec<RecordedRequest>>,
    token: Mutex<(StatusCode, String)>,
    clusters: (StatusCode, String),
}

/// Auth and cluster management service on one loopback listener.
///
/// `/api/token` hands out [`StubServer::TOKEN`] unless told otherwise, every
/// other path answers with the status and body given to `start`.
pub struct StubServer {
    pub url: String,
    state: Arc<StubState>,
}

impl StubServer {
    pub const TOKEN: &'static str = "stub-access-token";

    pub async fn start(status: StatusCode, body: &str) -> Self {
        let token_body = serde_json::json!({ "access_token": Self::TOKEN, "token_type": "bearer" });
        let state = Arc::new(StubState {
            requests: Mutex::new(Vec::new()),
            token: Mutex::new((StatusCode::OK, token_body.to_string())),
            clusters: (status, body.to_string()),
        });
        let app = Router::new().fallback(record).with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        Self {
            url: format!("http://{addr}"),
            state,
        }
    }

    pub fn with_token_response(self, status: StatusCode, body: &str) -> Self {
        *self.state.token.lock().unwrap() = (status, body.to_string());
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }
}

fn header_value(headers: &HeaderMap, name: HeaderName) -> Option<String> {
    headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
}

async fn record(
    AxumState(state): AxumState<Arc<StubState>>,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    state.requests.lock().unwrap().push(RecordedRequest {
        path: uri.path().to_string(),
        authorization: header_value(&headers, header::AUTHORIZATION),
        content_type: header_value(&headers, header::CONTENT_TYPE),
        body,
    });
    if uri.path() == "/api/token" {
        state.token.lock().unwrap().clone()
    } else {
        state.clusters.clone()
    }
}

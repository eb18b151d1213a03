use super::{
    Grant, SA_NAME, ToolChainEnabler,
    resources::{cluster_role_binding, ensure_cluster_role_binding, ensure_oauth_client, ensure_service_account, service_account},
};
use crate::{
    Context, Error, Result, State,
    cluster::Informer,
    cluster_client::ClusterService,
    configuration::Configuration,
    objects::{KubeObjectClient, Lookup, ObjectClient},
    online_registration,
    openshift::OAuthClient,
    telemetry,
};
use chrono::Utc;
use futures::StreamExt;
use k8s_openapi::api::{core::v1::ServiceAccount, rbac::v1::ClusterRoleBinding};
use kube::{
    Resource,
    api::{Api, ListParams, ObjectMeta, ResourceExt},
    client::Client,
    runtime::{
        controller::{Action, Controller},
        reflector::ObjectRef,
        watcher::Config,
    },
};
use std::sync::Arc;
use tokio::time::Duration;
use tracing::*;

/// Delay before a failed registration is attempted again.
pub const REGISTRATION_RETRY: Duration = Duration::from_secs(5);

/// A reconciliation trigger.
///
/// Triggers derived from cluster-scoped objects carry no namespace.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Request {
    pub name: String,
    pub namespace: Option<String>,
}

/// Namespace of the request, else the configured watch namespace.
pub fn resolve_namespace(request: &Request, watch_namespace: Option<&str>) -> Option<String> {
    request
        .namespace
        .as_deref()
        .filter(|ns| !ns.is_empty())
        .or(watch_namespace)
        .map(str::to_string)
}

#[instrument(skip(ctx, doc), fields(trace_id))]
async fn reconcile(doc: Arc<ToolChainEnabler>, ctx: Arc<Context>) -> Result<Action> {
    let trace_id = telemetry::get_trace_id();
    if trace_id != opentelemetry::trace::TraceId::INVALID {
        Span::current().record("trace_id", field::display(&trace_id));
    }
    let _timer = ctx.metrics.reconcile.count_and_measure(&trace_id);
    ctx.diagnostics.write().await.last_event = Utc::now();

    let request = Request {
        name: doc.name_any(),
        namespace: doc.namespace(),
    };
    reconcile_request(request, ctx).await
}

/// Runs one pass for `request` against the current state of its trigger.
pub async fn reconcile_request(request: Request, ctx: Arc<Context>) -> Result<Action> {
    let Some(ns) = resolve_namespace(&request, ctx.config.watch_namespace()) else {
        warn!(name = %request.name, "no namespace for request and no watch namespace configured, dropping");
        return Ok(Action::await_change());
    };

    info!("Reconciling ToolChainEnabler \"{}\" in {}", request.name, ns);
    match ctx.objects.get_enabler(&ns, &request.name).await? {
        Lookup::Found(doc) => doc.reconcile(ctx.clone(), &ns).await,
        Lookup::Absent => {
            // owned objects are left to ownerReference garbage collection
            info!(name = %request.name, namespace = %ns, "ToolChainEnabler not found, nothing to do");
            Ok(Action::await_change())
        }
    }
}

fn error_policy(doc: Arc<ToolChainEnabler>, error: &Error, ctx: Arc<Context>) -> Action {
    warn!(
        kind = "ToolChainEnabler",
        name = %doc.name_any(),
        namespace = ?doc.namespace(),
        "reconcile failed: {:?}",
        error
    );
    ctx.metrics.reconcile.set_failure(&doc, error);
    Action::requeue(Duration::from_secs(5 * 60))
}

impl ToolChainEnabler {
    async fn reconcile(&self, ctx: Arc<Context>, ns: &str) -> Result<Action> {
        let objects = ctx.objects.as_ref();
        let owner = self.controller_owner_ref(&());
        let owner = owner.as_ref();

        ensure_service_account(objects, &service_account(ns, SA_NAME, owner)).await?;
        for grant in Grant::ALL {
            let crb = cluster_role_binding(grant.binding_name(), grant.role(), ns, SA_NAME, owner);
            ensure_cluster_role_binding(objects, &crb).await?;
        }
        ensure_oauth_client(objects, owner).await?;

        let data = Informer::new(objects, ns, &ctx.config.cluster_name).inform().await?;
        match ctx.cluster_service.create_cluster(&data).await {
            Ok(()) => Ok(Action::await_change()),
            Err(e) if e.is_remote() => {
                error!(cluster = %data.name, "cluster registration failed, retrying: {e}");
                ctx.metrics.reconcile.registration_retries.inc();
                Ok(Action::requeue(REGISTRATION_RETRY))
            }
            Err(e) => Err(e),
        }
    }
}

/// Maps a cluster-scoped object back to the ToolChainEnabler controlling it.
///
/// Owner references hold no namespace, so the watch namespace stands in.
pub fn owner_request(meta: &ObjectMeta, watch_namespace: Option<&str>) -> Option<ObjectRef<ToolChainEnabler>> {
    let kind = ToolChainEnabler::kind(&());
    let owner = meta
        .owner_references
        .as_ref()?
        .iter()
        .find(|o| o.controller == Some(true) && o.kind == kind)?;
    let request = Request {
        name: owner.name.clone(),
        namespace: None,
    };
    match resolve_namespace(&request, watch_namespace) {
        Some(ns) => Some(ObjectRef::new(&request.name).within(&ns)),
        None => {
            debug!(owner = %owner.name, object = ?meta.name, "no watch namespace, ignoring owned object event");
            None
        }
    }
}

/// Initialize the controller and shared state (given the crd is installed)
pub async fn run(state: State, config: Configuration) -> Result<()> {
    let client = Client::try_default().await.map_err(Error::KubeError)?;
    let docs = Api::<ToolChainEnabler>::all(client.clone());
    if let Err(e) = docs.list(&ListParams::default().limit(1)).await {
        error!("CRD is not queryable; {e:?}. Is the CRD installed?");
        info!("Installation: cargo run --bin crdgen | kubectl apply -f -");
        return Err(Error::KubeError(e));
    }

    let objects: Arc<dyn ObjectClient> = Arc::new(KubeObjectClient::new(client.clone()));
    if let Err(e) = online_registration::ensure(objects.as_ref()).await {
        error!("failed to provision online-registration access: {e}");
        return Err(e);
    }

    let cluster_service = ClusterService::new(&config)?;
    let watch_namespace = config.watch_namespace().map(str::to_string);
    let ctx = state.to_context(objects, cluster_service, config);

    let crb_namespace = watch_namespace.clone();
    let oauth_namespace = watch_namespace;
    Controller::new(docs, Config::default().any_semantic())
        .owns(Api::<ServiceAccount>::all(client.clone()), Config::default())
        .watches(Api::<ClusterRoleBinding>::all(client.clone()), Config::default(), move |crb| {
            owner_request(&crb.metadata, crb_namespace.as_deref())
        })
        .watches(Api::<OAuthClient>::all(client), Config::default(), move |oc| {
            owner_request(&oc.metadata, oauth_namespace.as_deref())
        })
        .shutdown_on_signal()
        .run(reconcile, error_policy, ctx)
        .filter_map(|x| async move { std::result::Result::ok(x) })
        .for_each(|_| futures::future::ready(()))
        .await;
    Ok(())
}

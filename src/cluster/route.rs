use crate::{
    Result,
    objects::{Lookup, ObjectClient},
    openshift::{Route, RoutePort, RouteSpec, RouteTargetReference, TLS_TERMINATION_EDGE, TlsConfig},
};
use k8s_openapi::apimachinery::pkg::util::intstr::IntOrString;
use kube::api::ObjectMeta;
use tracing::{debug, error};

pub const ROUTE_NAME: &str = "toolchain-route";
pub const ROUTE_SERVICE: &str = "toolchain";
pub const ROUTE_TARGET_PORT: &str = "https";

fn toolchain_route(namespace: &str) -> Route {
    Route {
        metadata: ObjectMeta {
            name: Some(ROUTE_NAME.to_string()),
            namespace: Some(namespace.to_string()),
            ..ObjectMeta::default()
        },
        spec: RouteSpec {
            host: None,
            to: RouteTargetReference {
                kind: "Service".into(),
                name: ROUTE_SERVICE.into(),
            },
            port: Some(RoutePort {
                target_port: IntOrString::String(ROUTE_TARGET_PORT.into()),
            }),
            tls: Some(TlsConfig {
                termination: TLS_TERMINATION_EDGE.into(),
            }),
        },
    }
}

/// Discovers the wildcard application domain of the cluster router.
///
/// A throwaway route is created so the router assigns it a host, and the
/// domain is whatever follows the first label of that host. The route is
/// deleted again whatever the outcome of the read-back.
pub async fn routing_sub_domain(client: &dyn ObjectClient, namespace: &str) -> Result<String> {
    let created = client.create_route(namespace, &toolchain_route(namespace)).await?;

    let host = match client.get_route(namespace, ROUTE_NAME).await {
        Ok(Lookup::Found(route)) => Ok(route.spec.host.or(created.spec.host)),
        Ok(Lookup::Absent) => Ok(created.spec.host),
        Err(e) => Err(e),
    };

    if let Err(e) = client.delete_route(namespace, ROUTE_NAME).await {
        error!(route = ROUTE_NAME, namespace, "failed to delete route: {e}");
    }

    let host = host?.unwrap_or_default();
    debug!(%host, "router assigned host");
    Ok(route_host_sub_domain(&host))
}

/// `foo.apps.example.com` -> `apps.example.com`; a host without a dot has no domain.
pub fn route_host_sub_domain(host: &str) -> String {
    match host.split_once('.') {
        Some((_, domain)) => domain.trim().to_string(),
        None => String::new(),
    }
}

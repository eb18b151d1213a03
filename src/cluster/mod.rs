//! Assembly of the cluster registration payload from live cluster state.
mod informer;
mod payload;
mod route;

pub use informer::{
    API_URL_HOST_SUFFIX, CLUSTER_TYPE, DEFAULT_SCOPE, INFRASTRUCTURE_NAME, Informer, USERNAME_PREFIX,
    name_from_url,
};
pub use payload::{ClusterData, CreateClustersPayload};
pub use route::{ROUTE_NAME, ROUTE_SERVICE, ROUTE_TARGET_PORT, route_host_sub_domain, routing_sub_domain};

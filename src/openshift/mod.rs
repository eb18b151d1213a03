//! Typed OpenShift API objects the operator reads and writes.
mod infrastructure;
mod oauth_client;
mod route;

pub use infrastructure::{Infrastructure, InfrastructureSpec, InfrastructureStatus};
pub use oauth_client::{GRANT_METHOD_AUTO, OAuthClient};
pub use route::{Route, RoutePort, RouteSpec, RouteTargetReference, TLS_TERMINATION_EDGE, TlsConfig};

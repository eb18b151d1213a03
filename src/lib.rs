use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::warn;

use cluster_client::ClusterService;
use configuration::Configuration;
use objects::ObjectClient;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Kube Error: {0}")]
    KubeError(#[source] kube::Error),

    /// Any object store failure other than "not found".
    #[error("failed to {verb} {kind} {name}: {source}")]
    ObjectStore {
        verb: &'static str,
        kind: &'static str,
        name: String,
        #[source]
        source: BoxError,
    },

    #[error("couldn't find any secret reference for sa {account}")]
    MissingSecretReference { account: String },

    #[error("couldn't find any secret reference for sa {account} of type {secret_type}")]
    MissingTokenSecret { account: String, secret_type: String },

    #[error("{kind} {name} not found")]
    MissingObject { kind: &'static str, name: String },

    #[error("{kind} {name} has no usable {field}")]
    MissingField {
        kind: &'static str,
        name: String,
        field: &'static str,
    },

    #[error("failed to obtain service account token. Response status: {status}. Response body: {body}")]
    TokenExchange { status: String, body: String },

    #[error(
        "received unexpected response code while adding cluster configuration in cluster management service. Response status: {status}. Response body: {body}"
    )]
    Registration { status: String, body: String },

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Configuration(String),
}
pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub fn metric_label(&self) -> String {
        let label = match self {
            Error::KubeError(_) => "kubeerror",
            Error::ObjectStore { .. } => "objectstore",
            Error::MissingSecretReference { .. } => "missingsecretreference",
            Error::MissingTokenSecret { .. } => "missingtokensecret",
            Error::MissingObject { .. } => "missingobject",
            Error::MissingField { .. } => "missingfield",
            Error::TokenExchange { .. } => "tokenexchange",
            Error::Registration { .. } => "registration",
            Error::Http(_) => "http",
            Error::Configuration(_) => "configuration",
        };
        label.to_string()
    }

    /// Failures of the remote auth or cluster service, retried with a fixed delay.
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Error::TokenExchange { .. } | Error::Registration { .. } | Error::Http(_)
        )
    }

    pub(crate) fn object_store(
        verb: &'static str,
        kind: &'static str,
        name: &str,
        source: impl Into<BoxError>,
    ) -> Self {
        Error::ObjectStore {
            verb,
            kind,
            name: name.to_string(),
            source: source.into(),
        }
    }
}

/// Diagnostics to be exposed by the web server
#[derive(Clone, Serialize)]
pub struct Diagnostics {
    pub last_event: DateTime<Utc>,
    pub reporter: String,
}
impl Default for Diagnostics {
    fn default() -> Self {
        Self {
            last_event: Utc::now(),
            reporter: "toolchain-operator".into(),
        }
    }
}

/// State shared between the controller and the web server
#[derive(Clone, Default)]
pub struct State {
    /// Diagnostics populated by the reconciler
    diagnostics: Arc<RwLock<Diagnostics>>,
    /// Metrics
    metrics: Arc<Metrics>,
}

/// State wrapper around the controller outputs for the web server
impl State {
    /// Metrics getter
    pub fn metrics(&self) -> String {
        let mut buffer = String::new();
        let registry = &*self.metrics.registry;
        if let Err(e) = prometheus_client::encoding::text::encode(&mut buffer, registry) {
            warn!("failed to encode metrics: {e}");
        }
        buffer
    }

    /// State getter
    pub async fn diagnostics(&self) -> Diagnostics {
        self.diagnostics.read().await.clone()
    }

    // Create a Controller Context that can update State
    pub fn to_context(
        &self,
        objects: Arc<dyn ObjectClient>,
        cluster_service: ClusterService,
        config: Configuration,
    ) -> Arc<Context> {
        Arc::new(Context {
            objects,
            cluster_service,
            config: Arc::new(config),
            metrics: self.metrics.clone(),
            diagnostics: self.diagnostics.clone(),
        })
    }
}

// Context for our reconciler
#[derive(Clone)]
pub struct Context {
    /// Object store access
    pub objects: Arc<dyn ObjectClient>,
    /// Remote cluster management service
    pub cluster_service: ClusterService,
    /// Process-wide configuration
    pub config: Arc<Configuration>,
    /// Diagnostics read by the web server
    pub diagnostics: Arc<RwLock<Diagnostics>>,
    /// Prometheus metrics
    pub metrics: Arc<Metrics>,
}

pub use enabler::run;

/// Log and trace integrations
pub mod telemetry;

/// Metrics
mod metrics;
pub use metrics::Metrics;

pub mod cluster;
pub mod cluster_client;
pub mod configuration;
pub mod enabler;
pub mod objects;
pub mod online_registration;
pub mod openshift;
pub mod secret;

#[cfg(test)]
pub mod fixtures;

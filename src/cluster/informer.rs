use super::{ClusterData, routing_sub_domain};
use crate::{
    Error, Result,
    enabler::{OAUTH_CLIENT_NAME, SA_NAME},
    objects::{Lookup, ObjectClient},
};
use k8s_openapi::api::core::v1::Secret;
use reqwest::Url;
use tracing::{debug, info};

pub const INFRASTRUCTURE_NAME: &str = "cluster";
/// Domain used to synthesize the API URL when no infrastructure descriptor exists
pub const API_URL_HOST_SUFFIX: &str = "openshift.com";
pub const DEFAULT_SCOPE: &str = "user:full";
pub const USERNAME_PREFIX: &str = "system:serviceaccount";
pub const CLUSTER_TYPE: &str = "OSD";

const TOKEN_SECRET_TYPE: &str = "kubernetes.io/service-account-token";
const TOKEN_KEY: &str = "token";

/// A single field populator of the registration payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ConfigOption {
    NameAndApiUrl,
    AppDns,
    OAuthClient,
    ServiceAccount,
    TokenProvider,
    Type,
}

const PIPELINE: [ConfigOption; 6] = [
    ConfigOption::NameAndApiUrl,
    ConfigOption::AppDns,
    ConfigOption::OAuthClient,
    ConfigOption::ServiceAccount,
    ConfigOption::TokenProvider,
    ConfigOption::Type,
];

/// Builds `ClusterData` for one namespace from live cluster state.
pub struct Informer<'a> {
    client: &'a dyn ObjectClient,
    namespace: &'a str,
    cluster_name: &'a str,
}

impl<'a> Informer<'a> {
    /// `cluster_name` is only consulted on platforms without an infrastructure descriptor.
    pub fn new(client: &'a dyn ObjectClient, namespace: &'a str, cluster_name: &'a str) -> Self {
        Self {
            client,
            namespace,
            cluster_name,
        }
    }

    /// Runs every populator in order; the first failure discards the partial payload.
    pub async fn inform(&self) -> Result<ClusterData> {
        let mut data = ClusterData::default();
        for option in PIPELINE {
            data = self.apply(option, data).await?;
        }
        info!(cluster = %data.name, api_url = %data.api_url, "cluster configuration assembled");
        Ok(data)
    }

    async fn apply(&self, option: ConfigOption, data: ClusterData) -> Result<ClusterData> {
        match option {
            ConfigOption::NameAndApiUrl => self.name_and_api_url(data).await,
            ConfigOption::AppDns => self.app_dns(data).await,
            ConfigOption::OAuthClient => self.oauth_client(data).await,
            ConfigOption::ServiceAccount => self.service_account(data).await,
            ConfigOption::TokenProvider => Ok(token_provider(data)),
            ConfigOption::Type => Ok(cluster_type(data)),
        }
    }

    async fn name_and_api_url(&self, mut data: ClusterData) -> Result<ClusterData> {
        match self.client.get_infrastructure(INFRASTRUCTURE_NAME).await? {
            Lookup::Found(infra) => {
                let api_url = infra
                    .status
                    .and_then(|s| s.api_server_url)
                    .filter(|url| !url.is_empty())
                    .ok_or(Error::MissingField {
                        kind: "infrastructure",
                        name: INFRASTRUCTURE_NAME.into(),
                        field: "apiServerURL",
                    })?;
                data.name = name_from_url(&api_url);
                data.api_url = api_url;
            }
            Lookup::Absent => {
                debug!("no infrastructure descriptor, using configured cluster name");
                data.name = self.cluster_name.to_string();
                data.api_url = format!("https://api.{}.{API_URL_HOST_SUFFIX}/", self.cluster_name);
            }
        }
        Ok(data)
    }

    async fn app_dns(&self, mut data: ClusterData) -> Result<ClusterData> {
        data.app_dns = routing_sub_domain(self.client, self.namespace).await?;
        Ok(data)
    }

    async fn oauth_client(&self, mut data: ClusterData) -> Result<ClusterData> {
        let oc = self
            .client
            .get_oauth_client(OAUTH_CLIENT_NAME)
            .await?
            .found()
            .ok_or(Error::MissingObject {
                kind: "oauthclient",
                name: OAUTH_CLIENT_NAME.into(),
            })?;
        data.auth_client_secret = oc.secret.filter(|s| !s.is_empty()).ok_or(Error::MissingField {
            kind: "oauthclient",
            name: OAUTH_CLIENT_NAME.into(),
            field: "secret",
        })?;
        data.auth_client_id = OAUTH_CLIENT_NAME.into();
        data.auth_client_default_scope = DEFAULT_SCOPE.into();
        Ok(data)
    }

    async fn service_account(&self, mut data: ClusterData) -> Result<ClusterData> {
        let sa = self
            .client
            .get_service_account(self.namespace, SA_NAME)
            .await?
            .found()
            .ok_or(Error::MissingObject {
                kind: "service account",
                name: SA_NAME.into(),
            })?;
        let account = sa.metadata.name.unwrap_or_else(|| SA_NAME.into());

        let references = sa.secrets.unwrap_or_default();
        if references.is_empty() {
            return Err(Error::MissingSecretReference { account });
        }

        // every reference must resolve; the last token secret wins
        let mut token_secret = None;
        for name in references.iter().filter_map(|r| r.name.as_deref()) {
            match self.client.get_secret(self.namespace, name).await? {
                Lookup::Found(secret) if secret.type_.as_deref() == Some(TOKEN_SECRET_TYPE) => {
                    token_secret = Some(secret);
                }
                // dockercfg and friends
                Lookup::Found(secret) => {
                    debug!(secret = name, secret_type = ?secret.type_, "skipping secret");
                }
                Lookup::Absent => {
                    return Err(Error::MissingObject {
                        kind: "secret",
                        name: name.to_string(),
                    });
                }
            }
        }
        let secret = token_secret.ok_or_else(|| Error::MissingTokenSecret {
            account: account.clone(),
            secret_type: TOKEN_SECRET_TYPE.into(),
        })?;

        data.service_account_token = token(&secret)?;
        data.service_account_username = format!("{USERNAME_PREFIX}:{}:{account}", self.namespace);
        Ok(data)
    }
}

fn token(secret: &Secret) -> Result<String> {
    secret
        .data
        .as_ref()
        .and_then(|d| d.get(TOKEN_KEY))
        .and_then(|t| String::from_utf8(t.0.clone()).ok())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| Error::MissingField {
            kind: "secret",
            name: secret.metadata.name.clone().unwrap_or_default(),
            field: TOKEN_KEY,
        })
}

fn token_provider(mut data: ClusterData) -> ClusterData {
    data.token_provider_id = Some(uuid::Uuid::new_v4().to_string());
    data
}

fn cluster_type(mut data: ClusterData) -> ClusterData {
    data.cluster_type = CLUSTER_TYPE.into();
    data
}

/// Second label of the URL's host: `https://api.<name>.example.com/` -> `<name>`.
///
/// Hosts with fewer than three labels have no name.
pub fn name_from_url(api_url: &str) -> String {
    let host = Url::parse(api_url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
        .unwrap_or_else(|| api_url.to_string());
    let labels: Vec<&str> = host.split('.').collect();
    match labels.as_slice() {
        [_, name, _, ..] => name.to_string(),
        _ => String::new(),
    }
}

use k8s_openapi::{ClusterResourceScope, apimachinery::pkg::apis::meta::v1::ObjectMeta};
use kube::Resource;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

pub const GRANT_METHOD_AUTO: &str = "auto";

/// `oauth.openshift.io/v1` OAuthClient.
///
/// The kind keeps its fields at the top level instead of under `spec`,
/// so `Resource` is implemented by hand rather than derived.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OAuthClient {
    pub api_version: String,
    pub kind: String,
    pub metadata: ObjectMeta,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(default, rename = "redirectURIs", skip_serializing_if = "Vec::is_empty")]
    pub redirect_uris: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grant_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_max_age_seconds: Option<i32>,
}

impl OAuthClient {
    pub fn new(name: &str) -> Self {
        Self {
            api_version: Self::api_version(&()).into_owned(),
            kind: Self::kind(&()).into_owned(),
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                ..ObjectMeta::default()
            },
            secret: None,
            redirect_uris: Vec::new(),
            grant_method: None,
            access_token_max_age_seconds: None,
        }
    }
}

impl Resource for OAuthClient {
    type DynamicType = ();
    type Scope = ClusterResourceScope;

    fn kind(_: &()) -> Cow<'_, str> {
        "OAuthClient".into()
    }

    fn group(_: &()) -> Cow<'_, str> {
        "oauth.openshift.io".into()
    }

    fn version(_: &()) -> Cow<'_, str> {
        "v1".into()
    }

    fn plural(_: &()) -> Cow<'_, str> {
        "oauthclients".into()
    }

    fn meta(&self) -> &ObjectMeta {
        &self.metadata
    }

    fn meta_mut(&mut self) -> &mut ObjectMeta {
        &mut self.metadata
    }
}

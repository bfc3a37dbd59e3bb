//! Deployment manifest publishing.
//!
//! The manifest maps each resource name to a typed entry. References to
//! other resources are written as `{resource.path}` expressions for the
//! orchestrator to resolve.

use std::str::FromStr;

use serde::{Serialize, Serializer, ser::SerializeMap};
use serde_json::json;

use crate::builder::DistributedApplication;
use crate::error::AppHostError;
use crate::model::{Endpoint, EnvValue, Resource, ResourceKind, Scheme};

/// Manifest output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ManifestFormat {
    #[default]
    Json,
    Yaml,
}

impl FromStr for ManifestFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(format!("unknown manifest format '{other}' (expected json or yaml)")),
        }
    }
}

/// Name-keyed entries serialized as a map in insertion order.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<T>(pub Vec<(String, T)>);

impl<T> Entries<T> {
    fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<T: Serialize> Serialize for Entries<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (key, value) in &self.0 {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Published form of a [`DistributedApplication`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    pub resources: Entries<ManifestResource>,
}

/// One resource entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestResource {
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_string: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inputs: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deployments: Vec<ManifestDeployment>,
    #[serde(skip_serializing_if = "Entries::is_empty")]
    pub env: Entries<String>,
    #[serde(skip_serializing_if = "Entries::is_empty")]
    pub bindings: Entries<ManifestBinding>,
}

impl ManifestResource {
    const fn new(kind: &'static str) -> Self {
        Self {
            kind,
            connection_string: None,
            image: None,
            path: None,
            value: None,
            inputs: None,
            deployments: Vec::new(),
            env: Entries(Vec::new()),
            bindings: Entries(Vec::new()),
        }
    }
}

/// Endpoint entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestBinding {
    pub scheme: &'static str,
    pub protocol: &'static str,
    pub transport: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_port: Option<u16>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub external: bool,
}

impl From<&Endpoint> for ManifestBinding {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            scheme: endpoint.scheme.as_str(),
            protocol: "tcp",
            transport: match endpoint.scheme {
                Scheme::Http | Scheme::Https => "http",
                Scheme::Tcp => "tcp",
            },
            target_port: endpoint.target_port,
            external: endpoint.external,
        }
    }
}

/// Model deployment entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ManifestDeployment {
    pub name: String,
    pub model: String,
    pub version: String,
}

fn secret_input(generate: bool) -> serde_json::Value {
    if generate {
        json!({ "value": { "type": "string", "secret": true, "default": { "generate": { "minLength": 22 } } } })
    } else {
        json!({ "value": { "type": "string", "secret": true } })
    }
}

fn entry(resource: &Resource) -> ManifestResource {
    let name = &resource.name;
    let mut entry = match &resource.kind {
        ResourceKind::Postgres { image, tag } => {
            let password = resource
                .env_value("POSTGRES_PASSWORD")
                .map(EnvValue::expression)
                .unwrap_or_default();
            ManifestResource {
                connection_string: Some(format!(
                    "Host={{{name}.bindings.tcp.host}};Port={{{name}.bindings.tcp.port}};Username=postgres;Password={password}"
                )),
                image: Some(format!("{image}:{tag}")),
                ..ManifestResource::new("container.v0")
            }
        }
        ResourceKind::Database {
            server,
            database_name,
        } => ManifestResource {
            connection_string: Some(format!("{{{server}.connectionString}};Database={database_name}")),
            ..ManifestResource::new("value.v0")
        },
        ResourceKind::Project { path, .. } => ManifestResource {
            path: Some(path.clone()),
            ..ManifestResource::new("project.v0")
        },
        ResourceKind::Parameter { secret } => ManifestResource {
            value: Some(format!("{{{name}.inputs.value}}")),
            inputs: secret.then(|| secret_input(true)),
            ..ManifestResource::new("parameter.v0")
        },
        ResourceKind::ConnectionString => ManifestResource {
            connection_string: Some(format!("{{{name}.value}}")),
            value: Some(format!("{{{name}.inputs.value}}")),
            inputs: Some(secret_input(false)),
            ..ManifestResource::new("parameter.v0")
        },
        ResourceKind::AzureOpenAi { deployments } => ManifestResource {
            connection_string: Some(format!("{{{name}.outputs.connectionString}}")),
            path: Some(format!("{name}.module.bicep")),
            deployments: deployments
                .iter()
                .map(|d| ManifestDeployment {
                    name: d.name.clone(),
                    model: d.model_name.clone(),
                    version: d.model_version.clone(),
                })
                .collect(),
            ..ManifestResource::new("azure.bicep.v0")
        },
    };

    entry.env = Entries(
        resource
            .env
            .iter()
            .map(|(key, value)| (key.clone(), value.expression()))
            .collect(),
    );
    entry.bindings = Entries(
        resource
            .endpoints
            .iter()
            .map(|e| (e.name.clone(), ManifestBinding::from(e)))
            .collect(),
    );
    entry
}

impl DistributedApplication {
    /// Publish the model as a manifest.
    #[must_use]
    pub fn manifest(&self) -> Manifest {
        Manifest {
            resources: Entries(
                self.resources()
                    .iter()
                    .map(|r| (r.name.clone(), entry(r)))
                    .collect(),
            ),
        }
    }

    /// Render the manifest in the given format.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn render(&self, format: ManifestFormat) -> Result<String, AppHostError> {
        let manifest = self.manifest();
        Ok(match format {
            ManifestFormat::Json => serde_json::to_string_pretty(&manifest)?,
            ManifestFormat::Yaml => serde_yaml::to_string(&manifest)?,
        })
    }
}

//! Resource model of a distributed application.
//!
//! Resources are containers, databases, runnable projects and external
//! connection strings. Runnable resources expose named endpoints and carry
//! environment values, which may be literals or expressions that the
//! orchestrator resolves at deploy time.

use std::fmt;

/// Named endpoint of another resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointReference {
    pub resource: String,
    pub endpoint: String,
}

impl EndpointReference {
    #[must_use]
    pub fn new(resource: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            endpoint: endpoint.into(),
        }
    }
}

/// Value of one environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvValue {
    Literal(String),
    /// URL of another resource's endpoint.
    Endpoint(EndpointReference),
    /// Connection string of another resource.
    ConnectionString(String),
    /// Deploy-time value of a parameter resource.
    Parameter(String),
}

impl EnvValue {
    /// Resource this value depends on, if any.
    #[must_use]
    pub fn referenced_resource(&self) -> Option<&str> {
        match self {
            Self::Literal(_) => None,
            Self::Endpoint(r) => Some(&r.resource),
            Self::ConnectionString(name) | Self::Parameter(name) => Some(name),
        }
    }

    /// Manifest form: the literal itself or a `{...}` expression.
    #[must_use]
    pub fn expression(&self) -> String {
        match self {
            Self::Literal(value) => value.clone(),
            Self::Endpoint(r) => format!("{{{}.bindings.{}.url}}", r.resource, r.endpoint),
            Self::ConnectionString(name) => format!("{{{name}.connectionString}}"),
            Self::Parameter(name) => format!("{{{name}.value}}"),
        }
    }
}

impl From<&str> for EnvValue {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for EnvValue {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<EndpointReference> for EnvValue {
    fn from(value: EndpointReference) -> Self {
        Self::Endpoint(value)
    }
}

/// URL scheme of an endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
    Tcp,
}

impl Scheme {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Http => "http",
            Self::Https => "https",
            Self::Tcp => "tcp",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named network endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub name: String,
    pub scheme: Scheme,
    pub target_port: Option<u16>,
    /// Reachable from outside the application's network.
    pub external: bool,
}

impl Endpoint {
    #[must_use]
    pub fn new(scheme: Scheme) -> Self {
        Self {
            name: scheme.as_str().to_string(),
            scheme,
            target_port: None,
            external: false,
        }
    }

    #[must_use]
    pub const fn with_target_port(mut self, port: u16) -> Self {
        self.target_port = Some(port);
        self
    }
}

/// Model deployment of an Azure `OpenAI` resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AzureOpenAiDeployment {
    pub name: String,
    pub model_name: String,
    pub model_version: String,
}

impl AzureOpenAiDeployment {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        model_name: impl Into<String>,
        model_version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model_name: model_name.into(),
            model_version: model_version.into(),
        }
    }
}

/// What a resource is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKind {
    /// `PostgreSQL` server container.
    Postgres { image: String, tag: String },
    /// Database hosted by a `Postgres` resource.
    Database { server: String, database_name: String },
    /// Runnable service built from source.
    Project {
        path: String,
        launch_profile: Option<String>,
    },
    /// Value supplied by the operator at deploy time.
    Parameter { secret: bool },
    /// Externally configured connection string.
    ConnectionString,
    /// Provisioned Azure `OpenAI` account.
    AzureOpenAi { deployments: Vec<AzureOpenAiDeployment> },
}

impl ResourceKind {
    /// Whether the resource runs a process that takes environment and
    /// exposes endpoints.
    #[must_use]
    pub const fn is_runnable(&self) -> bool {
        matches!(self, Self::Postgres { .. } | Self::Project { .. })
    }

    /// Whether other resources may reference its connection string.
    #[must_use]
    pub const fn has_connection_string(&self) -> bool {
        !matches!(self, Self::Project { .. })
    }
}

/// A resource after wiring has been resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    pub endpoints: Vec<Endpoint>,
    /// Environment in declaration order; later values replace earlier ones.
    pub env: Vec<(String, EnvValue)>,
}

impl Resource {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            endpoints: Vec::new(),
            env: Vec::new(),
        }
    }

    #[must_use]
    pub fn endpoint(&self, name: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }

    #[must_use]
    pub fn env_value(&self, key: &str) -> Option<&EnvValue> {
        self.env.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Set an environment variable, replacing any earlier value.
    pub fn set_env(&mut self, key: impl Into<String>, value: EnvValue) {
        let key = key.into();
        if let Some(slot) = self.env.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.env.push((key, value));
        }
    }
}

//! Two-phase application builder.
//!
//! Resources are declared first and come back as [`ResourceHandle`]s.
//! Wiring (references, environment, endpoint exposure) is recorded against
//! handles and only resolved by [`DistributedApplicationBuilder::build`], so
//! resources may reference each other in any order, cycles included.

use tracing::debug;

use crate::error::AppHostError;
use crate::model::{
    AzureOpenAiDeployment, Endpoint, EndpointReference, EnvValue, Resource, ResourceKind, Scheme,
};

/// Environment variable set on every project when forwarded headers are on.
pub const FORWARDED_HEADERS_ENV: &str = "ASPNETCORE_FORWARDEDHEADERS_ENABLED";

/// Port the `PostgreSQL` container listens on.
const POSTGRES_PORT: u16 = 5432;

/// Caller name reported for wiring steps whose target is unknown.
const BUILDER: &str = "application";

/// Reference to a declared resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceHandle {
    name: String,
}

impl ResourceHandle {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference one of this resource's endpoints.
    #[must_use]
    pub fn endpoint(&self, endpoint: &str) -> EndpointReference {
        EndpointReference::new(self.name.clone(), endpoint)
    }

    /// Reference this resource's connection string.
    #[must_use]
    pub fn connection_string(&self) -> EnvValue {
        EnvValue::ConnectionString(self.name.clone())
    }
}

#[derive(Debug, Clone)]
enum Wiring {
    Environment { key: String, value: EnvValue },
    Reference { source: String },
    ExternalHttpEndpoints,
}

/// Builder for a [`DistributedApplication`].
#[derive(Debug, Default)]
pub struct DistributedApplicationBuilder {
    resources: Vec<Resource>,
    wiring: Vec<(String, Wiring)>,
    forwarded_headers: bool,
}

impl DistributedApplicationBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable forwarded-header processing on every project.
    pub fn with_forwarded_headers(&mut self) -> &mut Self {
        self.forwarded_headers = true;
        self
    }

    fn add(&mut self, resource: Resource) -> ResourceHandle {
        let handle = ResourceHandle {
            name: resource.name.clone(),
        };
        self.resources.push(resource);
        handle
    }

    /// Declare a `PostgreSQL` server container and its generated password.
    pub fn add_postgres(&mut self, name: &str, image: &str, tag: &str) -> ResourceHandle {
        let password = self.add(Resource::new(
            format!("{name}-password"),
            ResourceKind::Parameter { secret: true },
        ));

        let mut server = Resource::new(
            name,
            ResourceKind::Postgres {
                image: image.to_string(),
                tag: tag.to_string(),
            },
        );
        server
            .endpoints
            .push(Endpoint::new(Scheme::Tcp).with_target_port(POSTGRES_PORT));
        server.set_env("POSTGRES_HOST_AUTH_METHOD", "scram-sha-256".into());
        server.set_env(
            "POSTGRES_INITDB_ARGS",
            "--auth-host=scram-sha-256 --auth-local=scram-sha-256".into(),
        );
        server.set_env("POSTGRES_USER", "postgres".into());
        server.set_env(
            "POSTGRES_PASSWORD",
            EnvValue::Parameter(password.name().to_string()),
        );
        self.add(server)
    }

    /// Declare a database on a `PostgreSQL` server.
    pub fn add_database(&mut self, server: &ResourceHandle, name: &str) -> ResourceHandle {
        self.add(Resource::new(
            name,
            ResourceKind::Database {
                server: server.name.clone(),
                database_name: name.to_string(),
            },
        ))
    }

    /// Declare a runnable project.
    ///
    /// Projects expose `http`, plus `https` unless the launch profile is
    /// `http`.
    pub fn add_project(
        &mut self,
        name: &str,
        path: &str,
        launch_profile: Option<&str>,
    ) -> ResourceHandle {
        let mut project = Resource::new(
            name,
            ResourceKind::Project {
                path: path.to_string(),
                launch_profile: launch_profile.map(str::to_string),
            },
        );
        project.endpoints.push(Endpoint::new(Scheme::Http));
        if launch_profile != Some("http") {
            project.endpoints.push(Endpoint::new(Scheme::Https));
        }
        self.add(project)
    }

    /// Declare a connection string supplied by the operator.
    pub fn add_connection_string(&mut self, name: &str) -> ResourceHandle {
        self.add(Resource::new(name, ResourceKind::ConnectionString))
    }

    /// Declare an Azure `OpenAI` account with model deployments.
    pub fn add_azure_openai(
        &mut self,
        name: &str,
        deployments: Vec<AzureOpenAiDeployment>,
    ) -> ResourceHandle {
        self.add(Resource::new(name, ResourceKind::AzureOpenAi { deployments }))
    }

    /// Make the resource's HTTP endpoints reachable from outside.
    pub fn with_external_http_endpoints(&mut self, target: &ResourceHandle) -> &mut Self {
        self.wiring
            .push((target.name.clone(), Wiring::ExternalHttpEndpoints));
        self
    }

    /// Give `target` the connection string or service URLs of `source`.
    ///
    /// Connection-string resources become `ConnectionStrings__<source>`.
    /// Projects become one `services__<source>__<endpoint>__0` per endpoint.
    pub fn with_reference(&mut self, target: &ResourceHandle, source: &ResourceHandle) -> &mut Self {
        self.wiring.push((
            target.name.clone(),
            Wiring::Reference {
                source: source.name.clone(),
            },
        ));
        self
    }

    /// Set an environment variable on `target`.
    pub fn with_environment(
        &mut self,
        target: &ResourceHandle,
        key: &str,
        value: impl Into<EnvValue>,
    ) -> &mut Self {
        self.wiring.push((
            target.name.clone(),
            Wiring::Environment {
                key: key.to_string(),
                value: value.into(),
            },
        ));
        self
    }

    /// Resolve all wiring and validate the model.
    ///
    /// # Errors
    ///
    /// Returns an error if names are invalid or duplicated, if any wiring
    /// names an unknown resource or endpoint, or if a connection string is
    /// requested from a resource without one.
    pub fn build(self) -> Result<DistributedApplication, AppHostError> {
        let Self {
            mut resources,
            wiring,
            forwarded_headers,
        } = self;

        for (i, resource) in resources.iter().enumerate() {
            if !is_valid_name(&resource.name) {
                return Err(AppHostError::InvalidName(resource.name.clone()));
            }
            if resources.iter().skip(i + 1).any(|r| r.name == resource.name) {
                return Err(AppHostError::DuplicateResource(resource.name.clone()));
            }
        }

        for (target, step) in wiring {
            let index = position(&resources, &target, BUILDER)?;
            let env = match step {
                Wiring::ExternalHttpEndpoints => {
                    let resource = resources.get_mut(index).ok_or_else(|| unknown(BUILDER, &target))?;
                    for endpoint in &mut resource.endpoints {
                        if matches!(endpoint.scheme, Scheme::Http | Scheme::Https) {
                            endpoint.external = true;
                        }
                    }
                    continue;
                }
                Wiring::Environment { key, value } => vec![(key, value)],
                Wiring::Reference { source } => {
                    let source = resources
                        .get(position(&resources, &source, &target)?)
                        .ok_or_else(|| unknown(&target, &source))?;
                    reference_env(source)
                }
            };

            let resource = resources.get_mut(index).ok_or_else(|| unknown(BUILDER, &target))?;
            if !resource.kind.is_runnable() {
                return Err(AppHostError::NotRunnable(target));
            }
            for (key, value) in env {
                resource.set_env(key, value);
            }
        }

        if forwarded_headers {
            for resource in &mut resources {
                if matches!(resource.kind, ResourceKind::Project { .. }) {
                    resource.set_env(FORWARDED_HEADERS_ENV, "true".into());
                }
            }
        }

        for resource in &resources {
            if let ResourceKind::Database { server, .. } = &resource.kind {
                position(&resources, server, &resource.name)?;
            }
            for (_, value) in &resource.env {
                validate_value(&resources, &resource.name, value)?;
            }
        }

        debug!(resources = resources.len(), "Application model built");
        Ok(DistributedApplication { resources })
    }
}

/// Environment a reference to `source` contributes.
fn reference_env(source: &Resource) -> Vec<(String, EnvValue)> {
    if source.kind.has_connection_string() {
        return vec![(
            format!("ConnectionStrings__{}", source.name),
            EnvValue::ConnectionString(source.name.clone()),
        )];
    }

    source
        .endpoints
        .iter()
        .map(|endpoint| {
            (
                format!("services__{}__{}__0", source.name, endpoint.name),
                EnvValue::Endpoint(EndpointReference::new(source.name.clone(), endpoint.name.clone())),
            )
        })
        .collect()
}

fn validate_value(
    resources: &[Resource],
    referenced_by: &str,
    value: &EnvValue,
) -> Result<(), AppHostError> {
    let Some(name) = value.referenced_resource() else {
        return Ok(());
    };
    let resource = resources
        .iter()
        .find(|r| r.name == name)
        .ok_or_else(|| unknown(referenced_by, name))?;

    match value {
        EnvValue::Endpoint(reference) if resource.endpoint(&reference.endpoint).is_none() => {
            Err(AppHostError::UnknownEndpoint {
                referenced_by: referenced_by.to_string(),
                resource: reference.resource.clone(),
                endpoint: reference.endpoint.clone(),
            })
        }
        EnvValue::ConnectionString(_) if !resource.kind.has_connection_string() => {
            Err(AppHostError::NoConnectionString(resource.name.clone()))
        }
        EnvValue::Parameter(_) if !matches!(resource.kind, ResourceKind::Parameter { .. }) => {
            Err(unknown(referenced_by, name))
        }
        _ => Ok(()),
    }
}

fn position(resources: &[Resource], name: &str, referenced_by: &str) -> Result<usize, AppHostError> {
    resources
        .iter()
        .position(|r| r.name == name)
        .ok_or_else(|| unknown(referenced_by, name))
}

fn unknown(referenced_by: &str, name: &str) -> AppHostError {
    AppHostError::UnknownResource {
        referenced_by: referenced_by.to_string(),
        name: name.to_string(),
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_lowercase())
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !name.ends_with('-')
}

/// A fully wired and validated application model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistributedApplication {
    resources: Vec<Resource>,
}

impl DistributedApplication {
    /// Resources in declaration order.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    #[must_use]
    pub fn resource(&self, name: &str) -> Option<&Resource> {
        self.resources.iter().find(|r| r.name == name)
    }
}

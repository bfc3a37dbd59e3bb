//! The eShop application topology.
//!
//! One `PostgreSQL` server with the identity and ordering databases, the
//! identity, ordering and web services, and the environment that links
//! them. Identity needs every client's callback URL, so identity and its
//! clients reference each other.

use tracing::info;

use crate::builder::{DistributedApplication, DistributedApplicationBuilder};
use crate::error::AppHostError;
use crate::model::AzureOpenAiDeployment;

pub const POSTGRES_IMAGE: &str = "ankane/pgvector";
pub const POSTGRES_TAG: &str = "latest";

pub const OPENAI_NAME: &str = "openai";
pub const CHAT_MODEL_NAME: &str = "gpt-35-turbo-16k";
pub const TEXT_EMBEDDING_NAME: &str = "text-embedding-ada-002";

/// Environment variable that forces plain HTTP endpoints when set to `1`.
pub const USE_HTTP_ENDPOINTS_ENV: &str = "ESHOP_USE_HTTP_ENDPOINTS";

/// How the `OpenAI` dependency is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAiSource {
    /// An existing account, given as the `openai` connection string.
    ConnectionString,
    /// An Azure `OpenAI` account provisioned with the chat and embedding
    /// deployments.
    Azure,
}

/// Deployment switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EshopOptions {
    pub use_http_endpoints: bool,
    pub openai: Option<OpenAiSource>,
}

impl EshopOptions {
    /// Launch profile for the externally reachable services.
    #[must_use]
    pub const fn launch_profile(&self) -> &'static str {
        if self.use_http_endpoints { "http" } else { "https" }
    }
}

/// Whether `ESHOP_USE_HTTP_ENDPOINTS` asks for plain HTTP.
///
/// Only a value that parses as the integer `1` counts.
#[must_use]
pub fn should_use_http_endpoints(value: Option<&str>) -> bool {
    value.and_then(|v| v.trim().parse::<i32>().ok()) == Some(1)
}

/// Declare and build the eShop application.
///
/// # Errors
///
/// Returns an error if the declared wiring does not resolve.
pub fn eshop(options: EshopOptions) -> Result<DistributedApplication, AppHostError> {
    let profile = options.launch_profile();
    let mut builder = DistributedApplicationBuilder::new();
    builder.with_forwarded_headers();

    let postgres = builder.add_postgres("postgres", POSTGRES_IMAGE, POSTGRES_TAG);
    let identity_db = builder.add_database(&postgres, "identitydb");
    let order_db = builder.add_database(&postgres, "orderingdb");

    let identity_api =
        builder.add_project("identity-api", "services/identity-api", Some(profile));
    builder
        .with_external_http_endpoints(&identity_api)
        .with_reference(&identity_api, &identity_db);
    let identity_endpoint = identity_api.endpoint(profile);

    let ordering_api = builder.add_project("ordering-api", "crates/ordering-api", None);
    builder
        .with_reference(&ordering_api, &order_db)
        .with_environment(&ordering_api, "Identity__Url", identity_endpoint.clone());

    let webapp = builder.add_project("webapp", "crates/webapp", Some(profile));
    builder
        .with_external_http_endpoints(&webapp)
        .with_reference(&webapp, &ordering_api)
        .with_environment(&webapp, "IdentityUrl", identity_endpoint);

    if let Some(source) = options.openai {
        let openai = match source {
            OpenAiSource::ConnectionString => builder.add_connection_string(OPENAI_NAME),
            OpenAiSource::Azure => builder.add_azure_openai(
                OPENAI_NAME,
                vec![
                    AzureOpenAiDeployment::new(CHAT_MODEL_NAME, "gpt-35-turbo", "0613"),
                    AzureOpenAiDeployment::new(
                        TEXT_EMBEDDING_NAME,
                        "text-embedding-ada-002",
                        "2",
                    ),
                ],
            ),
        };
        builder
            .with_reference(&webapp, &openai)
            .with_environment(&webapp, "AI__OPENAI__CHATMODEL", CHAT_MODEL_NAME);
    }

    // Self-referencing callback
    builder.with_environment(&webapp, "CallBackUrl", webapp.endpoint(profile));

    builder
        .with_environment(&identity_api, "OrderingApiClient", ordering_api.endpoint("http"))
        .with_environment(&identity_api, "WebAppClient", webapp.endpoint(profile));

    let app = builder.build()?;
    info!(
        launch_profile = profile,
        openai = ?options.openai,
        resources = app.resources().len(),
        "eShop application model built"
    );
    Ok(app)
}

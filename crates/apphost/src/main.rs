//! eShop AppHost CLI - publishes the deployment manifest.
//!
//! # Usage
//!
//! ```bash
//! # JSON manifest on stdout
//! eshop-apphost manifest
//!
//! # YAML manifest with an Azure OpenAI account, written to a file
//! eshop-apphost manifest --format yaml --use-openai -o manifest.yaml
//!
//! # Use an existing OpenAI account instead
//! ConnectionStrings__openai="Key=..." eshop-apphost manifest --use-openai
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use eshop_apphost::topology::USE_HTTP_ENDPOINTS_ENV;
use eshop_apphost::{EshopOptions, ManifestFormat, OpenAiSource, eshop, should_use_http_endpoints};

#[derive(Parser)]
#[command(name = "eshop-apphost")]
#[command(author, version, about = "eShop distributed application host")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the application model and publish its manifest
    Manifest {
        /// Output format (`json` or `yaml`)
        #[arg(short, long, default_value = "json")]
        format: ManifestFormat,

        /// Wire an `OpenAI` account into the web app
        #[arg(long)]
        use_openai: bool,

        /// Existing `OpenAI` connection string; without it an Azure account
        /// is provisioned
        #[arg(long, env = "ConnectionStrings__openai", hide_env_values = true)]
        openai_connection_string: Option<String>,

        /// Write the manifest to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() {
    dotenvy::dotenv().ok();

    // Logs go to stderr; stdout carries the manifest
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "eshop_apphost=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Manifest {
            format,
            use_openai,
            openai_connection_string,
            output,
        } => {
            let options = EshopOptions {
                use_http_endpoints: should_use_http_endpoints(
                    std::env::var(USE_HTTP_ENDPOINTS_ENV).ok().as_deref(),
                ),
                openai: use_openai.then(|| {
                    if openai_connection_string.is_some() {
                        OpenAiSource::ConnectionString
                    } else {
                        OpenAiSource::Azure
                    }
                }),
            };

            let rendered = eshop(options)?.render(format)?;

            match output {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    tracing::info!(path = %path.display(), "Manifest written");
                }
                None => {
                    let mut stdout = std::io::stdout().lock();
                    stdout.write_all(rendered.as_bytes())?;
                    stdout.write_all(b"\n")?;
                }
            }
        }
    }
    Ok(())
}

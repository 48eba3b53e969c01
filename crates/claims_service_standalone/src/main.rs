use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Context};
use clap::Parser;
use claims_service::config::{load_sampling_config, DEFAULT_PAYLOAD_LIMIT};
use claims_service::shaper::ProcessSchema;
use claims_service::ServiceConfig;
use completion_client::{AzureOpenAIClient, ClientConfig};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug, Clone)]
#[command(name = "claims-service")]
#[command(about = "Insurance claims conversation service")]
#[command(version)]
struct Cli {
    /// Enable debug logging when RUST_LOG is not set
    #[arg(long, env = "DEBUG", default_value = "false")]
    debug: bool,

    /// Listen address
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "3000")]
    port: u16,

    /// Azure OpenAI resource endpoint, e.g. https://my-resource.openai.azure.com
    #[arg(long, env = "AZURE_OPENAI_API_ENDPOINT")]
    endpoint: String,

    #[arg(long, env = "AZURE_OPENAI_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Chat model deployment name
    #[arg(long, env = "AZURE_OPENAI_API_DEPLOYMENT")]
    deployment: String,

    #[arg(long, env = "AZURE_OPENAI_API_VERSION", default_value = "2024-02-01")]
    api_version: String,

    /// Directory searched first for prompt templates
    #[arg(long, env = "CLAIMS_PROMPTS_DIR")]
    prompts_dir: Option<PathBuf>,

    #[arg(long, env = "CLAIMS_WORKERS", default_value = "4")]
    workers: usize,

    /// Timeout for each completion request, in seconds
    #[arg(long, env = "CLAIMS_REQUEST_TIMEOUT_SECS", default_value = "60")]
    request_timeout_secs: u64,

    /// Maximum accepted request body, in bytes
    #[arg(long, env = "CLAIMS_PAYLOAD_LIMIT", default_value_t = DEFAULT_PAYLOAD_LIMIT)]
    payload_limit: usize,

    /// Comma separated top-level fields the /process result must contain
    #[arg(long, env = "CLAIMS_PROCESS_REQUIRED_FIELDS", default_value = "")]
    required_fields: String,
}

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_line_number(true)
                .with_file(false),
        )
        .init();
}

fn service_config(cli: &Cli) -> ServiceConfig {
    let mut config = ServiceConfig::new(cli.deployment.clone());
    config.host = cli.host.clone();
    config.port = cli.port;
    config.workers = cli.workers;
    config.payload_limit = cli.payload_limit;
    config.prompts_dir = cli.prompts_dir.clone();
    config.process_schema = ProcessSchema::from_list(&cli.required_fields);
    config.sampling = load_sampling_config();
    config
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    init_tracing(cli.debug);

    tracing::info!("Starting claims service on {}:{}", cli.host, cli.port);
    tracing::info!("  Endpoint: {}", cli.endpoint);
    tracing::info!("  Deployment: {}", cli.deployment);
    tracing::info!("  API version: {}", cli.api_version);

    let client_config = ClientConfig::new(cli.endpoint.clone(), cli.api_key.clone())
        .with_api_version(cli.api_version.clone())
        .with_timeout(Duration::from_secs(cli.request_timeout_secs));
    let client = AzureOpenAIClient::new(client_config)
        .context("Failed to create completion client")?;

    let config = service_config(&cli);
    tracing::debug!(
        sampling = ?config.sampling,
        required_fields = ?config.process_schema.required_fields(),
        "Service configuration"
    );

    claims_service::server::run(Arc::new(client), config)
        .await
        .map_err(|e| anyhow!(e))
}

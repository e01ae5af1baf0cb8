//! OAuth 2.0 Authorization Server - Entry Point

use std::sync::Arc;

use clap::Parser;

use oauth2_codeflow::config::{Config, defaults};
use oauth2_codeflow::server::AuthServer;
use oauth2_codeflow::server::oauth::{KeyMaterial, RegisteredClient, ResourceOwner};
use oauth2_codeflow::telemetry;

#[derive(Parser, Debug)]
#[command(name = "codeflow-server")]
#[command(about = "Minimal OAuth 2.0 authorization code server")]
#[command(version)]
struct Cli {
    /// HTTP server port
    #[arg(long, default_value_t = defaults::PORT, env = "PORT")]
    port: u16,

    /// Public base URL used in discovery metadata (e.g., https://auth.example.com)
    #[arg(long, env = "BASE_URL")]
    base_url: Option<String>,

    /// Registered client identifier
    #[arg(long, default_value = defaults::CLIENT_ID, env = "CLIENT_ID")]
    client_id: String,

    /// Registered client secret
    #[arg(long, default_value = defaults::CLIENT_SECRET, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Subject of the resource owner tokens are issued for
    #[arg(long, default_value = defaults::OWNER_SUBJECT, env = "RESOURCE_OWNER_SUB")]
    owner_sub: String,

    /// Display name of the resource owner
    #[arg(long, default_value = defaults::OWNER_NAME, env = "RESOURCE_OWNER_NAME")]
    owner_name: String,

    /// Email of the resource owner
    #[arg(long, default_value = defaults::OWNER_EMAIL, env = "RESOURCE_OWNER_EMAIL")]
    owner_email: String,

    /// Reject authorization codes older than this many seconds (0 = never expire)
    #[arg(long, default_value_t = 0, env = "CODE_TTL_SECS")]
    code_ttl_secs: u64,

    /// Verify the signed expiry of bearer tokens on every protected request
    #[arg(long, env = "ENFORCE_TOKEN_EXPIRY")]
    enforce_token_expiry: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

impl Cli {
    fn into_config(self) -> Config {
        let mut config = Config::new(RegisteredClient::new(self.client_id, self.client_secret))
            .with_code_ttl_secs(self.code_ttl_secs);
        config.port = self.port;
        config.base_url = self.base_url;
        config.resource_owner = ResourceOwner {
            subject: self.owner_sub,
            name: self.owner_name,
            email: self.owner_email,
        };
        config.enforce_token_expiry = self.enforce_token_expiry;
        config
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    telemetry::init_tracing(&cli.log_level, cli.json_logs);

    let config = cli.into_config();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        port = config.port,
        client_id = %config.client.client_id,
        code_ttl = ?config.code_ttl,
        enforce_token_expiry = config.enforce_token_expiry,
        "Starting OAuth 2.0 authorization server"
    );

    let keys = tokio::task::spawn_blocking(KeyMaterial::generate).await??;
    tracing::info!(key_id = %keys.key_id(), "Generated RSA signing key");

    AuthServer::new(&config, Arc::new(keys)).run_http().await
}

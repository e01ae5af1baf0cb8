//! OAuth 2.0 Authorization Code Client - Entry Point
//!
//! Prints the authorization URL, reads the code (or the whole redirect URL)
//! from stdin, exchanges it, and prints the resulting user info.

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use oauth2_codeflow::CodeFlowClient;
use oauth2_codeflow::config::{ClientConfig, defaults};
use oauth2_codeflow::telemetry;

#[derive(Parser, Debug)]
#[command(name = "codeflow-client")]
#[command(about = "Drive the OAuth 2.0 authorization code flow against codeflow-server")]
#[command(version)]
struct Cli {
    /// OAuth2 client ID
    #[arg(long, default_value = defaults::CLIENT_ID, env = "CLIENT_ID")]
    client_id: String,

    /// OAuth2 client secret
    #[arg(long, default_value = defaults::CLIENT_SECRET, env = "CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// OAuth2 authorization server URL
    #[arg(long, default_value = defaults::AUTH_SERVER_URL, env = "AUTH_SERVER")]
    auth_server: String,

    /// Redirect URI sent with the authorization request
    #[arg(long, default_value = defaults::REDIRECT_URI)]
    redirect_uri: String,

    /// State value to send (random when omitted)
    #[arg(long)]
    state: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn", env = "RUST_LOG")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    telemetry::init_tracing(&cli.log_level, cli.json_logs);

    let config = ClientConfig::new(cli.client_id, cli.client_secret)
        .with_auth_server(cli.auth_server)
        .with_redirect_uri(cli.redirect_uri);
    let client = CodeFlowClient::new(config)?;

    let state = cli.state.unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string());
    let auth_url = client.authorization_url(&state)?;

    println!("Please visit this URL to authorize the application: {auth_url}");

    let mut stdout = tokio::io::stdout();
    stdout.write_all(b"Enter the authorization code (or the full redirect URL): ").await?;
    stdout.flush().await?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let input = lines.next_line().await?.context("No input on stdin")?;
    let code = CodeFlowClient::parse_callback(&input, &state)?;

    let token = client
        .exchange_code(&code)
        .await
        .context("Unable to exchange code for token")?;

    println!("Access Token: {}", token.access_token);

    let user_info = client
        .user_info(&token.access_token)
        .await
        .context("Unable to get user info")?;

    println!("User Info: {}", serde_json::to_string_pretty(&user_info)?);

    Ok(())
}

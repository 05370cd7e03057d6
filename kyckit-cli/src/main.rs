//! `kyckit`: developer CLI for exercising the onboarding backend from a terminal.
//!
//! The session is persisted under `--data-dir` (default: the platform data
//! directory), so `login` once and later commands reuse the token.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use eyre::{eyre, Result, WrapErr};
use kyckit_core::api::ApiEnvelope;
use kyckit_core::kyc::KycStep;
use kyckit_core::storage::FileBackend;
use kyckit_core::{ClientConfig, Environment, KycClient, KycKitError, LoginRequest};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kyckit", version, about = "KYC onboarding client CLI")]
struct Cli {
    /// Backend deployment.
    #[arg(long, global = true, default_value = "staging")]
    env: Environment,

    /// Backend base URL, overrides `--env`.
    #[arg(long, global = true, env = "KYCKIT_API_URL")]
    base_url: Option<String>,

    /// Directory holding the persisted session.
    #[arg(long, global = true, env = "KYCKIT_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Print `{success, data?, message?, type?}` instead of the bare output.
    #[arg(long, global = true)]
    envelope: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in and persist the session.
    Login {
        /// Account email.
        #[arg(long)]
        email: String,
        /// Account password.
        #[arg(long, env = "KYCKIT_PASSWORD")]
        password: String,
    },
    /// Log out and clear the local session.
    Logout,
    /// Print the signed-in user.
    Whoami {
        /// Refresh the profile from the backend.
        #[arg(long)]
        remote: bool,
    },
    /// Print the KYC status, falling back to the last known one offline.
    KycStatus,
    /// Print the local KYC progress.
    Progress,
    /// Mark a KYC step as completed.
    CompleteStep {
        /// Step name, e.g. `profile_setup`.
        step: KycStep,
    },
    /// Discard local KYC progress.
    ResetProgress,
    /// Print the user's settings.
    Settings,
    /// Check the backend health endpoint.
    Health,
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        self.base_url.as_ref().map_or_else(
            || ClientConfig::from_environment(self.env),
            ClientConfig::with_base_url,
        )
    }

    fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        dirs::data_dir()
            .map(|dir| dir.join("kyckit"))
            .ok_or_else(|| eyre!("no data directory on this platform, pass --data-dir"))
    }

    fn client(&self) -> Result<KycClient> {
        let dir = self.data_dir()?;
        let backend = FileBackend::open(&dir)
            .wrap_err_with(|| format!("failed to open session store at {}", dir.display()))?;
        tracing::debug!(data_dir = %dir.display(), "session store opened");
        Ok(KycClient::new(self.client_config(), Arc::new(backend)))
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn to_output<T: serde::Serialize>(value: &T) -> Result<Value, KycKitError> {
    serde_json::to_value(value)
        .map_err(|err| KycKitError::invalid_input(format!("unprintable output: {err}")))
}

/// Runs `command`, returning its printable output (`null` for none).
async fn execute(client: &KycClient, command: Command) -> Result<Value, KycKitError> {
    match command {
        Command::Login { email, password } => {
            let session = client
                .auth()
                .login(LoginRequest { email, password })
                .await?;
            tracing::info!(user = %session.user.id, "logged in");
            to_output(&session.user)
        }
        Command::Logout => {
            client.auth().logout().await?;
            tracing::info!("logged out");
            Ok(Value::Null)
        }
        Command::Whoami { remote } => {
            let user = if remote {
                Some(client.auth().current_user().await?)
            } else {
                client.sessions().user()
            };
            match user {
                Some(user) => to_output(&user),
                None => Err(KycKitError::State {
                    message: "not logged in".to_string(),
                }),
            }
        }
        Command::KycStatus => to_output(&client.kyc().status().await?),
        Command::Progress => to_output(&client.flow().progress()),
        Command::CompleteStep { step } => to_output(&client.flow().complete_step(step)?),
        Command::ResetProgress => {
            client.flow().reset()?;
            tracing::info!("kyc progress reset");
            Ok(Value::Null)
        }
        Command::Settings => to_output(&client.user().settings().await?),
        Command::Health => to_output(&client.api().health().await?),
    }
}

async fn run(cli: Cli) -> Result<()> {
    let client = cli.client()?;
    let result = execute(&client, cli.command).await;

    if cli.envelope {
        let envelope = ApiEnvelope::from_result(result);
        print_json(&envelope)?;
        if !envelope.success {
            return Err(eyre!("command failed"));
        }
        return Ok(());
    }

    let output = result?;
    if !output.is_null() {
        print_json(&output)?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,kyckit=info,kyckit_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse()).await
}

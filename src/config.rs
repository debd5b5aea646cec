//! Command-line and environment configuration.

use crate::functions::FunctionsSettings;
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;
use url::Url;
use yup_oauth2::ServiceAccountKey;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read service account key {path}: {source}")]
    ServiceAccountKey {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Project ID is missing: set --project-id or use a key that carries one")]
    ProjectIdMissing,
    #[error("Invalid listen address: {0}")]
    InvalidAddress(#[from] std::net::AddrParseError),
}

/// Clinic functions server.
#[derive(Parser, Debug, Clone)]
#[command(name = "clinic-functions", version, about)]
pub struct Config {
    /// Address to listen on.
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// Path to the service account JSON key.
    #[arg(long, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    pub credentials: PathBuf,

    /// Overrides the project ID from the service account key.
    #[arg(long, env = "GOOGLE_CLOUD_PROJECT")]
    pub project_id: Option<String>,

    /// Lets an unauthenticated caller create the first super admin.
    #[arg(long, env = "SUPER_ADMIN_BOOTSTRAP_TOKEN", hide_env_values = true)]
    pub bootstrap_token: Option<String>,

    /// Shared secret the account-creation trigger must present.
    #[arg(long, env = "TRIGGER_SECRET", hide_env_values = true)]
    pub trigger_secret: Option<String>,

    /// Continue URL embedded in email verification links.
    #[arg(long, env = "VERIFICATION_CONTINUE_URL")]
    pub verification_continue_url: Option<Url>,

    /// Default log filter when RUST_LOG is unset.
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl Config {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }

    pub fn settings(&self) -> FunctionsSettings {
        FunctionsSettings::new(
            self.bootstrap_token.as_deref(),
            self.verification_continue_url.clone(),
        )
        .with_trigger_secret(self.trigger_secret.as_deref())
    }

    pub async fn load_service_account_key(&self) -> Result<ServiceAccountKey, ConfigError> {
        yup_oauth2::read_service_account_key(&self.credentials)
            .await
            .map_err(|source| ConfigError::ServiceAccountKey {
                path: self.credentials.clone(),
                source,
            })
    }

    /// The explicit `--project-id`, else the key's own project.
    pub fn project_id(&self, key: &ServiceAccountKey) -> Result<String, ConfigError> {
        self.project_id
            .clone()
            .or_else(|| key.project_id.clone())
            .filter(|id| !id.is_empty())
            .ok_or(ConfigError::ProjectIdMissing)
    }
}

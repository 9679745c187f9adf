//! Handles settings for the application.
//!
//! Values come, in increasing priority, from built-in defaults, the TOML file
//! passed with `--config` (`config/tally.toml` when omitted, and optional)
//! and `TALLY__SECTION__KEY` environment variables.

use std::{net::SocketAddr, path::PathBuf};

use chrono::Duration;
use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use server::MAX_TOKEN_TTL_HOURS;
use thiserror::Error;

const DEFAULT_CONFIG: &str = "config/tally.toml";

#[derive(Debug, Parser)]
#[command(name = "tally", about = "Shared expense tracker server")]
pub struct Cli {
    /// Path of the TOML configuration file.
    #[arg(long, env = "TALLY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("invalid server address \"{0}\"")]
    Address(String),
    #[error("identity.token_ttl_hours must be between 1 and {MAX_TOKEN_TTL_HOURS}, got {0}")]
    TokenTtl(i64),
}

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, Deserialize)]
pub struct Database {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub addr: String,
}

#[derive(Debug, Deserialize)]
pub struct Identity {
    /// Token signing secret. A random one is generated at start-up when unset.
    pub secret: Option<String>,
    pub token_ttl_hours: i64,
}

#[derive(Debug, Default, Deserialize)]
pub struct Splits {
    /// Reconciliation tolerance as a decimal amount, e.g. `"0.01"`.
    pub tolerance: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub database: Database,
    pub server: Server,
    pub identity: Identity,
    #[serde(default)]
    pub splits: Splits,
}

impl Settings {
    pub fn new(cli: &Cli) -> Result<Self, SettingsError> {
        let file = match &cli.config {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name(DEFAULT_CONFIG).required(false),
        };

        let settings: Settings = Config::builder()
            .set_default("app.level", "info")?
            .set_default("database.url", "sqlite:./tally.db?mode=rwc")?
            .set_default("server.addr", "127.0.0.1:3000")?
            .set_default("identity.token_ttl_hours", 24)?
            .add_source(file)
            .add_source(Environment::with_prefix("TALLY").separator("__"))
            .build()?
            .try_deserialize()?;

        settings.token_ttl()?;
        settings.server_addr()?;
        Ok(settings)
    }

    pub fn token_ttl(&self) -> Result<Duration, SettingsError> {
        let hours = self.identity.token_ttl_hours;
        if !(1..=MAX_TOKEN_TTL_HOURS).contains(&hours) {
            return Err(SettingsError::TokenTtl(hours));
        }
        Duration::try_hours(hours).ok_or(SettingsError::TokenTtl(hours))
    }

    pub fn server_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.server
            .addr
            .parse()
            .map_err(|_| SettingsError::Address(self.server.addr.clone()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_apply_without_a_file() {
        let cli = Cli { config: None };
        let settings = Settings::new(&cli).unwrap();
        assert_eq!(settings.identity.token_ttl_hours, 24);
        assert!(settings.identity.secret.is_none());
        assert_eq!(
            settings.server_addr().unwrap(),
            "127.0.0.1:3000".parse().unwrap()
        );
    }

    #[test]
    fn file_values_override_defaults() {
        let path = std::env::temp_dir().join(format!("tally-settings-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\naddr = \"0.0.0.0:8080\"\n\n[identity]\nsecret = \"s3cret\"\ntoken_ttl_hours = 2\n\n[splits]\ntolerance = \"0.05\""
        )
        .unwrap();

        let settings = Settings::new(&Cli {
            config: Some(path.clone()),
        })
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(settings.server.addr, "0.0.0.0:8080");
        assert_eq!(settings.identity.secret.as_deref(), Some("s3cret"));
        assert_eq!(settings.identity.token_ttl_hours, 2);
        assert_eq!(settings.splits.tolerance.as_deref(), Some("0.05"));
        assert_eq!(settings.app.level, "info");
    }

    #[test]
    fn token_ttl_must_stay_in_range() {
        let mut settings = Settings::new(&Cli { config: None }).unwrap();
        assert_eq!(settings.token_ttl().unwrap(), Duration::hours(24));

        for hours in [0, -3, MAX_TOKEN_TTL_HOURS + 1, 10_000_000_000] {
            settings.identity.token_ttl_hours = hours;
            assert!(matches!(
                settings.token_ttl(),
                Err(SettingsError::TokenTtl(h)) if h == hours
            ));
        }
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let cli = Cli {
            config: Some(PathBuf::from("/nonexistent/tally.toml")),
        };
        assert!(matches!(Settings::new(&cli), Err(SettingsError::Config(_))));
    }
}

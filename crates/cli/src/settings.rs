//! Effective run settings: command line over config file over defaults.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use pokecull_cells::DEFAULT_RADIUS;
use pokecull_core::SpeciesId;
use pokecull_infra::AuthService;
use pokecull_infra::config::{ConfigError, FileConfig};
use pokecull_inventory::{DEFAULT_RELEASE_DELAY, RetentionPolicy};
use pokecull_observability::{LogFormat, LogOptions};

use crate::args::Cli;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("missing required setting `{0}` (pass it on the command line or in the config file)")]
    Missing(&'static str),

    #[error("{0}")]
    Invalid(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("password prompt failed: {0}")]
    Prompt(String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub auth_service: AuthService,
    pub username: String,
    /// Absent only when `location_only` is set.
    pub password: Option<String>,
    pub location: String,
    pub location_only: bool,
    pub policy: RetentionPolicy,
    pub cell_radius: u32,
    pub dry_run: bool,
    pub scan_forts: bool,
    pub names: bool,
    /// `None` when snapshots are disabled.
    pub snapshot_dir: Option<PathBuf>,
    pub replay: Option<PathBuf>,
    pub log: LogOptions,
}

impl Settings {
    /// Merge `cli` over `file`. `prompt` is asked for the password only when
    /// neither source has one and the run goes past location resolution.
    pub fn resolve<F>(cli: Cli, file: Option<FileConfig>, prompt: F) -> Result<Self, SettingsError>
    where
        F: FnOnce() -> Result<String, SettingsError>,
    {
        let file = file.unwrap_or_default();

        let auth_service = cli
            .auth_service
            .or(file.auth_service)
            .ok_or(SettingsError::Missing("auth_service"))?
            .parse::<AuthService>()
            .map_err(|e| SettingsError::Invalid(e.to_string()))?;
        let username =
            non_empty(cli.username.or(file.username)).ok_or(SettingsError::Missing("username"))?;
        let location =
            non_empty(cli.location.or(file.location)).ok_or(SettingsError::Missing("location"))?;

        let password = match cli.password.or(file.password) {
            Some(password) => Some(password),
            None if cli.test => None,
            None => Some(prompt()?),
        };

        let blocked = if cli.blocked_species.is_empty() {
            file.blocked_species_ids.unwrap_or_default()
        } else {
            cli.blocked_species
        };
        let release_delay = match cli.release_delay.or(file.release_delay_secs) {
            Some(secs) => Duration::try_from_secs_f64(secs).map_err(|e| {
                SettingsError::Invalid(format!("release delay {secs}: {e}"))
            })?,
            None => DEFAULT_RELEASE_DELAY,
        };
        let policy = RetentionPolicy::new(cli.min_cp.or(file.minimum_combat_power).unwrap_or(0))
            .with_blocked_species(blocked.into_iter().map(SpeciesId::new))
            .with_release_delay(release_delay);

        let snapshot_dir = if cli.no_snapshot {
            None
        } else {
            Some(cli.snapshot_dir.unwrap_or_else(|| PathBuf::from(".")))
        };

        Ok(Self {
            auth_service,
            username,
            password,
            location,
            location_only: cli.test,
            policy,
            cell_radius: cli.radius.or(file.cell_radius).unwrap_or(DEFAULT_RADIUS),
            dry_run: cli.dry_run,
            scan_forts: cli.scan_forts,
            names: cli.names,
            snapshot_dir,
            replay: cli.replay,
            log: log_options(cli.debug, cli.log_json),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Logging options from the `--debug` / `--log-json` flags.
pub fn log_options(debug: bool, json: bool) -> LogOptions {
    LogOptions {
        debug,
        format: if json { LogFormat::Json } else { LogFormat::Text },
    }
}

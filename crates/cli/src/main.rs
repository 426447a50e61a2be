use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info, warn};

use pokecull_cli::settings::log_options;
use pokecull_cli::{Cli, Exit, RunError, Settings, SettingsError, locate, run_session};
use pokecull_infra::config::FileConfig;
use pokecull_infra::disposal::{CancelHandle, cancellation};
use pokecull_infra::geocode::NominatimGeocoder;
use pokecull_infra::pokedex::{PokedexClient, SpeciesNames, StaticNames};
use pokecull_infra::replay::ReplayClient;

fn main() -> ExitCode {
    let cli = Cli::parse();
    pokecull_observability::init_with(&log_options(cli.debug, cli.log_json));

    match execute(cli) {
        Ok(exit) => exit.into(),
        Err(e) => {
            error!(error = %e, "run aborted");
            e.exit().into()
        }
    }
}

fn execute(cli: Cli) -> Result<Exit, RunError> {
    let file = FileConfig::load(&cli.config).map_err(SettingsError::from)?;
    let settings = Settings::resolve(cli, file, prompt_password)?;

    let geocoder = NominatimGeocoder::new().map_err(|e| {
        RunError::Location(pokecull_core::DomainError::invalid_coordinate(e.to_string()))
    })?;
    let position = locate(&settings, &geocoder)?;
    if settings.location_only {
        return Ok(Exit::Success);
    }

    let Some(recording) = settings.replay.as_deref() else {
        return Err(SettingsError::Invalid(
            "no live protocol client is available; pass --replay FILE".to_string(),
        )
        .into());
    };
    let mut client = ReplayClient::from_path(recording)?;

    let (handle, mut pacer) = cancellation();
    if let Err(e) = install_interrupt_handler(handle) {
        warn!(error = %format!("{e:#}"), "continuing without Ctrl-C handling");
    }

    let names: Box<dyn SpeciesNames> = match settings.names.then(PokedexClient::new) {
        Some(Ok(client)) => Box::new(client),
        Some(Err(e)) => {
            warn!(error = %e, "species name lookup disabled");
            Box::new(StaticNames::default())
        }
        None => Box::new(StaticNames::default()),
    };

    let summary = run_session(&settings, position, &mut client, &mut pacer, names.as_ref())?;
    match summary.stats() {
        Some(stats) => info!(
            run_id = %summary.run_id,
            released = stats.released,
            failed = stats.failed,
            not_attempted = stats.not_attempted,
            "run complete"
        ),
        None if summary.cancelled => {
            warn!(run_id = %summary.run_id, "run cancelled before disposal")
        }
        None => info!(
            run_id = %summary.run_id,
            scheduled = summary.scheduled,
            "dry run complete"
        ),
    }
    Ok(summary.exit())
}

fn prompt_password() -> Result<String, SettingsError> {
    info!("Secure password input (if there is no prompt, use --password <pw>)");
    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| SettingsError::Prompt(e.to_string()))
}

fn install_interrupt_handler(handle: CancelHandle) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        warn!("interrupt received; stopping after the current call");
        handle.cancel();
    })
    .context("installing Ctrl-C handler")
}

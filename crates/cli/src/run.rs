//! One complete run: locate, log in, fetch, triage, release.

use std::ops::ControlFlow;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, info_span, warn};

use pokecull_cells::{CellWalk, generate_cell_walk};
use pokecull_core::{Coordinate, DomainError, RunId};
use pokecull_infra::client::{authenticate, fetch_player_and_inventory, player_name, release_item};
use pokecull_infra::disposal::{
    DisposalExecutor, DisposalExecutorConfig, DisposalReport, DisposalStats, Pacer,
};
use pokecull_infra::geocode::{Geocoder, resolve_location};
use pokecull_infra::map::{FortScan, scan_forts};
use pokecull_infra::pokedex::SpeciesNames;
use pokecull_infra::snapshot::{SnapshotError, SnapshotWriter};
use pokecull_infra::{ClientError, GameClient, Method};
use pokecull_inventory::{
    PayloadError, TriageOutcome, parse_inventory, raw_records_by_species, triage,
};

use crate::exit::Exit;
use crate::settings::{Settings, SettingsError};

/// Fatal failures; each aborts the run before any release call.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error("{0}")]
    Location(DomainError),

    #[error("{0}")]
    Authentication(DomainError),

    #[error("protocol error: {0}")]
    Protocol(#[from] ClientError),

    #[error("unusable inventory response: {0}")]
    Payload(#[from] PayloadError),

    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl RunError {
    pub fn exit(&self) -> Exit {
        match self {
            RunError::Settings(_) => Exit::Config,
            RunError::Location(_) => Exit::Location,
            RunError::Authentication(_) => Exit::Authentication,
            RunError::Protocol(_) | RunError::Payload(_) | RunError::Snapshot(_) => Exit::Protocol,
        }
    }
}

/// What a completed run did.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: RunId,
    pub position: Coordinate,
    pub cells: usize,
    pub player: Option<String>,
    pub items: usize,
    /// Creature records excluded as malformed.
    pub malformed: usize,
    pub scheduled: usize,
    pub retained: usize,
    pub fort_searched: Option<String>,
    /// `None` on dry runs and on runs cancelled before disposal.
    pub disposal: Option<DisposalReport>,
    /// A cancel signal stopped the run early.
    pub cancelled: bool,
}

impl RunSummary {
    pub fn stats(&self) -> Option<DisposalStats> {
        self.disposal.as_ref().map(DisposalReport::stats)
    }

    pub fn exit(&self) -> Exit {
        match &self.disposal {
            _ if self.cancelled => Exit::Cancelled,
            Some(report) if report.is_partial_failure() => Exit::PartialFailure,
            _ => Exit::Success,
        }
    }

    fn cancelled_before_inventory(run_id: RunId, position: Coordinate, cells: usize) -> Self {
        Self {
            run_id,
            position,
            cells,
            player: None,
            items: 0,
            malformed: 0,
            scheduled: 0,
            retained: 0,
            fort_searched: None,
            disposal: None,
            cancelled: true,
        }
    }
}

/// Resolve the configured location, before any protocol traffic.
pub fn locate<G: Geocoder + ?Sized>(
    settings: &Settings,
    geocoder: &G,
) -> Result<Coordinate, RunError> {
    let position = resolve_location(geocoder, &settings.location).map_err(RunError::Location)?;
    info!(location = %settings.location, %position, "position resolved");
    Ok(position)
}

/// Everything after location resolution.
pub fn run_session<C, P>(
    settings: &Settings,
    position: Coordinate,
    client: &mut C,
    pacer: &mut P,
    names: &dyn SpeciesNames,
) -> Result<RunSummary, RunError>
where
    C: GameClient + ?Sized,
    P: Pacer + ?Sized,
{
    let run_id = RunId::new();
    let _span = info_span!("run", %run_id).entered();
    let snapshots = settings.snapshot_dir.clone().map(SnapshotWriter::new);

    client.set_position(position);
    let password = settings.password.as_deref().unwrap_or_default();
    authenticate(client, settings.auth_service, &settings.username, password)
        .map_err(RunError::Authentication)?;

    let walk = generate_cell_walk(&position, settings.cell_radius);
    debug!(origin = %walk.origin().to_token(), cells = walk.len(), "cell walk generated");

    let fort_searched = if settings.scan_forts {
        match visit_fort(client, &position, &walk, pacer, snapshots.as_ref())? {
            ControlFlow::Continue(fort) => fort,
            ControlFlow::Break(()) => {
                warn!("cancelled during fort scan; inventory not fetched");
                return Ok(RunSummary::cancelled_before_inventory(run_id, position, walk.len()));
            }
        }
    } else {
        None
    };

    let responses = fetch_player_and_inventory(client)?;
    let player = player_name(&responses).map(str::to_string);
    let inventory = responses.require(Method::GetInventory)?;
    if let Some(writer) = &snapshots {
        writer.write_inventory(&responses)?;
        writer.write_groups(&raw_records_by_species(inventory)?)?;
    }

    let parsed = parse_inventory(inventory)?;
    for malformed in &parsed.warnings {
        warn!(error = %malformed.to_domain_error(), "inventory record excluded");
    }
    info!(
        items = parsed.items.len(),
        malformed = parsed.warnings.len(),
        ignored = parsed.ignored,
        "inventory parsed"
    );

    if settings.policy.is_permissive() {
        info!("retention policy keeps every item; nothing will be released");
    }
    let outcome = triage(&parsed.items, &settings.policy);
    log_outcome(&outcome, names, settings.names);

    let disposal = if settings.dry_run {
        for entry in &outcome.schedule {
            info!(
                item_id = %entry.item_id,
                species_id = %entry.species_id,
                cp = entry.combat_power,
                reason = %entry.reason,
                "would release"
            );
        }
        None
    } else {
        let executor = DisposalExecutor::new(DisposalExecutorConfig::from_policy(&settings.policy));
        Some(executor.run(&outcome.schedule, pacer, |entry| {
            release_item(client, entry.item_id)
                .map_err(|e| DomainError::disposal(entry.item_id.get(), e.to_string()))
        }))
    };

    Ok(RunSummary {
        run_id,
        position,
        cells: walk.len(),
        player,
        items: parsed.items.len(),
        malformed: parsed.warnings.len(),
        scheduled: outcome.schedule.len(),
        retained: outcome.retained.len(),
        fort_searched,
        cancelled: disposal.as_ref().is_some_and(|report| report.cancelled),
        disposal,
    })
}

/// `locate` then `run_session`; a location-only run stops after the first step.
pub fn run<C, G, P>(
    settings: &Settings,
    geocoder: &G,
    client: &mut C,
    pacer: &mut P,
    names: &dyn SpeciesNames,
) -> Result<Option<RunSummary>, RunError>
where
    C: GameClient + ?Sized,
    G: Geocoder + ?Sized,
    P: Pacer + ?Sized,
{
    let position = locate(settings, geocoder)?;
    if settings.location_only {
        return Ok(None);
    }
    run_session(settings, position, client, pacer, names).map(Some)
}

fn visit_fort<C, P>(
    client: &mut C,
    position: &Coordinate,
    walk: &CellWalk,
    pacer: &mut P,
    snapshots: Option<&SnapshotWriter>,
) -> Result<ControlFlow<(), Option<String>>, RunError>
where
    C: GameClient + ?Sized,
    P: Pacer + ?Sized,
{
    match scan_forts(client, position, walk, pacer)? {
        FortScan::Searched { fort, responses } => {
            if let Some(writer) = snapshots {
                writer.write_fort_search(&responses)?;
            }
            Ok(ControlFlow::Continue(Some(fort.id)))
        }
        FortScan::Cancelled { .. } => Ok(ControlFlow::Break(())),
        FortScan::NoFort => {
            info!("no enabled fort nearby");
            Ok(ControlFlow::Continue(None))
        }
    }
}

fn log_outcome(outcome: &TriageOutcome, names: &dyn SpeciesNames, lookup: bool) {
    for favorite in outcome.favorites() {
        let name = if lookup { names.name(favorite.species_id) } else { None };
        debug!(
            item_id = %favorite.item_id,
            species_id = %favorite.species_id,
            name = name.as_deref().unwrap_or("-"),
            "favorite kept"
        );
    }
    info!(
        species = outcome.groups.len(),
        items = outcome.groups.total_items(),
        scheduled = outcome.schedule.len(),
        retained = outcome.retained.len(),
        "triage finished"
    );
}

use std::cell::Cell;
use std::collections::HashSet;
use std::time::Duration;

use clap::Parser;
use serde_json::{Value, json};

use pokecull_cli::{Cli, Exit, RunError, RunSummary, Settings, run};
use pokecull_core::Coordinate;
use pokecull_infra::client::{AuthService, ClientError, GameClient, Method, RequestChain, Responses};
use pokecull_infra::disposal::{DisposalStatus, ManualPacer};
use pokecull_infra::geocode::{GeocodeError, Geocoder, ResolvedLocation};
use pokecull_infra::pokedex::StaticNames;

/// In-memory stand-in for the protocol client.
#[derive(Default)]
struct FakeClient {
    inventory: Value,
    reject_login: bool,
    failing_releases: HashSet<u64>,
    logged_in: bool,
    position: Option<Coordinate>,
    calls: Vec<(Method, Value)>,
}

impl FakeClient {
    fn with_inventory(items: Value) -> Self {
        Self {
            inventory: json!({ "success": true, "inventory_delta": { "inventory_items": items } }),
            ..Self::default()
        }
    }

    fn released(&self) -> Vec<u64> {
        self.calls
            .iter()
            .filter(|(m, _)| *m == Method::ReleasePokemon)
            .filter_map(|(_, p)| p["pokemon_id"].as_u64())
            .collect()
    }

    fn methods(&self) -> Vec<Method> {
        self.calls.iter().map(|(m, _)| *m).collect()
    }
}

impl GameClient for FakeClient {
    fn login(&mut self, _: AuthService, _: &str, _: &str) -> Result<(), ClientError> {
        if self.reject_login {
            return Err(ClientError::LoginRejected("invalid credentials".into()));
        }
        self.logged_in = true;
        Ok(())
    }

    fn set_position(&mut self, position: Coordinate) {
        self.position = Some(position);
    }

    fn call(&mut self, chain: RequestChain) -> Result<Responses, ClientError> {
        if !self.logged_in {
            return Err(ClientError::NotAuthenticated);
        }
        let mut bodies = Vec::new();
        for request in chain.requests() {
            self.calls.push((request.method, request.params.clone()));
            let body = match request.method {
                Method::GetPlayer => json!({ "player_data": { "username": "ash" } }),
                Method::GetInventory => self.inventory.clone(),
                Method::ReleasePokemon => {
                    let id = request.params["pokemon_id"].as_u64().unwrap_or_default();
                    if self.failing_releases.contains(&id) {
                        json!({ "result": 2 })
                    } else {
                        json!({ "result": 1 })
                    }
                }
                Method::GetMapObjects => json!({ "map_cells": [ { "forts": [
                    { "id": "fort-1", "latitude": 35.66, "longitude": 139.70, "enabled": true }
                ] } ] }),
                Method::FortDetails => {
                    json!({ "fort_id": "fort-1", "latitude": 35.66, "longitude": 139.70 })
                }
                Method::FortSearch => json!({ "result": 1 }),
            };
            bodies.push((request.method, body));
        }
        Ok(Responses::from_bodies(bodies))
    }
}

struct FakeGeocoder {
    found: bool,
    lookups: Cell<usize>,
}

impl FakeGeocoder {
    fn found() -> Self {
        Self {
            found: true,
            lookups: Cell::new(0),
        }
    }

    fn nothing() -> Self {
        Self {
            found: false,
            lookups: Cell::new(0),
        }
    }
}

impl Geocoder for FakeGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError> {
        self.lookups.set(self.lookups.get() + 1);
        if !self.found {
            return Ok(None);
        }
        Ok(Some(ResolvedLocation {
            address: query.to_string(),
            position: Coordinate::new(35.6595, 139.7005, None).expect("valid"),
        }))
    }
}

fn creature(id: u64, species: u32, cp: u32, favorite: bool) -> Value {
    let mut data = json!({ "id": id, "pokemon_id": species, "cp": cp });
    if favorite {
        data["favorite"] = json!(1);
    }
    json!({ "inventory_item_data": { "pokemon_data": data } })
}

fn scenario_items() -> Value {
    json!([
        creature(1, 41, 500, false),
        creature(2, 1, 100, false),
        { "inventory_item_data": { "item": { "item_id": 1, "count": 20 } } },
        creature(3, 1, 300, true),
        creature(4, 99, 120, false),
    ])
}

fn settings(extra: &[&str]) -> Settings {
    let base = [
        "pokecull",
        "-a",
        "ptc",
        "-u",
        "ash",
        "-p",
        "pikachu",
        "-l",
        "Shibuya",
        "--blocked-species",
        "41",
        "--min-cp",
        "150",
        "--no-snapshot",
    ];
    let cli = Cli::try_parse_from(base.iter().chain(extra.iter()).copied()).expect("valid args");
    Settings::resolve(cli, None, || panic!("no prompt expected")).expect("valid settings")
}

fn run_with(
    settings: &Settings,
    geocoder: &FakeGeocoder,
    client: &mut FakeClient,
    pacer: &mut ManualPacer,
) -> Result<Option<RunSummary>, RunError> {
    run(settings, geocoder, client, pacer, &StaticNames::default())
}

#[test]
fn releases_scheduled_items_in_order_with_delay() {
    let mut client = FakeClient::with_inventory(scenario_items());
    let mut pacer = ManualPacer::new();

    let summary = run_with(&settings(&[]), &FakeGeocoder::found(), &mut client, &mut pacer)
        .expect("run succeeds")
        .expect("full run");

    assert_eq!(client.released(), vec![1, 2, 4]);
    assert_eq!(pacer.waits(), &[Duration::from_secs(3), Duration::from_secs(3)]);
    assert_eq!(summary.items, 4);
    assert_eq!(summary.retained, 1);
    assert_eq!(summary.cells, 21);
    assert_eq!(summary.player.as_deref(), Some("ash"));
    assert_eq!(summary.exit(), Exit::Success);
    assert!(client.position.is_some());
    assert_eq!(&client.methods()[..2], &[Method::GetPlayer, Method::GetInventory]);
}

#[test]
fn malformed_item_is_skipped_and_later_items_processed() {
    let items = json!([
        { "inventory_item_data": { "pokemon_data": { "id": 7, "pokemon_id": 16 } } },
        creature(8, 16, 10, false),
    ]);
    let mut client = FakeClient::with_inventory(items);
    let mut pacer = ManualPacer::new();

    let summary = run_with(&settings(&[]), &FakeGeocoder::found(), &mut client, &mut pacer)
        .unwrap()
        .unwrap();

    assert_eq!(summary.malformed, 1);
    assert_eq!(client.released(), vec![8]);
}

#[test]
fn rejected_login_aborts_before_any_call() {
    let mut client = FakeClient {
        reject_login: true,
        ..FakeClient::with_inventory(scenario_items())
    };
    let mut pacer = ManualPacer::new();

    let err = run_with(&settings(&[]), &FakeGeocoder::found(), &mut client, &mut pacer)
        .unwrap_err();

    assert!(matches!(err, RunError::Authentication(_)));
    assert_eq!(err.exit(), Exit::Authentication);
    assert!(client.calls.is_empty());
}

#[test]
fn unknown_location_aborts_before_login() {
    let mut client = FakeClient::with_inventory(scenario_items());
    let mut pacer = ManualPacer::new();

    let err = run_with(&settings(&[]), &FakeGeocoder::nothing(), &mut client, &mut pacer)
        .unwrap_err();

    assert_eq!(err.exit(), Exit::Location);
    assert!(!client.logged_in);
    assert!(client.position.is_none());
}

#[test]
fn failed_release_continues_and_reports_partial_failure() {
    let mut client = FakeClient {
        failing_releases: HashSet::from([2]),
        ..FakeClient::with_inventory(scenario_items())
    };
    let mut pacer = ManualPacer::new();

    let summary = run_with(&settings(&[]), &FakeGeocoder::found(), &mut client, &mut pacer)
        .unwrap()
        .unwrap();

    assert_eq!(client.released(), vec![1, 2, 4]);
    let report = summary.disposal.as_ref().unwrap();
    assert!(matches!(report.records[1].status, DisposalStatus::Failed { .. }));
    assert_eq!(report.released().count(), 2);
    // Only the successful call before item 2 is followed by a delay.
    assert_eq!(pacer.waits(), &[Duration::from_secs(3)]);
    assert_eq!(summary.exit(), Exit::PartialFailure);
}

#[test]
fn cancellation_stops_before_next_release() {
    let mut client = FakeClient::with_inventory(scenario_items());
    let mut pacer = ManualPacer::new().cancel_on_wait(1);

    let summary = run_with(&settings(&[]), &FakeGeocoder::found(), &mut client, &mut pacer)
        .unwrap()
        .unwrap();

    assert_eq!(client.released(), vec![1]);
    let stats = summary.stats().unwrap();
    assert_eq!(stats.not_attempted, 2);
    assert_eq!(summary.exit(), Exit::Cancelled);
}

#[test]
fn dry_run_releases_nothing() {
    let mut client = FakeClient::with_inventory(scenario_items());
    let mut pacer = ManualPacer::new();

    let summary = run_with(
        &settings(&["--dry-run"]),
        &FakeGeocoder::found(),
        &mut client,
        &mut pacer,
    )
    .unwrap()
    .unwrap();

    assert_eq!(summary.scheduled, 3);
    assert!(summary.disposal.is_none());
    assert!(client.released().is_empty());
    assert!(pacer.waits().is_empty());
}

#[test]
fn location_only_run_never_logs_in() {
    let mut client = FakeClient::with_inventory(scenario_items());
    let mut pacer = ManualPacer::new();
    let geocoder = FakeGeocoder::found();

    let result = run_with(&settings(&["-t"]), &geocoder, &mut client, &mut pacer).unwrap();

    assert!(result.is_none());
    assert_eq!(geocoder.lookups.get(), 1);
    assert!(!client.logged_in);
}

#[test]
fn fort_scan_precedes_inventory_fetch() {
    let mut client = FakeClient::with_inventory(json!([]));
    let mut pacer = ManualPacer::new();

    let summary = run_with(
        &settings(&["--scan-forts", "--radius", "3"]),
        &FakeGeocoder::found(),
        &mut client,
        &mut pacer,
    )
    .unwrap()
    .unwrap();

    assert_eq!(summary.fort_searched.as_deref(), Some("fort-1"));
    assert_eq!(
        client.methods(),
        vec![
            Method::GetMapObjects,
            Method::FortDetails,
            Method::FortSearch,
            Method::GetPlayer,
            Method::GetInventory
        ]
    );
    assert_eq!(client.calls[0].1["cell_id"].as_array().map(Vec::len), Some(7));
    assert_eq!(pacer.waits(), &[Duration::from_secs(1)]);
}

#[test]
fn cancel_during_fort_scan_stops_before_inventory_fetch() {
    let mut client = FakeClient::with_inventory(json!([]));
    let mut pacer = ManualPacer::new().cancel_on_wait(1);

    let summary = run_with(
        &settings(&["--scan-forts", "--dry-run"]),
        &FakeGeocoder::found(),
        &mut client,
        &mut pacer,
    )
    .unwrap()
    .unwrap();

    assert_eq!(client.methods(), vec![Method::GetMapObjects, Method::FortDetails]);
    assert!(summary.cancelled);
    assert_eq!(summary.fort_searched, None);
    assert_eq!(summary.exit(), Exit::Cancelled);
}

#[test]
fn snapshots_are_written_when_enabled() {
    let dir = tempfile::tempdir().unwrap();
    let dir_arg = dir.path().to_str().unwrap().to_string();
    let cli = Cli::try_parse_from([
        "pokecull",
        "-a",
        "ptc",
        "-u",
        "ash",
        "-p",
        "x",
        "-l",
        "35.0, 139.0",
        "--snapshot-dir",
        &dir_arg,
    ])
    .unwrap();
    let settings = Settings::resolve(cli, None, || panic!("no prompt expected")).unwrap();
    let mut client = FakeClient::with_inventory(scenario_items());
    let mut pacer = ManualPacer::new();
    let geocoder = FakeGeocoder::found();

    run_with(&settings, &geocoder, &mut client, &mut pacer)
        .unwrap()
        .unwrap();

    assert_eq!(geocoder.lookups.get(), 0);
    let text = std::fs::read_to_string(dir.path().join("pokemons.json")).unwrap();
    let groups: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(groups["1"].as_array().unwrap().len(), 2);
    assert_eq!(groups["1"][1]["favorite"], 1);
    assert!(text.find("\"1\"").unwrap() < text.find("\"41\"").unwrap());
    assert!(text.find("\"41\"").unwrap() < text.find("\"99\"").unwrap());
    assert!(dir.path().join("inventory.json").exists());
}

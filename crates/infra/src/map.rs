//! Area query over a cell walk, and the fort visit that can follow it.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use pokecull_cells::CellWalk;
use pokecull_core::Coordinate;

use crate::client::{ClientError, GameClient, Method, RequestChain, Responses};
use crate::disposal::{Pace, Pacer};

/// Pause between the fort details lookup and the search call.
pub const FORT_SEARCH_DELAY: Duration = Duration::from_secs(1);

/// Parameters of a `GET_MAP_OBJECTS` sub-request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapQuery {
    pub latitude: f64,
    pub longitude: f64,
    /// One entry per cell; all zero means "everything".
    pub since_timestamp_ms: Vec<u64>,
    pub cell_id: Vec<u64>,
}

impl MapQuery {
    pub fn around(position: &Coordinate, walk: &CellWalk) -> Self {
        let cell_id = walk.ids();
        Self {
            latitude: position.latitude(),
            longitude: position.longitude(),
            since_timestamp_ms: vec![0; cell_id.len()],
            cell_id,
        }
    }

    pub fn to_params(&self) -> Value {
        json!({
            "latitude": self.latitude,
            "longitude": self.longitude,
            "since_timestamp_ms": self.since_timestamp_ms,
            "cell_id": self.cell_id,
        })
    }
}

impl RequestChain {
    pub fn get_map_objects(self, query: &MapQuery) -> Self {
        self.add(Method::GetMapObjects, query.to_params())
    }

    pub fn fort_details(self, fort: &Fort) -> Self {
        self.add(
            Method::FortDetails,
            json!({
                "fort_id": fort.id,
                "latitude": fort.latitude,
                "longitude": fort.longitude,
            }),
        )
    }

    /// Player position is sent as the raw bit pattern of each float.
    pub fn fort_search(self, fort: &Fort, player: &Coordinate) -> Self {
        self.add(
            Method::FortSearch,
            json!({
                "fort_id": fort.id,
                "fort_latitude": fort.latitude,
                "fort_longitude": fort.longitude,
                "player_latitude": f2i(player.latitude()),
                "player_longitude": f2i(player.longitude()),
            }),
        )
    }
}

/// IEEE-754 bit pattern of `value`, as the protocol expects for some fields.
pub fn f2i(value: f64) -> u64 {
    value.to_bits()
}

/// A fort listed in a map cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fort {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub enabled: bool,
}

/// Forts from a `GET_MAP_OBJECTS` body, in cell order. Malformed entries are skipped.
pub fn parse_forts(body: &Value) -> Vec<Fort> {
    let Some(cells) = body.get("map_cells").and_then(Value::as_array) else {
        return Vec::new();
    };
    cells
        .iter()
        .filter_map(|cell| cell.get("forts").and_then(Value::as_array))
        .flatten()
        .filter_map(|fort| match serde_json::from_value::<Fort>(fort.clone()) {
            Ok(fort) => Some(fort),
            Err(e) => {
                debug!(error = %e, "skipping malformed fort");
                None
            }
        })
        .collect()
}

/// Result of a fort scan.
#[derive(Debug, Clone, PartialEq)]
pub enum FortScan {
    /// No enabled fort in the queried cells.
    NoFort,
    /// Cancelled between the details and search calls.
    Cancelled { fort: Fort },
    Searched { fort: Fort, responses: Responses },
}

/// Query the walked cells, then visit the first enabled fort.
pub fn scan_forts<C, P>(
    client: &mut C,
    position: &Coordinate,
    walk: &CellWalk,
    pacer: &mut P,
) -> Result<FortScan, ClientError>
where
    C: GameClient + ?Sized,
    P: Pacer + ?Sized,
{
    let query = MapQuery::around(position, walk);
    let chain = client.create_request().get_map_objects(&query);
    let responses = client.call(chain)?;
    let forts = parse_forts(responses.require(Method::GetMapObjects)?);
    info!(cells = walk.len(), forts = forts.len(), "map objects fetched");

    let Some(fort) = forts.into_iter().find(|f| f.enabled) else {
        return Ok(FortScan::NoFort);
    };

    let chain = client.create_request().fort_details(&fort);
    let responses = client.call(chain)?;
    let details = responses.require(Method::FortDetails)?;
    let fort = Fort {
        id: details
            .get("fort_id")
            .and_then(Value::as_str)
            .map_or_else(|| fort.id.clone(), str::to_string),
        latitude: details
            .get("latitude")
            .and_then(Value::as_f64)
            .unwrap_or(fort.latitude),
        longitude: details
            .get("longitude")
            .and_then(Value::as_f64)
            .unwrap_or(fort.longitude),
        enabled: fort.enabled,
    };
    debug!(fort_id = %fort.id, "fort details fetched");

    if pacer.wait(FORT_SEARCH_DELAY) == Pace::Cancelled {
        warn!(fort_id = %fort.id, "fort scan cancelled before search");
        return Ok(FortScan::Cancelled { fort });
    }

    let chain = client.create_request().fort_search(&fort, position);
    let responses = client.call(chain)?;
    info!(fort_id = %fort.id, "fort searched");
    Ok(FortScan::Searched { fort, responses })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fake::ScriptedClient;
    use crate::disposal::ManualPacer;
    use pokecull_cells::generate_cell_walk;

    fn position() -> Coordinate {
        Coordinate::new(35.6595, 139.7005, None).unwrap()
    }

    fn map_body(forts: Value) -> Responses {
        Responses::from_bodies([(
            Method::GetMapObjects,
            json!({ "map_cells": [ { "s2_cell_id": 1 }, { "forts": forts } ] }),
        )])
    }

    #[test]
    fn query_aligns_timestamps_with_cells() {
        let walk = generate_cell_walk(&position(), 10);
        let query = MapQuery::around(&position(), &walk);
        assert_eq!(query.cell_id.len(), 21);
        assert_eq!(query.since_timestamp_ms, vec![0; 21]);
        assert_eq!(query.to_params()["cell_id"][0], walk.ids()[0]);
    }

    #[test]
    fn f2i_is_the_bit_pattern() {
        assert_eq!(f2i(1.0), 0x3FF0_0000_0000_0000);
        assert_eq!(f2i(0.0), 0);
    }

    #[test]
    fn malformed_forts_are_skipped() {
        let body = json!({ "map_cells": [ { "forts": [
            { "id": "a", "latitude": 1.0, "longitude": 2.0, "enabled": true },
            { "id": "b" }
        ] } ] });
        let forts = parse_forts(&body);
        assert_eq!(forts.len(), 1);
        assert_eq!(forts[0].id, "a");
    }

    #[test]
    fn scan_visits_first_enabled_fort() {
        let forts = json!([
            { "id": "closed", "latitude": 35.0, "longitude": 139.0, "enabled": false },
            { "id": "open", "latitude": 35.1, "longitude": 139.1, "enabled": true }
        ]);
        let mut client = ScriptedClient::default()
            .reply(Ok(map_body(forts)))
            .reply(Ok(Responses::from_bodies([(
                Method::FortDetails,
                json!({ "fort_id": "open", "latitude": 35.1, "longitude": 139.1 }),
            )])))
            .reply(Ok(Responses::from_bodies([(
                Method::FortSearch,
                json!({ "result": 1 }),
            )])));
        let mut pacer = ManualPacer::new();
        let walk = generate_cell_walk(&position(), 2);

        let scan = scan_forts(&mut client, &position(), &walk, &mut pacer).unwrap();

        assert!(matches!(scan, FortScan::Searched { ref fort, .. } if fort.id == "open"));
        assert_eq!(
            client.calls,
            vec![
                vec![Method::GetMapObjects],
                vec![Method::FortDetails],
                vec![Method::FortSearch]
            ]
        );
        assert_eq!(pacer.waits(), &[FORT_SEARCH_DELAY]);
        assert_eq!(client.params[2][0]["player_latitude"], f2i(35.6595));
    }

    #[test]
    fn scan_without_enabled_fort_stops_after_query() {
        let mut client = ScriptedClient::default().reply(Ok(map_body(json!([]))));
        let mut pacer = ManualPacer::new();
        let walk = generate_cell_walk(&position(), 0);

        let scan = scan_forts(&mut client, &position(), &walk, &mut pacer).unwrap();
        assert_eq!(scan, FortScan::NoFort);
        assert_eq!(client.calls.len(), 1);
    }
}

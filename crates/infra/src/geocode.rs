//! Location name → coordinate resolution.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use pokecull_core::{Coordinate, DomainError, DomainResult};

pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";
const USER_AGENT: &str = concat!("pokecull/", env!("CARGO_PKG_VERSION"));
const GEOCODE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("geocoder client build failed: {0}")]
    BuildClient(String),

    #[error("geocoder request failed: {0}")]
    Http(String),

    #[error("geocoder returned status {code}")]
    HttpStatus { code: u16 },

    #[error("geocoder response could not be decoded: {0}")]
    Decode(String),
}

/// A location that was found.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedLocation {
    pub address: String,
    pub position: Coordinate,
}

/// External geocoding service.
pub trait Geocoder {
    /// `Ok(None)` when the service has no match for `query`.
    fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError>;
}

/// Parse a `"lat, lng"` (or `"lat lng"`) literal.
///
/// Returns `None` when `text` does not look like two numbers, and an
/// `InvalidCoordinate` error when it does but the values are out of range.
pub fn parse_coordinate_literal(text: &str) -> Option<DomainResult<Coordinate>> {
    let mut parts = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|p| !p.is_empty());
    let lat = parts.next()?.parse::<f64>().ok()?;
    let lng = parts.next()?.parse::<f64>().ok()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Coordinate::new(lat, lng, None))
}

/// Resolve `location` to a coordinate, using `geocoder` unless it is a literal.
///
/// A location the service cannot find is an `InvalidCoordinate` error, as is any
/// service failure; the caller stops before login either way.
pub fn resolve_location<G: Geocoder + ?Sized>(
    geocoder: &G,
    location: &str,
) -> DomainResult<Coordinate> {
    if let Some(literal) = parse_coordinate_literal(location) {
        let position = literal?;
        debug!(%position, "location given as coordinates");
        return Ok(position);
    }

    match geocoder.geocode(location) {
        Ok(Some(found)) => {
            info!(address = %found.address, position = %found.position, "location resolved");
            Ok(found.position)
        }
        Ok(None) => Err(DomainError::invalid_coordinate(format!(
            "location `{location}` could not be found"
        ))),
        Err(e) => Err(DomainError::invalid_coordinate(format!(
            "location `{location}` could not be resolved: {e}"
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: String,
}

/// Nominatim-compatible HTTP geocoder.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    client: Client,
    endpoint: String,
}

impl NominatimGeocoder {
    pub fn new() -> Result<Self, GeocodeError> {
        Self::with_endpoint(DEFAULT_GEOCODER_URL)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Result<Self, GeocodeError> {
        let client = Client::builder()
            .timeout(GEOCODE_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GeocodeError::BuildClient(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, query: &str) -> Result<Option<ResolvedLocation>, GeocodeError> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query), ("format", "jsonv2"), ("limit", "1")])
            .send()
            .map_err(|e| GeocodeError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodeError::HttpStatus {
                code: status.as_u16(),
            });
        }

        let places: Vec<Place> = response
            .json()
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;
        let Some(place) = places.into_iter().next() else {
            return Ok(None);
        };

        let lat = place
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodeError::Decode(format!("lat: {e}")))?;
        let lon = place
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodeError::Decode(format!("lon: {e}")))?;
        let position =
            Coordinate::new(lat, lon, None).map_err(|e| GeocodeError::Decode(e.to_string()))?;

        Ok(Some(ResolvedLocation {
            address: place.display_name,
            position,
        }))
    }
}

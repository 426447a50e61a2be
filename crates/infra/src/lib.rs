//! Infrastructure layer: protocol client boundary, geocoding, disposal pacing, files.

pub mod client;
pub mod config;
pub mod disposal;
pub mod geocode;
pub mod map;
pub mod pokedex;
pub mod replay;
pub mod snapshot;

pub use client::{AuthService, ClientError, GameClient, Method, RequestChain, Responses};
pub use disposal::{
    CancelHandle, DisposalExecutor, DisposalExecutorConfig, DisposalReport, ManualPacer, Pace,
    Pacer, ShutdownPacer, cancellation,
};
pub use geocode::{Geocoder, NominatimGeocoder, ResolvedLocation, resolve_location};
pub use replay::ReplayClient;
pub use snapshot::SnapshotWriter;

//! Command-line surface.

use std::path::PathBuf;

use clap::Parser;

use pokecull_infra::config::DEFAULT_CONFIG_FILE;

/// Resolve a location, log in, and release unwanted creatures.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "pokecull", version, about)]
pub struct Cli {
    /// Auth service ('ptc' or 'google')
    #[arg(short = 'a', long = "auth_service", alias = "auth-service")]
    pub auth_service: Option<String>,

    /// Username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Password (prompted for when omitted)
    #[arg(short, long)]
    pub password: Option<String>,

    /// Location name, or "lat, lng"
    #[arg(short, long)]
    pub location: Option<String>,

    /// Debug mode
    #[arg(short, long)]
    pub debug: bool,

    /// Only resolve the specified location
    #[arg(short, long)]
    pub test: bool,

    /// Config file with defaults for the options above
    #[arg(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    /// Species ids always released (comma-separated)
    #[arg(long = "blocked-species", value_delimiter = ',')]
    pub blocked_species: Vec<u32>,

    /// Release non-favorites below this combat power
    #[arg(long = "min-cp")]
    pub min_cp: Option<u32>,

    /// Seconds to wait after each release
    #[arg(long = "release-delay")]
    pub release_delay: Option<f64>,

    /// Cells walked in each direction for area queries
    #[arg(long)]
    pub radius: Option<u32>,

    /// Answer protocol calls from a recorded response file
    #[arg(long, value_name = "FILE")]
    pub replay: Option<PathBuf>,

    /// Triage and report, but release nothing
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Visit the first enabled fort near the location
    #[arg(long = "scan-forts")]
    pub scan_forts: bool,

    /// Look up species names for log output
    #[arg(long)]
    pub names: bool,

    /// Directory for inventory.json / pokemons.json
    #[arg(long = "snapshot-dir", value_name = "DIR")]
    pub snapshot_dir: Option<PathBuf>,

    /// Do not write snapshot files
    #[arg(long = "no-snapshot", conflicts_with = "snapshot_dir")]
    pub no_snapshot: bool,

    /// Emit logs as JSON
    #[arg(long = "log-json")]
    pub log_json: bool,
}

//! Command-line front end: settings, the run pipeline, and exit statuses.

pub mod args;
pub mod exit;
pub mod run;
pub mod settings;

pub use args::Cli;
pub use exit::Exit;
pub use run::{RunError, RunSummary, locate, run, run_session};
pub use settings::{Settings, SettingsError};

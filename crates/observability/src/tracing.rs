//! Tracing/logging initialization.

use tracing_subscriber::EnvFilter;

/// Crates raised to `debug` by the debug switch.
const WORKSPACE_TARGETS: &[&str] = &[
    "pokecull_core",
    "pokecull_cells",
    "pokecull_inventory",
    "pokecull_infra",
    "pokecull_cli",
    "pokecull",
];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogOptions {
    pub debug: bool,
    pub format: LogFormat,
}

/// Filter directives: `RUST_LOG` when set, `info` otherwise, plus the
/// workspace crates at `debug` when requested.
pub fn filter_directives(options: &LogOptions, env: Option<&str>) -> String {
    let mut directives = env
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or("info")
        .to_string();
    if options.debug {
        for target in WORKSPACE_TARGETS {
            directives.push_str(&format!(",{target}=debug"));
        }
    }
    directives
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init_with(options: &LogOptions) {
    let env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let filter = EnvFilter::try_new(filter_directives(options, env.as_deref()))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let _ = match options.format {
        LogFormat::Json => builder
            .json()
            .with_timer(tracing_subscriber::fmt::time::SystemTime)
            .with_target(false)
            .try_init(),
        LogFormat::Text => builder.with_target(true).try_init(),
    };
}

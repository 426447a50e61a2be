//! Process exit statuses.

use std::process::ExitCode;

/// Distinguishable outcomes of a run.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Exit {
    Success,
    /// Missing or invalid settings.
    Config,
    /// Location could not be resolved or is out of range.
    Location,
    Authentication,
    /// Protocol or file failure before triage.
    Protocol,
    /// One or more release calls failed; the rest of the run completed.
    PartialFailure,
    Cancelled,
}

impl Exit {
    pub fn code(self) -> u8 {
        match self {
            Exit::Success => 0,
            Exit::Config => 2,
            Exit::Location => 3,
            Exit::Authentication => 4,
            Exit::Protocol => 5,
            Exit::PartialFailure => 6,
            Exit::Cancelled => 130,
        }
    }
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit.code())
    }
}

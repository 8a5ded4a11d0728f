//! Top-level wrapper shared by every script binary.

use std::{fmt::Display, future::Future, io::Write, process::ExitCode};

use tracing::error;

/// Exit status of a script run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failure => 1,
        }
    }
}

impl From<RunStatus> for ExitCode {
    fn from(status: RunStatus) -> Self {
        ExitCode::from(status.code())
    }
}

/// Awaits `main`. On error the error text goes to `out` and the run fails.
pub async fn run_main<F, T, E, W>(main: F, out: &mut W) -> RunStatus
where
    F: Future<Output = Result<T, E>>,
    E: Display,
    W: Write,
{
    match main.await {
        Ok(_) => RunStatus::Success,
        Err(err) => {
            error!(error = %err, "script failed");
            // Nothing left to report to if the console itself is gone.
            let _ = writeln!(out, "{err}");
            RunStatus::Failure
        }
    }
}

//! Tile level editor and the platformer that plays its levels.

mod assets;
mod bootstrap;
mod editor;
mod level;
mod loop_runner;
mod script;
mod settings;

use std::process::ExitCode;

use tracing::error;

/// Builds the two scenes and drives them until the input script runs out.
pub(crate) fn run() -> ExitCode {
    match bootstrap::build_app() {
        Ok(app) => loop_runner::run(app),
        Err(err) => {
            error!(error = %err, "startup_failed");
            ExitCode::FAILURE
        }
    }
}

use std::process::{Command, Stdio};
use std::time::Instant;

use tracing::{error, info};

use crate::logging::{FormatElapsedTimeOptions, format_elapsed_time};

/// Builds the website by running the project's binary, which calls `vitrina::coronate`. Returns whether it succeeded.
pub fn start_build() -> bool {
    let start_time = Instant::now();

    match Command::new("cargo")
        .arg("run")
        .arg("--quiet")
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
    {
        Ok(mut child) => match child.wait() {
            Ok(exit_code) if exit_code.success() => {
                info!(name: "build", "Build succeeded in {}", format_elapsed_time(start_time.elapsed(), &FormatElapsedTimeOptions::default()));
                true
            }
            Ok(exit_code) => {
                error!(name: "build", "Build failed ({})", exit_code);
                false
            }
            Err(err) => {
                error!(name: "build", "Failed to build project: {:?}", err);
                false
            }
        },
        Err(err) => {
            error!(name: "build", "Failed to spawn cargo: {:?}", err);
            false
        }
    }
}

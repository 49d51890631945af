mod build;
mod consts;
mod logging;
mod preview;
mod server_utils;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;
use logging::init_logging;
use preview::start_preview_web_server;
use tracing::error;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Commands {
    /// Build the project
    Build,
    /// Serve the built website
    Preview {
        /// Expose the server to your network
        #[arg(long)]
        host: bool,

        /// Directory the website was built to
        #[arg(long, default_value = "dist")]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging();

    match cli.command {
        Commands::Build => {
            if build::start_build() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            }
        }
        Commands::Preview { host, dir } => {
            if !dir.exists() {
                error!(name: "preview", "{} does not exist. Run {} first.", dir.display(), "vitrina build".bold());
                return ExitCode::FAILURE;
            }

            match start_preview_web_server(dir, host).await {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    error!(name: "preview", "Preview server stopped: {}", err);
                    ExitCode::FAILURE
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build() {
        let cli = Cli::try_parse_from(["vitrina", "build"]).unwrap();
        assert_eq!(cli.command, Commands::Build);
    }

    #[test]
    fn test_parse_preview_defaults() {
        let cli = Cli::try_parse_from(["vitrina", "preview"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Preview {
                host: false,
                dir: PathBuf::from("dist")
            }
        );
    }

    #[test]
    fn test_parse_preview_options() {
        let cli = Cli::try_parse_from(["vitrina", "preview", "--host", "--dir", "public"]).unwrap();
        assert_eq!(
            cli.command,
            Commands::Preview {
                host: true,
                dir: PathBuf::from("public")
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(Cli::try_parse_from(["vitrina", "dev"]).is_err());
    }
}

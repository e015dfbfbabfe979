//! # CLI Argument Definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// The main CLI structure parsing command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "brite")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(arg_required_else_help = true)]
#[command(about = "Operator toolkit for the BRITE onboarding backend")]
pub struct Cli {
    /// Configuration file; `server.toml` is tried when absent
    #[arg(short, long, global = true, env = "BRITE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: AppCommands,
}

/// Enumeration of available application subcommands.
#[derive(Debug, Subcommand)]
pub enum AppCommands {
    /// Inspect and re-drive dead-lettered submissions
    Failed {
        #[command(subcommand)]
        action: FailedAction,
    },
    /// Render the provider agreement offline
    RenderContract {
        /// JSON file with the wizard answers
        #[arg(long)]
        form: PathBuf,
        /// PNG or JPEG drawn as the provider signature
        #[arg(long)]
        signature: Option<PathBuf>,
        /// Where to write the PDF
        #[arg(long, default_value = "brite-provider-agreement.pdf")]
        out: PathBuf,
    },
    /// Validate the configuration the server would start with
    CheckConfig {},
}

#[derive(Debug, Subcommand)]
pub enum FailedAction {
    /// List dead letters, newest first
    List {},
    /// Print one dead letter
    Show { file: String },
    /// Send a dead letter to the webhook once more
    Replay {
        file: String,
        /// Keep the file after a successful delivery
        #[arg(long)]
        keep: bool,
    },
    /// Delete a dead letter
    Purge { file: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_replay_with_keep() {
        let cli = Cli::try_parse_from(["brite", "failed", "replay", "failed-x.json", "--keep"]).unwrap();
        assert!(matches!(
            cli.command,
            AppCommands::Failed { action: FailedAction::Replay { ref file, keep: true } } if file == "failed-x.json"
        ));
    }

    #[test]
    fn config_is_global() {
        let cli = Cli::try_parse_from(["brite", "check-config", "--config", "prod.toml"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("prod.toml")));
        assert!(matches!(cli.command, AppCommands::CheckConfig {}));
    }

    #[test]
    fn render_contract_requires_a_form() {
        assert!(Cli::try_parse_from(["brite", "render-contract"]).is_err());

        let cli = Cli::try_parse_from(["brite", "render-contract", "--form", "form.json"]).unwrap();
        let AppCommands::RenderContract { out, signature, .. } = cli.command else {
            panic!("wrong command");
        };
        assert_eq!(out, PathBuf::from("brite-provider-agreement.pdf"));
        assert!(signature.is_none());
    }
}

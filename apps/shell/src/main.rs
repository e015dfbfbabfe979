#![allow(clippy::print_stderr, clippy::print_stdout)]

mod args;
mod handlers;

use crate::args::{AppCommands, Cli, FailedAction};
use crate::handlers::{config, contract, failed};
use anyhow::Context;
use brite::domain::config::ApiConfig;
use brite::kernel::config::load_config;
use brite_logger::{LevelFilter, Logger, parse_level};
use clap::Parser;

#[brite_runtime::main(memory_efficient)]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg: ApiConfig = load_config(cli.config.as_deref()).context("Configuration is malformed")?;

    let level = if cli.verbose { LevelFilter::DEBUG } else { parse_level(&cfg.logging.level)? };
    let _logger = Logger::builder().name(env!("CARGO_PKG_NAME")).level(level).init()?;

    match cli.command {
        AppCommands::Failed { action } => match action {
            FailedAction::List {} => failed::list(&cfg.relay).await?,
            FailedAction::Show { file } => failed::show(&cfg.relay, &file).await?,
            FailedAction::Replay { file, keep } => failed::replay(&cfg.relay, &file, keep).await?,
            FailedAction::Purge { file } => failed::purge(&cfg.relay, &file).await?,
        },
        AppCommands::RenderContract { form, signature, out } => {
            contract::render(&cfg.contract, &form, signature.as_deref(), &out).await?;
        },
        AppCommands::CheckConfig {} => config::check(&cfg)?,
    }

    Ok(())
}

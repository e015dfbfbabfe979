use anyhow::Context;
use brite::domain::config::ApiConfig;
use brite::kernel::config::load_config;
use brite_server::{Server, init_logger};
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "brite-server", version, about = "BRITE onboarding backend")]
struct Args {
    /// Configuration file; `server.toml` is tried when absent
    #[arg(short, long, env = "BRITE_CONFIG")]
    config: Option<PathBuf>,
}

#[brite_runtime::main(high_performance)]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let cfg: ApiConfig =
        load_config(args.config.as_deref()).context("Critical: Configuration is malformed")?;

    let _log = init_logger(env!("CARGO_PKG_NAME"), &cfg.logging)?;

    Server::builder().config(cfg).build().await?.run().await
}

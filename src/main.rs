use std::env::args;

use anyhow::Result;
use clap::Parser;
use clockbot::{
    bot::{args::BotArgs, config::BotConfig, start_bot},
    utils::{dir::application_dir, logging::enable_logging, runtime::single_thread_runtime},
};
use tracing::error;

fn main() -> Result<()> {
    run(BotArgs::parse_from(args()))
}

fn run(args: BotArgs) -> Result<()> {
    let app_dir = application_dir(args.dir)?;
    enable_logging(&app_dir, args.log, args.log_console)?;

    let config_path = args.config.unwrap_or_else(|| app_dir.join("config.toml"));
    let config = BotConfig::load(&config_path).inspect_err(|e| error!("{e:?}"))?;

    single_thread_runtime()?
        .block_on(start_bot(config))
        .inspect_err(|e| error!("Bot stopped with an error {e:?}"))
}

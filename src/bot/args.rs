use std::path::PathBuf;

use clap::Parser;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "clockbot", version, long_about = None)]
#[command(about = "Nags you to clock in, clock out and log what you've been working on")]
pub struct BotArgs {
    #[arg(long, help = "Path to the config file. Defaults to config.toml in the application directory")]
    pub config: Option<PathBuf>,
    #[arg(
        long,
        help = "Application directory. By default uses $XDG_STATE_HOME/clockbot or $HOME/.local/state/clockbot"
    )]
    pub dir: Option<PathBuf>,
    /// Also print logs to stdout.
    #[arg(long = "log-console")]
    pub log_console: bool,
    #[arg(long = "log-filter")]
    pub log: Option<LevelFilter>,
}

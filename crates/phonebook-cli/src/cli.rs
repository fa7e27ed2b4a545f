use std::path::PathBuf;

use clap::Parser;

#[derive(Parser)]
#[command(
    name = "phonebook",
    about = "Interactive phonebook stored in a tab-delimited .txt file",
    version,
)]
pub struct Cli {
    /// Directory file (.txt) to open at startup
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log debug events to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

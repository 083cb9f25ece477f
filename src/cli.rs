use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file (defaults to $SAUCE_CONFIG or ~/.config/sauce/config.yaml)
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Extract metadata from a URL and print it as JSON
    Extract {
        /// Post, profile or image URL
        url: String,

        /// Page the URL was found on.
        /// Needed for bare image URLs that don't identify their post.
        #[clap(short, long)]
        referer: Option<String>,

        /// Print only the DText commentary
        #[clap(long, default_value = "false")]
        dtext: bool,
    },
    /// Print the effective configuration
    Config {},
}

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;

use sauce::config::Config;
use sauce::extractor::ExtractorRegistry;
use sauce::scrape::HttpFetcher;

mod cli;

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_with(path),
        None => Config::load(),
    };

    config.context("failed to load config")
}

fn main() -> anyhow::Result<()> {
    sauce::logging::init();

    let args = cli::Args::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        cli::Command::Extract {
            url,
            referer,
            dtext,
        } => {
            let fetcher = HttpFetcher::new(config.scrape.clone())
                .context("failed to set up http client")?;
            let registry = ExtractorRegistry::new(Arc::new(fetcher));

            let metadata = registry
                .extract(&url, referer.as_deref())
                .with_context(|| format!("extraction failed for {url}"))?;

            if dtext {
                println!("{}", metadata.dtext_artist_commentary_desc);
                return Ok(());
            }

            if !metadata.has_any_data() {
                log::warn!("nothing found for {url}");
            }

            println!("{}", serde_json::to_string_pretty(&metadata)?);
        }

        cli::Command::Config {} => {
            log::debug!("config path: {}", config.path().display());
            print!("{}", serde_yml::to_string(&config)?);
        }
    }

    Ok(())
}

//! CLI for the linkfetch batch downloader.

mod download;
mod elapsed;
mod report;
mod speed;

use anyhow::Result;
use clap::Parser;
use linkfetch_core::config::{self, LinkfetchConfig};
use linkfetch_core::DownloadOptions;
use std::path::PathBuf;
use std::process::ExitCode;

/// Fetch every link listed in a manifest into local files.
#[derive(Debug, Parser)]
#[command(name = "linkfetch", version)]
#[command(about = "linkfetch: concurrent, rate-limited batch downloader", long_about = None)]
pub struct Cli {
    /// File with one `<link> <file name>` pair per line.
    #[arg(short = 'f', long = "links-file", value_name = "FILE")]
    pub links_file: PathBuf,

    /// Directory for downloaded files; created if missing. Defaults to the current directory.
    #[arg(short = 'o', long = "output-dir", value_name = "DIRECTORY")]
    pub output_dir: Option<PathBuf>,

    /// Number of links downloaded at the same time.
    #[arg(short = 'n', long = "threads-number", value_name = "NUMBER", value_parser = parse_threads)]
    pub threads: Option<usize>,

    /// Total download speed in bytes per second; `k` and `m` suffixes multiply by 1024 and 1024².
    #[arg(short = 'l', long = "speed-limit", value_name = "LIMIT", value_parser = speed::parse_speed_limit)]
    pub speed_limit: Option<u64>,

    /// Also list successful and failed files, not just system errors.
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the result as JSON (all events) instead of text.
    #[arg(long)]
    pub json: bool,
}

fn parse_threads(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

impl Cli {
    pub async fn run_from_args() -> Result<ExitCode> {
        let cli = match Cli::try_parse() {
            Ok(cli) => cli,
            Err(e) => {
                // Help and version go to stdout and succeed; usage errors exit 1.
                let code = if e.use_stderr() {
                    ExitCode::FAILURE
                } else {
                    ExitCode::SUCCESS
                };
                e.print()?;
                return Ok(code);
            }
        };
        let cfg = match config::load_or_init() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!("config unavailable, using defaults: {:#}", e);
                LinkfetchConfig::default()
            }
        };
        tracing::debug!("loaded config: {:?}", cfg);

        let options = cli.download_options(&cfg);
        let verbose = options.verbose;
        let (result, elapsed) = download::run_download(options, cfg.http).await?;

        if cli.json {
            println!("{}", report::render_json(&result, elapsed)?);
        } else {
            print!("{}", report::render_text(&result, elapsed, verbose));
        }

        Ok(if result.has_system_error() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        })
    }

    /// Flags win over the config file, which wins over built-in defaults.
    fn download_options(&self, cfg: &LinkfetchConfig) -> DownloadOptions {
        let output_dir = self
            .output_dir
            .clone()
            .or_else(|| cfg.output_dir.clone())
            .unwrap_or_default();
        DownloadOptions::new(&self.links_file)
            .with_output_dir(output_dir)
            .with_threads(self.threads.unwrap_or(cfg.threads))
            .with_speed_limit(self.speed_limit.unwrap_or(cfg.speed_limit))
            .with_verbose(self.verbose)
    }
}

#[cfg(test)]
mod tests;

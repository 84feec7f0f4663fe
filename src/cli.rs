//! Command-line interface definitions.
//!
//! Global options can be given before or after the subcommand and may also
//! come from environment variables.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Company news insights: discover, summarize, score, and voice the news.
///
/// # Examples
///
/// ```sh
/// # One-shot report printed as Markdown, JSON saved alongside
/// awful_news_insight run --company "Acme Corp" -j ./reports
///
/// # HTTP server with a custom config and audio directory
/// awful_news_insight --config config.yaml --audio-dir /var/lib/insight serve --bind 127.0.0.1:8080
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to config.yaml file
    #[arg(short, long, env = "NEWS_INSIGHT_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Directory for generated audio digests (overrides the config file)
    #[arg(long, env = "NEWS_INSIGHT_AUDIO_DIR", global = true)]
    pub audio_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Produce one report and print it as Markdown
    Run {
        /// Company to search news for
        #[arg(long)]
        company: String,

        /// Also write the JSON report into this directory
        #[arg(short, long)]
        json_output_dir: Option<PathBuf>,

        /// Skip translation and speech synthesis
        #[arg(long)]
        no_audio: bool,
    },

    /// Serve the HTTP API
    Serve {
        /// Address to listen on
        #[arg(long, env = "NEWS_INSIGHT_BIND", default_value = "0.0.0.0:5000")]
        bind: String,
    },
}

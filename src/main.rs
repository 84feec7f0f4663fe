//! # Awful News Insight
//!
//! Command-line entry point for the company news insight pipeline.
//!
//! ## Usage
//!
//! ```sh
//! awful_news_insight run --company "Acme Corp" -j ./reports
//! awful_news_insight serve --bind 0.0.0.0:5000
//! ```
//!
//! `run` prints a Markdown report to stdout (logs go to stderr) and
//! optionally saves the JSON report. `serve` exposes the same pipeline over
//! HTTP.

use awful_news_insight::audio::AudioStore;
use awful_news_insight::config::InsightConfig;
use awful_news_insight::outputs::{json, markdown};
use awful_news_insight::pipeline::InsightPipeline;
use awful_news_insight::server::{self, AppState};
use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;

use cli::{Cli, Command};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("news_insight starting up");

    let args = Cli::parse();
    debug!(?args.config, ?args.audio_dir, ?args.command, "Parsed CLI arguments");

    let mut config = InsightConfig::load(args.config.as_deref())?;
    if let Some(dir) = args.audio_dir {
        config.audio.dir = dir;
    }

    let pipeline = InsightPipeline::from_config(&config)?;
    let audio = AudioStore::new(&config.audio.dir);

    match args.command {
        Command::Run {
            company,
            json_output_dir,
            no_audio,
        } => {
            let pipeline = if no_audio {
                pipeline.without_speech()
            } else {
                if let Err(e) = audio.ensure_ready().await {
                    error!(
                        path = %audio.dir().display(),
                        error = %e,
                        "Audio directory is not writable (fix perms or choose a different path)"
                    );
                    return Err(e.into());
                }
                pipeline
            };

            match pipeline.run(&company).await {
                Ok(report) => {
                    println!("{}", markdown::report_to_markdown(&report));
                    if let Some(dir) = json_output_dir {
                        json::write_report(&report, &dir).await?;
                    }
                }
                Err(e) => warn!(%company, reason = %e, "Run produced no report"),
            }
        }
        Command::Serve { bind } => {
            if let Err(e) = audio.ensure_ready().await {
                error!(
                    path = %audio.dir().display(),
                    error = %e,
                    "Audio directory is not writable (fix perms or choose a different path)"
                );
                return Err(e.into());
            }
            if let Some(max_age) = config.audio.retention() {
                audio.prune_older_than(max_age).await;
            }
            server::serve(AppState::new(pipeline, audio), &bind).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        elapsed_secs = elapsed.as_secs_f64(),
        "news_insight finished"
    );

    Ok(())
}

//! This module contains the main structure and logic for the whole
//! application.

use std::time::Duration as StdDuration;

use chrono::Duration;
use clap::Parser;
use log::{debug, info, trace, LevelFilter};
use simple_logger::SimpleLogger;

use crate::error::{Error, Result};
use crate::models::Score;
use crate::scores::staleness::DEFAULT_UPDATE_INTERVAL_HOURS;
use crate::scores::{Client, DEFAULT_DATA_URL};
use crate::writers::Writers;

/// Represents the application
pub struct Application {
    /// The arguments given on the command line.
    argv: Option<Args>,
}

impl Application {
    /// Creates a new application
    pub fn new() -> Self {
        Application { argv: None }
    }

    /// Read argv to get the arguments before running the application.
    /// The logger is initialized here, with the level given on the command line.
    pub fn read_argv(&mut self) {
        let args = Args::parse();
        // A logger may already be installed when embedded
        let _ = SimpleLogger::new().with_level(args.log_level).init();
        trace!("In Application::read_argv()");
        debug!("Arguments: {:?}", args);
        self.argv = Some(args);
    }

    /// Runs the global application
    /// read_argv() MUST have been called before
    pub fn run(&self) -> Result<()> {
        trace!("Running Application::run()");
        let args = self.argv.as_ref().ok_or(Error::ArgumentsNotRead)?;

        let client = Client::builder()
            .data_url(&args.url)
            .update_interval(
                Duration::try_hours(args.interval_hours)
                    .unwrap_or_else(|| Duration::hours(DEFAULT_UPDATE_INTERVAL_HOURS)),
            )
            .timeout(StdDuration::from_secs(args.timeout))
            .build()?;

        let scores: Vec<Score> = if args.all {
            info!("Reading all the scores");
            let mut scores = client.get_all_scores()?;
            scores.sort_by(|a, b| a.cve.cmp(&b.cve));
            scores
        } else {
            info!("Reading the scores of {:?}", args.cves);
            client.get_scores(args.cves.as_slice())?
        };

        let writer = args.writer.build();
        writer.write(client.metadata().as_ref(), &scores);
        Ok(())
    }
}

impl Default for Application {
    fn default() -> Self {
        Self::new()
    }
}

/// Represents the CLI arguments accepted by the application
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The CVEs to look up
    #[arg(value_name = "CVE", required_unless_present = "all")]
    pub cves: Vec<String>,
    /// Print the scores of all the CVEs
    #[arg(short, long)]
    pub all: bool,
    /// The URL of the gzipped dataset
    #[arg(short, long, value_name = "URL", default_value = DEFAULT_DATA_URL)]
    pub url: String,
    /// How long the downloaded scores are considered fresh
    #[arg(
        long,
        value_name = "HOURS",
        default_value_t = DEFAULT_UPDATE_INTERVAL_HOURS,
        allow_negative_numbers = true
    )]
    pub interval_hours: i64,
    /// The timeout of the HTTP request, in seconds
    #[arg(short, long, value_name = "SECONDS", default_value_t = 10)]
    pub timeout: u64,
    /// The writer to use
    #[arg(short, long, value_name = "WRITER", default_value = "textstdout")]
    pub writer: Writers,
    /// The log level
    #[arg(short, long, value_name = "LEVEL", default_value = "warn")]
    pub log_level: LevelFilter,
}

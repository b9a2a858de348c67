//! glad-clusters CLI - Command-line interface
//!
//! Resolves a location to a tile range, runs the remote clustering worker
//! over every tile, and prints the resulting table as JSON lines on stdout.

mod args;
mod error;
mod output;

use std::io;

use clap::Parser;
use tracing::info;

use glad_clusters::config::ConfigFile;
use glad_clusters::logging::{init_logging, LoggingConfig};
use glad_clusters::run::{ClusterRun, RunOptions, RunOutcome};

use args::Args;
use error::CliError;

fn main() {
    let args = Args::parse();
    if let Err(e) = run(args) {
        e.exit();
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let mut logging = LoggingConfig::new().with_verbose(args.verbose);
    if let Some(path) = &args.log_file {
        logging = logging.with_log_file(path);
    }
    let _guard = init_logging(&logging).map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let file = match &args.config {
        Some(path) => ConfigFile::load(path)?,
        None => ConfigFile::default(),
    };
    let settings = args.settings(file)?;

    info!(version = glad_clusters::VERSION, "glad-clusters starting");

    let mut cluster_run =
        ClusterRun::new(settings.run, &args.location())?.with_dispatch_config(settings.dispatch);

    if let RunOutcome::Completed(summary) =
        cluster_run.run_http(&settings.worker, RunOptions::default())?
    {
        info!(
            dispatched = summary.dispatched,
            failures = summary.invocation_failures,
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "Worker fan-out finished"
        );
    }

    let Some(dataset) = cluster_run.dataset() else {
        return Ok(());
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    if args.errors {
        output::write_json_lines(&mut out, dataset.errors())
    } else {
        output::write_json_lines(&mut out, &dataset.view())
    }
    .map_err(CliError::Output)?;

    eprintln!("{}", output::summary_line(dataset));
    Ok(())
}

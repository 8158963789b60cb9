//! desgraph CLI entry point.

use std::process::ExitCode;

use clap::Parser;
use log::{LevelFilter, debug, error, info};
use miette::GraphicalReportHandler;

use desgraph::DesError;
use desgraph_cli::{Args, error_adapter::to_reportables};

fn init_logging(args: &Args) {
    let level = args.log_filter().unwrap_or_else(|| {
        eprintln!("unknown log level `{}`, falling back to `warn`", args.log_level);
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(level)
        .init();
    debug!(level:?; "Logger initialized");
}

/// Logs one rendered report per diagnostic carried by `err`.
fn report(err: &DesError) {
    let handler = GraphicalReportHandler::new();
    for reportable in to_reportables(err) {
        let mut rendered = String::new();
        match handler.render_report(&mut rendered, &reportable) {
            Ok(()) => error!("{rendered}"),
            Err(_) => error!("{err}"),
        }
    }
}

fn main() -> ExitCode {
    miette::set_panic_hook();

    let args = Args::parse();
    init_logging(&args);
    info!(inputs = args.inputs.len(); "Running desgraph");
    debug!(args:?; "Parsed arguments");

    match desgraph_cli::run(&args) {
        Ok(()) => {
            info!("Done");
            ExitCode::SUCCESS
        }
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

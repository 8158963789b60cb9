//! Command-line argument definitions for the desgraph CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments select the netlist sources, what to print, and
//! where to print it.

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use log::LevelFilter;

/// Command-line arguments for the desgraph netlist elaborator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Netlist sources, one module per file
    #[arg(required = true, help = "Paths to the input files")]
    pub inputs: Vec<PathBuf>,

    /// Print the regenerated module source instead of a DOT graph
    #[arg(long)]
    pub render: bool,

    /// Only print this module
    #[arg(long)]
    pub top: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// The `--log-level` filter, or `None` if it names no level.
    pub fn log_filter(&self) -> Option<LevelFilter> {
        LevelFilter::from_str(&self.log_level).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["desgraph", "top.des"]);

        assert_eq!(args.inputs, vec![PathBuf::from("top.des")]);
        assert!(!args.render);
        assert_eq!(args.top, None);
        assert_eq!(args.log_filter(), Some(LevelFilter::Warn));
    }

    #[test]
    fn test_log_filter() {
        let args = Args::parse_from(["desgraph", "--log-level", "DEBUG", "m1.des", "top.des"]);
        assert_eq!(args.log_filter(), Some(LevelFilter::Debug));
        assert_eq!(args.inputs.len(), 2);

        let args = Args::parse_from(["desgraph", "--log-level", "loud", "m1.des"]);
        assert_eq!(args.log_filter(), None);
    }

    #[test]
    fn test_inputs_are_required() {
        assert!(Args::try_parse_from(["desgraph", "--render"]).is_err());
    }
}

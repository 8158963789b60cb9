//! CLI logic for the desgraph netlist elaborator.
//!
//! This module contains the core CLI logic: load every input into a
//! [`Design`], elaborate and check it, and print rendered sources or DOT
//! graphs.

pub mod error_adapter;

mod args;
mod config;

pub use args::Args;

use std::{fs, io::Write};

use log::{info, warn};

use desgraph::{DesError, Design, identifier::Id};

use error_adapter::warning_reportables;

/// Run the desgraph CLI application
///
/// # Arguments
///
/// * `args` - Command-line arguments
///
/// # Errors
///
/// Returns `DesError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Parsing errors and duplicate modules
/// - Hierarchy cycles and unknown pins
/// - Inconsistent graphs
/// - Warnings, when `deny_warnings` is set
pub fn run(args: &Args) -> Result<(), DesError> {
    info!(
        inputs = args.inputs.len(),
        render = args.render;
        "Processing netlists"
    );

    let app_config = config::load_config(args.config.as_ref())?;
    let deny_warnings = app_config.check().deny_warnings();
    let mut design = Design::new(app_config);

    for input in &args.inputs {
        design.parse_module(input)?;
    }

    design.build_all()?;
    let names: Vec<Id> = design.modules().keys().copied().collect();
    for name in &names {
        design.check(*name)?;
    }

    let count = report_warnings(&design);
    if deny_warnings && count > 0 {
        return Err(DesError::WarningsDenied { count });
    }

    let selected = match &args.top {
        Some(top) => {
            let top = Id::new(top);
            if design.module(top).is_none() {
                return Err(DesError::ModuleNotFound(top));
            }
            vec![top]
        }
        None => names,
    };

    let mut output = String::new();
    for name in selected {
        let text = if args.render {
            design.render(name)?
        } else {
            design.dump(name)?
        };
        output.push_str(&text);
        if !text.ends_with('\n') {
            output.push('\n');
        }
    }

    match &args.output {
        Some(path) => {
            fs::write(path, output)?;
            info!(output_file = path.display().to_string(); "Output written");
        }
        None => std::io::stdout().write_all(output.as_bytes())?,
    }

    Ok(())
}

/// Logs every collected warning and returns how many there were.
fn report_warnings(design: &Design) -> usize {
    let reporter = miette::GraphicalReportHandler::new();
    let reportables = warning_reportables(design);

    for reportable in &reportables {
        let mut writer = String::new();
        match reporter.render_report(&mut writer, reportable) {
            Ok(()) => warn!("{writer}"),
            Err(_) => warn!("{reportable}"),
        }
    }

    reportables.len()
}

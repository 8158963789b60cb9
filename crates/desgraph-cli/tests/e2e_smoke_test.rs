use std::{
    fs,
    path::{Path, PathBuf},
};

use tempfile::tempdir;

use desgraph_cli::Args;

fn designs_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../designs")
}

/// Collects all .des files from a directory
fn collect_des_files(dir: PathBuf) -> Vec<PathBuf> {
    let mut files = if let Ok(entries) = fs::read_dir(&dir) {
        entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("des")
            })
            .collect()
    } else {
        Vec::new()
    };

    // Sort for consistent test output
    files.sort();
    files
}

fn args(inputs: Vec<PathBuf>, output: PathBuf) -> Args {
    Args {
        inputs,
        render: false,
        top: None,
        output: Some(output),
        config: None,
        log_level: "off".to_string(),
    }
}

#[test]
fn e2e_smoke_test_valid_designs() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let valid_designs = collect_des_files(designs_dir());

    assert!(
        !valid_designs.is_empty(),
        "No valid designs found in designs/"
    );

    let mut failed_designs = Vec::new();

    for design_path in &valid_designs {
        let output_filename = format!(
            "{}.dot",
            design_path.file_stem().unwrap().to_string_lossy()
        );
        let output_path = temp_dir.path().join(output_filename);

        let cfg = args(vec![design_path.clone()], output_path.clone());

        match desgraph_cli::run(&cfg) {
            Ok(()) => {
                let dot = fs::read_to_string(&output_path).unwrap();
                assert!(dot.starts_with("digraph"), "{}", design_path.display());
            }
            Err(e) => failed_designs.push((design_path.clone(), e)),
        }
    }

    if !failed_designs.is_empty() {
        eprintln!("\nValid designs that failed:");
        for (path, err) in &failed_designs {
            eprintln!("  - {}: {}", path.display(), err);
        }
        panic!("{} valid design(s) failed unexpectedly", failed_designs.len());
    }

    println!("All {} valid designs passed", valid_designs.len());
}

#[test]
fn e2e_smoke_test_all_designs_together() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("all.dot");

    let mut cfg = args(collect_des_files(designs_dir()), output_path.clone());
    cfg.top = Some("TOP".to_string());

    desgraph_cli::run(&cfg).expect("designs should elaborate together");

    let dot = fs::read_to_string(&output_path).unwrap();
    assert!(dot.contains("\"u1/i1\""));
    assert!(dot.contains("\"u2/i2\""));
}

#[test]
fn e2e_smoke_test_render() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let output_path = temp_dir.path().join("m1.des");

    let mut cfg = args(vec![designs_dir().join("m1.des")], output_path.clone());
    cfg.render = true;

    desgraph_cli::run(&cfg).expect("m1.des should render");

    let rendered = fs::read_to_string(&output_path).unwrap();
    assert!(rendered.starts_with("module M1(a, b);"));

    // The rendered source is itself a valid input.
    let reparsed = args(vec![output_path], temp_dir.path().join("m1.dot"));
    desgraph_cli::run(&reparsed).expect("rendered source should parse");
}

#[test]
fn e2e_smoke_test_error_designs() {
    let temp_dir = tempdir().expect("Failed to create temp directory");

    let error_designs = collect_des_files(designs_dir().join("errors"));

    assert!(
        !error_designs.is_empty(),
        "No error designs found in designs/errors/"
    );

    let mut unexpectedly_succeeded = Vec::new();

    for design_path in &error_designs {
        let output_filename = format!(
            "error_{}.dot",
            design_path.file_stem().unwrap().to_string_lossy()
        );
        let cfg = args(
            vec![design_path.clone()],
            temp_dir.path().join(output_filename),
        );

        if desgraph_cli::run(&cfg).is_ok() {
            unexpectedly_succeeded.push(design_path.clone());
        }
    }

    if !unexpectedly_succeeded.is_empty() {
        eprintln!("\nError designs that unexpectedly succeeded:");
        for path in &unexpectedly_succeeded {
            eprintln!("  - {}", path.display());
        }
        panic!(
            "{} error design(s) succeeded unexpectedly",
            unexpectedly_succeeded.len()
        );
    }

    println!("All {} error designs failed as expected", error_designs.len());
}

#[test]
fn e2e_denied_warnings_fail() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let source = temp_dir.path().join("warn.des");
    fs::write(&source, "module W(a, b); input a; output b; BUF u(.i(a)); endmodule\n").unwrap();
    let config = temp_dir.path().join("config.toml");
    fs::write(&config, "[check]\ndeny_warnings = true\n").unwrap();

    let mut cfg = args(vec![source], temp_dir.path().join("warn.dot"));
    cfg.config = Some(config);

    let err = desgraph_cli::run(&cfg).unwrap_err();

    assert!(matches!(err, desgraph::DesError::WarningsDenied { count: 1 }));
}

use std::fs;
use std::path::Path;

use acplot::core::cmds::{OutputSettings, perf, validate};
use acplot::types::{AppError, WordWidth};
use acplot::{ExportFormat, perf as analysis};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const SCHEMES: [&str; 5] = ["NONE", "AN", "ONES_COMPLEMENT", "TWOS_COMPLEMENT", "RESIDUE"];

fn tag(name: &str) -> String {
    format!("TAG_{name}_START-TAG_{name}_END")
}

/// Writes a timing file with the full harness header.
fn write_perf(dir: &Path, scheme: &str, bits: u32, rows: &[(&str, f64)]) {
    let mut text = String::from("TAGS;MEDIAN;MAX;MIN;COUNT;AVG\n");
    for (name, median) in rows {
        text.push_str(&format!("{};{median};{median};{median};10;{median}\n", tag(name)));
    }
    fs::write(dir.join(format!("perf_{scheme}_{bits}BIT.csv")), text).unwrap();
}

/// Baseline medians of 100 and 50; every encoded scheme reports 20 and 25.
fn write_fixture(dir: &Path) {
    for bits in [32, 64] {
        write_perf(dir, "NONE", bits, &[("MUL", 100.0), ("ADD", 50.0)]);
        for scheme in &SCHEMES[1..] {
            write_perf(dir, scheme, bits, &[("MUL", 20.0), ("ADD", 25.0)]);
        }
    }
}

fn vector_only() -> OutputSettings {
    OutputSettings {
        formats: vec![ExportFormat::Pdf, ExportFormat::Eps],
        ..OutputSettings::default()
    }
}

#[test]
fn additive_and_direct_ratios() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let table = analysis::slowdown_table(dir.path(), WordWidth::W32).unwrap();
    assert_eq!(table.tags, vec!["MUL", "ADD"]);
    assert_eq!(
        table.columns,
        vec!["AN 32", "1's comp. 32", "2's comp 32", "Res. 32"]
    );

    let an = table.get("MUL", "AN 32").unwrap();
    assert!((an - 1.2).abs() < 1e-12);
    let residue = table.get("MUL", "Res. 32").unwrap();
    assert!((residue - 0.2).abs() < 1e-12);
    let ones = table.get("ADD", "1's comp. 32").unwrap();
    assert!((ones - 1.5).abs() < 1e-12);
}

#[test]
fn pipeline_writes_tables_and_charts() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());

    let outputs = perf::run(dir.path(), &vector_only()).unwrap();
    assert_eq!(outputs.csv, vec![dir.path().join("out32.csv"), dir.path().join("out64.csv")]);
    assert_eq!(
        outputs.charts,
        vec![dir.path().join("perf.pdf"), dir.path().join("perf.eps")]
    );

    let csv = fs::read_to_string(dir.path().join("out64.csv")).unwrap();
    let mut lines = csv.lines();
    assert_eq!(
        lines.next().unwrap(),
        "TAGS,AN 64,1's comp. 64,2's comp 64,Res. 64"
    );
    assert_eq!(lines.next().unwrap(), "MUL,1.2,1.2,1.2,0.2");
    assert_eq!(lines.next().unwrap(), "ADD,1.5,1.5,1.5,0.5");

    for chart in &outputs.charts {
        assert!(fs::metadata(chart).unwrap().len() > 0);
    }
}

#[test]
fn measured_tag_without_baseline_fails() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    write_perf(dir.path(), "AN", 32, &[("MUL", 20.0), ("DIV", 5.0)]);

    let err = analysis::slowdown_table(dir.path(), WordWidth::W32).unwrap_err();
    assert!(matches!(err, AppError::KeyAlignment { .. }), "{err}");
}

#[test]
fn zero_baseline_median_fails_before_charting() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    write_perf(dir.path(), "NONE", 32, &[("MUL", 0.0), ("ADD", 50.0)]);

    let err = perf::run(dir.path(), &vector_only()).unwrap_err();
    assert!(
        matches!(err, AppError::SchemaMismatch { ref reason, .. } if reason.contains("MUL")),
        "{err}"
    );
    assert!(!dir.path().join("perf.pdf").exists());
}

#[test]
fn baseline_tag_without_measurement_leaves_gap() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    write_perf(dir.path(), "RESIDUE", 32, &[("MUL", 300.0)]);

    let table = analysis::slowdown_table(dir.path(), WordWidth::W32).unwrap();
    assert_eq!(table.get("MUL", "Res. 32"), Some(3.0));
    assert_eq!(table.get("ADD", "Res. 32"), None);
    assert!(table.get("ADD", "AN 32").is_some());
}

#[test]
fn missing_scheme_file_is_reported() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    fs::remove_file(dir.path().join("perf_TWOS_COMPLEMENT_64BIT.csv")).unwrap();

    let err = perf::run(dir.path(), &vector_only()).unwrap_err();
    match err {
        AppError::MissingFile(path) => {
            assert!(path.ends_with("perf_TWOS_COMPLEMENT_64BIT.csv"))
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn missing_median_column_is_schema_error() {
    let dir = tempdir().unwrap();
    write_fixture(dir.path());
    fs::write(dir.path().join("perf_AN_32BIT.csv"), "TAGS;MAX\nMUL;3\n").unwrap();

    let err = analysis::slowdown_table(dir.path(), WordWidth::W32).unwrap_err();
    assert!(
        matches!(err, AppError::SchemaMismatch { ref column, .. } if column == "MEDIAN"),
        "{err}"
    );
}

#[test]
fn validation_slowdown_is_direct() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("mul100.csv"),
        format!("TAGS;MEDIAN\n{};200\n", tag("MATMUL")),
    )
    .unwrap();
    fs::write(
        dir.path().join("mul100-enc.csv"),
        format!("TAGS;MEDIAN\n{};900\n", tag("MATMUL")),
    )
    .unwrap();

    let (table, path) = validate::run(dir.path()).unwrap();
    assert_eq!(table.get("MATMUL", "Slowdown"), Some(4.5));
    assert_eq!(
        fs::read_to_string(path).unwrap(),
        "TAGS,Slowdown\nMATMUL,4.5\n"
    );
}

use std::fs;
use std::path::Path;

use acplot::ExportFormat;
use acplot::core::cmds::OutputSettings;
use acplot::core::cmds::fi::{self, Campaigns};
use acplot::faults::aggregate;
use acplot::loader::{FI_DELIMITER, load_tables};
use acplot::types::{AppError, FaultCategory};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

const HEADER: &str = "PROG,TOTAL,ANSUC,ANFAIL,ANCRASH,OSCRASH,HANGED,ANUNEXP,NONDIAG";

fn write_run(root: &Path, campaign: &str, file: &str, rows: &[&str]) {
    let dir = root.join("faultsim-res").join(campaign);
    fs::create_dir_all(&dir).unwrap();
    let mut text = format!("{HEADER}\n");
    for row in rows {
        text.push_str(row);
        text.push('\n');
    }
    fs::write(dir.join(file), text).unwrap();
}

fn write_fixture(root: &Path) {
    write_run(
        root,
        "perm",
        "run-0.txt",
        &["val-mul,100,80,5,3,2,4,6,0", "val-mul-enc,100,60,20,10,2,3,5,0"],
    );
    write_run(root, "perm", "run-1.txt", &["val-mul-enc,50,30,10,5,1,2,2,0"]);
    write_run(
        root,
        "trans",
        "run-0.txt",
        &["val-mul,40,30,0,2,2,2,4,0", "val-mul-enc,40,20,10,5,1,1,3,0"],
    );
}

fn vector_only() -> OutputSettings {
    OutputSettings {
        formats: vec![ExportFormat::Pdf, ExportFormat::Eps],
        ..OutputSettings::default()
    }
}

#[test]
fn single_run_scenario() {
    let root = tempdir().unwrap();
    write_run(root.path(), "perm", "run.txt", &["val-mul,100,80,5,3,2,4,6,0"]);

    let pattern = root.path().join("faultsim-res/perm/*.txt");
    let tables = load_tables(&pattern.to_string_lossy(), FI_DELIMITER).unwrap();
    let summary = aggregate(&tables, &Campaigns::default().display_names).unwrap();

    let native = summary.row("Native").unwrap();
    assert_eq!(native.count(FaultCategory::Masked), 15);
    assert_eq!(native.count(FaultCategory::AcDetected), 3);
    assert_eq!(native.count(FaultCategory::OsDetected), 2);
    assert_eq!(native.count(FaultCategory::Hang), 4);
    assert_eq!(native.count(FaultCategory::Sdc), 6);
    assert_eq!(native.sum(), 30);
}

#[test]
fn pipeline_writes_summaries_and_chart() {
    let root = tempdir().unwrap();
    let charts = tempdir().unwrap();
    write_fixture(root.path());

    let outputs = fi::run(root.path(), charts.path(), &Campaigns::default(), &vector_only()).unwrap();

    assert_eq!(
        fs::read_to_string(root.path().join("fi-perm.csv")).unwrap(),
        "PROG,Masked,AC-Detected,OS-Detected,Hang,SDC\n\
         Native,15,3,2,4,6\n\
         AC,30,15,3,5,7\n"
    );
    assert_eq!(
        fs::read_to_string(root.path().join("fi-trans.csv")).unwrap(),
        "PROG,Masked,AC-Detected,OS-Detected,Hang,SDC\n\
         Native,10,2,2,2,4\n\
         AC,10,5,1,1,3\n"
    );
    assert_eq!(
        outputs.charts,
        vec![charts.path().join("fi.pdf"), charts.path().join("fi.eps")]
    );
    assert_eq!(outputs.summaries.len(), 2);
}

#[test]
fn campaign_without_results_is_missing_file() {
    let root = tempdir().unwrap();
    write_run(root.path(), "perm", "run.txt", &["val-mul,100,80,5,3,2,4,6,0"]);
    fs::create_dir_all(root.path().join("faultsim-res/trans")).unwrap();

    let err = fi::run(root.path(), root.path(), &Campaigns::default(), &vector_only()).unwrap_err();
    assert!(matches!(err, AppError::MissingFile(_)), "{err}");
}

#[test]
fn configured_display_names_apply() {
    let root = tempdir().unwrap();
    write_fixture(root.path());
    let mut campaigns = Campaigns::default();
    campaigns.names = vec!["trans".to_string()];
    campaigns
        .display_names
        .insert("val-mul-enc".to_string(), "Encoded".to_string());

    let outputs = fi::run(root.path(), root.path(), &campaigns, &vector_only()).unwrap();
    let (_, summary) = &outputs.summaries[0];
    assert_eq!(summary.programs(), vec!["Native", "Encoded"]);
}

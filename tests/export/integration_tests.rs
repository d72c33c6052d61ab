use std::fs;

use acplot::core::chart::{
    BarMode, BarTable, Chart, ChartRenderer, ChartStyleConfig, Layout, LegendMode, Orientation,
    Panel,
};
use acplot::core::chart::render::Series;
use acplot::core::cmds::{fi, perf};
use acplot::types::{AppError, FaultSummaryRow, FaultSummaryTable, SlowdownTable};
use acplot::{ExportFormat, Exporter};
use tempfile::tempdir;

fn small_exporter() -> Exporter {
    Exporter {
        width_cm: 6.0,
        height_cm: 4.0,
        dpi: 150,
    }
}

fn chart() -> Chart {
    let data = BarTable {
        categories: vec!["MUL".into(), "ADD".into(), "DIV".into()],
        series: vec![
            Series {
                label: "AN 32".into(),
                values: vec![Some(1.2), Some(1.5), None],
            },
            Series {
                label: "Res. 32".into(),
                values: vec![Some(3.0), Some(0.5), Some(8.0)],
            },
        ],
    };
    let panel = Panel {
        log2_y: true,
        y_label: Some("Slowdown".into()),
        ..Panel::new(data, BarMode::Grouped)
    };
    ChartRenderer::new(ChartStyleConfig::default())
        .render(
            Layout {
                orientation: Orientation::Stacked,
                legend: LegendMode::PerPanel,
                legend_columns: None,
            },
            vec![panel],
        )
        .unwrap()
}

#[test]
fn vector_output_is_byte_identical() {
    let exporter = small_exporter();
    let chart = chart();
    for format in [ExportFormat::Pdf, ExportFormat::Eps] {
        let first = exporter.render_vector(&chart, format).unwrap();
        let second = exporter.render_vector(&chart, format).unwrap();
        assert!(!first.is_empty());
        assert_eq!(first, second, "{format} output differs between renders");
    }
}

#[test]
fn eps_contains_legend_and_axis_label() {
    let eps = small_exporter()
        .render_vector(&chart(), ExportFormat::Eps)
        .unwrap();
    let text = String::from_utf8(eps).unwrap();
    assert!(text.contains("(AN 32) show"));
    assert!(text.contains("(Res. 32) show"));
    assert!(text.contains("(Slowdown) show"));
    assert!(text.trim_end().ends_with("%%EOF"));
}

#[test]
fn repeated_export_overwrites() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("perf");
    let exporter = small_exporter();
    let formats = [ExportFormat::Pdf, ExportFormat::Eps];

    let first = exporter.export(&chart(), &base, &formats).unwrap();
    let bytes = fs::read(&first[0]).unwrap();
    let second = exporter.export(&chart(), &base, &formats).unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second[0]).unwrap(), bytes);
}

#[test]
fn unwritable_destination_is_filesystem_error() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("missing").join("perf");
    for format in [ExportFormat::Png, ExportFormat::Pdf, ExportFormat::Eps] {
        let err = small_exporter()
            .export(&chart(), &base, &[format])
            .unwrap_err();
        assert!(matches!(err, AppError::Filesystem { .. }), "{format}: {err}");
    }
}

#[test]
fn png_has_the_physical_pixel_size() {
    let dir = tempdir().unwrap();
    let base = dir.path().join("perf");
    let exporter = small_exporter();

    let written = exporter
        .export(&chart(), &base, &[ExportFormat::Png])
        .unwrap();
    assert_eq!(written, vec![dir.path().join("perf.png")]);

    let bytes = fs::read(&written[0]).unwrap();
    assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    assert_eq!((width, height), exporter.size_px());
    assert_eq!((width, height), (354, 236));
}

fn figure_exporter() -> Exporter {
    Exporter {
        dpi: 150,
        ..Exporter::default()
    }
}

fn shows(eps: &str, text: &str) -> usize {
    eps.matches(&format!("({text}) show")).count()
}

fn slowdowns(bits: u32, scale: f64) -> SlowdownTable {
    let tags = vec!["MUL".to_string(), "ADD".to_string()];
    let mut table = SlowdownTable::new(None, tags);
    for (i, scheme) in ["AN", "Res."].iter().enumerate() {
        let factor = scale * (i + 1) as f64;
        table.push_ratios(
            format!("{scheme} {bits}"),
            &[("MUL".to_string(), 1.5 * factor), ("ADD".to_string(), 2.0 * factor)],
        );
    }
    table
}

#[test]
fn perf_figure_has_a_legend_per_panel_and_one_operations_axis() {
    let style = ChartStyleConfig::default();
    let chart = perf::perf_chart(&slowdowns(32, 1.0), &slowdowns(64, 2.0), &style).unwrap();
    let eps = String::from_utf8(
        figure_exporter()
            .render_vector(&chart, ExportFormat::Eps)
            .unwrap(),
    )
    .unwrap();

    for label in ["AN 32", "Res. 32", "AN 64", "Res. 64"] {
        assert_eq!(shows(&eps, label), 1, "legend entry {label}");
    }
    assert_eq!(shows(&eps, "Slowdown"), 2);
    assert_eq!(shows(&eps, "Operations"), 1);
    // Category ticks only under the bottom panel
    assert_eq!(shows(&eps, "MUL"), 1);
    assert_eq!(shows(&eps, "ADD"), 1);
}

#[test]
fn fi_figure_has_one_shared_legend_and_both_titles() {
    let summary = |scale: i64| FaultSummaryTable {
        rows: vec![
            FaultSummaryRow {
                program: "Native".into(),
                counts: [15 * scale, 3, 2, 4, 6],
            },
            FaultSummaryRow {
                program: "AC".into(),
                counts: [30 * scale, 15, 3, 5, 7],
            },
        ],
    };
    let summaries = vec![
        ("perm".to_string(), summary(1)),
        ("trans".to_string(), summary(2)),
    ];
    let chart = fi::fi_chart(&summaries, &ChartStyleConfig::default()).unwrap();
    assert_eq!(chart.layout().legend, LegendMode::Shared);
    assert_eq!(chart.layout().legend_columns, Some(5));

    let eps = String::from_utf8(
        figure_exporter()
            .render_vector(&chart, ExportFormat::Eps)
            .unwrap(),
    )
    .unwrap();

    for label in ["Masked", "AC-Detected", "OS-Detected", "Hang", "SDC"] {
        assert_eq!(shows(&eps, label), 1, "legend entry {label}");
    }
    assert_eq!(shows(&eps, "Permanent fault inj."), 1);
    assert_eq!(shows(&eps, "Transient fault inj."), 1);
    assert_eq!(shows(&eps, "Native"), 2);
    assert_eq!(shows(&eps, "AC"), 2);
}

use log::info;

use crate::types::AppResult;
use crate::types::config::config;

fn list(values: &[String]) -> String {
    format!("[{}]", values.join(", "))
}

pub fn execute(format: String) -> AppResult<()> {
    let effective = config().to_effective();

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&effective)?);
        return Ok(());
    }

    info!("Effective Configuration:");
    info!("");
    info!("Log:");
    let log = effective.log();
    info!("  level: {}", log.level());
    match log.color {
        Some(true) => info!("  color: on"),
        Some(false) => info!("  color: off"),
        None => info!("  color: auto"),
    }

    info!("");
    info!("Export:");
    let export = effective.export();
    info!("  formats: {}", list(&export.formats()));
    info!("  size: {} x {} cm", export.width_cm(), export.height_cm());
    info!("  dpi: {}", export.dpi());

    info!("");
    info!("Style:");
    let style = effective.style();
    match &style.font_family {
        Some(family) => info!("  font_family: {family}"),
        None => info!("  font_family: (default)"),
    }
    if let Some(size) = style.font_size_pt {
        info!("  font_size_pt: {size}");
    }
    if let Some(size) = style.legend_font_size_pt {
        info!("  legend_font_size_pt: {size}");
    }
    if let Some(width) = style.bar_width {
        info!("  bar_width: {width}");
    }
    match &style.palette {
        Some(palette) => info!("  palette: {}", list(palette)),
        None => info!("  palette: (default)"),
    }

    info!("");
    info!("Fault injection:");
    let fi = effective.fi();
    info!("  results_dir: {}", fi.results_dir());
    info!("  campaigns: {}", list(&fi.campaigns()));
    info!("  display_names:");
    for (raw, display) in fi.display_names() {
        info!("    {raw} -> {display}");
    }

    Ok(())
}

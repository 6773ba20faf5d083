use crate::aggregate::{ChartView, SeriesSet};
use crate::chart::ChartData;
use crate::loader::LoadStats;
use crate::source::CsvSource;
use echo_charts_common::{EchoChartsError, Result};
use std::io::Write;
use std::path::Path;

// --- headless summary output ---

pub fn write_summary<W: Write>(
    out: &mut W,
    sources: &[CsvSource],
    stats: &LoadStats,
    data: &ChartData,
) -> std::io::Result<()> {
    writeln!(out, "{:<16} {}", "Sources:", sources.len())?;
    writeln!(out, "{:<16} {}", "Rows:", stats.rows_read)?;
    if stats.rows_skipped > 0 {
        writeln!(out, "{:<16} {}", "Skipped:", stats.rows_skipped)?;
    }
    writeln!(out, "{:<16} {}", "Days:", data.daily.both.len())?;
    writeln!(
        out,
        "{:<16} {} expls / {} rexpls",
        "Split:",
        data.daily.primary.total(),
        data.daily.secondary.total()
    )?;
    for view in [ChartView::Hourly, ChartView::Weekday] {
        writeln!(out)?;
        write_view_table(out, view, data.view(view))?;
    }
    Ok(())
}

pub fn print_summary(sources: &[CsvSource], stats: &LoadStats, data: &ChartData) {
    let mut stdout = std::io::stdout().lock();
    let _ = write_summary(&mut stdout, sources, stats, data);
}

pub fn write_view_table<W: Write>(out: &mut W, view: ChartView, set: &SeriesSet) -> std::io::Result<()> {
    writeln!(out, "{:<12} {:>8} {:>8} {:>8} {:>8}", view.name(), "both", "expls", "rexpls", "avg")?;
    for (i, p) in set.both.points().iter().enumerate() {
        let primary = set.primary.points().get(i).map_or(0, |q| q.count);
        let secondary = set.secondary.points().get(i).map_or(0, |q| q.count);
        let avg = p.average.map_or("-".to_string(), |a| format!("{a:.2}"));
        writeln!(out, "{:<12} {:>8} {:>8} {:>8} {:>8}", p.position.to_string(), p.count, primary, secondary, avg)?;
    }
    Ok(())
}

// --- JSON export ---

pub fn export_json(output_path: &Path, sources: &[CsvSource], stats: &LoadStats, data: &ChartData) -> Result<()> {
    let doc = serde_json::json!({
        "sources": sources,
        "stats": stats,
        "daily": data.daily,
        "hourly": data.hourly,
        "weekday": data.weekday,
    });
    let mut file = std::fs::File::create(output_path)?;
    serde_json::to_writer_pretty(&mut file, &doc).map_err(|e| EchoChartsError::Other(e.to_string()))?;
    Ok(())
}

// --- CSV export ---

/// one row per (view, key): counts for all three series plus their averages
pub fn export_csv(output_path: &Path, data: &ChartData) -> Result<()> {
    let mut w = csv::Writer::from_path(output_path)?;
    w.write_record([
        "view", "key", "both", "expls", "rexpls", "both_avg", "expls_avg", "rexpls_avg",
    ])?;
    let fmt_avg = |a: Option<f64>| a.map_or(String::new(), |v| format!("{v:.2}"));
    for view in ChartView::ALL {
        let set = data.view(view);
        for p in set.both.points() {
            let primary = set.primary.get(&p.position);
            let secondary = set.secondary.get(&p.position);
            w.write_record([
                view.name().to_string(),
                p.position.to_string(),
                p.count.to_string(),
                primary.map_or(0, |q| q.count).to_string(),
                secondary.map_or(0, |q| q.count).to_string(),
                fmt_avg(p.average),
                fmt_avg(primary.and_then(|q| q.average)),
                fmt_avg(secondary.and_then(|q| q.average)),
            ])?;
        }
    }
    w.flush()?;
    Ok(())
}

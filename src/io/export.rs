//! History and report exporters

use crate::config::app::CsvLayout;
use crate::engine::view::{RatingReport, RatingView};
use crate::error::{RatingError, Result};
use std::borrow::Cow;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::info;

/// Render the rating history as CSV text
pub fn render_history_csv(view: &RatingView<'_>, layout: CsvLayout) -> String {
    let mut out = String::new();

    match layout {
        CsvLayout::Wide => {
            let players = view.players();
            out.push_str("session,date");
            for player in players {
                let _ = write!(out, ",{}", escape_field(player));
            }
            out.push('\n');

            for snapshot in view.snapshots() {
                let _ = write!(
                    out,
                    "{},{}",
                    snapshot.session_index,
                    snapshot.date.map(|d| d.to_string()).unwrap_or_default()
                );
                for player in players {
                    match snapshot.ratings.get(player) {
                        Some(rating) => {
                            let _ = write!(out, ",{:.2}", rating);
                        }
                        None => out.push(','),
                    }
                }
                out.push('\n');
            }
        }
        CsvLayout::Long => {
            out.push_str("session,date,player,rating\n");
            for entry in view.entries() {
                let _ = writeln!(
                    out,
                    "{},{},{},{:.2}",
                    entry.session_index,
                    entry.date.map(|d| d.to_string()).unwrap_or_default(),
                    escape_field(&entry.player),
                    entry.rating
                );
            }
        }
    }

    out
}

/// Write the rating history CSV to `path`
pub fn write_history_csv(view: &RatingView<'_>, layout: CsvLayout, path: &Path) -> Result<()> {
    write_file(path, &render_history_csv(view, layout))?;
    info!("Rating history ({} layout) saved to {}", layout, path.display());
    Ok(())
}

/// Pretty-printed JSON for a report
pub fn render_report_json(report: &RatingReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(|e| {
        RatingError::ExportFailed {
            message: format!("Failed to serialize report: {}", e),
        }
        .into()
    })
}

/// Write the JSON report to `path`
pub fn write_report_json(report: &RatingReport, path: &Path) -> Result<()> {
    write_file(path, &render_report_json(report)?)?;
    info!("Ratings saved to {}", path.display());
    Ok(())
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RatingError::ExportFailed {
            message: format!("Failed to create {}: {}", parent.display(), e),
        })?;
    }

    fs::write(path, contents).map_err(|e| RatingError::ExportFailed {
        message: format!("Failed to write {}: {}", path.display(), e),
    })?;
    Ok(())
}

fn escape_field(field: &str) -> Cow<'_, str> {
    if field.contains(|c: char| matches!(c, ',' | '"' | '\n')) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

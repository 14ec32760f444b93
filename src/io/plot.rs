//! Rating-over-time chart

use crate::engine::view::RatingView;
use crate::error::{RatingError, Result};
use plotters::prelude::*;
use std::fmt::Display;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

const CHART_SIZE: (u32, u32) = (1200, 700);
const RATING_PADDING: f64 = 25.0;

fn plot_error(err: impl Display) -> RatingError {
    RatingError::ExportFailed {
        message: format!("Failed to draw rating chart: {}", err),
    }
}

/// Draw every player's rating series as an SVG line chart.
///
/// The x axis is the session index, labelled with the session date when known.
/// Nothing is written when no session has been committed.
pub fn write_history_plot(view: &RatingView<'_>, path: &Path) -> Result<()> {
    let sessions = view.sessions();
    let Some(last) = sessions.last() else {
        warn!("No rated sessions, skipping chart {}", path.display());
        return Ok(());
    };

    let (low, high) = view
        .entries()
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(low, high), entry| {
            (low.min(entry.rating), high.max(entry.rating))
        });
    let dates: Vec<String> = sessions
        .iter()
        .map(|record| match record.date {
            Some(date) => date.format("%Y-%m-%d").to_string(),
            None => record.session_index.to_string(),
        })
        .collect();

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| RatingError::ExportFailed {
            message: format!("Failed to create {}: {}", parent.display(), e),
        })?;
    }

    let root = SVGBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&root)
        .caption("Poker ELO Rating History", ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(
            0usize..last.session_index.max(1),
            (low - RATING_PADDING)..(high + RATING_PADDING),
        )
        .map_err(plot_error)?;

    let label_session = |index: &usize| dates.get(*index).cloned().unwrap_or_default();
    chart
        .configure_mesh()
        .x_desc("Session")
        .y_desc("ELO rating")
        .x_label_formatter(&label_session)
        .y_label_formatter(&|rating| format!("{:.0}", rating))
        .draw()
        .map_err(plot_error)?;

    for (i, player) in view.players().iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();
        let series: Vec<(usize, f64)> = view.history(player).iter().collect();

        chart
            .draw_series(LineSeries::new(series, color.stroke_width(2)))
            .map_err(plot_error)?
            .label(player.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(plot_error)?;

    root.present().map_err(plot_error)?;
    info!("Rating chart saved to {}", path.display());
    Ok(())
}

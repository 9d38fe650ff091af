// ============================================================
// Layer 6 — Training Curves
// ============================================================
// Renders the metric history as a two-panel PNG:
//
//   ┌──────────────── Accuracy ────────────────┐
//   │  train ──   validation ──   (0..1)       │
//   ├────────────────── Loss ──────────────────┤
//   │  train ──   validation ──   (MSE)        │
//   └──────────────────────────────────────────┘
//
// x axis is the zero-based epoch index. Text is drawn with the
// system "sans-serif" font, so headless machines without fonts
// should skip plotting (train --no-plot).
//
// Reference: plotters crate documentation

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;
use std::path::Path;

use crate::domain::error::{TrainError, TrainResult};
use crate::infra::metrics::MetricHistory;

/// File name of the curve figure inside the checkpoint directory
pub const FIGURE_FILE: &str = "fig_train_skeleton.png";

const FIGURE_SIZE: (u32, u32) = (2000, 1000);

/// Draw the accuracy and loss curves of `history` into a PNG at `path`.
pub fn render_curves(history: &MetricHistory, path: &Path) -> TrainResult<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE).map_err(TrainError::render(path))?;

    let panels = root.split_evenly((2, 1));

    draw_panel(
        &panels[0],
        "Accuracy",
        "Accuracy",
        &history.train_accuracy,
        &history.val_accuracy,
        1.0,
    )
    .map_err(TrainError::render(path))?;

    let loss_max = history
        .train_loss
        .iter()
        .chain(&history.val_loss)
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max);

    draw_panel(
        &panels[1],
        "Loss",
        "MSE",
        &history.train_loss,
        &history.val_loss,
        (loss_max * 1.1).max(1e-3),
    )
    .map_err(TrainError::render(path))?;

    root.present().map_err(TrainError::render(path))?;
    tracing::info!("Saved training curves to '{}'", path.display());
    Ok(())
}

fn draw_panel<DB: DrawingBackend>(
    area:    &DrawingArea<DB, Shift>,
    title:   &str,
    y_desc:  &str,
    train:   &[f64],
    val:     &[f64],
    y_max:   f64,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let x_max = train.len().saturating_sub(1).max(1) as f64;

    let mut chart = ChartBuilder::on(area)
        .caption(title, ("sans-serif", 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(70)
        .build_cartesian_2d(0f64..x_max, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_desc("Epochs")
        .y_desc(y_desc)
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            train.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            &BLUE,
        ))?
        .label("train")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &BLUE));

    chart
        .draw_series(LineSeries::new(
            val.iter().enumerate().map(|(i, v)| (i as f64, *v)),
            &RED,
        ))?
        .label("validation")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], &RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

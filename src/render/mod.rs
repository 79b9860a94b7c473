//! Chart rendering: one image per label.
//!
//! The model is turned into backend-neutral `ChartPlan`s here; drawing and
//! encoding live behind `ChartBackend` (see `png`).

pub mod layout;
pub mod palette;
pub mod png;

pub use layout::OutputLayout;
pub use palette::Palette;
pub use png::PngBackend;

use crate::Result;
use crate::model::{EstimateData, Series};
use plotters::style::RGBColor;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const X_DESC: &str = "Time";
pub const Y_DESC: &str = "Constant";
pub const SHARED_LEGEND: &str = "shared";

#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("label {label:?} has per-process updates but no estim_update_shared series")]
    MissingShared { label: String },
}

/// One connected line, drawn in its series index's palette color.
#[derive(Debug, Clone, PartialEq)]
pub struct LinePlan {
    pub legend: String,
    pub color: RGBColor,
    pub points: Vec<(f64, f64)>,
}

/// Everything needed to draw one label's chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartPlan {
    pub title: String,
    pub lines: Vec<LinePlan>,
    /// Drawn last as black triangle markers, unconnected.
    pub shared: Vec<(f64, f64)>,
}

impl ChartPlan {
    /// Every plotted point, lines first.
    pub fn all_points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.lines
            .iter()
            .flat_map(|l| l.points.iter().copied())
            .chain(self.shared.iter().copied())
    }

    /// Axis ranges covering all points. Degenerate ranges are widened so a
    /// single point still gets a drawable chart.
    pub fn bounds(&self) -> ((f64, f64), (f64, f64)) {
        let mut x = (f64::INFINITY, f64::NEG_INFINITY);
        let mut y = (f64::INFINITY, f64::NEG_INFINITY);
        for (px, py) in self.all_points() {
            x = (x.0.min(px), x.1.max(px));
            y = (y.0.min(py), y.1.max(py));
        }
        (widen(x), widen(y))
    }

    /// Legend corner with the fewest points under it.
    pub fn legend_corner(&self) -> Corner {
        let ((x0, x1), (y0, y1)) = self.bounds();
        let (xm, ym) = ((x0 + x1) / 2.0, (y0 + y1) / 2.0);

        let mut counts = [0usize; 4];
        for (x, y) in self.all_points() {
            let right = x > xm;
            let upper = y > ym;
            let idx = match (upper, right) {
                (true, false) => 0,
                (true, true) => 1,
                (false, false) => 2,
                (false, true) => 3,
            };
            counts[idx] += 1;
        }

        // Ties keep matplotlib's preference: upper right first.
        let order = [
            (1, Corner::UpperRight),
            (0, Corner::UpperLeft),
            (2, Corner::LowerLeft),
            (3, Corner::LowerRight),
        ];
        let mut best = order[0];
        for cand in order {
            if counts[cand.0] < counts[best.0] {
                best = cand;
            }
        }
        best.1
    }
}

fn widen((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = if hi - lo <= f64::EPSILON * lo.abs().max(1.0) {
        if lo == 0.0 { 1.0 } else { lo.abs() * 0.1 }
    } else {
        // Scaled before subtracting: hi - lo overflows for data near f64::MAX.
        hi * 0.05 - lo * 0.05
    };
    let (wlo, whi) = (lo - pad, hi + pad);
    if wlo.is_finite() && whi.is_finite() {
        (wlo, whi)
    } else {
        (lo, hi)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    UpperLeft,
    UpperRight,
    LowerLeft,
    LowerRight,
}

/// Draws a chart plan into an image file.
pub trait ChartBackend {
    fn draw(&mut self, plan: &ChartPlan, path: &Path) -> Result<()>;
}

fn points(series: &Series) -> Vec<(f64, f64)> {
    series.iter().map(|(t, v)| (t.into_inner(), *v)).collect()
}

/// Build the plan for one label.
pub fn plan_chart(
    label: &str,
    data: &EstimateData,
    palette: &Palette,
) -> std::result::Result<ChartPlan, RenderError> {
    let lines: Vec<LinePlan> = data
        .per_process
        .get(label)
        .map(|by_index| {
            by_index
                .iter()
                .map(|(index, series)| LinePlan {
                    legend: index.to_string(),
                    color: palette.color(*index),
                    points: points(series),
                })
                .collect()
        })
        .unwrap_or_default();

    let shared = data
        .shared
        .get(label)
        .ok_or_else(|| RenderError::MissingShared {
            label: label.to_string(),
        })?;

    Ok(ChartPlan {
        title: label.to_string(),
        lines,
        shared: points(shared),
    })
}

/// Render every label with per-process updates, in label order.
///
/// Stops at the first failure; charts already written stay on disk. Two
/// labels that sanitize to the same path are both drawn, the later one
/// replacing the earlier, with a warning.
pub fn render_all<B: ChartBackend>(
    data: &EstimateData,
    layout: &OutputLayout,
    backend: &mut B,
) -> Result<Vec<PathBuf>> {
    layout.prepare_root()?;

    let palette = Palette::hsv(data.palette_size());
    debug!(colors = palette.len(), labels = data.per_process.len(), "rendering");
    let mut written = Vec::new();
    let mut owners: HashMap<PathBuf, &str> = HashMap::new();

    for label in data.per_process.keys() {
        let plan = plan_chart(label, data, &palette)?;
        let path = layout.prepare_label(label)?;
        if let Some(prev) = owners.insert(path.clone(), label.as_str()) {
            warn!(
                label = %label,
                previous = %prev,
                path = %path.display(),
                "labels map to the same output file; overwriting"
            );
        }
        backend.draw(&plan, &path)?;
        info!(
            label = %label,
            series = plan.lines.len(),
            path = %path.display(),
            "rendered chart"
        );
        written.push(path);
    }

    Ok(written)
}

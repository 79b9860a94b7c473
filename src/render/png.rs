use crate::Result;
use crate::render::{ChartBackend, ChartPlan, Corner, SHARED_LEGEND, X_DESC, Y_DESC};
use anyhow::Context;
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::Path;

/// Bitmap PNG output through plotters.
#[derive(Debug, Clone, Copy)]
pub struct PngBackend {
    pub width: u32,
    pub height: u32,
}

impl Default for PngBackend {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
        }
    }
}

impl From<Corner> for SeriesLabelPosition {
    fn from(corner: Corner) -> Self {
        match corner {
            Corner::UpperLeft => SeriesLabelPosition::UpperLeft,
            Corner::UpperRight => SeriesLabelPosition::UpperRight,
            Corner::LowerLeft => SeriesLabelPosition::LowerLeft,
            Corner::LowerRight => SeriesLabelPosition::LowerRight,
        }
    }
}

impl ChartBackend for PngBackend {
    fn draw(&mut self, plan: &ChartPlan, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, (self.width, self.height)).into_drawing_area();
        draw_chart(&root, plan).with_context(|| format!("draw chart {:?}", plan.title))?;
        root.present()
            .with_context(|| format!("write chart {}", path.display()))?;
        Ok(())
    }
}

fn draw_chart<DB>(area: &DrawingArea<DB, Shift>, plan: &ChartPlan) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    area.fill(&WHITE)?;

    let ((x0, x1), (y0, y1)) = plan.bounds();
    let mut chart = ChartBuilder::on(area)
        .margin(15)
        .caption(&plan.title, ("sans-serif", 24).into_font())
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc(X_DESC)
        .y_desc(Y_DESC)
        .draw()?;

    for line in &plan.lines {
        let color = line.color;
        chart
            .draw_series(LineSeries::new(
                line.points.iter().copied(),
                color.stroke_width(2),
            ))?
            .label(line.legend.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .draw_series(
            plan.shared
                .iter()
                .map(|&(x, y)| TriangleMarker::new((x, y), 5, BLACK.filled())),
        )?
        .label(SHARED_LEGEND)
        .legend(|(x, y)| TriangleMarker::new((x + 10, y), 5, BLACK.filled()));

    chart
        .configure_series_labels()
        .position(plan.legend_corner().into())
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()?;

    Ok(())
}

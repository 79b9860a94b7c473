//! Serializable summary of the aggregated series (written by `--summary`).

use crate::model::{EstimateData, Series};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesView {
    pub index: i64,
    /// (timestamp, value), ascending by timestamp.
    pub points: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelView {
    pub label: String,
    pub series: Vec<SeriesView>,
    /// Empty when the label never received an `estim_update_shared`.
    pub shared: Vec<(f64, f64)>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub palette_size: usize,
    pub labels: Vec<LabelView>,
}

fn to_points(series: &Series) -> Vec<(f64, f64)> {
    series.iter().map(|(t, v)| (t.into_inner(), *v)).collect()
}

/// Flatten the nested maps into label-ordered views.
///
/// Labels that only ever got shared updates are listed too, with no series.
pub fn build_summary(data: &EstimateData) -> SummaryView {
    let mut labels: Vec<&String> = data.per_process.keys().chain(data.shared.keys()).collect();
    labels.sort();
    labels.dedup();

    let labels: Vec<LabelView> = labels
        .into_iter()
        .map(|label| LabelView {
            label: label.clone(),
            series: data
                .per_process
                .get(label)
                .map(|by_index| {
                    by_index
                        .iter()
                        .map(|(index, series)| SeriesView {
                            index: *index,
                            points: to_points(series),
                        })
                        .collect::<Vec<_>>()
                })
                .unwrap_or_default(),
            shared: data.shared.get(label).map(to_points).unwrap_or_default(),
        })
        .collect();

    SummaryView {
        palette_size: data.palette_size(),
        labels,
    }
}

//! Aggregation model: group estimator records by label and series index.

pub mod view;

use crate::log::{LogRecord, RecordBody};
use ordered_float::OrderedFloat;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

pub use view::build_summary;

/// Series points keyed by timestamp, so iteration is in time order.
pub type Series = BTreeMap<OrderedFloat<f64>, f64>;

#[derive(Debug, Error, PartialEq)]
pub enum AggregateError {
    #[error("{source_name}:{line}: estimator key {key:?} has no estim_name registration before it")]
    UnknownName {
        source_name: String,
        line: usize,
        key: String,
    },
}

/// Everything the renderer needs, built in one pass over the records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EstimateData {
    /// label -> series index -> timestamp -> value.
    pub per_process: BTreeMap<String, BTreeMap<i64, Series>>,
    /// label -> timestamp -> value.
    pub shared: BTreeMap<String, Series>,
    /// Highest series index seen in an `estim_update`. May be negative:
    /// `-1` is the logger's id for events recorded outside any worker.
    pub max_index: Option<i64>,
}

impl EstimateData {
    /// One slot past the highest index, plus one for the shared end of the
    /// hue sweep. A log without updates still gets a single color.
    pub fn palette_size(&self) -> usize {
        match self.max_index {
            Some(max) => usize::try_from(max.saturating_add(2)).unwrap_or(0).max(1),
            None => 1,
        }
    }
}

/// Raw estimator key -> display name. Later registrations win.
#[derive(Debug, Default)]
struct NameTable {
    names: HashMap<String, String>,
}

impl NameTable {
    fn register(&mut self, key: &str, display: &str) {
        self.names.insert(key.to_string(), display.to_string());
    }

    fn resolve(&self, key: &str) -> Option<&str> {
        self.names.get(key).map(String::as_str)
    }
}

/// Fold records into per-process and shared series.
///
/// Duplicate (label, index, timestamp) and (label, timestamp) points are
/// last-write-wins. Every estimator record, `estim_name` included, resolves
/// its key after the registration check; an unregistered key is fatal.
pub fn aggregate(records: &[LogRecord], source_name: &str) -> Result<EstimateData, AggregateError> {
    let mut names = NameTable::default();
    let mut data = EstimateData::default();

    for rec in records {
        if let RecordBody::Name { display } = &rec.body {
            names.register(&rec.key, display);
        }

        let label = names
            .resolve(&rec.key)
            .ok_or_else(|| AggregateError::UnknownName {
                source_name: source_name.to_string(),
                line: rec.line,
                key: rec.key.clone(),
            })?;

        match &rec.body {
            RecordBody::Update {
                series_index,
                value,
            } => {
                data.per_process
                    .entry(label.to_string())
                    .or_default()
                    .entry(*series_index)
                    .or_default()
                    .insert(OrderedFloat(rec.timestamp), *value);
                data.max_index = Some(
                    data.max_index
                        .map_or(*series_index, |m| m.max(*series_index)),
                );
            }
            RecordBody::UpdateShared { value } => {
                data.shared
                    .entry(label.to_string())
                    .or_default()
                    .insert(OrderedFloat(rec.timestamp), *value);
            }
            RecordBody::Name { .. } => {}
            RecordBody::Other { .. } => {
                debug!(line = rec.line, kind = rec.body.tag(), "estimator event not plotted");
            }
        }
    }

    Ok(data)
}

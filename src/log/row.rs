/// Payload of an estimator event, by record kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordBody {
    /// `estim_name`: binds the raw key to a display name.
    Name { display: String },
    /// `estim_update`: one estimator instance reports a new constant.
    ///
    /// The index is the reporting worker id; `-1` means no worker yet.
    Update { series_index: i64, value: f64 },
    /// `estim_update_shared`: the shared constant for the label changes.
    UpdateShared { value: f64 },
    /// Any other `estim_*` event (`estim_report`, `estim_predict`, ...).
    Other { tag: String },
}

impl RecordBody {
    pub fn tag(&self) -> &str {
        match self {
            RecordBody::Name { .. } => "estim_name",
            RecordBody::Update { .. } => "estim_update",
            RecordBody::UpdateShared { .. } => "estim_update_shared",
            RecordBody::Other { tag } => tag,
        }
    }
}

/// A single estimator event from the text LOG.
///
/// Columns after empty-field collapse:
/// timestamp  series_index  kind  key  payload  [ignored...]
///
/// Only `estim_update` reads the series index column.
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    /// 1-based line number in the source.
    pub line: usize,
    pub timestamp: f64,
    /// Raw estimator key, resolved through `estim_name` registrations.
    pub key: String,
    pub body: RecordBody,
}

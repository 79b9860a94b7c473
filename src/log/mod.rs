//! Log parsing for the scheduler's text event LOG.

pub mod parse;
pub mod row;

pub use parse::{MalformedPolicy, parse_log_file};
pub use row::{LogRecord, RecordBody};

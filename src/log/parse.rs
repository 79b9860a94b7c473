use crate::log::row::{LogRecord, RecordBody};
use anyhow::Context;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// timestamp, series_index, kind, key, payload.
pub const MIN_FIELDS: usize = 5;

/// Prefix shared by every estimator event kind.
const ESTIM_PREFIX: &str = "estim_";

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("{source_name}:{line}: expected at least {} fields, found {found}", MIN_FIELDS)]
    TooFewFields {
        source_name: String,
        line: usize,
        found: usize,
    },

    #[error("{source_name}:{line}: bad {field} {raw:?}")]
    BadNumber {
        source_name: String,
        line: usize,
        field: &'static str,
        raw: String,
    },
}

/// What to do with a line that does not fit the record schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MalformedPolicy {
    /// Abort the whole run on the first bad line.
    #[default]
    Fail,
    /// Warn and keep going.
    Skip,
}

/// Read and parse a text LOG file into estimator records.
pub fn parse_log_file(path: &Path, policy: MalformedPolicy) -> anyhow::Result<Vec<LogRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("read log file {}", path.display()))?;
    let records = parse_log_str(&text, &path.display().to_string(), policy)?;
    Ok(records)
}

/// Parse LOG text. `source_name` is only used in error messages.
///
/// Lines whose kind is not an `estim_*` event are skipped under either
/// policy: the scheduler interleaves thread, steal and phase events that
/// carry no estimator key, so they are not malformed. `policy` only governs
/// estimator lines and lines too short to carry a kind.
pub fn parse_log_str(
    text: &str,
    source_name: &str,
    policy: MalformedPolicy,
) -> Result<Vec<LogRecord>, ParseError> {
    let mut out = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        let lno = lineno + 1;
        let fields = split_fields(line);

        if fields.is_empty() {
            continue;
        }

        match parse_fields(&fields, source_name, lno) {
            Ok(Some(record)) => out.push(record),
            Ok(None) => debug!(line = lno, "skipping non-estimator event"),
            Err(err) => match policy {
                MalformedPolicy::Fail => return Err(err),
                MalformedPolicy::Skip => warn!("skipping malformed line: {}", err),
            },
        }
    }
    Ok(out)
}

/// Split on tabs, trim, and drop fields that end up empty.
///
/// Doubled, leading and trailing tabs collapse; so does an empty middle
/// field, which shifts every later field one position left.
pub fn split_fields(line: &str) -> Vec<&str> {
    line.split('\t')
        .map(|f| f.trim_matches(|c| matches!(c, ' ' | '\t' | '\n' | '\r')))
        .filter(|f| !f.is_empty())
        .collect()
}

fn parse_fields(
    fields: &[&str],
    source_name: &str,
    lno: usize,
) -> Result<Option<LogRecord>, ParseError> {
    // Anything shorter than the kind column cannot even be classified.
    if fields.len() < 3 {
        return Err(ParseError::TooFewFields {
            source_name: source_name.to_string(),
            line: lno,
            found: fields.len(),
        });
    }

    let kind = fields[2];
    if !kind.starts_with(ESTIM_PREFIX) {
        return Ok(None);
    }

    if fields.len() < MIN_FIELDS {
        return Err(ParseError::TooFewFields {
            source_name: source_name.to_string(),
            line: lno,
            found: fields.len(),
        });
    }

    let number = |idx: usize, field: &'static str| -> Result<f64, ParseError> {
        fields[idx].parse::<f64>().map_err(|_| ParseError::BadNumber {
            source_name: source_name.to_string(),
            line: lno,
            field,
            raw: fields[idx].to_string(),
        })
    };

    let timestamp = number(0, "timestamp")?;

    let body = match kind {
        "estim_name" => RecordBody::Name {
            display: fields[4].to_string(),
        },
        "estim_update" => RecordBody::Update {
            series_index: fields[1]
                .parse::<i64>()
                .map_err(|_| ParseError::BadNumber {
                    source_name: source_name.to_string(),
                    line: lno,
                    field: "series index",
                    raw: fields[1].to_string(),
                })?,
            value: number(4, "value")?,
        },
        "estim_update_shared" => RecordBody::UpdateShared {
            value: number(4, "value")?,
        },
        other => RecordBody::Other {
            tag: other.to_string(),
        },
    };

    Ok(Some(LogRecord {
        line: lno,
        timestamp,
        key: fields[3].to_string(),
        body,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn parse(text: &str) -> Result<Vec<LogRecord>, ParseError> {
        parse_log_str(text, "LOG", MalformedPolicy::Fail)
    }

    #[test]
    fn split_collapses_empty_fields() {
        assert_eq!(
            split_fields("\t0.5\t\t2\t estim_update \tk\t1.0\t\r"),
            vec!["0.5", "2", "estim_update", "k", "1.0"]
        );
        assert_eq!(split_fields("  \t \r"), Vec::<&str>::new());
    }

    #[test]
    fn empty_middle_field_shifts_later_fields() {
        // The blank key disappears, so the value lands in the key column
        // and the line is one field short.
        let err = parse("0.0\t1\testim_update\t \t5.0\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::TooFewFields {
                source_name: "LOG".to_string(),
                line: 1,
                found: 4,
            }
        );
    }

    #[test]
    fn parses_the_three_plotted_kinds() {
        let text = "0.0\t1\testim_name   \tk1\tP1\t\n\
                    0.0\t1\testim_update \tk1\t5.0\t\n\
                    0.5\t0\testim_update_shared\tk1\t4.0\n";
        let recs = parse(text).unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(
            recs[0].body,
            RecordBody::Name {
                display: "P1".to_string()
            }
        );
        assert_eq!(
            recs[1].body,
            RecordBody::Update {
                series_index: 1,
                value: 5.0
            }
        );
        assert_eq!(recs[2].body, RecordBody::UpdateShared { value: 4.0 });
        assert_eq!(recs[2].timestamp, 0.5);
        assert_eq!(recs[2].line, 3);
    }

    #[test]
    fn keeps_other_estimator_events_and_skips_the_rest() {
        let text = "0.1\t0\tthread_exec    \t0x55d0\n\
                    0.2\t0\tenter_wait   \t\n\
                    0.3\t0\testim_predict\tk1\t12\t                     \t0.5\t6.0\t\n";
        let recs = parse(text).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].body.tag(), "estim_predict");
        assert_eq!(recs[0].key, "k1");
    }

    #[test]
    fn negative_worker_ids_are_accepted() {
        let recs = parse("0.0\t-1\testim_name\tk1\tP1\n\
                          0.0\t-1\testim_update\tk1\t5.0\n\
                          0.1\t-1\testim_update_shared\tk1\t4.0\n")
        .unwrap();
        assert_eq!(recs.len(), 3);
        assert_eq!(
            recs[1].body,
            RecordBody::Update {
                series_index: -1,
                value: 5.0
            }
        );
    }

    #[test]
    fn series_index_is_only_checked_on_updates() {
        let recs = parse("0.0\tw?\testim_name\tk1\tP1\n").unwrap();
        assert_eq!(recs.len(), 1);

        let err = parse("0.0\tw?\testim_update\tk1\t1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::BadNumber {
                field: "series index",
                ..
            }
        ));
    }

    #[test]
    fn non_estimator_lines_are_skipped_under_fail_policy() {
        let text = "0.1\t0\tsteal_fail   \n\
                    0.2\t3\tthread_exec    \t0x55d0\n";
        assert_eq!(parse(text).unwrap(), Vec::<LogRecord>::new());
    }

    #[test]
    fn too_few_fields_fails_by_default() {
        let err = parse("0.0\t1\testim_update\tk1\n").unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { found: 4, .. }));

        let err = parse("0.0\t1\n").unwrap_err();
        assert!(matches!(err, ParseError::TooFewFields { found: 2, .. }));
    }

    #[test]
    fn bad_numbers_are_reported_with_their_column() {
        let err = parse("0.0\tx\testim_update\tk1\t1.0\n").unwrap_err();
        assert!(matches!(
            err,
            ParseError::BadNumber {
                field: "series index",
                ..
            }
        ));

        let err = parse("0.0\t1\testim_update\tk1\tfast\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "LOG:1: bad value \"fast\"".to_string()
        );
    }

    #[test]
    fn name_payload_is_not_numeric() {
        let recs = parse("0.0\t1\testim_name\tk1\tfib cutoff\n").unwrap();
        assert_eq!(
            recs[0].body,
            RecordBody::Name {
                display: "fib cutoff".to_string()
            }
        );
    }

    #[test]
    fn skip_policy_drops_bad_lines() {
        let text = "0.0\t1\testim_update\tk1\n\
                    1.0\t2\testim_update\tk1\t3.0\n";
        let recs = parse_log_str(text, "LOG", MalformedPolicy::Skip).unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].line, 2);
    }

    #[test]
    fn reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("LOG");
        fs::write(&path, "0.0\t1\testim_name\tk1\tP1\n").unwrap();
        let recs = parse_log_file(&path, MalformedPolicy::Fail).unwrap();
        assert_eq!(recs.len(), 1);

        let missing = parse_log_file(&dir.path().join("nope"), MalformedPolicy::Fail);
        assert!(missing.unwrap_err().to_string().contains("read log file"));
    }
}

//! Run configuration resolved from the command line.

use crate::log::MalformedPolicy;
use crate::render::{OutputLayout, PngBackend};
use std::path::{Path, PathBuf};

/// Input names tried under `--dir`, in order.
pub const DEFAULT_LOG_NAMES: [&str; 2] = ["LOG", "LOG.log"];

#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub input: PathBuf,
    pub layout: OutputLayout,
    pub policy: MalformedPolicy,
    pub width: u32,
    pub height: u32,
    pub summary: Option<PathBuf>,
}

impl RunConfig {
    pub fn backend(&self) -> PngBackend {
        PngBackend {
            width: self.width,
            height: self.height,
        }
    }
}

/// Explicit path if given, else the first default name that exists under
/// `dir`, else `dir/LOG` so the read error names the expected file.
pub fn resolve_input(dir: &Path, explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }
    DEFAULT_LOG_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|p| p.is_file())
        .unwrap_or_else(|| dir.join(DEFAULT_LOG_NAMES[0]))
}

/// `--proc` selects the nested plots/<proc>/<label>/<prefix>.png tree;
/// without it every chart lands directly in `dir` as <label>.png.
pub fn resolve_layout(dir: &Path, proc: Option<&str>, prefix: &str) -> OutputLayout {
    match proc {
        Some(proc) => OutputLayout::Nested {
            root: dir.to_path_buf(),
            proc: proc.to_string(),
            prefix: prefix.to_string(),
        },
        None => OutputLayout::Flat {
            root: dir.to_path_buf(),
        },
    }
}

//! Where chart images go.
//!
//! Nested: <root>/plots/<proc>/<label>/<prefix>.png
//! Flat:   <root>/<label>.png

use anyhow::Context;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::debug;

static UNSAFE_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\\x00]").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputLayout {
    Nested {
        root: PathBuf,
        proc: String,
        prefix: String,
    },
    Flat {
        root: PathBuf,
    },
}

/// Make a label usable as a single path component.
///
/// Separators and NUL become '_'; "." and ".." are escaped so a label can
/// never climb out of the output root. The mapping is lossy: "a/b" and
/// "a_b" end up as the same component.
pub fn sanitize_component(label: &str) -> String {
    let cleaned = UNSAFE_PATH_CHARS.replace_all(label, "_").into_owned();
    match cleaned.as_str() {
        "" => "_".to_string(),
        "." | ".." => cleaned.replace('.', "_"),
        _ => cleaned,
    }
}

impl OutputLayout {
    /// Image path for a label, without touching the filesystem.
    pub fn image_path(&self, label: &str) -> PathBuf {
        let label = sanitize_component(label);
        match self {
            OutputLayout::Nested { root, proc, prefix } => root
                .join("plots")
                .join(sanitize_component(proc))
                .join(label)
                .join(format!("{}.png", prefix)),
            OutputLayout::Flat { root } => root.join(format!("{}.png", label)),
        }
    }

    /// Directories that must exist before any label is drawn.
    pub fn prepare_root(&self) -> anyhow::Result<()> {
        match self {
            OutputLayout::Nested { root, .. } => create_dir(&root.join("plots")),
            OutputLayout::Flat { root } => create_dir(root),
        }
    }

    /// Create the label's directories (outermost first) and return the
    /// image path.
    pub fn prepare_label(&self, label: &str) -> anyhow::Result<PathBuf> {
        let path = self.image_path(label);
        if let OutputLayout::Nested { root, proc, .. } = self {
            let proc_dir = root.join("plots").join(sanitize_component(proc));
            create_dir(&proc_dir)?;
            create_dir(&proc_dir.join(sanitize_component(label)))?;
        }
        Ok(path)
    }
}

fn create_dir(dir: &Path) -> anyhow::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }
    debug!(dir = %dir.display(), "creating output directory");
    fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))
}

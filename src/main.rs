use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod config;
mod log;
mod model;
mod render;

pub type Result<T> = anyhow::Result<T>;

#[derive(Parser)]
#[command(name = "estim-plot")]
#[command(about = "Plot estimator constants from a scheduler text LOG", long_about = None)]
struct Cli {
    /// Input/output root.
    #[arg(short = 'd', long, default_value = ".")]
    dir: PathBuf,

    /// Output file name (without .png) inside each label directory.
    #[arg(short = 'p', long, default_value = "")]
    prefix: String,

    /// Process-count subdirectory; selects the plots/<proc>/<label>/ layout.
    #[arg(long = "proc")]
    proc: Option<String>,

    /// Accepted for compatibility; binary logs are not read.
    #[arg(short = 'b', long)]
    binary: bool,

    /// Read this file instead of <dir>/LOG or <dir>/LOG.log.
    #[arg(long)]
    log: Option<PathBuf>,

    /// What to do with estimator lines that do not fit the record layout.
    #[arg(long, value_enum, default_value_t = MalformedOpt::Fail)]
    on_malformed: MalformedOpt,

    /// Image width in pixels.
    #[arg(long, default_value_t = 1024)]
    width: u32,

    /// Image height in pixels.
    #[arg(long, default_value_t = 768)]
    height: u32,

    /// Also write the aggregated series as JSON.
    #[arg(long)]
    summary: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG is set.
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MalformedOpt {
    /// Stop at the first bad line.
    Fail,
    /// Warn and drop the line.
    Skip,
}

impl From<MalformedOpt> for log::MalformedPolicy {
    fn from(value: MalformedOpt) -> Self {
        match value {
            MalformedOpt::Fail => log::MalformedPolicy::Fail,
            MalformedOpt::Skip => log::MalformedPolicy::Skip,
        }
    }
}

impl Cli {
    fn into_config(self) -> config::RunConfig {
        config::RunConfig {
            input: config::resolve_input(&self.dir, self.log.as_deref()),
            layout: config::resolve_layout(&self.dir, self.proc.as_deref(), &self.prefix),
            policy: self.on_malformed.into(),
            width: self.width,
            height: self.height,
            summary: self.summary,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    if cli.binary {
        warn!("--binary is ignored; reading the text log");
    }

    run(&cli.into_config())
}

fn run(cfg: &config::RunConfig) -> Result<()> {
    // 1) Parse log.
    let records = log::parse_log_file(&cfg.input, cfg.policy)?;
    info!(path = %cfg.input.display(), records = records.len(), "parsed log");

    // 2) Aggregate.
    let data = model::aggregate(&records, &cfg.input.display().to_string())?;

    // 3) Optional JSON summary.
    if let Some(out) = &cfg.summary {
        let summary = model::build_summary(&data);
        std::fs::write(out, serde_json::to_string_pretty(&summary)?)
            .with_context(|| format!("write summary {}", out.display()))?;
        println!("Wrote {}", out.display());
    }

    // 4) Render charts.
    let mut backend = cfg.backend();
    let written = render::render_all(&data, &cfg.layout, &mut backend)?;
    for path in &written {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

//! CLI interface for hindsight.
//!
//! Designed for build wrappers and humans alike: arguments in, report out.
//! The tool is a side-channel diagnostic — a nonzero exit here must never
//! be allowed to fail the build that invoked it; wrappers are expected to
//! isolate it.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{self, Config};
use crate::execlog;
use crate::explain::Explainer;
use crate::history::FsHistoryStore;
use crate::render::{self, RenderOptions};

/// hindsight — explain why build actions ran again.
#[derive(Debug, Parser)]
#[command(name = "hindsight", after_long_help = WORKFLOW_HELP)]
pub struct Cli {
    /// History root directory. When omitted, resolved from
    /// HINDSIGHT_HISTORY_ROOT, then ~/.hindsight/config.toml, then
    /// `.hindsight/history` under the current directory.
    #[arg(long, global = true)]
    history_root: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

const WORKFLOW_HELP: &str = r#"Workflow: explaining a rebuild
  1. Run your build with execution logging enabled
     (one JSON action record per line).
  2. hindsight explain out/exec.jsonl
     → the first run seeds history; every action reports [no history]
  3. Edit a source file, rebuild, explain again:
     hindsight explain out/exec.jsonl --out explain.txt
     → each re-run action shows which inputs and outputs actually changed

Suppression:
  Remote-cache hits with history and no detected changes are noise and
  are skipped. Pass --all to include them."#;

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Explain each action in an execution log against the previous run.
    ///
    /// Actions are processed strictly in log order; each record is diffed
    /// against its stored baseline and then becomes the new baseline.
    /// The report is written to `--out` (if given) or stdout.
    /// A summary is printed to stderr when writing to a file.
    Explain {
        /// Execution log: one JSON action record per line.
        log: PathBuf,

        /// Write the report to this file instead of stdout.
        #[arg(long)]
        out: Option<PathBuf>,

        /// Report format.
        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,

        /// After each action line, repeat every change with its full path.
        #[arg(long)]
        details: bool,

        /// Include unchanged remote-cache hits (suppressed by default).
        #[arg(long)]
        all: bool,
    },
}

/// CLI-facing report format.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FormatArg {
    /// Human-readable explanation lines.
    Text,

    /// One JSON diff per line, for machine consumers.
    Json,
}

/// Run the CLI, returning an error message on failure.
pub fn run(config: &Config) -> Result<(), String> {
    let cli = Cli::parse();

    match cli.command {
        Command::Explain {
            log,
            out,
            format,
            details,
            all,
        } => {
            let root = config::resolve_history_root(cli.history_root.as_deref(), config);
            cmd_explain(&root, &log, out.as_deref(), format, details, all)
        }
    }
}

fn cmd_explain(
    history_root: &Path,
    log: &Path,
    out: Option<&Path>,
    format: FormatArg,
    details: bool,
    all: bool,
) -> Result<(), String> {
    let records = execlog::read_records(log)
        .map_err(|e| format!("failed to read execution log {}: {e}", log.display()))?;

    let mut explainer = Explainer::new(FsHistoryStore::new(history_root));

    let mut report = String::new();
    if matches!(format, FormatArg::Text) {
        report.push_str(&render::header());
    }

    let mut shown = 0usize;
    let mut suppressed = 0usize;
    for (index, record) in records.iter().enumerate() {
        let diff = explainer
            .explain(record)
            .map_err(|e| format!("record {}: {e}", index + 1))?;

        if diff.suppressible && !all {
            suppressed += 1;
            continue;
        }
        shown += 1;

        match format {
            FormatArg::Text => {
                report.push_str(&render::render(record, &diff, RenderOptions { details }));
            }
            FormatArg::Json => {
                let line = render::render_json(&diff)
                    .map_err(|e| format!("failed to serialize diff: {e}"))?;
                report.push_str(&line);
            }
        }
        report.push('\n');
    }

    match out {
        Some(path) => {
            fs::write(path, &report)
                .map_err(|e| format!("failed to write {}: {e}", path.display()))?;
            eprintln!(
                "Explained {shown} action(s) ({suppressed} suppressed) → {}",
                path.display()
            );
        }
        None => print!("{report}"),
    }

    Ok(())
}

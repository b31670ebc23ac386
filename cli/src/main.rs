//! drvmerge - merge package output trees
//!
//! Command-line front end for the drvmerge library.

use clap::{Parser, ValueEnum};
use drvmerge::{
    Error as MergeError, ErrorCode, MergeEvent, MergeOptions, MergeStats, merge, parse_mounts,
};
use serde_json::{Value, json};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "DRVMERGE_LOG";

const SCHEMA_VERSION: &str = "1.0";

/// drvmerge - merge independent package outputs into one tree
///
/// Each LABEL SOURCE SUBPATH triple mounts the tree at SOURCE under
/// DESTINATION/SUBPATH. Shared directories are merged; any file that two
/// sources both provide is a conflict, reported against the source that
/// was merged first.
///
/// Usage:
///   drvmerge DESTINATION [LABEL SOURCE SUBPATH]...
#[derive(Parser, Debug)]
#[command(name = "drvmerge", version, about, long_about = None)]
struct Args {
    /// Root of the merged output tree
    destination: PathBuf,

    /// Sources to merge, as LABEL SOURCE SUBPATH triples
    #[arg(value_name = "LABEL SOURCE SUBPATH")]
    mounts: Vec<OsString>,

    /// Copy file timestamps (mtime/atime)
    #[arg(long)]
    preserve_times: bool,

    /// Do not copy file permissions
    #[arg(long)]
    no_perms: bool,

    /// Sync each file to disk before it becomes visible
    #[arg(long)]
    fsync: bool,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    output: OutputMode,

    /// Verbose output (debug logging on stderr, summary on success)
    #[arg(short = 'v', long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
enum OutputMode {
    Human,
    Jsonl,
}

impl OutputMode {
    fn as_str(self) -> &'static str {
        match self {
            Self::Human => "human",
            Self::Jsonl => "jsonl",
        }
    }
}

type CliResult<T> = std::result::Result<T, CliError>;

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Merge(#[from] MergeError),

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },
}

impl CliError {
    fn code(&self) -> ErrorCode {
        match self {
            Self::Merge(source) => source.code(),
            Self::Logging { .. } => ErrorCode::Internal,
        }
    }

    fn is_conflict(&self) -> bool {
        matches!(self, Self::Merge(source) if source.is_conflict())
    }

    fn to_jsonl_record(&self) -> Value {
        let mut obj = serde_json::Map::new();
        obj.insert("schema_version".to_owned(), json!(SCHEMA_VERSION));
        obj.insert("record_type".to_owned(), json!("error"));
        obj.insert("error_code".to_owned(), json!(self.code().as_str()));
        obj.insert("error_message".to_owned(), json!(self.to_string()));

        if let Self::Merge(
            MergeError::DirectoryFileConflict {
                relative,
                label,
                owner,
            }
            | MergeError::FileConflict {
                relative,
                label,
                owner,
            }
            | MergeError::FileDirectoryConflict {
                relative,
                label,
                owner,
            },
        ) = self
        {
            obj.insert("relative_path".to_owned(), json!(display_path(relative)));
            obj.insert("label".to_owned(), json!(label));
            obj.insert("owner".to_owned(), json!(owner));
        }

        Value::Object(obj)
    }
}

fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        // Usage errors share the exit status of every other failure.
        Err(error) if error.use_stderr() => {
            let _ = error.print();
            std::process::exit(1);
        }
        Err(error) => error.exit(),
    };

    if let Err(error) = run(&args) {
        report_error(args.output, &error);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> CliResult<()> {
    init_logging(args.verbose)?;

    // Validate the argument shape before anything touches the disk.
    let mounts = parse_mounts(&args.mounts)?;
    let options = build_options(args);

    tracing::debug!(
        destination = %args.destination.display(),
        mounts = mounts.len(),
        preserve_permissions = options.preserve_permissions,
        preserve_timestamps = options.preserve_timestamps,
        fsync = options.fsync,
        output_mode = args.output.as_str(),
        "effective configuration"
    );

    let stats = merge(&args.destination, &mounts, &options)?;

    match args.output {
        OutputMode::Human => {
            if args.verbose {
                print_stats(&stats);
            }
        }
        OutputMode::Jsonl => println!("{}", stats_record(&stats)),
    }
    Ok(())
}

fn init_logging(verbose: bool) -> CliResult<()> {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "warn" }));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| CliError::Logging {
            message: e.to_string(),
        })
}

fn build_options(args: &Args) -> MergeOptions {
    let mut options = MergeOptions::default().with_event_handler(match args.output {
        OutputMode::Human => print_human_event,
        OutputMode::Jsonl => print_jsonl_event,
    });

    if args.preserve_times {
        options = options.with_preserve_timestamps();
    }
    if args.no_perms {
        options = options.without_permissions();
    }
    if args.fsync {
        options = options.with_fsync();
    }
    options
}

fn print_human_event(event: &MergeEvent<'_>) {
    println!("{event}");
}

fn print_jsonl_event(event: &MergeEvent<'_>) {
    println!("{}", event_record(event));
}

fn event_record(event: &MergeEvent<'_>) -> Value {
    match event {
        MergeEvent::Mounting { label, subpath } => json!({
            "schema_version": SCHEMA_VERSION,
            "record_type": "mount",
            "label": label,
            "subpath": display_path(subpath),
        }),
        MergeEvent::Copied {
            label,
            relative,
            destination,
            subpath,
            bytes,
        } => json!({
            "schema_version": SCHEMA_VERSION,
            "record_type": "copied",
            "label": label,
            "relative_path": display_path(relative),
            "destination": display_path(destination),
            "subpath": display_path(subpath),
            "bytes_copied": bytes,
        }),
        MergeEvent::Missing { path } => json!({
            "schema_version": SCHEMA_VERSION,
            "record_type": "missing",
            "path": display_path(path),
        }),
        MergeEvent::IllegalFileType { path } => json!({
            "schema_version": SCHEMA_VERSION,
            "record_type": "illegal_file_type",
            "path": display_path(path),
        }),
        other => json!({
            "schema_version": SCHEMA_VERSION,
            "record_type": "event",
            "message": other.to_string(),
        }),
    }
}

fn stats_record(stats: &MergeStats) -> Value {
    json!({
        "schema_version": SCHEMA_VERSION,
        "record_type": "summary",
        "mounts": stats.mounts,
        "files_copied": stats.files_copied,
        "bytes_copied": stats.bytes_copied,
        "dirs_created": stats.dirs_created,
        "dirs_merged": stats.dirs_merged,
        "entries_missing": stats.entries_missing,
        "entries_illegal": stats.entries_illegal,
        "duration_ms": u64::try_from(stats.duration.as_millis()).unwrap_or(u64::MAX),
    })
}

/// The final line before a failing exit. Stdout, like every other line, so
/// the log reads in processing order.
fn report_error(output: OutputMode, error: &CliError) {
    match output {
        OutputMode::Human if error.is_conflict() => println!("{error}"),
        OutputMode::Human => println!("error[{}]: {}", error.code(), error),
        OutputMode::Jsonl => println!("{}", error.to_jsonl_record()),
    }
}

fn print_stats(stats: &MergeStats) {
    let mut parts = vec![format!("{} files ({})", stats.files_copied, format_bytes(stats.bytes_copied))];
    parts.push(format!("{} dirs created", stats.dirs_created));
    if stats.dirs_merged > 0 {
        parts.push(format!("{} dirs shared", stats.dirs_merged));
    }
    let skipped = stats.entries_missing + stats.entries_illegal;
    if skipped > 0 {
        parts.push(format!("{skipped} entries skipped"));
    }
    println!(
        "Merged {} mounts in {:?}: {}",
        stats.mounts,
        stats.duration,
        parts.join(", ")
    );
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

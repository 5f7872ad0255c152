use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bodysync_tools::{
    decode_snapshot, encode_snapshot, format_snapshot_pretty, inspect_snapshot, load_frame,
    load_settings, InspectReport,
};
use clap::{Parser, Subcommand, ValueEnum};
use glob::Pattern;
use tracing::debug;

#[derive(Parser)]
#[command(
    name = "bodysync-tools",
    version,
    about = "bodysync snapshot inspection and conversion tools"
)]
struct Cli {
    /// Log codec decisions to stderr.
    #[arg(long, short, global = true)]
    verbose: bool,
    /// Codec settings JSON; defaults apply when omitted.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print frame number and size of snapshot files.
    Inspect {
        /// A snapshot file, or a directory of them.
        snapshot_path: PathBuf,
        /// Read buffers as relative snapshots and report their encoding.
        #[arg(long)]
        relative: bool,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected snapshots.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected snapshots (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Decode a snapshot into bodies.
    Decode {
        snapshot_file: PathBuf,
        /// Frame JSON the snapshot was encoded against.
        #[arg(long)]
        base: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = DecodeFormat::Json)]
        format: DecodeFormat,
    },
    /// Encode a frame JSON into a snapshot.
    Encode {
        frame_file: PathBuf,
        /// Encode relative to this frame JSON instead of in full.
        #[arg(long)]
        base: Option<PathBuf>,
        /// Output path for the snapshot bytes.
        #[arg(long, short)]
        output: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DecodeFormat {
    Json,
    Pretty,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_writer(std::io::stderr)
            .init();
    }
    let settings = load_settings(cli.settings.as_deref()).context("load settings")?;
    debug!(?settings, "loaded settings");

    match cli.command {
        Command::Inspect {
            snapshot_path,
            relative,
            glob,
            sort,
            limit,
        } => {
            if snapshot_path.is_dir() {
                let entries = collect_snapshot_entries(&snapshot_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let bytes = fs::read(&entry.path)
                        .with_context(|| format!("read snapshot {}", entry.path.display()))?;
                    let report = inspect_snapshot(&bytes, &settings, relative)?;
                    println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    print_inspect_report(&report);
                }
            } else {
                let bytes = fs::read(&snapshot_path)
                    .with_context(|| format!("read snapshot {}", snapshot_path.display()))?;
                let report = inspect_snapshot(&bytes, &settings, relative)?;
                print_inspect_report(&report);
            }
        }
        Command::Decode {
            snapshot_file,
            base,
            format,
        } => {
            let bytes = fs::read(&snapshot_file)
                .with_context(|| format!("read snapshot {}", snapshot_file.display()))?;
            let base = base.as_deref().map(load_frame).transpose()?;
            let snapshot = decode_snapshot(&bytes, &settings, base.as_ref())?;
            match format {
                DecodeFormat::Json => {
                    let json =
                        serde_json::to_string_pretty(&snapshot).context("serialize json")?;
                    println!("{json}");
                }
                DecodeFormat::Pretty => {
                    print!("{}", format_snapshot_pretty(&snapshot));
                }
            }
        }
        Command::Encode {
            frame_file,
            base,
            output,
        } => {
            let frame = load_frame(&frame_file)?;
            let base = base.as_deref().map(load_frame).transpose()?;
            let bytes = encode_snapshot(&frame, &settings, base.as_ref())?;
            fs::write(&output, &bytes)
                .with_context(|| format!("write snapshot {}", output.display()))?;
            println!(
                "wrote frame {} ({} bytes) to {}",
                frame.frame.raw(),
                bytes.len(),
                output.display()
            );
        }
    }
    Ok(())
}

struct SnapshotEntry {
    path: PathBuf,
    size: u64,
}

fn collect_snapshot_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<SnapshotEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(SnapshotEntry { path, size });
    }
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<SnapshotEntry>,
    sort: Option<InspectSort>,
) -> Vec<SnapshotEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => entries.sort_by(|a, b| a.path.cmp(&b.path)),
    }
    entries
}

fn print_inspect_report(report: &InspectReport) {
    println!("frame: {} size: {} bytes", report.frame, report.byte_len);
    if let Some(encoding) = report.encoding {
        println!("relative encoding: {encoding}");
    }
}

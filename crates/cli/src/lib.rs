use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use nextedit_assembler::{ContextConfig, ContextRequest, FsWorkspace, PredictionTracker};
use nextedit_protocol::{serialize_json, serialize_json_pretty, SupplementalContext};
use nextedit_snapshot_store::{unix_ms_now, FsBlobStore, SnapshotTracker};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::UNIX_EPOCH;

mod watch;

const DEFAULT_STORE_DIR: &str = ".nextedit/snapshots";

fn print_stdout(text: &str) -> Result<()> {
    use std::io::Write;

    let mut stdout = io::stdout().lock();
    if let Err(err) = stdout
        .write_all(text.as_bytes())
        .and_then(|_| stdout.write_all(b"\n"))
        .and_then(|_| stdout.flush())
    {
        if err.kind() == io::ErrorKind::BrokenPipe {
            return Ok(());
        }
        return Err(err.into());
    }
    Ok(())
}

#[derive(Parser)]
#[command(name = "nextedit")]
#[command(
    about = "Edit-history and cross-file context for next-edit prediction",
    long_about = None
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors (stdout is reserved for output)
    #[arg(short, long, global = true)]
    quiet: bool,

    /// TOML file with context settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding snapshot bodies (default: .nextedit/snapshots)
    #[arg(long, global = true)]
    store_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a file's content as a prior snapshot
    Record(RecordArgs),

    /// Print the unified diff between two files
    Diff(DiffArgs),

    /// Assemble supplemental context for a cursor position
    Context(ContextArgs),

    /// Watch a directory and record prior content on every change
    Watch(WatchArgs),

    /// List stored snapshots
    Snapshots(SnapshotsArgs),

    /// Print the JSON schema of the context output
    Schema,
}

#[derive(Args)]
struct RecordArgs {
    /// File the snapshot belongs to
    file: String,

    /// Take the snapshot content from this file instead
    #[arg(long)]
    content_from: Option<PathBuf>,

    /// Timestamp in milliseconds (default: now)
    #[arg(long)]
    at: Option<u64>,
}

#[derive(Args)]
struct DiffArgs {
    old: PathBuf,
    new: PathBuf,

    /// Lines of context around each change
    #[arg(long, default_value_t = nextedit_diff::DEFAULT_CONTEXT_LINES)]
    context: usize,
}

#[derive(Args)]
struct ContextArgs {
    /// Active file, relative to --root
    file: String,

    /// Cursor line (0-indexed)
    #[arg(long)]
    line: usize,

    /// Cursor column (0-indexed, characters)
    #[arg(long)]
    column: usize,

    /// Other open documents, most recently active first
    #[arg(long = "open", num_args = 1..)]
    open: Vec<String>,

    /// Project root
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Request time in milliseconds (default: now)
    #[arg(long)]
    at: Option<u64>,

    /// Pretty-print JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Args)]
struct WatchArgs {
    /// Directory to watch
    #[arg(default_value = ".")]
    root: PathBuf,
}

#[derive(Args)]
struct SnapshotsArgs {
    /// Only list snapshots of this file
    file: Option<String>,

    /// Emit JSON lines
    #[arg(long)]
    json: bool,

    /// Listing time in milliseconds, for the expiry sweep (default: now)
    #[arg(long)]
    at: Option<u64>,
}

pub async fn main_entry() -> Result<()> {
    let cli = Cli::parse();

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let config = load_config(cli.config.as_deref())?;
    let store_dir = cli
        .store_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(DEFAULT_STORE_DIR));

    match cli.command {
        Commands::Record(args) => run_record(args, config, &store_dir).await?,
        Commands::Diff(args) => run_diff(args)?,
        Commands::Context(args) => run_context(args, config, &store_dir).await?,
        Commands::Watch(args) => watch::run_watch(&args.root, config, &store_dir).await?,
        Commands::Snapshots(args) => run_snapshots(args, config, &store_dir).await?,
        Commands::Schema => run_schema()?,
    }

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<ContextConfig> {
    match path {
        Some(path) => ContextConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ContextConfig::default()),
    }
}

/// Tracker over the on-disk store with history restored as of `now`
async fn open_tracker(
    config: ContextConfig,
    store_dir: &Path,
    now: u64,
) -> Result<PredictionTracker> {
    let blobs = Arc::new(FsBlobStore::new(store_dir));
    let tracker = PredictionTracker::with_blob_store(config, blobs)
        .context("Invalid context configuration")?;
    tracker.restore(now).await;
    Ok(tracker)
}

async fn run_record(args: RecordArgs, config: ContextConfig, store_dir: &Path) -> Result<()> {
    let source = args
        .content_from
        .clone()
        .unwrap_or_else(|| PathBuf::from(&args.file));
    let content = fs::read_to_string(&source)
        .with_context(|| format!("Failed to read {}", source.display()))?;
    let now = args.at.unwrap_or_else(unix_ms_now);

    let tracker = open_tracker(config, store_dir, now).await?;
    if tracker.on_edit(&args.file, &content, now).await {
        log::info!("Recorded snapshot of {} at {now}", args.file);
    } else {
        log::info!("Snapshot of {} skipped", args.file);
    }
    Ok(())
}

fn run_diff(args: DiffArgs) -> Result<()> {
    let old = fs::read_to_string(&args.old)
        .with_context(|| format!("Failed to read {}", args.old.display()))?;
    let new = fs::read_to_string(&args.new)
        .with_context(|| format!("Failed to read {}", args.new.display()))?;

    let diff = nextedit_diff::build_diff(
        &args.old.to_string_lossy(),
        &args.new.to_string_lossy(),
        &old,
        &new,
        modified_ms(&args.old),
        modified_ms(&args.new),
        args.context,
    );
    print!("{}", diff.text);
    Ok(())
}

fn modified_ms(path: &Path) -> u64 {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .and_then(|elapsed| u64::try_from(elapsed.as_millis()).ok())
        .unwrap_or(0)
}

async fn run_context(args: ContextArgs, config: ContextConfig, store_dir: &Path) -> Result<()> {
    let path = args.root.join(&args.file);
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let now = args.at.unwrap_or_else(unix_ms_now);

    let tracker = open_tracker(config, store_dir, now).await?;
    let workspace = FsWorkspace::new(&args.root).with_open_documents(args.open.clone());
    let request = ContextRequest::new(args.file.clone(), content, args.line, args.column, now);
    let context = tracker.context_for(&request, &workspace).await;

    print_context(&context, args.pretty)
}

fn print_context(context: &SupplementalContext, pretty: bool) -> Result<()> {
    let output = if pretty {
        serialize_json_pretty(context)?
    } else {
        serialize_json(context)?
    };
    print_stdout(&output)
}

async fn run_snapshots(args: SnapshotsArgs, config: ContextConfig, store_dir: &Path) -> Result<()> {
    config.validate().context("Invalid context configuration")?;
    let blobs = Arc::new(FsBlobStore::new(store_dir));
    let mut tracker = SnapshotTracker::with_blob_store(config.snapshot_config(), blobs);
    tracker.restore(args.at.unwrap_or_else(unix_ms_now)).await;

    let store = tracker.store();
    for file in store.tracked_files() {
        if args.file.as_ref().is_some_and(|wanted| *wanted != file) {
            continue;
        }
        for snapshot in store.get(&file) {
            let line = if args.json {
                serde_json::json!({
                    "file_path": snapshot.file_path,
                    "timestamp_ms": snapshot.timestamp_ms,
                    "size": snapshot.size,
                })
                .to_string()
            } else {
                format!("{}\t{}\t{}", snapshot.file_path, snapshot.timestamp_ms, snapshot.size)
            };
            print_stdout(&line)?;
        }
    }
    Ok(())
}

fn run_schema() -> Result<()> {
    let schema = schemars::schema_for!(SupplementalContext);
    print_stdout(&serde_json::to_string_pretty(&schema)?)
}

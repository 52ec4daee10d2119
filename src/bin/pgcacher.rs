//! pgcacher - report how much of a file set is resident in the page cache.
//!
//! Usage:
//!   pgcacher /var/lib/db/*          # explicit files
//!   pgcacher -pid 1234              # files opened or mapped by a process
//!   pgcacher -top 20                # 20 most cached files across all processes
//!   pgcacher -top -json -pps        # every file, as JSON with per-page residency
//!
//! Long flags are accepted with one dash (`-least-size 10M`) or two.

#![cfg_attr(not(target_os = "linux"), allow(dead_code, unused_imports))]

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;
#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use std::ffi::OsString;
use std::io::{self, Write};
use std::process;

use clap::{CommandFactory, Parser};
use tracing::{Level, error, info};
use tracing_subscriber::EnvFilter;

use pgcacher::aggregate::{sort_by_cached, top_n};
use pgcacher::analyzer::analyze;
use pgcacher::collector::{FileSystem, ListError, RealFs};
use pgcacher::config::{Config, DEFAULT_WORKERS};
use pgcacher::fmt::parse_size;
use pgcacher::output::{OutputFlags, OutputMode, render};
#[cfg(target_os = "linux")]
use pgcacher::pagecache::MincoreProvider;
use pgcacher::pagecache::PageCacheProvider;
use pgcacher::resolver::{FileResolver, resolve_explicit};

/// Long flags that may be written with a single dash.
const SINGLE_DASH_FLAGS: &[&str] = &[
    "pid",
    "top",
    "worker",
    "least-size",
    "exclude-files",
    "include-files",
    "terse",
    "json",
    "unicode",
    "plain",
    "nohdr",
    "bname",
    "pps",
    "proc-path",
];

/// Page cache residency reporter.
#[derive(Parser, Debug)]
#[command(
    name = "pgcacher",
    about = "Report how much of a file set is resident in the page cache",
    version
)]
struct Args {
    /// Show the files opened or mapped by process PID.
    #[arg(long, value_name = "PID")]
    pid: Option<u32>,

    /// Scan every process and show the N most cached files.
    /// Without N (or with 0) every file is shown. Files named on the command
    /// line must come before -top or after `--`, otherwise they are read as N.
    #[arg(long, value_name = "N", num_args = 0..=1, default_missing_value = "0")]
    top: Option<usize>,

    /// Number of worker threads per stage.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_WORKERS)]
    worker: usize,

    /// Skip files smaller than SIZE (e.g. "4096", "10MB", "1G").
    #[arg(long, value_name = "SIZE", default_value = "0", value_parser = parse_size)]
    least_size: u64,

    /// Drop files matching this wildcard pattern.
    #[arg(long, value_name = "PATTERN")]
    exclude_files: Option<String>,

    /// Keep only files matching this wildcard pattern.
    #[arg(long, value_name = "PATTERN")]
    include_files: Option<String>,

    /// Comma-separated output.
    #[arg(long)]
    terse: bool,

    /// JSON output.
    #[arg(long)]
    json: bool,

    /// Table drawn with Unicode box characters.
    #[arg(long)]
    unicode: bool,

    /// Table without borders.
    #[arg(long)]
    plain: bool,

    /// Omit the header row.
    #[arg(long)]
    nohdr: bool,

    /// Show only the file name instead of the full path.
    #[arg(long)]
    bname: bool,

    /// Include per-page residency in JSON output.
    #[arg(long)]
    pps: bool,

    /// Increase logging verbosity (-v info, -vv debug, -vvv trace). Default is warn.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,

    /// Path to /proc filesystem.
    #[arg(long, default_value = "/proc")]
    proc_path: String,

    /// Files to inspect.
    #[arg(value_name = "FILE")]
    files: Vec<String>,
}

impl Args {
    fn config(&self) -> Config {
        let mut config = Config::default()
            .with_workers(self.worker)
            .with_least_size(self.least_size)
            .with_basename(self.bname)
            .with_no_header(self.nohdr)
            .with_proc_path(self.proc_path.clone())
            .with_output(OutputMode::select(OutputFlags {
                json: self.json,
                terse: self.terse,
                unicode: self.unicode,
                plain: self.plain,
                per_page: self.pps,
            }));

        // An empty pattern would match every path.
        if let Some(pattern) = self.include_files.as_ref().filter(|p| !p.is_empty()) {
            config = config.with_include(pattern.clone());
        }
        if let Some(pattern) = self.exclude_files.as_ref().filter(|p| !p.is_empty()) {
            config = config.with_exclude(pattern.clone());
        }
        config
    }
}

/// Rewrites `-least-size` style flags to `--least-size` so clap accepts them.
///
/// Arguments after a literal `--` are left alone.
fn normalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut passthrough = false;
    args.into_iter()
        .map(|arg| {
            if passthrough {
                return arg;
            }
            if arg == "--" {
                passthrough = true;
                return arg;
            }
            if arg.to_str().is_some_and(is_single_dash_long) {
                let mut long = OsString::from("-");
                long.push(&arg);
                long
            } else {
                arg
            }
        })
        .collect()
}

fn is_single_dash_long(arg: &str) -> bool {
    let Some(rest) = arg.strip_prefix('-') else {
        return false;
    };
    if rest.starts_with('-') {
        return false;
    }
    let name = rest.split_once('=').map_or(rest, |(name, _)| name);
    SINGLE_DASH_FLAGS.contains(&name)
}

/// Initializes the tracing subscriber on stderr.
/// Default level is WARN so that stdout carries only the report.
fn init_logging(verbose: u8, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };

    let mut filter = EnvFilter::from_default_env();
    if let Ok(directive) = format!("pgcacher={}", level).parse() {
        filter = filter.add_directive(directive);
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[cfg(not(target_os = "linux"))]
fn main() {
    eprintln!("pgcacher: page cache residency is only available on Linux");
    process::exit(1);
}

/// Conditions that end a run with a non-zero exit code.
#[derive(Debug)]
enum RunError {
    /// Nothing to inspect: no files, no `-pid` results and no `-top`.
    Usage,
    /// Top mode could not enumerate processes.
    List { proc_path: String, source: ListError },
    /// The report could not be written.
    Write(io::Error),
}

impl std::fmt::Display for RunError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunError::Usage => write!(f, "no files to process"),
            RunError::List { proc_path, source } => {
                write!(f, "can not list processes in {}: {}", proc_path, source)
            }
            RunError::Write(e) => write!(f, "failed to write report: {}", e),
        }
    }
}

impl std::error::Error for RunError {}

/// Resolves, analyzes and renders one report into `out`.
fn run<F, P, W>(args: &Args, fs: F, provider: &P, out: &mut W) -> Result<(), RunError>
where
    F: FileSystem + Clone,
    P: PageCacheProvider,
    W: Write,
{
    let config = args.config();
    let resolver = FileResolver::new(fs, provider, &config);

    let mut files = resolve_explicit(&args.files);
    if args.top.is_some() {
        let found = resolver
            .resolve_all_processes()
            .map_err(|source| RunError::List {
                proc_path: config.proc_path.clone(),
                source,
            })?;
        files.extend(found);
    } else {
        if let Some(pid) = args.pid {
            files.extend(resolver.resolve_process(pid));
        }
        if files.is_empty() {
            return Err(RunError::Usage);
        }
    }

    let files = files.filter(&config);
    info!(files = files.len(), workers = config.workers, "analyzing");

    let mut stats = analyze(&files, provider, &config);
    sort_by_cached(&mut stats);
    let shown = match args.top {
        Some(n) if n > 0 => top_n(&stats, n),
        _ => &stats[..],
    };

    render(out, shown, config.output, config.no_header)
        .and_then(|()| out.flush())
        .map_err(RunError::Write)
}

#[cfg(target_os = "linux")]
fn main() {
    let args = Args::parse_from(normalize_args(std::env::args_os()));
    init_logging(args.verbose, args.quiet);

    let provider = MincoreProvider::new(args.proc_path.clone());
    let result = run(&args, RealFs, &provider, &mut io::stdout().lock());

    match result {
        Ok(()) => {}
        Err(RunError::Usage) => {
            let _ = Args::command().print_help();
            process::exit(1);
        }
        Err(RunError::Write(e)) if e.kind() == io::ErrorKind::BrokenPipe => {}
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

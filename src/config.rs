//! Per-run configuration.
//!
//! Built once from the command line and shared read-only (`&Config`) with
//! every stage. Workers never mutate it.

use crate::output::OutputMode;

/// Default number of workers per concurrent stage.
pub const DEFAULT_WORKERS: usize = 2;

/// Immutable configuration for one invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Worker threads per concurrent stage (always >= 1).
    pub workers: usize,
    /// Files smaller than this many bytes are skipped; 0 disables the check.
    pub least_size: u64,
    /// Keep only paths matching this wildcard pattern.
    pub include: Option<String>,
    /// Drop paths matching this wildcard pattern.
    pub exclude: Option<String>,
    /// Display only the final path segment.
    pub basename: bool,
    /// Selected renderer.
    pub output: OutputMode,
    /// Suppress header rows in table and terse output.
    pub no_header: bool,
    /// Base path of the proc filesystem.
    pub proc_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
            least_size: 0,
            include: None,
            exclude: None,
            basename: false,
            output: OutputMode::Text,
            no_header: false,
            proc_path: "/proc".to_string(),
        }
    }
}

impl Config {
    /// Sets the worker count, clamped to at least one.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    pub fn with_least_size(mut self, bytes: u64) -> Self {
        self.least_size = bytes;
        self
    }

    pub fn with_include(mut self, pattern: impl Into<String>) -> Self {
        self.include = Some(pattern.into());
        self
    }

    pub fn with_exclude(mut self, pattern: impl Into<String>) -> Self {
        self.exclude = Some(pattern.into());
        self
    }

    pub fn with_basename(mut self, basename: bool) -> Self {
        self.basename = basename;
        self
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    pub fn with_proc_path(mut self, proc_path: impl Into<String>) -> Self {
        self.proc_path = proc_path.into();
        self
    }
}

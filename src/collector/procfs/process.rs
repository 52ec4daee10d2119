//! Process enumeration from `/proc/[pid]/stat`.

use crate::collector::procfs::parser::parse_proc_stat;
use crate::collector::traits::FileSystem;
use std::path::Path;
use tracing::{trace, warn};

/// Error type for process listing failures.
#[derive(Debug)]
pub enum ListError {
    /// The proc root itself could not be read.
    Io(std::io::Error),
    /// The proc root was readable but listed no processes.
    NoProcesses,
}

impl std::fmt::Display for ListError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListError::Io(e) => write!(f, "I/O error: {}", e),
            ListError::NoProcesses => write!(f, "no processes found"),
        }
    }
}

impl std::error::Error for ListError {}

impl From<std::io::Error> for ListError {
    fn from(e: std::io::Error) -> Self {
        ListError::Io(e)
    }
}

/// A live process as seen at enumeration time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessEntry {
    pub pid: u32,
    pub comm: String,
    /// Resident set size in pages.
    pub rss: u64,
}

/// Lists live processes from a proc filesystem.
pub struct ProcessLister<F: FileSystem> {
    fs: F,
    proc_path: String,
}

impl<F: FileSystem> ProcessLister<F> {
    /// Creates a new process lister.
    ///
    /// # Arguments
    /// * `fs` - Filesystem implementation (real or mock)
    /// * `proc_path` - Base path to proc filesystem (usually "/proc")
    pub fn new(fs: F, proc_path: impl Into<String>) -> Self {
        Self {
            fs,
            proc_path: proc_path.into(),
        }
    }

    /// Lists every process with a numeric directory under the proc root.
    ///
    /// Processes that exit between the directory scan and the stat read are
    /// silently skipped.
    pub fn list_processes(&self) -> Result<Vec<ProcessEntry>, ListError> {
        let entries = self.fs.read_dir(Path::new(&self.proc_path))?;

        let mut processes = Vec::new();
        for entry in entries {
            let Some(pid) = entry
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| n.parse::<u32>().ok())
            else {
                continue;
            };

            let Ok(content) = self.fs.read_to_string(&entry.join("stat")) else {
                trace!(pid, "process disappeared during listing");
                continue;
            };

            match parse_proc_stat(&content) {
                Ok(stat) => processes.push(ProcessEntry {
                    pid,
                    comm: stat.comm,
                    rss: stat.rss.max(0) as u64,
                }),
                Err(e) => warn!("failed to parse stat of process {}: {}", pid, e),
            }
        }

        Ok(processes)
    }
}

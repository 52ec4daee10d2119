//! Candidate file discovery.
//!
//! Files come from three sources: paths named on the command line, the
//! open descriptors and memory maps of one process, or those of every live
//! process. All of them end up in a [`FileSet`], which deduplicates on the
//! trimmed path and applies the include/exclude patterns.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::thread;

use tracing::{debug, trace, warn};

use crate::collector::procfs::parse_maps_line;
use crate::collector::{FileSystem, ListError, ProcessLister};
use crate::config::Config;
use crate::matcher::wildcard_match;
use crate::pagecache::PageCacheProvider;
use crate::pool::fan_out;

/// A deduplicated set of candidate paths.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    paths: BTreeSet<String>,
}

impl FileSet {
    /// Creates an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a set from raw paths, trimming surrounding whitespace.
    pub fn from_paths<I, S>(paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new();
        set.extend(paths);
        set
    }

    /// Adds raw paths. Blank entries are ignored.
    pub fn extend<I, S>(&mut self, paths: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for path in paths {
            let path = path.as_ref().trim();
            if !path.is_empty() {
                self.paths.insert(path.to_string());
            }
        }
    }

    /// Drops every path rejected by the include/exclude patterns.
    pub fn filter(mut self, config: &Config) -> Self {
        self.paths.retain(|path| !is_ignored(path, config));
        self
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.paths.contains(path)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.paths.iter().map(String::as_str)
    }

    pub fn into_vec(self) -> Vec<String> {
        self.paths.into_iter().collect()
    }
}

/// Builds the candidate set from explicitly named paths.
pub fn resolve_explicit<I, S>(paths: I) -> FileSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    FileSet::from_paths(paths)
}

/// Returns `true` if `path` must be dropped.
///
/// The exclude pattern is checked first and wins; a path that survives it
/// must then match the include pattern, when one is set.
pub fn is_ignored(path: &str, config: &Config) -> bool {
    if let Some(exclude) = &config.exclude
        && wildcard_match(path, exclude)
    {
        return true;
    }
    if let Some(include) = &config.include
        && !wildcard_match(path, include)
    {
        return true;
    }
    false
}

/// Keeps an fd link target only if it names a regular path outside `/dev`.
///
/// Sockets, pipes and anonymous inodes read back as `socket:[..]`,
/// `pipe:[..]` or `anon_inode:..` and are never absolute.
fn is_file_target(target: &Path) -> bool {
    target.is_absolute() && !target.starts_with("/dev")
}

/// Discovers the files held by processes through `/proc`.
pub struct FileResolver<'a, F: FileSystem, P: PageCacheProvider> {
    fs: F,
    provider: &'a P,
    config: &'a Config,
}

impl<'a, F, P> FileResolver<'a, F, P>
where
    F: FileSystem + Clone,
    P: PageCacheProvider,
{
    pub fn new(fs: F, provider: &'a P, config: &'a Config) -> Self {
        Self {
            fs,
            provider,
            config,
        }
    }

    fn proc_dir(&self, pid: u32) -> PathBuf {
        Path::new(&self.config.proc_path).join(pid.to_string())
    }

    /// Lists the files process `pid` has open or mapped.
    ///
    /// The mount namespace of `pid` is adopted first so that paths resolve as
    /// the process sees them. Descriptor targets come first in the result,
    /// followed by mapped files; duplicates between the two are left for
    /// [`FileSet`] to remove.
    pub fn resolve_process(&self, pid: u32) -> Vec<String> {
        if let Err(e) = self.provider.switch_mount_namespace(pid) {
            debug!("{}", e);
        }

        let (mut files, mapped) = thread::scope(|scope| {
            let maps = scope.spawn(|| self.process_map_files(pid));
            let fds = self.process_fd_files(pid);
            (fds, maps.join().unwrap_or_default())
        });

        files.extend(mapped);
        files
    }

    /// Resolves `/proc/[pid]/fd/*` links to file paths.
    pub fn process_fd_files(&self, pid: u32) -> Vec<String> {
        let fd_dir = self.proc_dir(pid).join("fd");
        let entries = match self.fs.read_dir(&fd_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not read dir {}: {}", fd_dir.display(), e);
                return Vec::new();
            }
        };

        fan_out(entries, self.config.workers, |link, acc| {
            let target = match self.fs.read_link(&link) {
                Ok(target) => target,
                Err(e) => {
                    warn!("can not read link '{}': {}", link.display(), e);
                    return;
                }
            };
            if !is_file_target(&target) {
                return;
            }
            match target.to_str() {
                Some(path) => acc.push(path.to_string()),
                None => trace!("skipping non UTF-8 path {}", target.display()),
            }
        })
    }

    /// Extracts file-backed mappings from `/proc/[pid]/maps`.
    pub fn process_map_files(&self, pid: u32) -> Vec<String> {
        let maps_path = self.proc_dir(pid).join("maps");
        match self.fs.read_to_string(&maps_path) {
            Ok(content) => content
                .lines()
                .filter_map(parse_maps_line)
                .map(str::to_string)
                .collect(),
            Err(e) => {
                warn!("could not read {}: {}", maps_path.display(), e);
                Vec::new()
            }
        }
    }

    /// Lists the files of every live process that has resident memory.
    ///
    /// Processes with an empty resident set (kernel threads, zombies) are
    /// skipped without scanning.
    pub fn resolve_all_processes(&self) -> Result<Vec<String>, ListError> {
        let lister = ProcessLister::new(self.fs.clone(), self.config.proc_path.clone());
        let processes = lister.list_processes()?;
        if processes.is_empty() {
            return Err(ListError::NoProcesses);
        }

        let total = processes.len();
        let resident: Vec<_> = processes.into_iter().filter(|p| p.rss > 0).collect();
        debug!(
            total,
            resident = resident.len(),
            "scanning processes with resident memory"
        );

        let batches = fan_out(resident, self.config.workers, |process, acc| {
            let files = self.resolve_process(process.pid);
            trace!(pid = process.pid, comm = %process.comm, files = files.len(), "resolved");
            acc.push(files);
        });

        Ok(batches.into_iter().flatten().collect())
    }
}

//! In-memory mock filesystem for testing `/proc` introspection without Linux.
//!
//! This module provides `MockFs` which simulates a filesystem in memory,
//! including symbolic links, so that fd scans can be tested anywhere.

use crate::collector::traits::FileSystem;
use std::collections::{HashMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory filesystem for testing.
///
/// Stores files, directories and symlinks in memory, allowing tests to
/// simulate various `/proc` filesystem states without needing actual Linux access.
#[derive(Debug, Clone, Default)]
pub struct MockFs {
    /// Map from path to file contents.
    files: HashMap<PathBuf, String>,
    /// Set of directories (for read_dir support).
    directories: HashSet<PathBuf>,
    /// Map from link path to raw link target.
    symlinks: HashMap<PathBuf, PathBuf>,
}

impl MockFs {
    /// Creates a new empty mock filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given content.
    ///
    /// Parent directories are automatically created.
    pub fn add_file(&mut self, path: impl AsRef<Path>, content: impl Into<String>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.files.insert(path, content.into());
    }

    /// Adds an empty directory.
    pub fn add_dir(&mut self, path: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.directories.insert(path);
    }

    /// Adds a symbolic link pointing at `target`.
    ///
    /// The target is stored verbatim and never resolved, which is how
    /// `/proc/[pid]/fd` entries behave (`socket:[1]` is a valid target).
    pub fn add_symlink(&mut self, path: impl AsRef<Path>, target: impl AsRef<Path>) {
        let path = path.as_ref().to_path_buf();
        self.add_parents(&path);
        self.symlinks.insert(path, target.as_ref().to_path_buf());
    }

    /// Adds a process directory with `stat`, `maps` and the given fd links.
    ///
    /// # Arguments
    /// * `pid` - Process ID
    /// * `stat` - Content of `/proc/[pid]/stat`
    /// * `maps` - Content of `/proc/[pid]/maps`
    /// * `fds` - `(fd number, link target)` pairs for `/proc/[pid]/fd`
    pub fn add_process(&mut self, pid: u32, stat: &str, maps: &str, fds: &[(u32, &str)]) {
        let base = PathBuf::from(format!("/proc/{}", pid));
        self.add_dir(&base);
        self.add_file(base.join("stat"), stat);
        self.add_file(base.join("maps"), maps);
        self.add_dir(base.join("fd"));
        for (fd, target) in fds {
            self.add_symlink(base.join("fd").join(fd.to_string()), target);
        }
    }

    /// Checks if a file, directory or link exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
            || self.directories.contains(path)
            || self.symlinks.contains_key(path)
    }

    fn add_parents(&mut self, path: &Path) {
        let mut parent = path.parent();
        while let Some(p) = parent {
            if !p.as_os_str().is_empty() {
                self.directories.insert(p.to_path_buf());
            }
            parent = p.parent();
        }
    }
}

fn not_found(what: &str, path: &Path) -> io::Error {
    io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} not found: {:?}", what, path),
    )
}

impl FileSystem for MockFs {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found("file", path))
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        if !self.directories.contains(path) {
            return Err(not_found("directory", path));
        }

        let is_child = |p: &PathBuf| p.parent().is_some_and(|parent| parent == path);

        let mut entries = HashSet::new();
        entries.extend(self.files.keys().filter(|p| is_child(p)).cloned());
        entries.extend(self.symlinks.keys().filter(|p| is_child(p)).cloned());
        entries.extend(
            self.directories
                .iter()
                .filter(|p| is_child(p) && p.as_path() != path)
                .cloned(),
        );

        Ok(entries.into_iter().collect())
    }

    fn read_link(&self, path: &Path) -> io::Result<PathBuf> {
        if let Some(target) = self.symlinks.get(path) {
            return Ok(target.clone());
        }
        if self.exists(path) {
            // Same errno the kernel reports for readlink on a non-link.
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a symlink: {:?}", path),
            ));
        }
        Err(not_found("link", path))
    }
}

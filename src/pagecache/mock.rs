//! In-memory residency provider for testing the pipeline without `mincore`.

use std::collections::HashMap;
use std::io;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeZone, Utc};

use super::{FileStatus, NamespaceError, PageCacheProvider, SizeGuard, StatusError};

/// Residency provider that answers from a fixed table of files.
///
/// Unknown paths fail with `NotFound`, like a file deleted between
/// discovery and analysis. Namespace switches always succeed and are
/// recorded so tests can assert on them.
#[derive(Debug, Default)]
pub struct StaticProvider {
    files: HashMap<String, (i64, Vec<bool>)>,
    switched: Mutex<Vec<u32>>,
}

impl StaticProvider {
    /// Creates an empty provider.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a file with its size and per-page residency.
    pub fn add_file(&mut self, path: impl Into<String>, size: i64, page_status: Vec<bool>) {
        self.files.insert(path.into(), (size, page_status));
    }

    /// Registers a file of `pages` pages of which the first `cached` are resident.
    pub fn add_cached(&mut self, path: impl Into<String>, pages: usize, cached: usize) {
        let page_status = (0..pages).map(|i| i < cached).collect();
        self.add_file(path, pages as i64 * 4096, page_status);
    }

    /// PIDs passed to `switch_mount_namespace`, in call order.
    pub fn switched_pids(&self) -> Vec<u32> {
        self.switched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn sample_time() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0)
            .single()
            .unwrap_or(DateTime::UNIX_EPOCH)
    }
}

impl PageCacheProvider for StaticProvider {
    fn page_cache_status(
        &self,
        path: &str,
        guard: SizeGuard<'_>,
    ) -> Result<FileStatus, StatusError> {
        let (size, page_status) = self.files.get(path).ok_or_else(|| {
            StatusError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no such file: {}", path),
            ))
        })?;

        guard(*size)?;

        Ok(FileStatus::from_pages(
            path,
            *size,
            Self::sample_time(),
            DateTime::UNIX_EPOCH,
            page_status.clone(),
        ))
    }

    fn switch_mount_namespace(&self, pid: u32) -> Result<(), NamespaceError> {
        self.switched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(pid);
        Ok(())
    }
}

//! Page-cache residency of individual files.
//!
//! [`PageCacheProvider`] is the seam between the pipeline and the kernel.
//! On Linux, [`MincoreProvider`] maps each file with `PROT_NONE` and asks
//! `mincore(2)` which pages are resident; [`StaticProvider`] serves canned
//! answers for tests.

#[cfg(target_os = "linux")]
mod mincore;
mod mock;
#[cfg(target_os = "linux")]
mod namespace;

use std::io;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[cfg(target_os = "linux")]
pub use mincore::MincoreProvider;
pub use mock::StaticProvider;

/// Page-cache residency of one file at one instant.
///
/// Field names in JSON follow the established `pcstat` schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileStatus {
    /// Display name: the path as given, or its basename.
    #[serde(rename = "filename")]
    pub name: String,
    /// File size in bytes.
    pub size: i64,
    /// When the residency was sampled.
    pub timestamp: DateTime<Utc>,
    /// File modification time.
    pub mtime: DateTime<Utc>,
    pub pages: u64,
    pub cached: u64,
    pub uncached: u64,
    /// Percentage of pages resident, as reported when sampled.
    pub percent: f64,
    /// Per-page residency, one entry per page. Empty unless requested.
    #[serde(rename = "status", default)]
    pub page_status: Vec<bool>,
}

impl FileStatus {
    /// Builds a status record from a per-page residency vector.
    pub fn from_pages(
        name: impl Into<String>,
        size: i64,
        timestamp: DateTime<Utc>,
        mtime: DateTime<Utc>,
        page_status: Vec<bool>,
    ) -> Self {
        let pages = page_status.len() as u64;
        let cached = page_status.iter().filter(|resident| **resident).count() as u64;
        let percent = if pages == 0 {
            0.0
        } else {
            cached as f64 / pages as f64 * 100.0
        };

        Self {
            name: name.into(),
            size,
            timestamp,
            mtime,
            pages,
            cached,
            uncached: pages - cached,
            percent,
            page_status,
        }
    }

    /// Approximate number of cached bytes, derived from size and percent.
    pub fn cached_size(&self) -> i64 {
        (self.size as f64 * self.percent / 100.0) as i64
    }
}

/// Errors from a page-cache residency query.
#[derive(Debug)]
pub enum StatusError {
    /// The size guard rejected the file; not a failure.
    BelowLeastSize { size: i64, least: u64 },
    /// Directories have no page-cache footprint of their own.
    IsDirectory,
    /// Opening or stat-ing the file failed.
    Io(io::Error),
    /// Mapping the file failed.
    Mmap(io::Error),
    /// The residency query itself failed.
    Mincore(io::Error),
}

impl std::fmt::Display for StatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StatusError::BelowLeastSize { size, least } => {
                write!(f, "file size {} is less than the least size {}", size, least)
            }
            StatusError::IsDirectory => write!(f, "is a directory"),
            StatusError::Io(e) => write!(f, "I/O error: {}", e),
            StatusError::Mmap(e) => write!(f, "mmap failed: {}", e),
            StatusError::Mincore(e) => write!(f, "mincore failed: {}", e),
        }
    }
}

impl std::error::Error for StatusError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StatusError::Io(e) | StatusError::Mmap(e) | StatusError::Mincore(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for StatusError {
    fn from(e: io::Error) -> Self {
        StatusError::Io(e)
    }
}

/// Errors from switching into another process's mount namespace.
#[derive(Debug)]
pub enum NamespaceError {
    /// The namespace links under `/proc` could not be read or opened.
    Lookup { pid: u32, source: io::Error },
    /// `setns(2)` refused the switch.
    Setns { pid: u32, source: io::Error },
}

impl std::fmt::Display for NamespaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NamespaceError::Lookup { pid, source } => {
                write!(f, "cannot read mount namespace of pid {}: {}", pid, source)
            }
            NamespaceError::Setns { pid, source } => {
                write!(f, "cannot enter mount namespace of pid {}: {}", pid, source)
            }
        }
    }
}

impl std::error::Error for NamespaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NamespaceError::Lookup { source, .. } | NamespaceError::Setns { source, .. } => {
                Some(source)
            }
        }
    }
}

/// Pre-check run by the provider once the file size is known.
///
/// Returning an error aborts the query with that error before any mapping
/// is attempted.
pub type SizeGuard<'a> = &'a (dyn Fn(i64) -> Result<(), StatusError> + Sync);

/// Source of per-file page-cache residency.
pub trait PageCacheProvider: Send + Sync {
    /// Samples the residency of `path`, calling `guard` with the file size
    /// before doing any expensive work.
    fn page_cache_status(&self, path: &str, guard: SizeGuard<'_>)
    -> Result<FileStatus, StatusError>;

    /// Adopts the mount namespace of `pid` so its paths resolve as it sees them.
    fn switch_mount_namespace(&self, pid: u32) -> Result<(), NamespaceError>;
}

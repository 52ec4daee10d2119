//! Concurrent page-cache analysis of a candidate file set.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace, warn};

use crate::config::Config;
use crate::pagecache::{FileStatus, PageCacheProvider, StatusError};
use crate::pool::fan_out;
use crate::resolver::FileSet;

/// Why a file was left out without being an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The file is smaller than the configured least size.
    BelowLeastSize { size: i64, least: u64 },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::BelowLeastSize { size, least } => {
                write!(f, "size {} below least size {}", size, least)
            }
        }
    }
}

/// Result of analyzing one file.
#[derive(Debug)]
pub enum Outcome {
    Ok(FileStatus),
    Skipped(SkipReason),
    Failed(StatusError),
}

/// Rejects files smaller than `least` bytes; `least == 0` accepts everything.
fn check_least_size(size: i64, least: u64) -> Result<(), StatusError> {
    if least != 0 && u64::try_from(size).map_or(true, |size| size < least) {
        return Err(StatusError::BelowLeastSize { size, least });
    }
    Ok(())
}

/// Returns the final path segment, or the whole path if it has none.
fn basename(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Queries the residency of one file and classifies the result.
pub fn analyze_file<P>(provider: &P, path: &str, config: &Config) -> Outcome
where
    P: PageCacheProvider + ?Sized,
{
    let least = config.least_size;
    let guard = move |size: i64| check_least_size(size, least);

    match provider.page_cache_status(path, &guard) {
        Ok(mut status) => {
            if config.basename {
                status.name = basename(path);
            }
            Outcome::Ok(status)
        }
        Err(StatusError::BelowLeastSize { size, least }) => {
            Outcome::Skipped(SkipReason::BelowLeastSize { size, least })
        }
        Err(e) => Outcome::Failed(e),
    }
}

/// Analyzes every file in `files` with `config.workers` threads.
///
/// Skipped and failed files are left out of the result; failures are logged
/// with their path. The returned collection is in completion order, so callers
/// sort it before use.
pub fn analyze<P>(files: &FileSet, provider: &P, config: &Config) -> Vec<FileStatus>
where
    P: PageCacheProvider + ?Sized,
{
    let skipped = AtomicUsize::new(0);
    let failed = AtomicUsize::new(0);
    let paths: Vec<&str> = files.iter().collect();
    let total = paths.len();

    let stats = fan_out(paths, config.workers, |path, acc| {
        match analyze_file(provider, path, config) {
            Outcome::Ok(status) => acc.push(status),
            Outcome::Skipped(reason) => {
                skipped.fetch_add(1, Ordering::Relaxed);
                trace!("ignoring {:?}: {}", path, reason);
            }
            Outcome::Failed(e) => {
                failed.fetch_add(1, Ordering::Relaxed);
                warn!("skipping {:?}: {}", path, e);
            }
        }
    });

    debug!(
        total,
        analyzed = stats.len(),
        skipped = skipped.load(Ordering::Relaxed),
        failed = failed.load(Ordering::Relaxed),
        "page cache analysis finished"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pagecache::StaticProvider;
    use std::collections::BTreeSet;

    fn provider() -> StaticProvider {
        let mut provider = StaticProvider::new();
        provider.add_cached("/data/big.db", 1000, 600);
        provider.add_cached("/data/medium.db", 100, 100);
        provider.add_cached("/data/small.conf", 1, 1);
        provider.add_file("/data/empty", 0, Vec::new());
        provider
    }

    fn names(stats: &[FileStatus]) -> BTreeSet<String> {
        stats.iter().map(|s| s.name.clone()).collect()
    }

    #[test]
    fn test_analyze_file_ok() {
        let status = match analyze_file(&provider(), "/data/big.db", &Config::default()) {
            Outcome::Ok(status) => status,
            other => panic!("expected Ok, got {:?}", other),
        };
        assert_eq!(status.name, "/data/big.db");
        assert_eq!(status.cached, 600);
    }

    #[test]
    fn test_analyze_file_below_least_size_is_skipped_not_failed() {
        let config = Config::default().with_least_size(8192);
        let outcome = analyze_file(&provider(), "/data/small.conf", &config);
        assert!(matches!(
            outcome,
            Outcome::Skipped(SkipReason::BelowLeastSize {
                size: 4096,
                least: 8192
            })
        ));

        let outcome = analyze_file(&provider(), "/data/empty", &config);
        assert!(matches!(outcome, Outcome::Skipped(_)));
    }

    #[test]
    fn test_analyze_file_missing_is_failed() {
        let outcome = analyze_file(&provider(), "/data/gone", &Config::default());
        assert!(matches!(outcome, Outcome::Failed(StatusError::Io(_))));
    }

    #[test]
    fn test_analyze_file_basename() {
        let config = Config::default().with_basename(true);
        let Outcome::Ok(status) = analyze_file(&provider(), "/data/medium.db", &config) else {
            panic!("expected Ok");
        };
        assert_eq!(status.name, "medium.db");
    }

    #[test]
    fn test_least_size_zero_disables_check() {
        assert!(check_least_size(0, 0).is_ok());
        assert!(check_least_size(1, 0).is_ok());
        assert!(check_least_size(4096, 4096).is_ok());
        assert!(check_least_size(4095, 4096).is_err());
    }

    #[test]
    fn test_analyze_drops_skipped_and_failed() {
        let files = FileSet::from_paths([
            "/data/big.db",
            "/data/medium.db",
            "/data/small.conf",
            "/data/empty",
            "/data/gone",
        ]);
        let config = Config::default().with_least_size(4096 * 2);

        let stats = analyze(&files, &provider(), &config);
        assert_eq!(
            names(&stats),
            BTreeSet::from(["/data/big.db".to_string(), "/data/medium.db".to_string()])
        );
    }

    #[test]
    fn test_analyze_same_records_for_any_worker_count() {
        let mut provider = StaticProvider::new();
        let mut paths = Vec::new();
        for i in 0..64 {
            let path = format!("/data/file{i}");
            provider.add_cached(&path, 10 + i, i);
            paths.push(path);
        }
        let files = FileSet::from_paths(&paths);

        let one = analyze(&files, &provider, &Config::default().with_workers(1));
        let eight = analyze(&files, &provider, &Config::default().with_workers(8));

        assert_eq!(one.len(), 64);
        let key = |stats: &[FileStatus]| -> BTreeSet<(String, u64, u64)> {
            stats
                .iter()
                .map(|s| (s.name.clone(), s.pages, s.cached))
                .collect()
        };
        assert_eq!(key(&one), key(&eight));
    }

    #[test]
    fn test_analyze_empty_set() {
        let stats = analyze(&FileSet::new(), &provider(), &Config::default());
        assert!(stats.is_empty());
    }

    #[test]
    fn test_basename_of_root_keeps_path() {
        assert_eq!(basename("/"), "/");
        assert_eq!(basename("/usr/lib/libc.so.6"), "libc.so.6");
        assert_eq!(basename("relative.txt"), "relative.txt");
    }
}

//! Ordering, truncation and totals over analyzed files.

use crate::pagecache::FileStatus;

/// Sorts by cached page count, highest first.
///
/// Only `cached` is compared; records with equal counts keep no particular
/// order relative to each other.
pub fn sort_by_cached(stats: &mut [FileStatus]) {
    stats.sort_unstable_by(|a, b| b.cached.cmp(&a.cached));
}

/// Returns the first `n` records of an already sorted collection.
pub fn top_n(stats: &[FileStatus], n: usize) -> &[FileStatus] {
    &stats[..n.min(stats.len())]
}

/// Column totals for the "Sum" row.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub size: i64,
    pub pages: u64,
    pub cached: u64,
    /// Sum of each row's approximate cached bytes.
    pub cached_size: i64,
}

impl Summary {
    /// Totals a collection; `None` when there is nothing to total.
    pub fn of(stats: &[FileStatus]) -> Option<Self> {
        if stats.is_empty() {
            return None;
        }
        Some(stats.iter().fold(
            Summary {
                size: 0,
                pages: 0,
                cached: 0,
                cached_size: 0,
            },
            |acc, s| Summary {
                size: acc.size + s.size,
                pages: acc.pages + s.pages,
                cached: acc.cached + s.cached,
                cached_size: acc.cached_size + s.cached_size(),
            },
        ))
    }

    /// Share of all pages that are cached, weighted by page count.
    ///
    /// This is not the mean of the per-row percentages. Zero total pages
    /// (only empty files) yields 0.
    pub fn percent(&self) -> f64 {
        if self.pages == 0 {
            return 0.0;
        }
        self.cached as f64 / self.pages as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn status(name: &str, pages: usize, cached: usize) -> FileStatus {
        FileStatus::from_pages(
            name,
            pages as i64 * 4096,
            DateTime::UNIX_EPOCH,
            DateTime::UNIX_EPOCH,
            (0..pages).map(|i| i < cached).collect(),
        )
    }

    fn three() -> Vec<FileStatus> {
        vec![
            status("/a", 100, 100),
            status("/b", 50, 0),
            status("/c", 10, 5),
        ]
    }

    #[test]
    fn test_sort_descending_by_cached() {
        let mut stats = three();
        sort_by_cached(&mut stats);
        let cached: Vec<u64> = stats.iter().map(|s| s.cached).collect();
        assert_eq!(cached, vec![100, 5, 0]);
    }

    #[test]
    fn test_summary_is_page_weighted() {
        let summary = Summary::of(&three()).unwrap();
        assert_eq!(summary.pages, 160);
        assert_eq!(summary.cached, 105);
        assert_eq!(summary.size, 160 * 4096);
        assert!((summary.percent() - 65.625).abs() < 1e-9);

        let mean: f64 = three().iter().map(|s| s.percent).sum::<f64>() / 3.0;
        assert!((mean - summary.percent()).abs() > 1.0);
    }

    #[test]
    fn test_summary_cached_size_sums_rows() {
        let summary = Summary::of(&three()).unwrap();
        assert_eq!(summary.cached_size, 100 * 4096 + 5 * 4096);
    }

    #[test]
    fn test_summary_empty_and_zero_pages() {
        assert!(Summary::of(&[]).is_none());

        let summary = Summary::of(&[status("/empty", 0, 0)]).unwrap();
        assert_eq!(summary.percent(), 0.0);
    }

    #[test]
    fn test_top_n() {
        let mut stats: Vec<FileStatus> = (0..10)
            .map(|i| status(&format!("/f{i}"), 20, i))
            .collect();
        sort_by_cached(&mut stats);

        let top = top_n(&stats, 3);
        let cached: Vec<u64> = top.iter().map(|s| s.cached).collect();
        assert_eq!(cached, vec![9, 8, 7]);

        assert_eq!(top_n(&stats, 50).len(), 10);
        assert!(top_n(&stats, 0).is_empty());
    }
}

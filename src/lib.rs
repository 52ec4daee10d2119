//! pgcacher - page cache residency reporter library.
//!
//! The pipeline used by the `pgcacher` binary:
//! - `resolver` - collect candidate paths (arguments, one process, all processes)
//! - `analyzer` - query residency per file through a `pagecache` provider
//! - `aggregate` - sort, truncate and total the results
//! - `output` - render as a table, terse CSV or JSON

pub mod aggregate;
pub mod analyzer;
pub mod collector;
pub mod config;
pub mod fmt;
pub mod matcher;
pub mod output;
pub mod pagecache;
pub mod pool;
pub mod resolver;

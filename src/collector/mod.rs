//! `/proc` introspection for Linux.
//!
//! This module provides the filesystem seam used to discover processes and
//! the files they hold open or mapped, with support for mocking in tests.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │   ProcessLister             FileResolver              │
//! │   - /proc/[pid]/stat        - /proc/[pid]/fd/*        │
//! │                             - /proc/[pid]/maps        │
//! │            └──────────────┬──────────┘                │
//! │                    ┌──────▼──────┐                    │
//! │                    │  FileSystem │ (trait)            │
//! │                    └──────┬──────┘                    │
//! └───────────────────────────┼───────────────────────────┘
//!                  ┌──────────┴──────────┐
//!           ┌──────▼──────┐       ┌──────▼──────┐
//!           │   RealFs    │       │   MockFs    │
//!           │  (Linux)    │       │  (Testing)  │
//!           └─────────────┘       └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use pgcacher::collector::{MockFs, ProcessLister};
//!
//! let lister = ProcessLister::new(MockFs::typical_system(), "/proc");
//! let processes = lister.list_processes().unwrap();
//! assert!(processes.iter().any(|p| p.comm == "postgres"));
//! ```

pub mod mock;
pub mod procfs;
pub mod traits;

pub use mock::MockFs;
pub use procfs::{ListError, ProcessEntry, ProcessLister};
pub use traits::{FileSystem, RealFs};

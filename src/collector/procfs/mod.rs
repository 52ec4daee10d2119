//! Readers for the Linux `/proc` filesystem.
//!
//! This module provides parsers and the process lister used to discover
//! which processes, and through them which files, are worth inspecting.

pub mod parser;
pub mod process;

pub use parser::{ParseError, parse_maps_line, parse_proc_stat};
pub use process::{ListError, ProcessEntry, ProcessLister};

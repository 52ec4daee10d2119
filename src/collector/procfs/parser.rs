//! Parsers for `/proc` filesystem files.
//!
//! These are pure functions that parse the content of `/proc` files into
//! structured data. They are designed to be easily testable with string inputs.

/// Error type for parsing failures.
#[derive(Debug, Clone, PartialEq)]
pub struct ParseError {
    pub message: String,
}

impl ParseError {
    pub fn new(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
        }
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Parse error: {}", self.message)
    }
}

impl std::error::Error for ParseError {}

/// The subset of `/proc/[pid]/stat` needed to decide whether a process is
/// worth scanning.
#[derive(Debug, Clone, Default)]
pub struct ProcStat {
    pub pid: u32,
    pub comm: String,
    /// Resident set size in pages.
    pub rss: i64,
}

/// Index of `rss` among the fields following the `(comm)` field.
const RSS_FIELD: usize = 21;

/// Parses `/proc/[pid]/stat` content.
///
/// The format is tricky because the comm field can contain spaces and parentheses.
/// Format: pid (comm) state ppid pgrp session tty_nr ...
pub fn parse_proc_stat(content: &str) -> Result<ProcStat, ParseError> {
    let content = content.trim();

    let open_paren = content
        .find('(')
        .ok_or_else(|| ParseError::new("missing '(' in stat"))?;
    let close_paren = content
        .rfind(')')
        .ok_or_else(|| ParseError::new("missing ')' in stat"))?;

    if close_paren <= open_paren {
        return Err(ParseError::new("invalid parentheses in stat"));
    }

    let pid: u32 = content[..open_paren]
        .trim()
        .parse()
        .map_err(|_| ParseError::new("invalid pid"))?;

    let comm = content[open_paren + 1..close_paren].to_string();

    let fields: Vec<&str> = content[close_paren + 1..].split_whitespace().collect();

    if fields.len() <= RSS_FIELD {
        return Err(ParseError::new(format!(
            "not enough fields in stat: expected {}+, got {}",
            RSS_FIELD + 1,
            fields.len()
        )));
    }

    let rss = fields[RSS_FIELD]
        .parse()
        .map_err(|_| ParseError::new("invalid rss"))?;

    Ok(ProcStat { pid, comm, rss })
}

/// Extracts the mapped file path from one `/proc/[pid]/maps` line.
///
/// The path is the sixth whitespace-separated field and must be absolute.
/// Anonymous mappings, `[heap]`, `[stack]` and friends yield `None`, as do
/// lines with trailing fields such as `(deleted)`: the mapped file no longer
/// exists under that name.
pub fn parse_maps_line(line: &str) -> Option<&str> {
    let mut fields = line.split_whitespace();
    let path = fields.nth(5)?;
    if fields.next().is_some() || !path.starts_with('/') {
        return None;
    }
    Some(path)
}

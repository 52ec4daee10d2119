//! Report rendering.
//!
//! One [`OutputMode`] is chosen per run; each variant has exactly one
//! renderer. Tables share the same columns (Name, Size, Pages, Cached Size,
//! Cached Pages, Percent) and end with a "Sum" row whose percent is
//! page-weighted (see [`Summary::percent`]).

use std::io::{self, Write};

use crate::aggregate::Summary;
use crate::fmt::format_size;
use crate::pagecache::FileStatus;

/// Selected report layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// JSON array; per-page residency only when `per_page` is set.
    Json { per_page: bool },
    /// Comma-separated, one record per line, raw numbers.
    Terse,
    /// Table drawn with Unicode box characters.
    Unicode,
    /// Borderless fixed-width table.
    Plain,
    /// Table drawn with ASCII characters.
    Text,
}

/// Output-related command line switches, before precedence is applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFlags {
    pub json: bool,
    pub terse: bool,
    pub unicode: bool,
    pub plain: bool,
    pub per_page: bool,
}

impl OutputMode {
    /// Picks one mode: JSON, then terse, unicode, plain, falling back to text.
    pub fn select(flags: OutputFlags) -> Self {
        if flags.json {
            OutputMode::Json {
                per_page: flags.per_page,
            }
        } else if flags.terse {
            OutputMode::Terse
        } else if flags.unicode {
            OutputMode::Unicode
        } else if flags.plain {
            OutputMode::Plain
        } else {
            OutputMode::Text
        }
    }
}

/// Writes `stats` to `out` in the given layout.
pub fn render<W: Write>(
    out: &mut W,
    stats: &[FileStatus],
    mode: OutputMode,
    no_header: bool,
) -> io::Result<()> {
    match mode {
        OutputMode::Json { per_page } => render_json(out, stats, per_page),
        OutputMode::Terse => render_terse(out, stats, no_header),
        OutputMode::Unicode => render_table(out, stats, &UNICODE_FRAME, no_header),
        OutputMode::Plain => render_plain(out, stats, no_header),
        OutputMode::Text => render_table(out, stats, &ASCII_FRAME, no_header),
    }
}

/// Width of the Name column: the longest name, at least 5.
fn name_width(stats: &[FileStatus]) -> usize {
    stats
        .iter()
        .map(|s| s.name.chars().count())
        .max()
        .unwrap_or(0)
        .max(5)
}

/// Characters used to draw a bordered table.
struct Frame {
    /// Left, junction and right characters for the top, middle and bottom rules.
    top: [char; 3],
    middle: [char; 3],
    bottom: [char; 3],
    horizontal: char,
    vertical: char,
}

const ASCII_FRAME: Frame = Frame {
    top: ['+', '+', '+'],
    middle: ['|', '+', '|'],
    bottom: ['+', '+', '+'],
    horizontal: '-',
    vertical: '|',
};

const UNICODE_FRAME: Frame = Frame {
    top: ['┌', '┬', '┐'],
    middle: ['├', '┼', '┤'],
    bottom: ['└', '┴', '┘'],
    horizontal: '─',
    vertical: '│',
};

/// Inner widths of the fixed columns, including their padding spaces.
const FIXED_COLUMNS: [usize; 5] = [16, 13, 16, 13, 9];

impl Frame {
    fn rule(&self, [left, junction, right]: [char; 3], name_width: usize) -> String {
        let mut line = String::new();
        line.push(left);
        line.extend(std::iter::repeat_n(self.horizontal, name_width + 2));
        for width in FIXED_COLUMNS {
            line.push(junction);
            line.extend(std::iter::repeat_n(self.horizontal, width));
        }
        line.push(right);
        line
    }

    fn header(&self, name_width: usize) -> String {
        let v = self.vertical;
        format!(
            "{v} {:<name_width$} {v} Size           {v} Pages       {v} Cached Size    {v} Cached Pages{v} Percent {v}",
            "Name"
        )
    }

    fn row(&self, name_width: usize, row: &Row<'_>) -> String {
        let v = self.vertical;
        format!(
            "{v} {:<name_width$} {v} {:<15}{v} {:<12}{v} {:<15}{v} {:<12}{v} {:<7.3} {v}",
            row.name,
            format_size(row.size),
            row.pages,
            format_size(row.cached_size),
            row.cached,
            row.percent
        )
    }
}

/// Values shown in one table line.
struct Row<'a> {
    name: &'a str,
    size: i64,
    pages: u64,
    cached_size: i64,
    cached: u64,
    percent: f64,
}

impl<'a> Row<'a> {
    fn of(status: &'a FileStatus) -> Self {
        Self {
            name: &status.name,
            size: status.size,
            pages: status.pages,
            cached_size: status.cached_size(),
            cached: status.cached,
            percent: status.percent,
        }
    }

    fn sum(summary: &Summary) -> Row<'static> {
        Row {
            name: "Sum",
            size: summary.size,
            pages: summary.pages,
            cached_size: summary.cached_size,
            cached: summary.cached,
            percent: summary.percent(),
        }
    }

    fn plain(&self, name_width: usize) -> String {
        format!(
            "{:<name_width$}  {:<15} {:<12} {:<15} {:<12} {:<7.3}",
            self.name,
            format_size(self.size),
            self.pages,
            format_size(self.cached_size),
            self.cached,
            self.percent
        )
    }
}

fn render_table<W: Write>(
    out: &mut W,
    stats: &[FileStatus],
    frame: &Frame,
    no_header: bool,
) -> io::Result<()> {
    let width = name_width(stats);

    writeln!(out, "{}", frame.rule(frame.top, width))?;
    if !no_header {
        writeln!(out, "{}", frame.header(width))?;
        writeln!(out, "{}", frame.rule(frame.middle, width))?;
    }

    for s in stats {
        writeln!(out, "{}", frame.row(width, &Row::of(s)))?;
    }

    if let Some(sum) = Summary::of(stats) {
        writeln!(out, "{}", frame.rule(frame.middle, width))?;
        writeln!(out, "{}", frame.row(width, &Row::sum(&sum)))?;
    }
    writeln!(out, "{}", frame.rule(frame.bottom, width))
}

fn render_plain<W: Write>(out: &mut W, stats: &[FileStatus], no_header: bool) -> io::Result<()> {
    let width = name_width(stats);

    if !no_header {
        writeln!(
            out,
            "{:<width$}  Size            Pages        Cached Size     Cached Pages Percent",
            "Name"
        )?;
    }
    for s in stats {
        writeln!(out, "{}", Row::of(s).plain(width))?;
    }
    if let Some(sum) = Summary::of(stats) {
        writeln!(out, "{}", Row::sum(&sum).plain(width))?;
    }
    Ok(())
}

fn render_terse<W: Write>(out: &mut W, stats: &[FileStatus], no_header: bool) -> io::Result<()> {
    if !no_header {
        writeln!(out, "name,size,timestamp,mtime,pages,cached,percent")?;
    }
    for s in stats {
        writeln!(
            out,
            "{},{},{},{},{},{},{}",
            s.name,
            s.size,
            s.timestamp.timestamp(),
            s.mtime.timestamp(),
            s.pages,
            s.cached,
            s.percent
        )?;
    }
    Ok(())
}

fn render_json<W: Write>(out: &mut W, stats: &[FileStatus], per_page: bool) -> io::Result<()> {
    if per_page {
        serde_json::to_writer(&mut *out, stats)?;
    } else {
        let cleared: Vec<FileStatus> = stats
            .iter()
            .map(|s| FileStatus {
                page_status: Vec::new(),
                ..s.clone()
            })
            .collect();
        serde_json::to_writer(&mut *out, &cleared)?;
    }
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn status(name: &str, pages: usize, cached: usize) -> FileStatus {
        FileStatus::from_pages(
            name,
            pages as i64 * 4096,
            Utc.timestamp_opt(1_700_000_100, 0).unwrap(),
            Utc.timestamp_opt(1_600_000_000, 0).unwrap(),
            (0..pages).map(|i| i < cached).collect(),
        )
    }

    fn sample() -> Vec<FileStatus> {
        vec![
            status("/var/lib/db/a", 256, 256),
            status("/var/lib/db/b", 10, 5),
            status("/var/lib/db/c", 50, 0),
        ]
    }

    fn render_to_string(stats: &[FileStatus], mode: OutputMode, no_header: bool) -> String {
        let mut buf = Vec::new();
        render(&mut buf, stats, mode, no_header).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_select_precedence() {
        let all = OutputFlags {
            json: true,
            terse: true,
            unicode: true,
            plain: true,
            per_page: false,
        };
        assert_eq!(
            OutputMode::select(all),
            OutputMode::Json { per_page: false }
        );
        assert_eq!(
            OutputMode::select(OutputFlags {
                json: false,
                ..all
            }),
            OutputMode::Terse
        );
        assert_eq!(
            OutputMode::select(OutputFlags {
                json: false,
                terse: false,
                ..all
            }),
            OutputMode::Unicode
        );
        assert_eq!(
            OutputMode::select(OutputFlags {
                plain: true,
                ..OutputFlags::default()
            }),
            OutputMode::Plain
        );
        assert_eq!(OutputMode::select(OutputFlags::default()), OutputMode::Text);
    }

    #[test]
    fn test_text_table_layout() {
        let out = render_to_string(&sample(), OutputMode::Text, false);
        let lines: Vec<&str> = out.lines().collect();

        // top, header, rule, 3 rows, rule, sum, bottom
        assert_eq!(lines.len(), 9);
        assert_eq!(
            lines[0],
            "+---------------+----------------+-------------+----------------+-------------+---------+"
        );
        assert_eq!(
            lines[1],
            "| Name          | Size           | Pages       | Cached Size    | Cached Pages| Percent |"
        );
        assert_eq!(
            lines[2],
            "|---------------+----------------+-------------+----------------+-------------+---------|"
        );
        assert_eq!(
            lines[3],
            "| /var/lib/db/a | 1.000M         | 256         | 1.000M         | 256         | 100.000 |"
        );
        assert_eq!(
            lines[7],
            "| Sum           | 1.234M         | 316         | 1.020M         | 261         | 82.595  |"
        );
        assert_eq!(lines[8], lines[0]);
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_unicode_table_borders() {
        let out = render_to_string(&sample(), OutputMode::Unicode, false);
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with('┌') && lines[0].ends_with('┐'));
        assert!(lines[2].starts_with('├') && lines[2].contains('┼'));
        assert!(lines[8].starts_with('└') && lines[8].ends_with('┘'));
        assert!(lines[1].starts_with("│ Name"));
        assert!(lines[7].starts_with("│ Sum"));
        assert!(lines.iter().all(|l| l.chars().count() == lines[0].chars().count()));
    }

    #[test]
    fn test_table_no_header() {
        let out = render_to_string(&sample(), OutputMode::Text, true);
        assert!(!out.contains("Name"));
        assert_eq!(out.lines().count(), 7);
    }

    #[test]
    fn test_table_minimum_name_width() {
        let out = render_to_string(&[status("ab", 1, 1)], OutputMode::Text, false);
        assert!(out.lines().nth(1).unwrap().starts_with("| Name  |"));
        assert!(out.contains("| ab    |"));
    }

    #[test]
    fn test_empty_table_has_no_sum_row() {
        let out = render_to_string(&[], OutputMode::Text, false);
        assert_eq!(out.lines().count(), 4);
        assert!(!out.contains("Sum"));
        assert!(!out.contains("NaN"));
    }

    #[test]
    fn test_plain_layout() {
        let out = render_to_string(&sample(), OutputMode::Plain, false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(
            lines[0],
            "Name           Size            Pages        Cached Size     Cached Pages Percent"
        );
        assert_eq!(
            lines[2],
            "/var/lib/db/b  40.000K         10           20.000K         5            50.000 "
        );
        assert!(lines[4].starts_with("Sum            1.234M"));
        assert!(!out.contains('|'));
    }

    #[test]
    fn test_terse_layout() {
        let out = render_to_string(&sample(), OutputMode::Terse, false);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "name,size,timestamp,mtime,pages,cached,percent");
        assert_eq!(
            lines[1],
            "/var/lib/db/a,1048576,1700000100,1600000000,256,256,100"
        );
        assert_eq!(lines[2], "/var/lib/db/b,40960,1700000100,1600000000,10,5,50");

        let out = render_to_string(&sample(), OutputMode::Terse, true);
        assert_eq!(out.lines().count(), 3);
        assert!(!out.contains("name,size"));
    }

    #[test]
    fn test_json_clears_per_page_unless_requested() {
        let out = render_to_string(&sample(), OutputMode::Json { per_page: false }, false);
        let decoded: Vec<FileStatus> = serde_json::from_str(&out).unwrap();
        assert_eq!(decoded.len(), 3);
        assert!(decoded.iter().all(|s| s.page_status.is_empty()));
        assert!(out.contains(r#""status":[]"#));

        let original = sample();
        for (d, o) in decoded.iter().zip(&original) {
            assert_eq!(d.name, o.name);
            assert_eq!(d.size, o.size);
            assert_eq!(d.timestamp, o.timestamp);
            assert_eq!(d.mtime, o.mtime);
            assert_eq!(d.pages, o.pages);
            assert_eq!(d.cached, o.cached);
            assert_eq!(d.percent, o.percent);
        }

        let out = render_to_string(&original, OutputMode::Json { per_page: true }, false);
        let decoded: Vec<FileStatus> = serde_json::from_str(&out).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_json_empty() {
        let out = render_to_string(&[], OutputMode::Json { per_page: false }, false);
        assert_eq!(out, "[]\n");
    }
}

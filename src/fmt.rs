//! Human-readable byte sizes, in both directions.

const KB: i64 = 1024;
const MB: i64 = 1024 * KB;
const GB: i64 = 1024 * MB;
const TB: i64 = 1024 * GB;
const PB: i64 = 1024 * TB;

/// Format byte count using the largest unit that keeps the value at least 1.
///
/// `"512B"`, `"1.000K"`, `"1.000M"`, `"3.250G"`: three decimals for every
/// unit except plain bytes.
pub fn format_size(bytes: i64) -> String {
    let b = bytes as f64;
    if bytes >= PB {
        format!("{:.3}P", b / PB as f64)
    } else if bytes >= TB {
        format!("{:.3}T", b / TB as f64)
    } else if bytes >= GB {
        format!("{:.3}G", b / GB as f64)
    } else if bytes >= MB {
        format!("{:.3}M", b / MB as f64)
    } else if bytes >= KB {
        format!("{:.3}K", b / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Error returned by [`parse_size`].
#[derive(Debug, Clone, PartialEq)]
pub struct SizeParseError {
    pub input: String,
    pub reason: String,
}

impl std::fmt::Display for SizeParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid size '{}': {}", self.input, self.reason)
    }
}

impl std::error::Error for SizeParseError {}

/// Parses a human-readable size string (e.g. `"10MB"`, `"1.5G"`, `"4096"`)
/// into bytes.
///
/// Units are case-insensitive and always binary: `K`, `KB` and `KiB` all
/// mean 1024 bytes.
pub fn parse_size(s: &str) -> Result<u64, SizeParseError> {
    let err = |reason: &str| SizeParseError {
        input: s.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Err(err("empty size string"));
    }

    let split = trimmed
        .find(|c: char| !(c.is_ascii_digit() || c == '.'))
        .unwrap_or(trimmed.len());
    let (num_str, unit) = trimmed.split_at(split);

    let multiplier: u64 = match unit.trim().to_ascii_lowercase().as_str() {
        "" | "b" => 1,
        "k" | "kb" | "kib" => 1 << 10,
        "m" | "mb" | "mib" => 1 << 20,
        "g" | "gb" | "gib" => 1 << 30,
        "t" | "tb" | "tib" => 1 << 40,
        "p" | "pb" | "pib" => 1 << 50,
        _ => return Err(err("unknown unit")),
    };

    if num_str.is_empty() {
        return Err(err("missing number"));
    }

    if let Ok(n) = num_str.parse::<u64>() {
        return n.checked_mul(multiplier).ok_or_else(|| err("too large"));
    }

    let value: f64 = num_str.parse().map_err(|_| err("invalid number"))?;
    let bytes = value * multiplier as f64;
    if !bytes.is_finite() || bytes >= u64::MAX as f64 {
        return Err(err("too large"));
    }
    Ok(bytes as u64)
}

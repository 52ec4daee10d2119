//! Wildcard matching for include/exclude filters.
//!
//! Patterns understand two metacharacters: `*` matches any run of characters
//! (including none) and `?` matches exactly one character. Everything else is
//! literal. A pattern without metacharacters is a substring test, so
//! `postgres` matches `/var/lib/postgresql/16/main`.

/// Returns `true` if `pattern` contains a wildcard metacharacter.
fn has_wildcards(pattern: &str) -> bool {
    pattern.contains(['*', '?'])
}

/// Matches `text` against a wildcard `pattern`.
///
/// Literal patterns match anywhere in the text. Wildcard patterns are
/// anchored at both ends and evaluated with a dynamic-programming table, so
/// the cost is `O(len(text) * len(pattern))` with no backtracking.
pub fn wildcard_match(text: &str, pattern: &str) -> bool {
    if !has_wildcards(pattern) {
        return text.contains(pattern);
    }

    let text: Vec<char> = text.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    let cols = pattern.len() + 1;

    // table[i * cols + j]: the first i chars of text match the first j of pattern.
    let mut table = vec![false; (text.len() + 1) * cols];
    table[0] = true;
    for j in 1..cols {
        if pattern[j - 1] == '*' {
            table[j] = table[j - 1];
        }
    }

    for i in 1..=text.len() {
        for j in 1..cols {
            let p = pattern[j - 1];
            table[i * cols + j] = if p == '*' {
                table[(i - 1) * cols + j] || table[i * cols + j - 1]
            } else if p == '?' || p == text[i - 1] {
                table[(i - 1) * cols + j - 1]
            } else {
                false
            };
        }
    }

    table[text.len() * cols + pattern.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wildcard_match_examples() {
        assert!(wildcard_match("xiaorui.cc", "*rui*"));
        assert!(wildcard_match("xiaorui.cc", "xiaorui?cc"));
        assert!(wildcard_match("xiaorui.cc", "xiaorui?cc*"));
        assert!(wildcard_match("xiaorui.cc", "*xiaorui?cc*"));
        assert!(wildcard_match("github.com/rfyiamcool", "rfy"));
    }

    #[test]
    fn test_literal_pattern_is_substring() {
        let cases = [
            ("/var/lib/postgresql/base/1259", "postgresql", true),
            ("/var/lib/postgresql/base/1259", "/var", true),
            ("/var/lib/postgresql/base/1259", "1259", true),
            ("/var/lib/postgresql/base/1259", "mysql", false),
            ("abc", "abcd", false),
            ("abc", "", true),
            ("", "", true),
        ];
        for (text, pattern, expected) in cases {
            assert_eq!(wildcard_match(text, pattern), expected, "{text} / {pattern}");
            assert_eq!(wildcard_match(text, pattern), text.contains(pattern));
        }
    }

    #[test]
    fn test_star_matches_everything() {
        for text in ["", "a", "/usr/lib/libc.so.6", "日本語"] {
            assert!(wildcard_match(text, "*"), "{text}");
            assert!(wildcard_match(text, "**"), "{text}");
        }
    }

    #[test]
    fn test_question_mark_is_exactly_one_char() {
        assert!(!wildcard_match("", "?"));
        assert!(wildcard_match("a", "?"));
        assert!(wildcard_match("é", "?"));
        assert!(!wildcard_match("ab", "?"));
        assert!(wildcard_match("ab", "??"));
    }

    #[test]
    fn test_wildcard_pattern_is_anchored() {
        assert!(wildcard_match("/var/log/syslog", "/var/*"));
        assert!(!wildcard_match("/var/log/syslog", "/log/*"));
        assert!(!wildcard_match("/var/log/syslog", "*.log*"));
        assert!(wildcard_match("/data/app.log", "*.log"));
        assert!(!wildcard_match("/data/app.log.1", "*.log"));
        assert!(wildcard_match("/data/app.log.1", "*.log.?"));
    }

    #[test]
    fn test_star_in_middle() {
        assert!(wildcard_match("/usr/lib/x86_64-linux-gnu/libc.so.6", "/usr/*/libc*"));
        assert!(wildcard_match("ab", "a*b"));
        assert!(wildcard_match("a-long-b", "a*b"));
        assert!(!wildcard_match("a-long-c", "a*b"));
    }
}

// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! URL glob patterns

use std::fmt;

use regex::Regex;

use crate::error::{Error, Result};

/// Compiled URL matcher
///
/// Glob syntax:
/// - `**` matches anything, including `/`
/// - `*` matches anything except `/`
/// - `?` matches a single non-`/` character
/// - `{a,b}` matches either alternative
///
/// A leading `**/` may also match nothing, so `**/users` matches `/users`.
/// Besides the glob, a URL matches when it equals the pattern or contains it.
#[derive(Clone)]
pub struct UrlPattern {
    source: String,
    regex: Regex,
    literal: bool,
}

impl UrlPattern {
    /// Compile a glob
    pub fn glob(pattern: &str) -> Result<Self> {
        if pattern.trim().is_empty() {
            return Err(Error::invalid_pattern(pattern, "pattern is empty"));
        }
        let regex = Regex::new(&glob_to_regex(pattern)?)
            .map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
            literal: true,
        })
    }

    /// Use a raw regular expression, unanchored
    pub fn regex(pattern: &str) -> Result<Self> {
        if pattern.is_empty() {
            return Err(Error::invalid_pattern(pattern, "pattern is empty"));
        }
        let regex =
            Regex::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
            literal: false,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, url: &str) -> bool {
        if self.literal && (url == self.source || url.contains(&self.source)) {
            return true;
        }
        self.regex.is_match(url)
    }
}

impl fmt::Debug for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UrlPattern").field(&self.source).finish()
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn glob_to_regex(pattern: &str) -> Result<String> {
    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');

    let mut rest = pattern;
    if let Some(stripped) = rest.strip_prefix("**/") {
        out.push_str("(?:.*/)?");
        rest = stripped;
    }

    let mut chars = rest.chars().peekable();
    let mut in_group = false;
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str(".*");
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            '{' if !in_group => {
                in_group = true;
                out.push_str("(?:");
            }
            '}' if in_group => {
                in_group = false;
                out.push(')');
            }
            ',' if in_group => out.push('|'),
            '{' => return Err(Error::invalid_pattern(pattern, "nested '{' group")),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    if in_group {
        return Err(Error::invalid_pattern(pattern, "unclosed '{' group"));
    }

    out.push('$');
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_star_crosses_segments() {
        let p = UrlPattern::glob("**/x").unwrap();
        assert!(p.matches("https://api.test/v1/x"));
        assert!(p.matches("/x"));
        assert!(!p.matches("https://api.test/v1/xy"));
    }

    #[test]
    fn test_single_star_stays_in_segment() {
        let p = UrlPattern::glob("https://api.test/*/users").unwrap();
        assert!(p.matches("https://api.test/v1/users"));
        assert!(!p.matches("https://api.test/v1/extra/users"));
    }

    #[test]
    fn test_question_and_alternation() {
        let p = UrlPattern::glob("**/v?/{users,groups}").unwrap();
        assert!(p.matches("https://api.test/v1/users"));
        assert!(p.matches("https://api.test/v2/groups"));
        assert!(!p.matches("https://api.test/v10/users"));
        assert!(!p.matches("https://api.test/v1/teams"));
    }

    #[test]
    fn test_query_string_matched_by_wildcard() {
        let p = UrlPattern::glob("**/search*").unwrap();
        assert!(p.matches("https://api.test/search?q=shelly"));
    }

    #[test]
    fn test_anchored_glob_rejects_query_string() {
        let p = UrlPattern::glob("**/x").unwrap();
        assert!(p.matches("https://api.test/x"));
        assert!(!p.matches("https://api.test/x?q=1"));
    }

    #[test]
    fn test_regex_metacharacters_escaped() {
        let p = UrlPattern::glob("**/a.b").unwrap();
        assert!(p.matches("https://x.test/a.b"));
        assert!(!p.matches("https://x.test/aXb"));
    }

    #[test]
    fn test_substring_fallback() {
        let p = UrlPattern::glob("/api/users").unwrap();
        assert!(p.matches("https://x.test/api/users?id=1"));
        assert!(!p.matches("https://x.test/api/groups"));
    }

    #[test]
    fn test_raw_regex() {
        let p = UrlPattern::regex(r"/users/\d+$").unwrap();
        assert!(p.matches("https://x.test/users/42"));
        assert!(!p.matches("https://x.test/users/me"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(matches!(UrlPattern::glob(""), Err(Error::InvalidPattern { .. })));
        assert!(matches!(UrlPattern::glob("   "), Err(Error::InvalidPattern { .. })));
        assert!(matches!(UrlPattern::glob("**/{a,b"), Err(Error::InvalidPattern { .. })));
        assert!(matches!(UrlPattern::regex("("), Err(Error::InvalidPattern { .. })));
    }
}

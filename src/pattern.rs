//! SQL `LIKE` pattern matching.
//!
//! `%` matches any run of characters (including none) and `_` matches exactly
//! one character (a Unicode scalar value, not a byte). Every other pattern
//! character matches itself. There is no escape character.

/// Wildcard for zero or more characters.
const ANY_RUN: char = '%';

/// Wildcard for exactly one character.
const ANY_ONE: char = '_';

/// Reports whether `candidate` matches the whole of `pattern`.
///
/// # Examples
///
/// ```
/// use json_filter::pattern::matches;
///
/// assert!(matches("A%", "Alice"));
/// assert!(matches("a_c", "abc"));
/// assert!(!matches("a_c", "ac"));
/// assert!(matches("a%b%c", "axbyc"));
/// ```
pub fn matches(pattern: &str, candidate: &str) -> bool {
    let mut pattern = pattern;
    let mut candidate = candidate;

    'pattern: while !pattern.is_empty() {
        let (wildcard, chunk, rest) = scan_chunk(pattern);
        pattern = rest;

        // Trailing `%` swallows whatever is left.
        if wildcard && chunk.is_empty() {
            return true;
        }

        // A chunk matched in place is only accepted if it leaves nothing
        // behind, or if more pattern follows to consume the remainder.
        if let Some(tail) = match_chunk(chunk, candidate)
            && (tail.is_empty() || !pattern.is_empty())
        {
            candidate = tail;
            continue;
        }

        if wildcard {
            let current = candidate;
            for (offset, ch) in current.char_indices() {
                let Some(tail) = match_chunk(chunk, &current[offset + ch.len_utf8()..]) else {
                    continue;
                };
                // The last chunk has to end exactly at the end of the candidate.
                if pattern.is_empty() && !tail.is_empty() {
                    continue;
                }
                candidate = tail;
                continue 'pattern;
            }
        }

        return false;
    }

    candidate.is_empty()
}

/// Splits off the next chunk: whether it is preceded by `%`, the literal
/// chunk itself, and the rest of the pattern starting at the next `%`.
fn scan_chunk(pattern: &str) -> (bool, &str, &str) {
    let trimmed = pattern.trim_start_matches(ANY_RUN);
    let wildcard = trimmed.len() != pattern.len();
    let end = trimmed.find(ANY_RUN).unwrap_or(trimmed.len());
    (wildcard, &trimmed[..end], &trimmed[end..])
}

/// Matches `chunk` against the start of `s`, returning the unmatched tail.
fn match_chunk<'a>(chunk: &str, s: &'a str) -> Option<&'a str> {
    let mut rest = s;
    for expected in chunk.chars() {
        let mut chars = rest.chars();
        let actual = chars.next()?;
        if expected != ANY_ONE && expected != actual {
            return None;
        }
        rest = chars.as_str();
    }
    Some(rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_patterns() {
        assert!(matches("abc", "abc"));
        assert!(!matches("abc", "abcd"));
        assert!(!matches("abcd", "abc"));
        assert!(matches("", ""));
        assert!(!matches("", "a"));
    }

    #[test]
    fn test_percent() {
        assert!(matches("%", ""));
        assert!(matches("%", "anything"));
        assert!(matches("%%", "x"));
        assert!(matches("a%c", "abc"));
        assert!(matches("a%c", "ac"));
        assert!(matches("%c", "abcabc"));
        assert!(!matches("%b", "abc"));
        assert!(matches("a%b%c", "axbyc"));
        assert!(matches("%a%a%", "banana"));
        assert!(!matches("a%b%c", "axbyd"));
    }

    #[test]
    fn test_underscore() {
        assert!(matches("a_c", "abc"));
        assert!(!matches("a_c", "ac"));
        assert!(matches("___", "abc"));
        assert!(!matches("___", "ab"));
        assert!(matches("_%", "x"));
        assert!(!matches("_%", ""));
    }

    #[test]
    fn test_underscore_is_one_code_point() {
        assert!(matches("caf_", "café"));
        assert!(matches("_", "日"));
        assert!(matches("%本", "日本"));
        assert!(!matches("__", "日"));
    }

    #[test]
    fn test_backtracking_over_interior_percent() {
        // First in-place attempt of "ab" leaves "ab" behind and must retry.
        assert!(matches("%ab", "abab"));
        assert!(matches("a%ab%b", "aabbab"));
        assert!(matches("%a_c%", "xxabcxx"));
    }
}

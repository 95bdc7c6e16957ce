//! Applies a single [`Check`] to a byte buffer.

use crate::patterns::{PatternCache, PatternError};
use crate::rules::Check;

impl Check {
    /// Returns `true` if `contents` violate this check.
    ///
    /// Regular expressions are compiled through `patterns` on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if a regex check carries an invalid pattern.
    pub fn is_violated_by(
        &self,
        contents: &[u8],
        patterns: &mut PatternCache,
    ) -> Result<bool, PatternError> {
        match self {
            Self::Contains(literal) => Ok(contains(contents, literal.as_bytes())),
            Self::NotContains(literal) => Ok(!contains(contents, literal.as_bytes())),
            Self::Regex(pattern) => Ok(patterns.regex(pattern)?.is_match(contents)),
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .windows(needle.len())
        .any(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violated(check: &Check, contents: &[u8]) -> bool {
        check
            .is_violated_by(contents, &mut PatternCache::new())
            .unwrap()
    }

    #[test]
    fn contains_fails_on_literal_present() {
        let check = Check::Contains("TODO".into());
        assert!(violated(&check, b"// TODO: later"));
        assert!(!violated(&check, b"// done"));
    }

    #[test]
    fn not_contains_fails_on_literal_absent() {
        let check = Check::NotContains("LICENSE".into());
        assert!(violated(&check, b"package main"));
        assert!(!violated(&check, b"// LICENSE: MIT\npackage main"));
    }

    #[test]
    fn regex_fails_on_match_anywhere() {
        let check = Check::Regex(r"fix\s*me".into());
        assert!(violated(&check, b"line one\n// fix  me\n"));
        assert!(!violated(&check, b"fixed"));
    }

    #[test]
    fn literal_match_is_case_sensitive() {
        assert!(!violated(&Check::Contains("TODO".into()), b"todo"));
    }

    #[test]
    fn works_on_non_utf8_contents() {
        let contents = [0xff, 0xfe, b'T', b'O', b'D', b'O', 0x00];
        assert!(violated(&Check::Contains("TODO".into()), &contents));
        assert!(violated(&Check::Regex("TO.O".into()), &contents));
    }

    #[test]
    fn literal_longer_than_contents_is_absent() {
        assert!(!violated(&Check::Contains("TODO".into()), b"TO"));
        assert!(violated(&Check::NotContains("TODO".into()), b""));
    }

    #[test]
    fn invalid_regex_is_an_error() {
        let err = Check::Regex("(".into())
            .is_violated_by(b"anything", &mut PatternCache::new())
            .unwrap_err();
        assert!(matches!(err, PatternError::Regex { .. }));
    }
}

//! Domain blocklist with exact and subdomain-suffix matching.
//!
//! A pattern matches the domain itself and every subdomain of it; there
//! are no wildcard metacharacters. Matching is a scalar scan over the
//! pattern list, which stays fast for the list sizes a home network
//! carries.

use super::host_index::normalize_name;

pub struct Blocklist {
    patterns: Vec<Box<str>>,
}

impl Blocklist {
    /// Compile the configured pattern list: lowercased, trailing dots
    /// stripped, empty entries dropped.
    pub fn new(patterns: &[String]) -> Self {
        let patterns = patterns
            .iter()
            .map(|p| normalize_name(p).into_owned())
            .filter(|p| !p.is_empty())
            .map(String::into_boxed_str)
            .collect();
        Self { patterns }
    }

    /// True when `name` equals a pattern or is a subdomain of one.
    pub fn is_blocked(&self, name: &str) -> bool {
        let name = normalize_name(name);
        self.patterns.iter().any(|pattern| {
            name.as_ref() == pattern.as_ref()
                || (name.len() > pattern.len()
                    && name.ends_with(pattern.as_ref())
                    && name.as_bytes()[name.len() - pattern.len() - 1] == b'.')
        })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blocklist(patterns: &[&str]) -> Blocklist {
        let owned: Vec<String> = patterns.iter().map(|s| s.to_string()).collect();
        Blocklist::new(&owned)
    }

    #[test]
    fn test_exact_match() {
        let list = blocklist(&["evil.com"]);
        assert!(list.is_blocked("evil.com"));
        assert!(list.is_blocked("evil.com."));
    }

    #[test]
    fn test_subdomain_match_at_any_depth() {
        let list = blocklist(&["evil.com"]);
        assert!(list.is_blocked("sub.evil.com"));
        assert!(list.is_blocked("deep.sub.evil.com."));
    }

    #[test]
    fn test_suffix_without_label_boundary_does_not_match() {
        let list = blocklist(&["evil.com"]);
        assert!(!list.is_blocked("notevil.com"));
        assert!(!list.is_blocked("evil.com.au"));
        assert!(!list.is_blocked("com"));
    }

    #[test]
    fn test_case_insensitive() {
        let list = blocklist(&["Evil.COM"]);
        assert!(list.is_blocked("EVIL.com"));
        assert!(list.is_blocked("Sub.Evil.Com."));
    }

    #[test]
    fn test_no_wildcard_interpretation() {
        let list = blocklist(&["*.evil.com"]);
        // The pattern is a literal string, not a glob; "*.evil.com" only
        // matches names ending in the literal label "*".
        assert!(!list.is_blocked("sub.evil.com"));
        assert!(!list.is_blocked("evil.com"));
    }

    #[test]
    fn test_empty_patterns_are_dropped() {
        let list = blocklist(&["", "."]);
        assert!(list.is_empty());
        assert!(!list.is_blocked("anything.com"));
    }
}

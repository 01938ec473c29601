//! Decides which request paths need an authenticated session.
//!
//! Exclusion patterns come in three shapes, all matched from the start of the
//! path:
//!
//! - `/api/v1/stat*`   prefix match on the text before `*`
//! - `/api/v1/status/` the directory, with or without the trailing slash
//! - `/api/v1/status`  same as the directory form
//!
//! The last two are prefix matches too, so `/api/v1/status` also excludes
//! `/api/v1/status/extra` (and `/api/v1/statuses`). Callers rely on this.

use regex::Regex;
use tracing::warn;

fn compile(pattern: &str) -> Option<Regex> {
    let pattern = pattern.trim();
    if pattern.is_empty() {
        return None;
    }
    let source = if let Some(prefix) = pattern.strip_suffix('*') {
        format!("^{}.*", regex::escape(prefix))
    } else if let Some(dir) = pattern.strip_suffix('/') {
        format!("^{}/*", regex::escape(dir))
    } else {
        format!("^{}/*", regex::escape(pattern))
    };
    match Regex::new(&source) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, pattern = %pattern, "skipping unusable exclusion pattern");
            None
        }
    }
}

/// `true` unless `path` matches one of `excluded`.
///
/// A missing path or a missing pattern list means authentication is required.
pub fn require_auth<S: AsRef<str>>(path: Option<&str>, excluded: Option<&[S]>) -> bool {
    let (Some(path), Some(excluded)) = (path, excluded) else {
        return true;
    };
    !excluded
        .iter()
        .filter_map(|p| compile(p.as_ref()))
        .any(|re| re.is_match(path))
}

/// Exclusion patterns compiled once, for use on every request.
#[derive(Debug, Clone, Default)]
pub struct ExcludedPaths {
    patterns: Vec<Regex>,
}

impl ExcludedPaths {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .filter_map(|p| compile(p.as_ref()))
                .collect(),
        }
    }

    pub fn requires_auth(&self, path: Option<&str>) -> bool {
        match path {
            Some(path) => !self.patterns.iter().any(|re| re.is_match(path)),
            None => true,
        }
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

    fn check(path: &str, excluded: &[&str]) -> bool {
        require_auth(Some(path), Some(excluded))
    }

    #[test]
    fn trailing_slash_pattern_matches_bare_path() {
        assert!(!check("/api/v1/status", &["/api/v1/status/"]));
        assert!(!check("/api/v1/status/", &["/api/v1/status/"]));
    }

    #[test]
    fn wildcard_is_a_prefix() {
        let excluded = ["/api/v1/stat*"];
        assert!(!check("/api/v1/status", &excluded));
        assert!(!check("/api/v1/stats", &excluded));
        assert!(!check("/api/v1/stat", &excluded));
        assert!(check("/api/v1/users", &["/api/v1/status*"]));
    }

    #[test]
    fn bare_pattern_is_a_prefix_too() {
        let excluded = ["/api/v1/status"];
        assert!(!check("/api/v1/status", &excluded));
        assert!(!check("/api/v1/status/extra", &excluded));
        assert!(check("/api/v1/users", &excluded));
    }

    #[test]
    fn missing_inputs_require_auth() {
        assert!(require_auth(None, Some(&["/api/v1/status/"][..])));
        assert!(require_auth::<&str>(Some("/x"), None));
        assert!(require_auth::<&str>(None, None));
        assert!(check("/x", &[]));
    }

    #[test]
    fn patterns_are_trimmed_and_literal() {
        assert!(!check("/api/v1/status", &["  /api/v1/status/ "]));
        // `.` is not a regex wildcard here
        assert!(check("/aXb", &["/a.b"]));
        assert!(!check("/a.b", &["/a.b"]));
        assert!(check("/x", &["", "   "]));
    }

    #[test]
    fn match_is_anchored_at_start() {
        assert!(check("/v2/api/v1/status", &["/api/v1/status/"]));
    }

    #[test]
    fn first_match_wins_over_later_patterns() {
        let excluded = ["/users/", "/sessions*"];
        assert!(!check("/sessions", &excluded));
        assert!(!check("/users", &excluded));
        assert!(check("/profile", &excluded));
    }

    #[test]
    fn compiled_set_agrees_with_free_function() {
        let raw = ["/api/v1/status/", "/users*", " /sessions "];
        let set = ExcludedPaths::new(raw);
        assert_eq!(set.len(), 3);
        for path in ["/api/v1/status", "/users", "/sessions/x", "/profile", "/"] {
            assert_eq!(
                set.requires_auth(Some(path)),
                require_auth(Some(path), Some(&raw[..])),
                "path {path}"
            );
        }
        assert!(set.requires_auth(None));
        assert!(ExcludedPaths::default().requires_auth(Some("/users")));
    }
}

//! Path exclusion rules
//!
//! A rule excludes a path when any of these holds:
//! 1. the rule, as a shell glob, matches the full path
//! 2. the rule, as a shell glob, matches the final path segment
//! 3. the rule has no glob metacharacters and occurs in the full path
//!
//! Globs use conventional wildcards (`*`, `?`, `[...]`); `*` does not cross a
//! `/`. A run of stars such as `**` is the same as a single `*`, so there is
//! no recursive wildcard. Outside Windows a backslash makes the next character
//! literal (`\*` matches a file named `*`). A rule that fails to compile as a
//! glob never matches by rules 1 and 2. Since it contains a metacharacter,
//! rule 3 does not apply to it either.

use glob::{MatchOptions, Pattern};
use std::path::Path;
use tracing::warn;

/// Characters that turn a rule into a glob
const GLOB_METACHARS: &[char] = &['*', '?', '[', ']'];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

#[derive(Debug, Clone)]
struct Rule {
    raw: String,
    glob: Option<Pattern>,
    literal: bool,
}

/// Rewrite a shell-style rule into `glob` crate syntax.
///
/// Collapses star runs and turns `\x` escapes into bracketed literals.
/// Returns `None` for a rule ending in an unpaired backslash.
fn translate(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        match c {
            '*' if out.ends_with('*') => {}
            '\\' if !cfg!(windows) => {
                let next = chars.next()?;
                if GLOB_METACHARS.contains(&next) {
                    out.push('[');
                    out.push(next);
                    out.push(']');
                } else {
                    out.push(next);
                }
            }
            _ => out.push(c),
        }
    }

    Some(out)
}

impl Rule {
    fn compile(raw: &str) -> Self {
        let glob = match translate(raw).map(|p| Pattern::new(&p)) {
            Some(Ok(p)) => Some(p),
            Some(Err(e)) => {
                warn!(pattern = raw, error = %e, "Ignoring malformed exclude glob");
                None
            }
            None => {
                warn!(pattern = raw, "Ignoring exclude glob with trailing backslash");
                None
            }
        };

        Self {
            raw: raw.to_string(),
            glob,
            literal: !raw.contains(GLOB_METACHARS),
        }
    }

    fn matches(&self, full: &str, base: Option<&str>) -> bool {
        if let Some(glob) = &self.glob {
            if glob.matches_with(full, MATCH_OPTIONS) {
                return true;
            }
            if let Some(base) = base {
                if glob.matches_with(base, MATCH_OPTIONS) {
                    return true;
                }
            }
        }

        self.literal && !self.raw.is_empty() && full.contains(self.raw.as_str())
    }
}

/// Ordered set of exclusion rules, immutable for the lifetime of a scan
#[derive(Debug, Clone, Default)]
pub struct ExcludeMatcher {
    rules: Vec<Rule>,
}

impl ExcludeMatcher {
    /// Compile the given rules. Never fails; see the module docs.
    pub fn new<S: AsRef<str>>(rules: &[S]) -> Self {
        Self {
            rules: rules.iter().map(|r| Rule::compile(r.as_ref())).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True if `path` should be skipped. For a directory this prunes its subtree.
    pub fn is_match(&self, path: &Path) -> bool {
        if self.rules.is_empty() {
            return false;
        }

        let full = path.to_string_lossy();
        let base = path.file_name().map(|n| n.to_string_lossy());
        let base = base.as_deref();

        self.rules.iter().any(|rule| rule.matches(&full, base))
    }
}

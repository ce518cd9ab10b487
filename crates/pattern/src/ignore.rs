//! Ignore rules read from an ignore file
//!
//! Each non-empty line holds one wildcard pattern matched against a path
//! relative to the source directory. `#` starts a comment line, `!` marks a
//! path that must never be ignored and `\` escapes a leading `#` or `!`.

use std::io::BufRead;
use std::path::Path;

use bubz2_errors::{Error, PatternError};
use tracing::debug;

use crate::{PathMatch, Pattern, U8Pieces};

const WILDCARD: u8 = b'*';

/// What a matching rule does to a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    /// Skip the path
    Ignore,
    /// Never skip the path, whatever else matches
    Keep,
}

/// Ordered set of ignore patterns
#[derive(Default, Debug, Clone)]
pub struct IgnoreRules {
    rules: Vec<(Pattern<U8Pieces, u8>, Directive)>,
}

impl IgnoreRules {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pattern: Pattern<U8Pieces, u8>, directive: Directive) {
        self.rules.push((pattern, directive));
    }

    /// Parse one rule per line and add it.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails or a line is not valid UTF-8.
    pub fn read_from<R: BufRead>(&mut self, reader: R) -> std::io::Result<()> {
        for line in reader.lines() {
            let line = line?;
            if let Some((pattern, directive)) = parse_line(&line) {
                self.insert(Pattern::parse(pattern.as_bytes(), &WILDCARD), directive);
            }
        }
        Ok(())
    }

    /// Load rules from `path`; a missing file yields no rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        let read_failed = |message: String| PatternError::ReadFailed {
            path: path.display().to_string(),
            message,
        };

        let contents = match tokio::fs::read(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "ignore file not found, ignoring nothing");
                return Ok(Self::new());
            }
            Err(e) => return Err(read_failed(e.to_string()).into()),
        };

        let mut rules = Self::new();
        rules
            .read_from(contents.as_slice())
            .map_err(|e| read_failed(e.to_string()))?;
        debug!(path = %path.display(), rules = rules.len(), "loaded ignore rules");
        Ok(rules)
    }

    /// Whether `path` (relative, as raw bytes) should be skipped
    ///
    /// True when some `Ignore` rule matches and no `Keep` rule does.
    #[must_use]
    pub fn is_ignored(&self, path: &[u8]) -> bool {
        let mut ignored = false;
        for (pattern, directive) in &self.rules {
            if pattern.is_match(PathMatch, path) {
                match directive {
                    Directive::Ignore => ignored = true,
                    Directive::Keep => return false,
                }
            }
        }
        ignored
    }

    /// Convenience wrapper over [`IgnoreRules::is_ignored`] for paths
    #[must_use]
    pub fn is_path_ignored(&self, relative: &Path) -> bool {
        self.is_ignored(relative.as_os_str().as_encoded_bytes())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn parse_line(line: &str) -> Option<(&str, Directive)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    if let Some(rest) = line.strip_prefix('!') {
        return Some((rest, Directive::Keep));
    }
    if let Some(rest) = line.strip_prefix('\\') {
        return Some((rest, Directive::Ignore));
    }
    Some((line, Directive::Ignore))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules(text: &str) -> IgnoreRules {
        let mut rules = IgnoreRules::new();
        rules.read_from(text.as_bytes()).unwrap();
        rules
    }

    #[test]
    fn test_parse_line() {
        assert_eq!(parse_line("  "), None);
        assert_eq!(parse_line("# comment"), None);
        assert_eq!(parse_line("  *.nav  "), Some(("*.nav", Directive::Ignore)));
        assert_eq!(parse_line("!maps/keep.nav"), Some(("maps/keep.nav", Directive::Keep)));
        assert_eq!(parse_line("\\#hash.txt"), Some(("#hash.txt", Directive::Ignore)));
        assert_eq!(parse_line("\\!bang.txt"), Some(("!bang.txt", Directive::Ignore)));
        assert_eq!(parse_line("é*"), Some(("é*", Directive::Ignore)));
    }

    #[test]
    fn test_ignore_and_keep() {
        let rules = rules(
            "# navigation meshes are generated on the server\n\
             *.nav\n\
             !maps/keep*.nav\n\
             \n\
             cfg/*\n",
        );
        assert_eq!(rules.len(), 3);
        assert!(rules.is_ignored(b"maps/dm_flood.nav"));
        assert!(rules.is_ignored(b"MAPS\\CP_DUSTBOWL.NAV"));
        assert!(!rules.is_ignored(b"maps/keep_me.nav"));
        assert!(rules.is_ignored(b"cfg/server.cfg"));
        assert!(!rules.is_ignored(b"cfg"));
        assert!(!rules.is_ignored(b"maps/dm_flood.bsp"));
    }

    #[test]
    fn test_keep_wins_regardless_of_order() {
        let rules = rules("!*.txt\n*\n");
        assert!(!rules.is_ignored(b"readme.txt"));
        assert!(rules.is_ignored(b"readme.md"));
    }

    #[test]
    fn test_empty_rules_ignore_nothing() {
        let rules = IgnoreRules::new();
        assert!(rules.is_empty());
        assert!(!rules.is_ignored(b"anything"));
    }
}

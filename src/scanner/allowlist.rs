//! Extension allowlist and the archive wildcard set derived from it.
//!
//! Built once per run and shared read-only by the path walker, the
//! dispatcher and every archive backend.

use crate::core::config::ScanConfig;
use crate::core::error::Result;
use regex::Regex;
use std::path::Path;

/// Glob-style entry patterns (`*.nes`) handed to archive backends.
#[derive(Debug, Clone)]
pub struct WildcardSet {
    patterns: Vec<String>,
    regex: Regex,
}

impl WildcardSet {
    /// Patterns in `*.ext` form, for extractors that take wildcards.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// Whether an archive entry name matches any pattern (case-insensitive).
    pub fn matches_name(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }
}

/// Case-insensitive set of recognised extensions.
#[derive(Debug, Clone)]
pub struct Allowlist {
    regex: Regex,
    wildcards: WildcardSet,
}

impl Allowlist {
    /// Build the allowlist from bare extensions (`nes`, `.sfc`, ...).
    pub fn new(extensions: &[String]) -> Result<Self> {
        let mut normalized: Vec<String> = Vec::with_capacity(extensions.len());
        for ext in extensions {
            let ext = ext.trim().trim_start_matches('.').to_lowercase();
            if !ext.is_empty() && !normalized.contains(&ext) {
                normalized.push(ext);
            }
        }

        let alternation = normalized
            .iter()
            .map(|e| regex::escape(e))
            .collect::<Vec<_>>()
            .join("|");
        // An empty list must match nothing, not every name.
        let source = if alternation.is_empty() {
            r"\b\B".to_string()
        } else {
            format!(r"(?i)\.(?:{})$", alternation)
        };
        let regex = Regex::new(&source)?;

        let wildcards = WildcardSet {
            patterns: normalized.iter().map(|e| format!("*.{}", e)).collect(),
            regex: regex.clone(),
        };

        log::debug!("Extension allowlist: {}", normalized.join(","));

        Ok(Self {
            regex,
            wildcards,
        })
    }

    /// Build the allowlist from the scan configuration.
    pub fn from_config(config: &ScanConfig) -> Result<Self> {
        Self::new(&config.extensions)
    }

    /// Parse a comma-separated `-e` list. Leading dots are dropped.
    pub fn parse_list(list: &str) -> Vec<String> {
        list.split(',')
            .map(|s| s.trim().trim_start_matches('.').to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Check whether the file name of `path` carries a recognised extension.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .map(|name| self.regex.is_match(&name.to_string_lossy()))
            .unwrap_or(false)
    }

    pub fn wildcards(&self) -> &WildcardSet {
        &self.wildcards
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exts(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_matches_case_insensitive() {
        let allow = Allowlist::new(&exts(&["nes", "sfc"])).unwrap();
        assert!(allow.matches(Path::new("/roms/Mario.nes")));
        assert!(allow.matches(Path::new("ZELDA.SFC")));
        assert!(!allow.matches(Path::new("notes.txt")));
        assert!(!allow.matches(Path::new("nes")));
        assert!(!allow.matches(Path::new("game.nes.bak")));
    }

    #[test]
    fn test_normalization_and_dedup() {
        let allow = Allowlist::new(&exts(&[".NES", " nes ", "", "gb"])).unwrap();
        assert_eq!(
            allow.wildcards().patterns(),
            &["*.nes".to_string(), "*.gb".to_string()]
        );
    }

    #[test]
    fn test_extension_is_escaped() {
        let allow = Allowlist::new(&exts(&["a.b"])).unwrap();
        assert!(allow.matches(Path::new("x.a.b")));
        assert!(!allow.matches(Path::new("x.aXb")));
    }

    #[test]
    fn test_empty_list_matches_nothing() {
        let allow = Allowlist::new(&[]).unwrap();
        assert!(!allow.matches(Path::new("a.nes")));
        assert!(!allow.wildcards().matches_name("a.nes"));
    }

    #[test]
    fn test_wildcard_entry_names() {
        let allow = Allowlist::new(&exts(&["nes", "zip"])).unwrap();
        let wildcards = allow.wildcards();
        assert!(wildcards.matches_name("dir/Game.NES"));
        assert!(wildcards.matches_name("inner.zip"));
        assert!(!wildcards.matches_name("readme.txt"));
    }

    #[test]
    fn test_parse_list() {
        assert_eq!(Allowlist::parse_list("nes, sfc,,gb"), exts(&["nes", "sfc", "gb"]));
        assert_eq!(Allowlist::parse_list(".nes,.,7z"), exts(&["nes", "7z"]));
    }
}

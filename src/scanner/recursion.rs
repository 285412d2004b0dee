//! Recursion depth and archive provenance for nested expansion.

use crate::core::types::CHAIN_SEPARATOR;
use std::path::Path;

/// Position of one dispatch call in the archive tree.
///
/// A context is never mutated after creation. Each expansion derives a new
/// one with [`RecursionContext::nested`], so siblings never share state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecursionContext {
    depth: u32,
    /// Ancestor archives, innermost first
    chain: Vec<String>,
}

impl RecursionContext {
    /// Context for a path given on the command line.
    pub fn root() -> Self {
        Self::default()
    }

    /// Context for files extracted from `archive_name`.
    pub fn nested(&self, archive_name: impl Into<String>) -> Self {
        let mut chain = Vec::with_capacity(self.chain.len() + 1);
        chain.push(archive_name.into());
        chain.extend(self.chain.iter().cloned());
        Self {
            depth: self.depth + 1,
            chain,
        }
    }

    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Ancestor archive names, innermost first.
    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    pub fn is_top_level(&self) -> bool {
        self.chain.is_empty()
    }

    /// The chain as shown after a file name, e.g. ` < inner.zip < outer.zip`.
    pub fn render_chain(&self) -> String {
        self.chain
            .iter()
            .map(|name| format!("{}{}", CHAIN_SEPARATOR, name))
            .collect()
    }

    /// Name shown for `path`: the basename inside an archive, the path as
    /// given otherwise.
    pub fn display_name(&self, path: &Path) -> String {
        if self.is_top_level() {
            return path.display().to_string();
        }
        path.file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string())
    }

    /// Display name followed by the rendered chain.
    pub fn describe(&self, path: &Path) -> String {
        format!("{}{}", self.display_name(path), self.render_chain())
    }
}

/// How deep archives may nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecursionPolicy {
    pub max_depth: u32,
}

impl RecursionPolicy {
    pub fn new(max_depth: u32) -> Self {
        Self { max_depth }
    }

    /// Whether an archive found at `depth` may be expanded.
    pub fn allows(&self, depth: u32) -> bool {
        depth <= self.max_depth
    }
}

impl Default for RecursionPolicy {
    fn default() -> Self {
        Self { max_depth: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_context() {
        let ctx = RecursionContext::root();
        assert_eq!(ctx.depth(), 0);
        assert!(ctx.is_top_level());
        assert_eq!(ctx.render_chain(), "");
    }

    #[test]
    fn test_nested_prepends_innermost() {
        let outer = RecursionContext::root().nested("outer.zip");
        let inner = outer.nested("inner.zip");

        assert_eq!(inner.depth(), 2);
        assert_eq!(inner.chain(), &["inner.zip".to_string(), "outer.zip".to_string()]);
        assert_eq!(inner.render_chain(), " < inner.zip < outer.zip");

        // The parent is untouched
        assert_eq!(outer.depth(), 1);
        assert_eq!(outer.chain().len(), 1);
    }

    #[test]
    fn test_siblings_do_not_share_chain() {
        let parent = RecursionContext::root().nested("set.zip");
        let a = parent.nested("a.zip");
        let b = parent.nested("b.zip");

        assert_eq!(a.render_chain(), " < a.zip < set.zip");
        assert_eq!(b.render_chain(), " < b.zip < set.zip");
    }

    #[test]
    fn test_display_name() {
        let path = Path::new("/roms/nes/mario.nes");
        assert_eq!(RecursionContext::root().display_name(path), "/roms/nes/mario.nes");

        let nested = RecursionContext::root().nested("/roms/set.zip");
        assert_eq!(nested.display_name(path), "mario.nes");
        assert_eq!(nested.describe(path), "mario.nes < /roms/set.zip");
    }

    #[test]
    fn test_describe_matches_report_heading() {
        let ctx = RecursionContext::root().nested("outer.zip").nested("inner.zip");
        let path = Path::new("/tmp/romsum-x/mario.nes");
        let report = crate::core::types::ChecksumReport {
            path: path.to_path_buf(),
            display_name: ctx.display_name(path),
            chain: ctx.chain().to_vec(),
            checksums: Vec::new(),
        };

        assert_eq!(ctx.describe(path), report.heading());
    }

    #[test]
    fn test_policy_allows() {
        let policy = RecursionPolicy::default();
        assert!(policy.allows(0));
        assert!(policy.allows(1));
        assert!(!policy.allows(2));

        assert!(!RecursionPolicy::new(0).allows(1));
    }
}

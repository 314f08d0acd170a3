//! Path-based import resolution.

use quickfix_types::Importer;
use std::collections::BTreeMap;

/// Derives package names from import paths, with explicit overrides for
/// packages whose name differs from their path.
#[derive(Debug, Clone, Default)]
pub struct PathImporter {
    overrides: BTreeMap<String, String>,
}

impl PathImporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_overrides(overrides: BTreeMap<String, String>) -> Self {
        Self { overrides }
    }

    pub fn insert(&mut self, path: impl Into<String>, name: impl Into<String>) {
        self.overrides.insert(path.into(), name.into());
    }

    /// Name conventionally declared by the package at `path`.
    ///
    /// Uses the last path element, skipping a trailing major-version element
    /// (`/v2`) and dropping `go-` prefixes, `-go`/`.go` suffixes and gopkg
    /// style `.vN` suffixes.
    pub fn derive(path: &str) -> String {
        let mut elems = path.rsplit('/').filter(|e| !e.is_empty());
        let mut last = elems.next().unwrap_or(path);
        if is_major_version(last)
            && let Some(prev) = elems.next()
        {
            last = prev;
        }

        let mut name = last;
        if let Some((base, suffix)) = name.rsplit_once(".v")
            && !base.is_empty()
            && !suffix.is_empty()
            && suffix.bytes().all(|b| b.is_ascii_digit())
        {
            name = base;
        }
        name = name.strip_prefix("go-").unwrap_or(name);
        name = name.strip_suffix("-go").unwrap_or(name);
        name = name.strip_suffix(".go").unwrap_or(name);

        name.replace(['-', '.'], "_")
    }
}

fn is_major_version(elem: &str) -> bool {
    elem.strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

impl Importer for PathImporter {
    fn package_name(&self, path: &str) -> Option<String> {
        if path.is_empty() {
            return None;
        }
        Some(
            self.overrides
                .get(path)
                .cloned()
                .unwrap_or_else(|| Self::derive(path)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn derive_uses_last_element() {
        assert_eq!(PathImporter::derive("fmt"), "fmt");
        assert_eq!(PathImporter::derive("net/http"), "http");
        assert_eq!(PathImporter::derive("image/png"), "png");
    }

    #[test]
    fn derive_strips_conventional_decorations() {
        assert_eq!(PathImporter::derive("github.com/mattn/go-sqlite3"), "sqlite3");
        assert_eq!(PathImporter::derive("github.com/x/client-go"), "client");
        assert_eq!(PathImporter::derive("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(PathImporter::derive("github.com/x/y/v2"), "y");
    }

    #[test]
    fn overrides_win() {
        let mut importer = PathImporter::new();
        importer.insert("github.com/x/weird", "other");
        assert_eq!(importer.package_name("github.com/x/weird"), Some("other".to_string()));
        assert_eq!(importer.package_name("github.com/x/plain"), Some("plain".to_string()));
        assert_eq!(importer.package_name(""), None);
    }
}

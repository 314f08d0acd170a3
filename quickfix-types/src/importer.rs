//! The import resolution port.

/// Resolves an import path to the name its package declares.
pub trait Importer {
    /// `path` is unquoted. `None` means the path cannot be resolved.
    fn package_name(&self, path: &str) -> Option<String>;
}

impl<I: Importer + ?Sized> Importer for &I {
    fn package_name(&self, path: &str) -> Option<String> {
        (**self).package_name(path)
    }
}

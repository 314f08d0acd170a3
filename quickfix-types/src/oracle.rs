//! The diagnostic oracle port.

use crate::diagnostic::Diagnostic;
use crate::package::Package;

/// A best-effort checker: reports every problem it can find in one call
/// instead of stopping at the first. An empty result means the package
/// checks cleanly.
pub trait Oracle {
    fn check(&self, package: &Package) -> Vec<Diagnostic>;
}

impl<F> Oracle for F
where
    F: Fn(&Package) -> Vec<Diagnostic>,
{
    fn check(&self, package: &Package) -> Vec<Diagnostic> {
        self(package)
    }
}

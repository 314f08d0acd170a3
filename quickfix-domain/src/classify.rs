//! Diagnostic message classification.
//!
//! The oracle only exposes rendered text, so the message patterns live here
//! and nowhere else. Everything downstream works with [`Shape`] and
//! [`Params`].

use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static DECLARED_NOT_USED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9_]+) declared but not used$")
        .expect("DECLARED_NOT_USED regex should compile")
});

static IMPORTED_NOT_USED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^(".+") imported but not used$"#).expect("IMPORTED_NOT_USED regex should compile")
});

const NO_NEW_VARIABLES: &str = "no new variables on left side of :=";

/// Recognized diagnostic shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Shape {
    /// `x declared but not used`
    DeclaredNotUsed,
    /// `"p" imported but not used`
    ImportedNotUsed,
    /// `no new variables on left side of :=`
    NoNewVariables,
}

impl Shape {
    pub const ALL: [Shape; 3] = [
        Shape::DeclaredNotUsed,
        Shape::ImportedNotUsed,
        Shape::NoNewVariables,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Shape::DeclaredNotUsed => "declared-not-used",
            Shape::ImportedNotUsed => "imported-not-used",
            Shape::NoNewVariables => "no-new-variables",
        }
    }

    /// Parameters of `message` if it has this shape.
    pub fn extract(self, message: &str) -> Option<Params> {
        match self {
            Shape::DeclaredNotUsed => DECLARED_NOT_USED
                .captures(message)
                .map(|c| Params::Ident(c[1].to_string())),
            Shape::ImportedNotUsed => IMPORTED_NOT_USED
                .captures(message)
                .map(|c| Params::QuotedPath(c[1].to_string())),
            Shape::NoNewVariables => (message == NO_NEW_VARIABLES).then_some(Params::Empty),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Data a fix needs, as extracted from the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Params {
    /// Name of the unused binding.
    Ident(String),
    /// Import path literal, quotes included, compared verbatim.
    QuotedPath(String),
    Empty,
}

/// First shape `message` matches.
pub fn classify(message: &str) -> Option<(Shape, Params)> {
    Shape::ALL
        .into_iter()
        .find_map(|shape| shape.extract(message).map(|params| (shape, params)))
}

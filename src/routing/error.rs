//! Routing error types.
//!
//! Rebuild errors ([`RouteError`]) abort a whole table refresh. Reverse
//! routing failures ([`ReverseError`]) are returned to the caller per call.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Where a route definition came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    /// Routes file path, or a label such as `module:testrunner`.
    pub origin: String,
    /// 1-based line number.
    pub line: usize,
}

impl SourceLocation {
    pub fn new(origin: impl Into<String>, line: usize) -> Self {
        Self {
            origin: origin.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.origin, self.line)
    }
}

/// Structural problems found while inserting a key into the prefix tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("path must begin with /: {0}")]
    NotAbsolute(String),

    #[error("empty path elements are not allowed: {0}")]
    EmptySegment(String),

    #[error("empty placeholder name in {0}")]
    EmptyPlaceholder(String),

    #[error("catch-all must be the last path element: {0}")]
    CatchAllNotLast(String),

    #[error("duplicate catch-all at the same position: {0}")]
    DuplicateCatchAll(String),

    #[error("duplicate path: {0}")]
    DuplicatePath(String),
}

/// Errors that abort a route table rebuild.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A route file (root or module) could not be read.
    #[error("failed to load routes file {}: {source}", path.display())]
    MissingRouteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Path pattern did not start with `/`.
    #[error("absolute URL required at {location}: {path}")]
    RelativePath {
        path: String,
        location: SourceLocation,
    },

    /// Target does not resolve to a known handler.
    #[error("route validation error at {location}: {message}")]
    Validation {
        message: String,
        location: SourceLocation,
        /// Source lines around the offending line, each prefixed with its number.
        snippet: Vec<String>,
    },

    /// Two routes cannot share the tree structure they describe.
    #[error("route conflict at {location}: {source}")]
    TreeConflict {
        location: SourceLocation,
        #[source]
        source: TreeError,
    },

    /// A module include expands back into itself.
    #[error("module include cycle at {location}: {chain}")]
    IncludeCycle {
        chain: String,
        location: SourceLocation,
    },
}

impl RouteError {
    /// Location of the offending route line, when there is one.
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            RouteError::MissingRouteFile { .. } => None,
            RouteError::RelativePath { location, .. }
            | RouteError::Validation { location, .. }
            | RouteError::TreeConflict { location, .. }
            | RouteError::IncludeCycle { location, .. } => Some(location),
        }
    }
}

/// Failures of reverse routing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReverseError {
    #[error("reverse router got invalid action {0:?}, expected Namespace.Member")]
    InvalidAction(String),

    #[error("failed to find reverse route for {action} with {args:?}")]
    NotFound {
        action: String,
        args: BTreeMap<String, String>,
    },
}

/// Lines of `content` around `line` (1-based), numbered, for error display.
pub(crate) fn source_snippet(content: &str, line: usize) -> Vec<String> {
    const CONTEXT: usize = 2;

    let first = line.saturating_sub(CONTEXT).max(1);
    content
        .lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .skip(first - 1)
        .take_while(|(n, _)| *n <= line + CONTEXT)
        .map(|(n, text)| format!("{:>4} | {}", n, text))
        .collect()
}

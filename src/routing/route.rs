//! Compiled route descriptors.
//!
//! A [`Route`] is built once per route line and never mutated. The target
//! identifier is split into two [`IdentPart`]s up front so that matching and
//! reverse routing never rescan the raw text.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::registry::{HandlerRegistry, RegistryError};
use crate::routing::error::{RouteError, SourceLocation};
use crate::routing::matcher::Params;
use crate::routing::method::Method;

/// Raw target of a route that deliberately answers "not found".
pub const NOT_FOUND_ACTION: &str = "404";

/// Tree segment standing in for the method of a `*` route.
pub(crate) const ANY_METHOD_SEGMENT: &str = ":METHOD";

/// One half (namespace or member) of a target identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    Literal(String),
    /// `prefix:name`; `literal_prefix` is empty for a leading `:name`.
    Placeholder { name: String, literal_prefix: String },
}

/// How a requested identifier half lines up with a route's half.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PartMatch {
    Exact,
    Bound { name: String, value: String },
}

impl IdentPart {
    /// The text after the last `:` names the placeholder.
    pub fn parse(text: &str) -> Self {
        match text.rfind(':') {
            Some(pos) if pos + 1 < text.len() => IdentPart::Placeholder {
                name: text[pos + 1..].to_string(),
                literal_prefix: text[..pos].to_string(),
            },
            _ => IdentPart::Literal(text.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, IdentPart::Literal(text) if text.is_empty())
    }

    /// Substitute `value` for the placeholder. A leading placeholder is
    /// replaced whole; otherwise `prefix:` is kept and `value` appended.
    pub fn fill(&self, value: &str) -> String {
        match self {
            IdentPart::Literal(text) => text.clone(),
            IdentPart::Placeholder { literal_prefix, .. } if literal_prefix.is_empty() => {
                value.to_string()
            }
            IdentPart::Placeholder { literal_prefix, .. } => format!("{}:{}", literal_prefix, value),
        }
    }

    /// Resolve against captured path parameters. An uncaptured placeholder
    /// is left as written so the registry lookup fails visibly.
    pub fn resolve(&self, params: &Params) -> String {
        match self {
            IdentPart::Literal(text) => text.clone(),
            IdentPart::Placeholder { name, .. } => {
                match params.get(name).and_then(|values| values.first()) {
                    Some(value) => self.fill(value),
                    None => self.to_string(),
                }
            }
        }
    }

    /// Inverse of [`IdentPart::fill`]: does `requested` fit this half, and
    /// which value does it bind?
    pub fn unfill(&self, requested: &str) -> Option<PartMatch> {
        match self {
            IdentPart::Literal(text) => (text == requested).then_some(PartMatch::Exact),
            IdentPart::Placeholder {
                name,
                literal_prefix,
            } => {
                let value = if literal_prefix.is_empty() {
                    requested
                } else {
                    requested
                        .strip_prefix(literal_prefix.as_str())?
                        .strip_prefix(':')?
                };
                (!value.is_empty()).then(|| PartMatch::Bound {
                    name: name.clone(),
                    value: value.to_string(),
                })
            }
        }
    }
}

impl fmt::Display for IdentPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdentPart::Literal(text) => f.write_str(text),
            IdentPart::Placeholder {
                name,
                literal_prefix,
            } => write!(f, "{}:{}", literal_prefix, name),
        }
    }
}

impl Serialize for IdentPart {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// What a route dispatches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Target {
    /// The `404` sentinel.
    NotFound,
    Action {
        namespace: IdentPart,
        member: IdentPart,
    },
    /// Anything that is not `Namespace.Member`.
    Unparsed,
}

impl Target {
    pub fn parse(action: &str) -> Self {
        if action == NOT_FOUND_ACTION {
            return Target::NotFound;
        }
        let parts: Vec<&str> = action.split('.').collect();
        match parts.as_slice() {
            [namespace, member] => Target::Action {
                namespace: IdentPart::parse(strip_semicolon(namespace)),
                member: IdentPart::parse(strip_semicolon(member)),
            },
            _ => Target::Unparsed,
        }
    }
}

/// Legacy route files end target halves with `;`.
fn strip_semicolon(part: &str) -> &str {
    match part.strip_suffix(';') {
        Some(stripped) if !stripped.is_empty() => stripped,
        _ => part,
    }
}

/// Errors from decoding the parenthesised fixed argument list.
#[derive(Debug, Error)]
pub enum FixedArgsError {
    #[error("unbalanced quote")]
    UnbalancedQuote,

    #[error("bare \" in non-quoted field at column {column}")]
    BareQuote { column: usize },

    #[error("extraneous \" in quoted field at column {column}")]
    ExtraneousQuote { column: usize },

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Decode fixed arguments as a single CSV record.
pub fn parse_fixed_args(raw: &str) -> Result<Vec<String>, FixedArgsError> {
    check_quoting(raw)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_reader(raw.as_bytes());
    match reader.records().next() {
        None => Ok(Vec::new()),
        Some(record) => Ok(record?.iter().map(str::to_string).collect()),
    }
}

/// Strict RFC 4180 quoting. The `csv` reader is lenient and would quietly
/// rewrite a stray quote instead of rejecting it.
fn check_quoting(raw: &str) -> Result<(), FixedArgsError> {
    #[derive(Clone, Copy)]
    enum State {
        FieldStart,
        Unquoted,
        Quoted,
        // Just saw `"` inside a quoted field: an escape or the closing quote.
        QuoteInQuoted,
    }

    let mut state = State::FieldStart;
    for (column, c) in raw.char_indices() {
        state = match (state, c) {
            (State::FieldStart, '"') => State::Quoted,
            (State::FieldStart | State::Unquoted, ',') => State::FieldStart,
            (State::Unquoted, '"') => return Err(FixedArgsError::BareQuote { column }),
            (State::FieldStart | State::Unquoted, _) => State::Unquoted,
            (State::Quoted, '"') => State::QuoteInQuoted,
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, '"') => State::Quoted,
            (State::QuoteInQuoted, ',') => State::FieldStart,
            (State::QuoteInQuoted, _) => return Err(FixedArgsError::ExtraneousQuote { column }),
        };
    }

    match state {
        State::Quoted => Err(FixedArgsError::UnbalancedQuote),
        _ => Ok(()),
    }
}

/// Why a route target failed validation.
#[derive(Debug, Error)]
pub enum InvalidTarget {
    #[error("expected two parts (Namespace.Member), but got {parts}: {action}")]
    Shape { parts: usize, action: String },

    #[error(transparent)]
    Unknown(#[from] RegistryError),
}

/// Key under which a route is registered in the prefix tree.
pub fn tree_key(method: &str, path: &str) -> String {
    format!("/{}{}", method, path)
}

/// One compiled route line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub method: Method,
    pub path: String,
    /// Target as written, e.g. `Application.Show` or `404`.
    pub action: String,
    pub target: Target,
    pub fixed_params: Vec<String>,
    pub tree_key: String,
    #[serde(skip)]
    pub location: SourceLocation,
}

impl Route {
    /// Build a route. Malformed fixed arguments are logged and dropped; a
    /// relative path is fatal.
    pub fn new(
        method: Method,
        path: &str,
        action: &str,
        fixed_args: &str,
        location: SourceLocation,
    ) -> Result<Self, RouteError> {
        if !path.starts_with('/') {
            return Err(RouteError::RelativePath {
                path: path.to_string(),
                location,
            });
        }

        let fixed_params = parse_fixed_args(fixed_args).unwrap_or_else(|e| {
            tracing::error!(
                origin = %location.origin,
                line = location.line,
                args = %fixed_args,
                error = %e,
                "Invalid fixed parameters"
            );
            Vec::new()
        });

        let method_segment = if method.is_any() {
            ANY_METHOD_SEGMENT
        } else {
            method.as_str()
        };

        Ok(Self {
            method,
            path: path.to_string(),
            action: action.to_string(),
            target: Target::parse(action),
            fixed_params,
            tree_key: tree_key(method_segment, path),
            location,
        })
    }

    /// Both halves, when the target is `Namespace.Member`.
    pub fn parts(&self) -> Option<(&IdentPart, &IdentPart)> {
        match &self.target {
            Target::Action { namespace, member } => Some((namespace, member)),
            _ => None,
        }
    }

    /// Check that the target names a registered handler. Targets with a
    /// placeholder cannot be checked and are accepted.
    pub fn validate(&self, registry: &dyn HandlerRegistry) -> Result<(), InvalidTarget> {
        if self.action == NOT_FOUND_ACTION {
            return Ok(());
        }

        let parts: Vec<&str> = self.action.split('.').collect();
        if parts.len() != 2 {
            return Err(InvalidTarget::Shape {
                parts: parts.len(),
                action: self.action.clone(),
            });
        }
        if parts.iter().any(|part| part.contains(':')) {
            return Ok(());
        }

        match self.parts() {
            Some((IdentPart::Literal(namespace), IdentPart::Literal(member))) => {
                registry.action_exists(namespace, member)?;
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

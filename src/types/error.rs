use thiserror::Error;

use crate::parse::ParseError;

/// Why a specification element was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("no filter specification was provided")]
    Missing,

    #[error("specification contains no filter elements")]
    Empty,

    #[error("module and limit patterns containing '/' are not supported")]
    ModulePattern,

    #[error("limit has no value after '='")]
    MissingLimitValue,

    #[error("limit value is not an integer")]
    MalformedLimitValue,

    #[error("limit value {value} is negative")]
    NegativeLimit { value: i64 },

    #[error("unknown limit '{name}'; expected maxdepth, maxarray, maxrefs or maxbytes")]
    UnknownLimit { name: String },

    #[error("'!' must be followed by a class pattern")]
    BareNegation,

    #[error("'*' is only allowed as a trailing '*', '.*' or '.**'")]
    MisplacedWildcard,

    #[error("package pattern has an empty package name")]
    EmptyPackage,

    #[error("a single element cannot contain the ';' separator")]
    EmbeddedSeparator,
}

/// A specification string that cannot be compiled into a filter.
///
/// Raised only while compiling; evaluating a compiled filter cannot fail.
#[derive(Debug, Error)]
#[error("invalid unmarshalling filter specification '{element}': {reason}")]
pub struct InvalidSpecification {
    element: String,
    reason: InvalidReason,
    #[source]
    source: Option<ParseError>,
}

impl InvalidSpecification {
    pub(crate) fn new(element: impl Into<String>, reason: InvalidReason) -> Self {
        Self {
            element: element.into(),
            reason,
            source: None,
        }
    }

    pub(crate) fn with_source(
        element: impl Into<String>,
        reason: InvalidReason,
        source: ParseError,
    ) -> Self {
        Self {
            element: element.into(),
            reason,
            source: Some(source),
        }
    }

    /// The offending element, or the whole specification when no single
    /// element is to blame.
    #[must_use]
    pub fn element(&self) -> &str {
        &self.element
    }

    #[must_use]
    pub fn reason(&self) -> &InvalidReason {
        &self.reason
    }
}

use std::fmt;

/// Low-level failure from the element grammar, kept as the cause of an
/// [`InvalidSpecification`](crate::InvalidSpecification).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    input: String,
    message: String,
}

impl ParseError {
    pub(crate) fn new(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            message: message.into(),
        }
    }

    /// Text the grammar was applied to.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = self.message.trim_end();
        if detail.is_empty() {
            write!(f, "cannot parse '{}'", self.input)
        } else {
            write!(f, "cannot parse '{}': {detail}", self.input)
        }
    }
}

impl std::error::Error for ParseError {}

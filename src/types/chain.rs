use std::env::{self, VarError};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use super::error::{InvalidReason, InvalidSpecification};
use super::filter_info::FilterInfo;
use super::report::FilterReport;
use super::rule::{Limit, Polarity, Rule};
use super::status::Status;
use crate::FilterError;

/// Builder for assembling a [`FilterChain`] element by element.
///
/// Compiling a builder gives the same chain as compiling its elements joined
/// with `;`. An element that itself contains `;` is refused.
///
/// # Example
///
/// ```
/// use unmarshal_filter::{FilterBuilder, Limit, Query, Status};
///
/// let chain = FilterBuilder::new()
///     .limit(Limit::MaxDepth, 20)
///     .deny("java.lang.Runtime")
///     .allow("java.lang.*")
///     .compile()
///     .unwrap();
///
/// assert_eq!(chain.evaluate(&Query::new().class("java.lang.String")), Status::Allow);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    elements: Vec<String>,
}

impl FilterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow classes matching `pattern` (exact, `pkg.*`, `pkg.**` or `prefix*`).
    #[must_use]
    pub fn allow(mut self, pattern: &str) -> Self {
        self.elements.push(pattern.to_owned());
        self
    }

    /// Reject classes matching `pattern`.
    #[must_use]
    pub fn deny(mut self, pattern: &str) -> Self {
        self.elements.push(format!("!{pattern}"));
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: Limit, max: u64) -> Self {
        self.elements.push(format!("{limit}={max}"));
        self
    }

    /// Append a raw element in specification syntax.
    #[must_use]
    pub fn element(mut self, raw: &str) -> Self {
        self.elements.push(raw.to_owned());
        self
    }

    /// Compile the collected elements, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSpecification`] for the first element that violates
    /// the grammar or contains `;`, or when no rule results.
    pub fn compile(self) -> Result<FilterChain, InvalidSpecification> {
        if let Some(element) = self.elements.iter().find(|e| e.contains(';')) {
            return Err(InvalidSpecification::new(
                element.as_str(),
                InvalidReason::EmbeddedSeparator,
            ));
        }
        crate::compile::compile_spec(&self.elements.join(";"))
    }
}

/// A compiled, immutable filter. Thread-safe and designed to live behind `Arc`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChain {
    pub(crate) rules: Vec<Rule>,
}

impl FilterChain {
    /// Compile a `;`-separated filter specification.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidSpecification`] if any element violates the grammar or
    /// the specification yields no rules.
    pub fn compile(spec: &str) -> Result<Self, InvalidSpecification> {
        crate::compile::compile_spec(spec)
    }

    /// Compile the specification held in an environment variable.
    ///
    /// # Errors
    ///
    /// An unset variable is an [`InvalidSpecification`] with
    /// [`InvalidReason::Missing`]; a non-Unicode value is
    /// [`FilterError::Env`].
    pub fn from_env(var: &str) -> Result<Self, FilterError> {
        Self::from_lookup(var, env::var(var))
    }

    fn from_lookup(var: &str, lookup: Result<String, VarError>) -> Result<Self, FilterError> {
        match lookup {
            Ok(spec) => Ok(Self::compile(&spec)?),
            Err(VarError::NotPresent) => {
                Err(InvalidSpecification::new(var, InvalidReason::Missing).into())
            }
            Err(source @ VarError::NotUnicode(_)) => Err(FilterError::Env {
                var: var.to_owned(),
                source,
            }),
        }
    }

    /// Read a specification file and compile it. Trailing line terminators
    /// are dropped; everything else is taken literally.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError`] on I/O or compile failure.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FilterError> {
        let text = std::fs::read_to_string(path)?;
        Ok(Self::compile(text.trim_end_matches(['\r', '\n']))?)
    }

    /// Check one decode position. Rules run in order; the first one that is
    /// not [`Status::Undecided`] decides.
    pub fn evaluate<I: FilterInfo + ?Sized>(&self, info: &I) -> Status {
        crate::evaluate::evaluate(&self.rules, info)
    }

    /// Evaluate and report which rule decided.
    pub fn explain<I: FilterInfo + ?Sized>(&self, info: &I) -> FilterReport {
        crate::evaluate::evaluate_detailed(&self.rules, info)
    }

    /// Compiled rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Always `false` for a successfully compiled chain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// A denied exact class to repeat after the chain when its last rule is
    /// an allow set holding only `""`. Written bare, that set would be a
    /// trailing empty element and vanish on recompile.
    fn trailing_empty_anchor(&self) -> Option<&str> {
        match self.rules.last()? {
            Rule::Exact {
                polarity: Polarity::Allow,
                classes,
            } if classes.len() == 1 && classes.contains("") => {}
            _ => return None,
        }
        self.rules.iter().find_map(|rule| match rule {
            Rule::Exact {
                polarity: Polarity::Deny,
                classes,
            } => classes.iter().map(String::as_str).min(),
            _ => None,
        })
    }
}

impl FromStr for FilterChain {
    type Err = InvalidSpecification;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::compile(s)
    }
}

/// Canonical specification: compiling it again gives an equivalent chain.
impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(";")?;
            }
            write!(f, "{rule}")?;
        }
        if let Some(class) = self.trailing_empty_anchor() {
            write!(f, ";!{class}")?;
        }
        Ok(())
    }
}

/// The decision point a stream decoder consults for every resolved class
/// and structural step.
pub trait InputFilter: Send + Sync {
    fn check_input(&self, info: &dyn FilterInfo) -> Status;
}

impl InputFilter for FilterChain {
    fn check_input(&self, info: &dyn FilterInfo) -> Status {
        self.evaluate(info)
    }
}

impl<F> InputFilter for F
where
    F: Fn(&dyn FilterInfo) -> Status + Send + Sync,
{
    fn check_input(&self, info: &dyn FilterInfo) -> Status {
        self(info)
    }
}

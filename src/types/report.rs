use std::fmt;
use std::time::Duration;

use super::status::Status;

/// Detailed outcome returned by
/// [`FilterChain::explain()`](super::chain::FilterChain::explain).
///
/// Carries the status, which rule produced it (by chain position and in
/// specification syntax), how many rules were consulted, and the wall-clock
/// duration of the evaluation.
#[derive(Debug, Clone)]
#[must_use]
pub struct FilterReport {
    status: Status,
    decided_by: Option<(usize, String)>,
    rules_checked: usize,
    duration: Duration,
}

impl FilterReport {
    pub(crate) fn new(
        status: Status,
        decided_by: Option<(usize, String)>,
        rules_checked: usize,
        duration: Duration,
    ) -> Self {
        Self {
            status,
            decided_by,
            rules_checked,
            duration,
        }
    }

    /// Same status [`FilterChain::evaluate()`](super::chain::FilterChain::evaluate) returns.
    pub fn status(&self) -> Status {
        self.status
    }

    /// Chain position and rendered form of the deciding rule. `None` when
    /// every rule was undecided.
    #[must_use]
    pub fn decided_by(&self) -> Option<(usize, &str)> {
        self.decided_by
            .as_ref()
            .map(|(idx, rule)| (*idx, rule.as_str()))
    }

    #[must_use]
    pub fn rules_checked(&self) -> usize {
        self.rules_checked
    }

    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }
}

impl fmt::Display for FilterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "status: {}", self.status)?;
        match &self.decided_by {
            Some((idx, rule)) => write!(f, ", rule #{idx}: {rule}")?,
            None => write!(f, ", rule: none")?,
        }
        write!(f, ", checked: {}", self.rules_checked)?;
        write!(f, ", duration: {:?}", self.duration)?;
        Ok(())
    }
}

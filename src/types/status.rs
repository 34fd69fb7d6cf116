use std::fmt;

/// Outcome of checking a single decode position against a filter.
///
/// `Undecided` means "no opinion": a rule that returns it hands the decision
/// to the next rule in the chain. A whole chain returning `Undecided` leaves
/// the final policy to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Status {
    Allow,
    Reject,
    Undecided,
}

impl Status {
    /// Whether this status ends evaluation of a chain.
    #[must_use]
    pub fn is_decided(self) -> bool {
        !matches!(self, Status::Undecided)
    }

    #[must_use]
    pub fn is_rejected(self) -> bool {
        matches!(self, Status::Reject)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Allow => write!(f, "ALLOW"),
            Status::Reject => write!(f, "REJECT"),
            Status::Undecided => write!(f, "UNDECIDED"),
        }
    }
}

use std::collections::HashSet;
use std::fmt;

use super::filter_info::{class_name_of, FilterInfo};
use super::status::Status;

/// Whether a class-match rule grants or forbids the classes it matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Polarity {
    Allow,
    Deny,
}

impl Polarity {
    /// Status returned when a rule of this polarity matches.
    pub fn on_match(self) -> Status {
        match self {
            Polarity::Allow => Status::Allow,
            Polarity::Deny => Status::Reject,
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Polarity::Allow => "",
            Polarity::Deny => "!",
        }
    }
}

/// Structural metric bounded by a limit rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Limit {
    MaxDepth,
    MaxArray,
    MaxRefs,
    MaxBytes,
}

impl Limit {
    pub const ALL: [Limit; 4] = [
        Limit::MaxDepth,
        Limit::MaxArray,
        Limit::MaxRefs,
        Limit::MaxBytes,
    ];

    /// Name used on the left of `=` in a specification.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Limit::MaxDepth => "maxdepth",
            Limit::MaxArray => "maxarray",
            Limit::MaxRefs => "maxrefs",
            Limit::MaxBytes => "maxbytes",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|limit| limit.name() == name)
    }

    /// Current value of this metric. `None` for array length outside arrays.
    pub fn measure<I: FilterInfo + ?Sized>(self, info: &I) -> Option<u64> {
        match self {
            Limit::MaxDepth => Some(info.depth()),
            Limit::MaxArray => info.array_length(),
            Limit::MaxRefs => Some(info.references()),
            Limit::MaxBytes => Some(info.stream_bytes()),
        }
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One link of a compiled filter chain.
///
/// Prefix-carrying variants store the text before the wildcard; for
/// `Package` and `Hierarchy` that text includes the trailing `.`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    /// Rejects once the metric strictly exceeds `max`.
    Limit { limit: Limit, max: u64 },
    /// Every exact class name of one polarity, wherever it appeared.
    Exact {
        polarity: Polarity,
        classes: HashSet<String>,
    },
    /// `pkg.*`: classes declared directly in `package`.
    Package { polarity: Polarity, package: String },
    /// `pkg.**`: classes in `prefix` or any package below it.
    Hierarchy { polarity: Polarity, prefix: String },
    /// `text*`: class names starting with `prefix`.
    Prefix { polarity: Polarity, prefix: String },
}

impl Rule {
    pub(crate) fn exact(polarity: Polarity, class: &str) -> Self {
        let mut classes = HashSet::new();
        classes.insert(class.to_owned());
        Rule::Exact { polarity, classes }
    }

    /// Add a class to an exact-match set. No effect on other variants.
    pub(crate) fn insert_exact(&mut self, class: &str) {
        if let Rule::Exact { classes, .. } = self {
            classes.insert(class.to_owned());
        }
    }

    /// Polarity of a class-match rule; `None` for limits.
    #[must_use]
    pub fn polarity(&self) -> Option<Polarity> {
        match self {
            Rule::Limit { .. } => None,
            Rule::Exact { polarity, .. }
            | Rule::Package { polarity, .. }
            | Rule::Hierarchy { polarity, .. }
            | Rule::Prefix { polarity, .. } => Some(*polarity),
        }
    }

    /// Apply this rule alone to a decode position.
    pub fn check<I: FilterInfo + ?Sized>(&self, info: &I) -> Status {
        match self {
            Rule::Limit { limit, max } => match limit.measure(info) {
                Some(value) if value > *max => Status::Reject,
                _ => Status::Undecided,
            },
            Rule::Exact { polarity, classes } => {
                decide(*polarity, classes.contains(class_name_of(info)))
            }
            Rule::Package { polarity, package } => {
                let name = class_name_of(info);
                let direct = name.starts_with(package.as_str())
                    && name.rfind('.').map(|dot| dot + 1) == Some(package.len());
                decide(*polarity, direct)
            }
            Rule::Hierarchy { polarity, prefix } | Rule::Prefix { polarity, prefix } => {
                decide(*polarity, class_name_of(info).starts_with(prefix.as_str()))
            }
        }
    }
}

fn decide(polarity: Polarity, matched: bool) -> Status {
    if matched {
        polarity.on_match()
    } else {
        Status::Undecided
    }
}

/// Renders the rule back as specification elements. Exact sets expand to one
/// element per class, sorted for stable output.
impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Limit { limit, max } => write!(f, "{limit}={max}"),
            Rule::Exact { polarity, classes } => {
                let mut sorted: Vec<&str> = classes.iter().map(String::as_str).collect();
                sorted.sort_unstable();
                for (i, class) in sorted.into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(";")?;
                    }
                    write!(f, "{}{class}", polarity.marker())?;
                }
                Ok(())
            }
            Rule::Package { polarity, package } => write!(f, "{}{package}*", polarity.marker()),
            Rule::Hierarchy { polarity, prefix } => write!(f, "{}{prefix}**", polarity.marker()),
            Rule::Prefix { polarity, prefix } => write!(f, "{}{prefix}*", polarity.marker()),
        }
    }
}

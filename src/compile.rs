use tracing::debug;

use crate::parse::{classify, parse_limit_value, parse_shape, Element, Shape};
use crate::{FilterChain, InvalidReason, InvalidSpecification, Limit, Polarity, Rule};

/// Split a specification on `;` and compile its elements.
///
/// Trailing empty elements are dropped. A leading or interior empty element
/// stays and is the exact class name `""`, which an absent class matches.
pub(crate) fn compile_spec(spec: &str) -> Result<FilterChain, InvalidSpecification> {
    let mut elements: Vec<&str> = spec.split(';').collect();
    while elements.last().is_some_and(|e| e.is_empty()) {
        elements.pop();
    }
    compile(elements, spec)
}

/// Compile elements in order. `source` names the whole input in errors that
/// are not tied to one element.
pub(crate) fn compile<'a>(
    elements: impl IntoIterator<Item = &'a str>,
    source: &str,
) -> Result<FilterChain, InvalidSpecification> {
    let mut rules: Vec<Rule> = Vec::new();
    // Chain positions of the exact-match sets, created on first use.
    let mut allow_set: Option<usize> = None;
    let mut deny_set: Option<usize> = None;

    for element in elements {
        let kind =
            classify(element).map_err(|reason| InvalidSpecification::new(element, reason))?;

        match kind {
            Element::Limit { name, value } => rules.push(compile_limit(element, name, value)?),
            Element::Class { deny, pattern } => {
                let polarity = if deny {
                    Polarity::Deny
                } else {
                    Polarity::Allow
                };
                let shape = parse_shape(pattern)
                    .map_err(|reason| InvalidSpecification::new(element, reason))?;

                match shape {
                    Shape::Exact(class) => {
                        let slot = match polarity {
                            Polarity::Allow => &mut allow_set,
                            Polarity::Deny => &mut deny_set,
                        };
                        match *slot {
                            Some(idx) => rules[idx].insert_exact(class),
                            None => {
                                *slot = Some(rules.len());
                                rules.push(Rule::exact(polarity, class));
                            }
                        }
                    }
                    Shape::Package(package) => rules.push(Rule::Package {
                        polarity,
                        package: package.to_owned(),
                    }),
                    Shape::Hierarchy(prefix) => rules.push(Rule::Hierarchy {
                        polarity,
                        prefix: prefix.to_owned(),
                    }),
                    Shape::Prefix(prefix) => rules.push(Rule::Prefix {
                        polarity,
                        prefix: prefix.to_owned(),
                    }),
                }
            }
        }
    }

    if rules.is_empty() {
        return Err(InvalidSpecification::new(source, InvalidReason::Empty));
    }

    debug!(
        rules = rules.len(),
        exact_allow = exact_len(&rules, allow_set),
        exact_deny = exact_len(&rules, deny_set),
        "compiled unmarshalling filter"
    );

    Ok(FilterChain { rules })
}

fn compile_limit(element: &str, name: &str, value: &str) -> Result<Rule, InvalidSpecification> {
    if value.is_empty() {
        return Err(InvalidSpecification::new(
            element,
            InvalidReason::MissingLimitValue,
        ));
    }

    let parsed = parse_limit_value(value).map_err(|e| {
        InvalidSpecification::with_source(element, InvalidReason::MalformedLimitValue, e)
    })?;
    let max = u64::try_from(parsed).map_err(|_| {
        InvalidSpecification::new(element, InvalidReason::NegativeLimit { value: parsed })
    })?;

    let limit = Limit::from_name(name).ok_or_else(|| {
        InvalidSpecification::new(
            element,
            InvalidReason::UnknownLimit {
                name: name.to_owned(),
            },
        )
    })?;

    Ok(Rule::Limit { limit, max })
}

fn exact_len(rules: &[Rule], slot: Option<usize>) -> usize {
    match slot.map(|idx| &rules[idx]) {
        Some(Rule::Exact { classes, .. }) => classes.len(),
        _ => 0,
    }
}

use winnow::ascii::dec_int;
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{take_till, take_while};

use crate::InvalidReason;

use super::ParseError;

/// One `;`-separated element, classified but not yet validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Element<'i> {
    Limit { name: &'i str, value: &'i str },
    Class { deny: bool, pattern: &'i str },
}

/// Wildcard shape of a class pattern whose `!` has been stripped.
///
/// Package and hierarchy prefixes keep their trailing `.`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Shape<'i> {
    Exact(&'i str),
    Package(&'i str),
    Hierarchy(&'i str),
    Prefix(&'i str),
}

// -- Element kinds ----------------------------------------------------------

pub(crate) fn classify(element: &str) -> Result<Element<'_>, InvalidReason> {
    if element.contains('/') {
        return Err(InvalidReason::ModulePattern);
    }
    if let Some((name, value)) = element.split_once('=') {
        return Ok(Element::Limit { name, value });
    }
    match element.strip_prefix('!') {
        Some("") => Err(InvalidReason::BareNegation),
        Some(pattern) => Ok(Element::Class {
            deny: true,
            pattern,
        }),
        None => Ok(Element::Class {
            deny: false,
            pattern: element,
        }),
    }
}

// -- Limit values -----------------------------------------------------------

fn limit_value(input: &mut &str) -> ModalResult<i64> {
    dec_int.parse_next(input)
}

/// Parse the text after `=` as a signed decimal. Sign checks happen later so
/// that `-1` reports as negative rather than malformed.
pub(crate) fn parse_limit_value(text: &str) -> Result<i64, ParseError> {
    limit_value
        .parse(text)
        .map_err(|e| ParseError::new(text, e.inner().to_string()))
}

// -- Class patterns ---------------------------------------------------------

fn wildcard_split<'i>(input: &mut &'i str) -> ModalResult<(&'i str, &'i str)> {
    (take_till(0.., '*'), take_while(0.., '*')).parse_next(input)
}

pub(crate) fn parse_shape(pattern: &str) -> Result<Shape<'_>, InvalidReason> {
    // Anything left after the star run means a '*' was not trailing.
    let (prefix, stars) = wildcard_split
        .parse(pattern)
        .map_err(|_| InvalidReason::MisplacedWildcard)?;

    match stars.len() {
        0 => Ok(Shape::Exact(prefix)),
        1 | 2 if prefix == "." => Err(InvalidReason::EmptyPackage),
        1 if prefix.ends_with('.') => Ok(Shape::Package(prefix)),
        1 => Ok(Shape::Prefix(prefix)),
        2 if prefix.ends_with('.') => Ok(Shape::Hierarchy(prefix)),
        _ => Err(InvalidReason::MisplacedWildcard),
    }
}

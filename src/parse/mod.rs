mod error;
mod grammar;

pub use error::ParseError;
pub(crate) use grammar::{classify, parse_limit_value, parse_shape, Element, Shape};

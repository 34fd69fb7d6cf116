//! Allow/deny-list and resource-limit filtering for untrusted object stream
//! decoding.
//!
//! A filter specification is a `;`-separated list of elements:
//!
//! - `maxdepth=N`, `maxarray=N`, `maxrefs=N`, `maxbytes=N` reject once the
//!   metric exceeds `N`
//! - `com.example.Foo` matches one class, `com.example.*` classes directly in
//!   a package, `com.example.**` a package hierarchy, `Foo*` a name prefix
//! - a leading `!` turns a class pattern into a rejection
//!
//! Elements are checked in order and the first decisive one wins.
//!
//! ```
//! use unmarshal_filter::{FilterChain, Query, Status};
//!
//! let filter = FilterChain::compile("maxdepth=10;!java.lang.Runtime;java.lang.*").unwrap();
//!
//! assert_eq!(filter.evaluate(&Query::new().class("java.lang.String")), Status::Allow);
//! assert_eq!(filter.evaluate(&Query::new().class("java.lang.Runtime")), Status::Reject);
//! assert_eq!(filter.evaluate(&Query::new().depth(11)), Status::Reject);
//! assert_eq!(filter.evaluate(&Query::new().class("java.io.File")), Status::Undecided);
//! ```

mod compile;
mod error;
mod evaluate;
mod parse;
#[cfg(feature = "binary-cache")]
mod serial;
mod types;

pub use error::FilterError;
pub use parse::ParseError;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    FilterBuilder, FilterChain, FilterInfo, FilterReport, InputFilter, InvalidReason,
    InvalidSpecification, Limit, Polarity, Query, Rule, Status,
};

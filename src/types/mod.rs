mod chain;
mod error;
mod filter_info;
mod report;
mod rule;
mod status;

pub use chain::{FilterBuilder, FilterChain, InputFilter};
pub use error::{InvalidReason, InvalidSpecification};
pub use filter_info::{FilterInfo, Query};
pub use report::FilterReport;
pub use rule::{Limit, Polarity, Rule};
pub use status::Status;

//! Snack Shell Navigation Policy
//!
//! Every navigation a session's rendering host is about to commit is checked
//! against a fixed allow-list of domains. Anything that does not parse, or
//! whose host is not an allow-listed domain or one of its sub-domains, is
//! refused at the interception point.

mod allowlist;

pub use allowlist::{AllowList, DEFAULT_PROVIDER};

//! Snack Shell Tab Management
//!
//! A tab is one browsing context hosting the editor surface. Tabs are kept in
//! creation order (which is also tab-strip order) and exactly one of them is
//! foregrounded at a time.

mod error;
mod manager;
mod state;
mod tab;

pub use error::TabError;
pub use manager::{CloseOutcome, TabManager};
pub use state::Connectivity;
pub use tab::Tab;

pub type Result<T> = std::result::Result<T, TabError>;

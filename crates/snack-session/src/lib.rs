//! Snack Shell Session Management
//!
//! - The session manager owns the tab collection and the active pointer
//! - The last visited location of the active tab survives restarts
//! - Persisting is fire-and-forget: a failed write never reaches the user
//! - Going to the background saves the active location once, on the
//!   foreground -> background edge

mod error;
mod lifecycle;
mod manager;
mod persistence;

pub use error::SessionError;
pub use lifecycle::{AppLifecycle, LifecycleEvents, LifecycleSubscription, LifecycleTracker};
pub use manager::{Phase, SessionManager};
pub use persistence::{LastLocation, LAST_LOCATION_KEY};

pub type Result<T> = std::result::Result<T, SessionError>;

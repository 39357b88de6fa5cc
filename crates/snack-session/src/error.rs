//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Tab error: {0}")]
    Tab(#[from] snack_tabs::TabError),

    #[error("Session manager is still loading")]
    NotReady,
}

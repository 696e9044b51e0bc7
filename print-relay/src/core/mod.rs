//! Relay configuration, state and error handling

mod config;
mod error;
mod state;

pub use config::Config;
pub use error::{Result, ServerError};
pub use state::ServerState;

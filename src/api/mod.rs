//! Client side of the bias analysis API.
//!
//! The backend is an external service; this module only knows its request
//! and response shapes.

mod client;
mod error;
mod types;

pub use self::client::*;
pub use self::error::ApiError;
pub use self::types::*;

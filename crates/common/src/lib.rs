//! Shared types for the distribution-order backend.
//!
//! Every other crate in the workspace speaks in terms of [`EntityId`],
//! [`Timestamps`] and the structured [`ErrorLog`] record defined here.

pub mod error;
pub mod types;

pub use error::{ErrorKind, ErrorLog};
pub use types::{EntityId, Timestamps};

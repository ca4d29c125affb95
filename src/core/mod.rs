//! Core types, constants, and error taxonomy.
//!
//! This module has no runtime dependencies and is always compiled.

mod constants;
mod error;
mod types;

pub use constants::*;
pub use error::*;
pub use types::*;

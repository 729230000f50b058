//! Shared utility helpers.

pub mod error;
pub(crate) mod stats;

pub use error::{CanopyDiffError, CanopyDiffResult};

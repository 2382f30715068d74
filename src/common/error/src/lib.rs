//! Error types and result aliases for Strata.
//!
//! Every crate in the workspace reports failures through [`StrataError`] and
//! the [`StrataResult`] alias.

mod error;

pub use error::{StrataError, StrataResult};

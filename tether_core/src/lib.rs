//! Core types and traits for `tether` library.
#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::must_use_candidate)]

pub mod context;
pub mod erased;
pub mod error;
pub mod key;

pub use context::Context;
pub use erased::Erased;
pub use error::{Error, Result};
pub use key::DependencyKey;

//! Core domain entities.
//!
//! - [`Link`] - A short code mapped to a target URL, with click accounting

pub mod link;

pub use link::Link;

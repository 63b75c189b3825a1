//! Domain layer: entities, storage contracts and policies.
//!
//! The domain layer has no dependencies on infrastructure or transport.
//!
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//! - [`code_reuse`] - Policy for codes of soft-deleted links

pub mod code_reuse;
pub mod entities;
pub mod repositories;

pub use code_reuse::CodeReusePolicy;

//! Pure helpers used by the link service.
//!
//! - [`code_generator`] - Random short code generation
//! - [`validators`] - Short code and target URL validation

pub mod code_generator;
pub mod validators;

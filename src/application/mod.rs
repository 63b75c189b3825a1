//! Application layer services implementing business logic.
//!
//! Services coordinate validation, code generation and repository calls, and
//! expose a storage-agnostic API to HTTP handlers and the admin CLI.
//!
//! # Available Services
//!
//! - [`services::link_service::LinkService`] - Link creation, redirects and management

pub mod services;

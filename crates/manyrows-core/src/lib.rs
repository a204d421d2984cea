//! # manyrows-core
//!
//! Core types and utilities for working with the ManyRows entity API.
//!
//! This crate provides the shared error type, client configuration,
//! strongly-typed identifiers and pagination helpers used by
//! `manyrows-client`.
//!
//! ## Modules
//!
//! - [`error`] - Error type, structured API error details and HTTP status mapping
//! - [`config`] - Configuration structure for ManyRows clients
//! - [`uuid`] - Strongly-typed UUID wrappers for ManyRows resources
//! - [`page`] - Page request/resource types and bounds clamping

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod page;
pub mod uuid;

// Re-export commonly used types
pub use config::ManyRowsConfig;
pub use error::{Error, ErrorInfo, Result};
pub use page::{PageRequest, PageResource};

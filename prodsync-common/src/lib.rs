//! # prodsync Common Library
//!
//! Shared code for the prodsync services:
//! - Error types
//! - Configuration loading

pub mod config;
pub mod error;

pub use config::ServiceConfig;
pub use error::{Error, Result};

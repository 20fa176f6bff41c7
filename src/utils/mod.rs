//! Utility functions for code generation and database error handling.
//!
//! - [`code_generator`] - Short code generation and validation
//! - [`db_error`] - Classification of database errors

pub mod code_generator;
pub mod db_error;

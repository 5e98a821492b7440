/// Core Module for myquery
///
/// This module contains the database access layer (credentials, connection
/// handling, query execution, buffered result sets) and the shared error type.

pub mod db;
pub mod error;

// Re-export commonly used types for convenience
pub use error::{MyqueryError, Result};

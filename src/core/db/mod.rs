/// Database Module
///
/// This module provides the MySQL access layer for myquery, organized into
/// focused submodules.
///
/// ## Architecture
///
/// - **Credentials** (`credentials.rs`): Immutable connection settings and their connection string
/// - **Connection Handling** (`connection.rs`): One lazily-opened connection that reopens after close
/// - **Query Execution** (`query.rs`): Parameterized reader/update entry points
/// - **Result Sets** (`result.rs`): Buffered, name-indexed rows with typed accessors
/// - **Shared Database** (`database.rs`): Process-wide handler behind free functions
///
/// ## Error Handling
///
/// All database operations use the standardized `MyqueryError` type for consistent error propagation.
pub mod connection;
pub mod credentials;
pub mod database;
pub mod query;
pub mod result;

pub use connection::*;
pub use credentials::*;
pub use query::*;
pub use result::*;

/// Driver value type used for parameters and result cells.
pub use mysql::Value;

/// # Test Utilities Module
///
/// Shared fixtures for unit tests: sample result sets and credentials for
/// tests that talk to a live server.

use crate::core::db::{DatabaseCredentials, SqlResult};
use mysql::Value;
use std::env;

/// Text cell as the driver returns it
pub fn text(s: &str) -> Value {
    Value::Bytes(s.as_bytes().to_vec())
}

/// Three users; the last one has `NULL` name and score
pub fn sample_result() -> SqlResult {
    SqlResult::new(
        vec!["idMcUser".to_string(), "username".to_string(), "score".to_string()],
        vec![
            vec![Value::Int(1), text("Zarkrey"), Value::Double(12.0)],
            vec![Value::Int(2), text("Zazouh"), Value::Double(7.5)],
            vec![Value::Int(3), Value::NULL, Value::NULL],
        ],
    )
}

/// Credentials of a live test server, read from `MYQUERY_TEST_*` variables.
///
/// Returns `None` when `MYQUERY_TEST_HOST` is unset so server tests can skip.
pub fn live_credentials() -> Option<DatabaseCredentials> {
    let host = env::var("MYQUERY_TEST_HOST").ok()?;
    let user = env::var("MYQUERY_TEST_USER").unwrap_or_else(|_| "root".to_string());
    let password = env::var("MYQUERY_TEST_PASSWORD").unwrap_or_default();
    let database = env::var("MYQUERY_TEST_DATABASE").unwrap_or_else(|_| "test".to_string());
    let port = env::var("MYQUERY_TEST_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3306);
    Some(DatabaseCredentials::new(host, user, password, database, port))
}

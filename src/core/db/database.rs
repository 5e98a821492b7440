/// Shared Database Module
///
/// Process-wide access to one `ConnectionHandler`, for callers that want
/// to run queries without threading a handler through their code.

use crate::core::db::connection::ConnectionHandler;
use crate::core::db::credentials::DatabaseCredentials;
use crate::core::db::result::SqlResult;
use crate::core::{MyqueryError, Result};
use mysql::Value;
use once_cell::sync::OnceCell;
use std::sync::{Mutex, MutexGuard};
use tracing::warn;

/// Global handler slot, empty until `init` succeeds
static DATABASE: OnceCell<Mutex<Option<ConnectionHandler>>> = OnceCell::new();

fn lock() -> Result<MutexGuard<'static, Option<ConnectionHandler>>> {
    DATABASE
        .get_or_init(|| Mutex::new(None))
        .lock()
        .map_err(|_| MyqueryError::Connection("Failed to acquire database lock".to_string()))
}

fn with_handler<T>(f: impl FnOnce(&mut ConnectionHandler) -> Result<T>) -> Result<T> {
    let mut guard = lock()?;
    match guard.as_mut() {
        Some(handler) => f(handler),
        None => Err(MyqueryError::Connection(
            "Database not initialized; call database::init first".to_string(),
        )),
    }
}

/// Opens the shared connection with the given credentials
///
/// Calling it again replaces the shared handler; the previous connection is
/// closed. On failure the previous handler is left in place.
///
/// # Examples
///
/// ```no_run
/// use myquery::core::db::{database, DatabaseCredentials, Value};
///
/// database::init(DatabaseCredentials::new("localhost", "root", "", "gos", 3306))?;
/// let users = database::execute_reader(
///     "SELECT * FROM gos_mc_users WHERE idMcUser = ? AND username = ?",
///     &[Value::from(1), Value::from("Zarkrey")],
/// )?;
/// users.broadcast();
/// database::close();
/// # Ok::<(), myquery::core::MyqueryError>(())
/// ```
///
/// # Errors
///
/// Returns `MyqueryError::Database` if the connection cannot be opened.
pub fn init(credentials: DatabaseCredentials) -> Result<()> {
    let handler = ConnectionHandler::connect(credentials)?;
    let mut guard = lock()?;
    if let Some(mut previous) = guard.replace(handler) {
        previous.close();
    }
    Ok(())
}

/// Whether `init` has succeeded in this process
pub fn is_initialized() -> bool {
    lock().map(|guard| guard.is_some()).unwrap_or(false)
}

/// Runs a row-returning statement on the shared connection, reopening it if it was closed
pub fn execute_reader(query: &str, params: &[Value]) -> Result<SqlResult> {
    with_handler(|handler| handler.execute_reader(query, params))
}

/// Runs a statement on the shared connection and returns the affected-row count
pub fn execute_update(query: &str, params: &[Value]) -> Result<u64> {
    with_handler(|handler| handler.execute_update(query, params))
}

/// Closes the shared connection. A later query opens it again.
pub fn close() {
    match lock() {
        Ok(mut guard) => {
            if let Some(handler) = guard.as_mut() {
                handler.close();
            }
        }
        Err(e) => warn!("close: {}", e),
    }
}

/// Query Execution Module
///
/// This module provides the two query entry points: a row-returning reader
/// that buffers the result into a `SqlResult`, and an update call that
/// returns the affected-row count. Both bind a positional list of values to
/// the `?` placeholders of the statement. With parameters the statement is
/// prepared (binary protocol, typed values); without, it is sent as text and
/// every non-NULL value comes back as `Value::Bytes`.

use crate::core::db::result::SqlResult;
use crate::core::Result;
use mysql::prelude::{Protocol, Queryable};
use mysql::{Params, QueryResult, Row, Value};
use tracing::debug;

/// Builds driver parameters from a positional list.
fn bind_params(params: &[Value]) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.to_vec())
    }
}

/// Executes a row-returning statement and buffers its result
///
/// # Arguments
///
/// * `conn` - Any driver connection (plain connection, pooled connection, transaction)
/// * `query` - SQL text with `?` placeholders
/// * `params` - Values bound to the placeholders, in order
///
/// # Returns
///
/// A `SqlResult` holding every row of the first result set. Column labels
/// come from the result metadata, so they are known even when no row matched.
///
/// # Errors
///
/// Returns `MyqueryError::Database` if the statement cannot be prepared or
/// executed, if the parameter count does not match, or if reading a row fails.
pub fn execute_reader<Q: Queryable>(conn: &mut Q, query: &str, params: &[Value]) -> Result<SqlResult> {
    debug!(params = params.len(), "execute_reader: {}", query);

    let result = if params.is_empty() {
        buffer_result(conn.query_iter(query)?)?
    } else {
        buffer_result(conn.exec_iter(query, bind_params(params))?)?
    };

    debug!(
        rows = result.row_count(),
        columns = result.column_count(),
        "execute_reader: buffered result"
    );
    Ok(result)
}

/// Copies the first result set of a cursor into a `SqlResult`.
fn buffer_result<P: Protocol>(result: QueryResult<'_, '_, '_, P>) -> Result<SqlResult> {
    let columns: Vec<String> = result
        .columns()
        .as_ref()
        .iter()
        .map(|column| column.name_str().into_owned())
        .collect();

    let rows = result
        .map(|row| row.map(Row::unwrap))
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(SqlResult::new(columns, rows))
}

/// Executes a statement that does not return rows (`INSERT`, `UPDATE`, `DELETE`, DDL)
///
/// # Arguments
///
/// * `conn` - Any driver connection
/// * `query` - SQL text with `?` placeholders
/// * `params` - Values bound to the placeholders, in order
///
/// # Returns
///
/// The number of rows affected, as reported by the server.
///
/// # Errors
///
/// Returns `MyqueryError::Database` if the statement fails.
pub fn execute_update<Q: Queryable>(conn: &mut Q, query: &str, params: &[Value]) -> Result<u64> {
    debug!(params = params.len(), "execute_update: {}", query);

    // Statements without placeholders go over the text protocol; some of
    // them (`START TRANSACTION`, `USE`, ...) cannot be prepared.
    let affected = if params.is_empty() {
        conn.query_iter(query)?.affected_rows()
    } else {
        conn.exec_iter(query, bind_params(params))?.affected_rows()
    };

    debug!(affected, "execute_update: done");
    Ok(affected)
}

/// Represents different SQL statement types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementType {
    /// SELECT statement, including `WITH ... SELECT`
    Select,
    /// SHOW, DESCRIBE and EXPLAIN
    Show,
    /// INSERT or REPLACE statement
    Insert,
    /// UPDATE statement
    Update,
    /// DELETE statement
    Delete,
    /// CREATE statement
    Create,
    /// DROP statement
    Drop,
    /// ALTER statement
    Alter,
    /// BEGIN/START TRANSACTION/COMMIT/ROLLBACK
    Transaction,
    /// Other statement types
    Other,
}

impl StatementType {
    /// Determines the statement type from its leading keyword
    ///
    /// # Arguments
    ///
    /// * `sql` - SQL statement to analyze
    ///
    /// # Returns
    ///
    /// The classified statement type
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .trim_start_matches('(')
            .split(|c: char| c.is_whitespace() || c == '(' || c == ';')
            .next()
            .unwrap_or("")
            .to_uppercase();

        match keyword.as_str() {
            "SELECT" | "WITH" => StatementType::Select,
            "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" => StatementType::Show,
            "INSERT" | "REPLACE" => StatementType::Insert,
            "UPDATE" => StatementType::Update,
            "DELETE" => StatementType::Delete,
            "CREATE" => StatementType::Create,
            "DROP" => StatementType::Drop,
            "ALTER" => StatementType::Alter,
            "BEGIN" | "START" | "COMMIT" | "ROLLBACK" => StatementType::Transaction,
            _ => StatementType::Other,
        }
    }

    /// Whether statements of this type produce a result set
    pub fn returns_rows(self) -> bool {
        matches!(self, StatementType::Select | StatementType::Show)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::db::connection::ConnectionHandler;
    use crate::test_utils::live_credentials;

    #[test]
    fn test_bind_params() {
        assert_eq!(bind_params(&[]), Params::Empty);
        assert_eq!(
            bind_params(&[Value::Int(1), Value::from("Zarkrey")]),
            Params::Positional(vec![Value::Int(1), Value::Bytes(b"Zarkrey".to_vec())])
        );
    }

    #[test]
    fn test_statement_type_classification() {
        assert_eq!(StatementType::from_sql("SELECT * FROM users"), StatementType::Select);
        assert_eq!(StatementType::from_sql("  select 1"), StatementType::Select);
        assert_eq!(StatementType::from_sql("(SELECT 1) UNION (SELECT 2)"), StatementType::Select);
        assert_eq!(StatementType::from_sql("WITH t AS (SELECT 1) SELECT * FROM t"), StatementType::Select);
        assert_eq!(StatementType::from_sql("SHOW TABLES"), StatementType::Show);
        assert_eq!(StatementType::from_sql("DESC users"), StatementType::Show);
        assert_eq!(StatementType::from_sql("EXPLAIN SELECT 1"), StatementType::Show);
        assert_eq!(StatementType::from_sql("INSERT INTO users VALUES (1, 'test')"), StatementType::Insert);
        assert_eq!(StatementType::from_sql("REPLACE INTO users VALUES (1, 'test')"), StatementType::Insert);
        assert_eq!(StatementType::from_sql("UPDATE users SET name = 'new'"), StatementType::Update);
        assert_eq!(StatementType::from_sql("DELETE FROM users WHERE id = 1"), StatementType::Delete);
        assert_eq!(StatementType::from_sql("CREATE TABLE test (id INTEGER)"), StatementType::Create);
        assert_eq!(StatementType::from_sql("DROP TABLE test"), StatementType::Drop);
        assert_eq!(StatementType::from_sql("ALTER TABLE test ADD c INT"), StatementType::Alter);
        assert_eq!(StatementType::from_sql("START TRANSACTION"), StatementType::Transaction);
        assert_eq!(StatementType::from_sql("COMMIT;"), StatementType::Transaction);
        assert_eq!(StatementType::from_sql("SELECTED"), StatementType::Other);
        assert_eq!(StatementType::from_sql(""), StatementType::Other);
    }

    #[test]
    fn test_returns_rows() {
        assert!(StatementType::Select.returns_rows());
        assert!(StatementType::Show.returns_rows());
        assert!(!StatementType::Delete.returns_rows());
        assert!(!StatementType::Other.returns_rows());
    }

    #[test]
    fn test_live_reader_and_update() {
        let creds = match live_credentials() {
            Some(creds) => creds,
            None => return, // no server configured
        };
        let mut handler = ConnectionHandler::connect(creds).unwrap();

        handler.execute_update("DROP TABLE IF EXISTS myquery_users", &[]).unwrap();
        handler
            .execute_update(
                "CREATE TABLE myquery_users (idMcUser INT PRIMARY KEY, username VARCHAR(32), joined DATETIME NULL)",
                &[],
            )
            .unwrap();

        let inserted = handler
            .execute_update(
                "INSERT INTO myquery_users VALUES (?, ?, NULL), (?, ?, '2023-03-30 12:00:00')",
                &[Value::from(1), Value::from("Zarkrey"), Value::from(2), Value::from("Zazouh")],
            )
            .unwrap();
        assert_eq!(inserted, 2);

        let result = handler
            .execute_reader(
                "SELECT * FROM myquery_users WHERE idMcUser = ? AND username = ?",
                &[Value::from(1), Value::from("Zarkrey")],
            )
            .unwrap();
        assert_eq!(result.row_count(), 1);
        assert_eq!(result.columns(), &["idMcUser", "username", "joined"]);
        assert_eq!(result.first::<i64, _>("idMcUser").unwrap(), 1);
        assert_eq!(result.first::<String, _>("username").unwrap(), "Zarkrey");
        assert_eq!(result.get_opt::<String, _>(0, "joined").unwrap(), None);

        let nothing = handler
            .execute_reader("SELECT * FROM myquery_users WHERE idMcUser = ?", &[Value::from(99)])
            .unwrap();
        assert!(nothing.is_empty());
        assert_eq!(nothing.column_count(), 3);

        // Closing and querying again reopens the connection
        handler.close();
        assert!(!handler.is_open());
        let deleted = handler
            .execute_update(
                "DELETE FROM myquery_users WHERE idMcUser = ? AND username = ?",
                &[Value::from(2), Value::from("Zazouh")],
            )
            .unwrap();
        assert_eq!(deleted, 1);
        assert!(handler.is_open());

        handler.execute_update("DROP TABLE myquery_users", &[]).unwrap();
    }

    #[test]
    fn test_live_unpreparable_statements() {
        let creds = match live_credentials() {
            Some(creds) => creds,
            None => return, // no server configured
        };
        let mut handler = ConnectionHandler::connect(creds).unwrap();

        handler.execute_update("START TRANSACTION", &[]).unwrap();
        handler.execute_update("ROLLBACK", &[]).unwrap();

        let tables = handler.execute_reader("SHOW TABLES", &[]).unwrap();
        assert_eq!(tables.column_count(), 1);

        // Text protocol values still convert through the typed getters
        let one = handler.execute_reader("SELECT 1 AS one, NULL AS nothing", &[]).unwrap();
        assert_eq!(one.first::<i64, _>("one").unwrap(), 1);
        assert_eq!(one.get_opt::<i64, _>(0, "nothing").unwrap(), None);
    }
}

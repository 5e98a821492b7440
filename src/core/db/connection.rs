/// Connection Management Module
///
/// This module provides `ConnectionHandler`, the owner of a single MySQL
/// connection. The connection is opened on first use and opened again on
/// the next use after `close()` or after the link to the server was lost.

use crate::core::db::credentials::DatabaseCredentials;
use crate::core::db::query;
use crate::core::db::result::SqlResult;
use crate::core::{MyqueryError, Result};
use mysql::{Conn, Value};
use std::fmt;
use tracing::{debug, info, warn};

/// Represents the state of the handled connection
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionState {
    /// Never opened, or closed
    Closed,
    /// Connected to the server
    Open,
}

impl Default for ConnectionState {
    fn default() -> Self {
        ConnectionState::Closed
    }
}

/// Owner of one lazily-opened MySQL connection
pub struct ConnectionHandler {
    credentials: DatabaseCredentials,
    connection: Option<Conn>,
}

impl ConnectionHandler {
    /// Creates a handler without contacting the server
    pub fn new(credentials: DatabaseCredentials) -> Self {
        ConnectionHandler {
            credentials,
            connection: None,
        }
    }

    /// Creates a handler and opens its connection immediately
    ///
    /// # Errors
    ///
    /// Returns `MyqueryError::Database` if the server cannot be reached or
    /// rejects the credentials.
    pub fn connect(credentials: DatabaseCredentials) -> Result<Self> {
        let mut handler = ConnectionHandler::new(credentials);
        handler.connection()?;
        Ok(handler)
    }

    pub fn credentials(&self) -> &DatabaseCredentials {
        &self.credentials
    }

    pub fn state(&self) -> ConnectionState {
        if self.connection.is_some() {
            ConnectionState::Open
        } else {
            ConnectionState::Closed
        }
    }

    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Returns the connection, opening it first if needed
    ///
    /// # Errors
    ///
    /// Returns `MyqueryError::Database` if opening the connection fails. The
    /// handler stays closed in that case and the next call tries again.
    pub fn connection(&mut self) -> Result<&mut Conn> {
        let conn = match self.connection.take() {
            Some(conn) => conn,
            None => self.open()?,
        };
        Ok(self.connection.insert(conn))
    }

    /// Closes the connection if it is open. Safe to call repeatedly.
    pub fn close(&mut self) {
        if let Some(conn) = self.connection.take() {
            drop(conn);
            info!("Closed MySQL connection : {}", self.credentials.address());
        }
    }

    /// Runs a row-returning statement on the handled connection
    pub fn execute_reader(&mut self, sql: &str, params: &[Value]) -> Result<SqlResult> {
        let outcome = query::execute_reader(self.connection()?, sql, params);
        self.discard_if_lost(outcome)
    }

    /// Runs a statement on the handled connection and returns the affected-row count
    pub fn execute_update(&mut self, sql: &str, params: &[Value]) -> Result<u64> {
        let outcome = query::execute_update(self.connection()?, sql, params);
        self.discard_if_lost(outcome)
    }

    /// Drops the connection when `outcome` shows the server link is gone, so
    /// the next call opens a fresh one.
    fn discard_if_lost<T>(&mut self, outcome: Result<T>) -> Result<T> {
        if let Err(e) = &outcome {
            if is_connection_lost(e) && self.connection.take().is_some() {
                warn!("Lost MySQL connection : {} ({})", self.credentials.address(), e);
            }
        }
        outcome
    }

    fn open(&self) -> Result<Conn> {
        debug!("Opening MySQL connection : {:?}", self.credentials);
        let conn = Conn::new(self.credentials.opts())?;
        info!("Connected to MySQL : {}", self.credentials.address());
        Ok(conn)
    }
}

/// Whether an error means the connection itself is unusable.
///
/// I/O failures and driver-level protocol errors qualify; server errors
/// (syntax, constraint violations, ...) leave the session intact.
pub fn is_connection_lost(error: &MyqueryError) -> bool {
    matches!(
        error,
        MyqueryError::Database(mysql::Error::IoError(_)) | MyqueryError::Database(mysql::Error::DriverError(_))
    )
}

impl fmt::Debug for ConnectionHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionHandler")
            .field("credentials", &self.credentials)
            .field("state", &self.state())
            .finish()
    }
}

impl Drop for ConnectionHandler {
    fn drop(&mut self) {
        self.close();
    }
}

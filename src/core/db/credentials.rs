/// Credentials Module
///
/// Immutable connection settings for a MySQL server and their rendering as a
/// connection string or driver options.

use mysql::{Opts, OptsBuilder};
use serde::Deserialize;
use std::fmt;

/// Default MySQL TCP port
pub const DEFAULT_PORT: u16 = 3306;

/// Connection settings for a MySQL-compatible server.
///
/// Fields are private; the record never changes after construction.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DatabaseCredentials {
    host: String,
    user: String,
    password: String,
    database: String,
    port: u16,
}

/// A local root account on the standard port, with no default schema.
///
/// Schema names belong to the deployment, so none is assumed here; set
/// `database` in the `[database]` config section to issue queries without
/// schema-qualified table names.
impl Default for DatabaseCredentials {
    fn default() -> Self {
        DatabaseCredentials {
            host: "localhost".to_string(),
            user: "root".to_string(),
            password: String::new(),
            database: String::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl DatabaseCredentials {
    /// Creates a new set of credentials
    ///
    /// # Arguments
    ///
    /// * `host` - Server host name or IP address
    /// * `user` - Account name
    /// * `password` - Account password (may be empty)
    /// * `database` - Default schema, or an empty string for none
    /// * `port` - Server TCP port
    pub fn new(
        host: impl Into<String>,
        user: impl Into<String>,
        password: impl Into<String>,
        database: impl Into<String>,
        port: u16,
    ) -> Self {
        DatabaseCredentials {
            host: host.into(),
            user: user.into(),
            password: password.into(),
            database: database.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// `host:port`, as used in log lines
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Builds the driver options for these credentials.
    ///
    /// An empty database name leaves the session without a default schema.
    pub fn opts(&self) -> Opts {
        let database = if self.database.is_empty() {
            None
        } else {
            Some(self.database.clone())
        };

        OptsBuilder::new()
            .ip_or_hostname(Some(self.host.clone()))
            .tcp_port(self.port)
            .user(Some(self.user.clone()))
            .pass(Some(self.password.clone()))
            .db_name(database)
            .into()
    }
}

/// Renders the ADO-style connection string, password included.
impl fmt::Display for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Server={};Port={};Database={};User ID={};Password={};Allow Zero Datetime=True",
            self.host, self.port, self.database, self.user, self.password
        )
    }
}

impl fmt::Debug for DatabaseCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseCredentials")
            .field("host", &self.host)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("port", &self.port)
            .finish()
    }
}

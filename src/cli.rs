/// Command-line front end
///
/// Parses `myquery [--config <path>] [--json] <query> [param ...]` and runs
/// the statement on the shared database connection.

use crate::config::{self, Config};
use crate::core::db::{database, StatementType};
use crate::core::{MyqueryError, Result};
use mysql::Value;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

pub const USAGE: &str = "Usage: myquery [--config <path>] [--json] <query> [param ...]";

/// A parsed command line
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub config_path: Option<PathBuf>,
    pub json: bool,
    pub query: String,
    pub params: Vec<Value>,
}

/// Parses the arguments that follow the program name.
///
/// # Errors
///
/// Returns `MyqueryError::Usage` for unknown flags, a `--config` without a
/// path, or a missing query.
pub fn parse_args<S: AsRef<str>>(args: &[S]) -> Result<Invocation> {
    let mut config_path = None;
    let mut json = false;
    let mut positional = Vec::new();

    let mut iter = args.iter().map(AsRef::as_ref);
    while let Some(arg) = iter.next() {
        match arg {
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| MyqueryError::Usage("--config requires a path".to_string()))?;
                config_path = Some(PathBuf::from(path));
            }
            "--json" => json = true,
            // Everything after `--` is positional, even if it starts with a dash
            "--" => positional.extend(iter.by_ref().map(str::to_string)),
            flag if flag.starts_with("--") => {
                return Err(MyqueryError::Usage(format!("unknown option {}", flag)));
            }
            other => positional.push(other.to_string()),
        }
    }

    let mut positional = positional.into_iter();
    let query = positional
        .next()
        .ok_or_else(|| MyqueryError::Usage("missing query".to_string()))?;
    let params = positional.map(|p| parse_param(&p)).collect();

    Ok(Invocation {
        config_path,
        json,
        query,
        params,
    })
}

/// Converts a command-line parameter to a driver value.
///
/// Integers bind as integers, the literal `NULL` binds as `NULL`, anything
/// else binds as text.
pub fn parse_param(raw: &str) -> Value {
    if raw == "NULL" {
        Value::NULL
    } else if let Ok(i) = raw.parse::<i64>() {
        Value::Int(i)
    } else {
        Value::from(raw)
    }
}

/// Loads the configuration for an invocation.
///
/// An explicit `--config` file must exist; otherwise the default config file
/// is used when present, and built-in defaults when it is not.
pub fn load_config(invocation: &Invocation) -> Result<Config> {
    if let Some(path) = &invocation.config_path {
        return config::load_config(path);
    }
    match config::default_config_path() {
        Some(path) if path.exists() => config::load_config(path),
        _ => Ok(Config::default()),
    }
}

/// Runs the statement and writes its outcome to `out`.
///
/// Row-returning statements print the table (or JSON with `--json`); other
/// statements print the affected-row count.
pub fn run<W: Write>(invocation: &Invocation, config: &Config, out: &mut W) -> Result<()> {
    database::init(config.credentials())?;

    let statement = StatementType::from_sql(&invocation.query);
    info!(?statement, "running query");

    if statement.returns_rows() {
        let result = database::execute_reader(&invocation.query, &invocation.params)?;
        if invocation.json {
            writeln!(out, "{}", serde_json::to_string_pretty(&result.to_json())?)?;
        } else {
            result.write_to(out)?;
            writeln!(out, "({} rows)", result.row_count())?;
        }
    } else {
        let affected = database::execute_update(&invocation.query, &invocation.params)?;
        writeln!(out, "{} rows affected", affected)?;
    }

    Ok(())
}

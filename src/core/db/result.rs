/// Result Set Module
///
/// This module provides `SqlResult`, an in-memory copy of a query's result
/// set. Rows are buffered from the driver cursor once; afterwards cells can
/// be read in any order by row index and column label or position, either
/// raw or through a checked conversion to a Rust type.

use crate::core::{MyqueryError, Result};
use chrono::NaiveDate;
use mysql::prelude::FromValue;
use mysql::Value;
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::HashMap;
use std::fmt;
use std::io::{self, Write};

/// Identifies a column of a `SqlResult`, by position or by label.
pub trait ColumnIndex {
    /// Resolves to a column position, or `None` if no such column exists.
    fn position(&self, result: &SqlResult) -> Option<usize>;

    /// Human-readable form used in error messages.
    fn describe(&self) -> String;
}

impl ColumnIndex for usize {
    fn position(&self, result: &SqlResult) -> Option<usize> {
        if *self < result.column_count() {
            Some(*self)
        } else {
            None
        }
    }

    fn describe(&self) -> String {
        format!("#{}", self)
    }
}

impl ColumnIndex for &str {
    fn position(&self, result: &SqlResult) -> Option<usize> {
        result.column_index(self)
    }

    fn describe(&self) -> String {
        (*self).to_string()
    }
}

impl ColumnIndex for String {
    fn position(&self, result: &SqlResult) -> Option<usize> {
        result.column_index(self)
    }

    fn describe(&self) -> String {
        self.clone()
    }
}

/// Buffered result of a row-returning query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SqlResult {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
    // First position of every label
    positions: HashMap<String, usize>,
}

impl SqlResult {
    /// Creates a result from column labels and row values.
    ///
    /// Every row is normalized to the column count: short rows are padded
    /// with `NULL`, extra values are dropped.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, Value::NULL);
                row
            })
            .collect();

        let mut positions = HashMap::with_capacity(width);
        for (i, label) in columns.iter().enumerate() {
            positions.entry(label.clone()).or_insert(i);
        }

        SqlResult {
            columns,
            rows,
            positions,
        }
    }

    /// A result with no columns and no rows
    pub fn empty() -> Self {
        SqlResult::default()
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Number of columns reported by the result metadata, even when no row was returned.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `true` when the query returned no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn column_label(&self, index: usize) -> Option<&str> {
        self.columns.get(index).map(String::as_str)
    }

    /// Position of a column label; the first one wins when labels repeat.
    pub fn column_index(&self, label: &str) -> Option<usize> {
        self.positions.get(label).copied()
    }

    /// Raw cell value.
    ///
    /// Returns `None` when the row or the column does not exist. A database
    /// `NULL` is `Some(&Value::NULL)`.
    pub fn get_object<I: ColumnIndex>(&self, row: usize, column: I) -> Option<&Value> {
        let position = column.position(self)?;
        self.rows.get(row)?.get(position)
    }

    /// Raw cell value of the first row
    pub fn first_object<I: ColumnIndex>(&self, column: I) -> Option<&Value> {
        self.get_object(0, column)
    }

    /// Reads a cell converted to `T`.
    ///
    /// # Errors
    ///
    /// - `MyqueryError::RowOutOfRange` if `row` is past the last row
    /// - `MyqueryError::ColumnNotFound` if `column` names no column
    /// - `MyqueryError::Conversion` if the value cannot be represented as `T`
    ///   (including `NULL` for non-`Option` targets)
    pub fn get<T: FromValue, I: ColumnIndex>(&self, row: usize, column: I) -> Result<T> {
        let (position, value) = self.locate(row, &column)?;
        mysql::from_value_opt::<T>(value.clone()).map_err(|_| MyqueryError::Conversion {
            row,
            column: self.columns[position].clone(),
            target: std::any::type_name::<T>(),
            value: format_value(value),
        })
    }

    /// Like [`SqlResult::get`], but a `NULL` cell reads as `None`.
    pub fn get_opt<T: FromValue, I: ColumnIndex>(&self, row: usize, column: I) -> Result<Option<T>> {
        let (position, value) = self.locate(row, &column)?;
        if *value == Value::NULL {
            return Ok(None);
        }
        self.get::<T, usize>(row, position).map(Some)
    }

    /// Reads a cell of the first row converted to `T`
    pub fn first<T: FromValue, I: ColumnIndex>(&self, column: I) -> Result<T> {
        self.get(0, column)
    }

    /// Returns a view over one row
    pub fn row(&self, index: usize) -> Option<SqlRow<'_>> {
        if index < self.rows.len() {
            Some(SqlRow { result: self, index })
        } else {
            None
        }
    }

    /// Iterates over all rows in order
    pub fn rows(&self) -> impl Iterator<Item = SqlRow<'_>> + '_ {
        (0..self.rows.len()).map(move |index| SqlRow { result: self, index })
    }

    /// Writes the table rendering (see the `Display` impl) to `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        write!(writer, "{}", self)
    }

    /// Prints the table to stdout.
    pub fn broadcast(&self) {
        print!("{}", self);
    }

    /// Exports the rows as a JSON array of objects keyed by column label.
    ///
    /// With duplicate labels the first column keeps the key.
    pub fn to_json(&self) -> JsonValue {
        let rows = self
            .rows
            .iter()
            .map(|row| {
                let mut object = Map::with_capacity(self.columns.len());
                for (label, value) in self.columns.iter().zip(row) {
                    if !object.contains_key(label) {
                        object.insert(label.clone(), value_to_json(value));
                    }
                }
                JsonValue::Object(object)
            })
            .collect();
        JsonValue::Array(rows)
    }

    fn locate<I: ColumnIndex>(&self, row: usize, column: &I) -> Result<(usize, &Value)> {
        let cells = self.rows.get(row).ok_or(MyqueryError::RowOutOfRange {
            index: row,
            row_count: self.rows.len(),
        })?;
        let position = column
            .position(self)
            .ok_or_else(|| MyqueryError::ColumnNotFound(column.describe()))?;
        Ok((position, &cells[position]))
    }
}

/// Renders a header line with the labels, then one line per row:
///
/// ```text
/// [idMcUser, username]
/// [1, Zarkrey]
/// ```
///
/// An empty result renders nothing.
impl fmt::Display for SqlResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.rows.is_empty() {
            return Ok(());
        }

        writeln!(f, "[{}]", self.columns.join(", "))?;
        for row in &self.rows {
            let cells: Vec<String> = row.iter().map(format_value).collect();
            writeln!(f, "[{}]", cells.join(", "))?;
        }
        Ok(())
    }
}

/// Borrowed view over a single row of a `SqlResult`.
#[derive(Debug, Clone, Copy)]
pub struct SqlRow<'a> {
    result: &'a SqlResult,
    index: usize,
}

impl<'a> SqlRow<'a> {
    /// Position of this row in the result
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn len(&self) -> usize {
        self.result.column_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn value<I: ColumnIndex>(&self, column: I) -> Option<&'a Value> {
        self.result.get_object(self.index, column)
    }

    pub fn get<T: FromValue, I: ColumnIndex>(&self, column: I) -> Result<T> {
        self.result.get(self.index, column)
    }

    pub fn get_opt<T: FromValue, I: ColumnIndex>(&self, column: I) -> Result<Option<T>> {
        self.result.get_opt(self.index, column)
    }
}

/// Formats a MySQL value for display
///
/// # Arguments
///
/// * `value` - Driver value to format
///
/// # Returns
///
/// A string representation of the value suitable for display.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::NULL => "NULL".to_string(),
        Value::Int(i) => i.to_string(),
        Value::UInt(u) => u.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Double(d) => d.to_string(),
        Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => text.to_string(),
            Err(_) => format!("<BLOB: {} bytes>", bytes.len()),
        },
        Value::Date(year, month, day, hour, minute, second, micros) => {
            format_datetime(*year, *month, *day, *hour, *minute, *second, *micros)
        }
        Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let sign = if *negative { "-" } else { "" };
            let total_hours = u64::from(*days) * 24 + u64::from(*hours);
            let mut out = format!("{}{:02}:{:02}:{:02}", sign, total_hours, minutes, seconds);
            if *micros > 0 {
                out.push_str(&format!(".{:06}", micros));
            }
            out
        }
    }
}

fn format_datetime(year: u16, month: u8, day: u8, hour: u8, minute: u8, second: u8, micros: u32) -> String {
    let parsed = NaiveDate::from_ymd_opt(year.into(), month.into(), day.into())
        .and_then(|date| date.and_hms_micro_opt(hour.into(), minute.into(), second.into(), micros));

    match parsed {
        Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S%.f").to_string(),
        // Zero dates and other values chrono rejects
        None => format!(
            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
            year, month, day, hour, minute, second
        ),
    }
}

fn value_to_json(value: &Value) -> JsonValue {
    match value {
        Value::NULL => JsonValue::Null,
        Value::Int(i) => JsonValue::from(*i),
        Value::UInt(u) => JsonValue::from(*u),
        Value::Float(f) => Number::from_f64(f64::from(*f))
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Double(d) => Number::from_f64(*d)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null),
        Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) => JsonValue::String(text.to_string()),
            Err(_) => JsonValue::Array(bytes.iter().map(|b| JsonValue::from(*b)).collect()),
        },
        Value::Date(..) | Value::Time(..) => JsonValue::String(format_value(value)),
    }
}

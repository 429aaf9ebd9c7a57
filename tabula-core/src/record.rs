use crate::{AsValue, Error, Result, Value};
use std::sync::Arc;

/// Positional access to a row as returned by the connection, before decoding.
pub trait RawRow {
    fn column_count(&self) -> usize;
    fn label(&self, index: usize) -> Option<&str>;
    fn value(&self, index: usize) -> Result<Value>;
    /// The explicit null flag.
    fn is_null(&self, index: usize) -> Result<bool> {
        Ok(self.value(index)?.is_null())
    }
    /// Primitive accessor, yields 0 for NULL: check [`RawRow::is_null`] first.
    fn get_i64(&self, index: usize) -> Result<i64> {
        let value = self.value(index)?;
        if value.is_null() {
            return Ok(0);
        }
        i64::try_from_value(value)
    }
}

/// Row of driver values together with the column labels.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct RowLabeled {
    pub labels: Arc<[String]>,
    pub values: Box<[Value]>,
}

impl RowLabeled {
    pub fn new(labels: Arc<[String]>, values: Box<[Value]>) -> Self {
        Self { labels, values }
    }

    pub fn get_column(&self, name: &str) -> Option<&Value> {
        self.labels
            .iter()
            .position(|v| v == name)
            .map(|i| &self.values[i])
    }
}

impl RawRow for RowLabeled {
    fn column_count(&self) -> usize {
        self.values.len()
    }

    fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    fn value(&self, index: usize) -> Result<Value> {
        self.values.get(index).cloned().ok_or_else(|| {
            Error::msg(format!(
                "Column index {} is out of range, the row has {} columns",
                index,
                self.values.len()
            ))
        })
    }
}

/// Outcome of a statement that changes data.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowsAffected {
    pub rows_affected: u64,
    /// Key generated by the last insert, for connections that report it.
    pub last_affected_id: Option<i64>,
}

impl RowsAffected {
    pub fn new(rows_affected: u64) -> Self {
        Self {
            rows_affected,
            last_affected_id: None,
        }
    }
}

impl Extend<RowsAffected> for RowsAffected {
    fn extend<T: IntoIterator<Item = RowsAffected>>(&mut self, iter: T) {
        for elem in iter {
            self.rows_affected += elem.rows_affected;
            if elem.last_affected_id.is_some() {
                self.last_affected_id = elem.last_affected_id;
            }
        }
    }
}

/// Item of the stream produced by executing a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Row(RowLabeled),
    Affected(RowsAffected),
}

use crate::{Result, Value};
use std::fmt::Display;

/// A statement parsed by the connection, waiting for its parameters.
///
/// Values reach `bind_index` already converted by the column codec, see
/// [`ColumnType::bind`](crate::ColumnType::bind).
pub trait Prepared: Send + Sync + Display {
    /// Bind the value at the 1-based `index`.
    fn bind_index(&mut self, value: Value, index: u64) -> Result<()>;
    /// Remove all the previously bound values.
    fn clear_bindings(&mut self) -> Result<()>;
    /// Number of placeholders the statement expects.
    fn parameter_count(&self) -> usize;
}

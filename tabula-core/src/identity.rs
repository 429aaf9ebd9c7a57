use crate::{
    AsValue, BinaryOpType, CodecContext, Column, ColumnDef, ColumnType, Condition, Dialect, Error,
    Expr, Result, SqlError, TableRef, Value,
};
use std::{
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Typed values decode the same way on every dialect.
const CANONICAL: CodecContext = CodecContext::new(Dialect::Postgres);

/// The ordered columns identifying a row of one table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity {
    table: TableRef,
    columns: Arc<[Arc<ColumnDef>]>,
}

impl Identity {
    pub fn new(table: TableRef, columns: Vec<Arc<ColumnDef>>) -> Self {
        Self {
            table,
            columns: columns.into(),
        }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn columns(&self) -> &[Arc<ColumnDef>] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn is_composite(&self) -> bool {
        self.columns.len() > 1
    }

    pub fn position(&self, column: &ColumnDef) -> Option<usize> {
        self.columns.iter().position(|c| **c == *column)
    }

    fn unknown(&self, column: &ColumnDef) -> Error {
        Error::new(SqlError::UnknownComponent {
            table: self.table.name.clone(),
            column: column.name().to_string(),
        })
    }
}

/// Identity value of a row, one canonical value per identity column.
///
/// Equality and hashing compare the values after their codec normalized them, so keys built in
/// any order from equal values are equal.
#[derive(Debug, Clone)]
pub struct CompositeKey {
    identity: Identity,
    values: Arc<[Value]>,
}

impl CompositeKey {
    pub fn builder(identity: &Identity) -> KeyBuilder {
        KeyBuilder {
            identity: identity.clone(),
            values: vec![None; identity.len()],
            unknown: None,
        }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Values in identity column order.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn value(&self, column: &ColumnDef) -> Option<&Value> {
        self.identity.position(column).map(|i| &self.values[i])
    }

    /// Typed component of the key.
    pub fn get<T: AsValue>(&self, column: &Column<T>) -> Result<T> {
        let Some(value) = self.value(column.def()) else {
            return Err(self.identity.unknown(column.def()));
        };
        T::try_from_value(value.clone())
    }

    /// Condition matching the row with this key.
    pub fn condition(&self) -> Condition {
        let mut result: Option<Expr> = None;
        for (column, value) in self.identity.columns.iter().zip(self.values.iter()) {
            let equal = Expr::binary(
                BinaryOpType::Equal,
                Expr::Column(column.clone()),
                Expr::Param(value.clone(), column.column_type),
            );
            result = Some(match result {
                Some(v) => v.and(equal),
                None => equal,
            });
        }
        // A table without identity has no row to match
        Condition::new(result.unwrap_or_else(|| Expr::Raw("1 = 0".into(), ColumnType::BOOLEAN)))
    }
}

impl PartialEq for CompositeKey {
    fn eq(&self, other: &Self) -> bool {
        self.identity.table == other.identity.table && self.values == other.values
    }
}

impl Eq for CompositeKey {}

impl Hash for CompositeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity.table.hash(state);
        self.values.hash(state);
    }
}

/// Collects the components of a [`CompositeKey`], in any order.
#[derive(Debug)]
pub struct KeyBuilder {
    identity: Identity,
    values: Vec<Option<Value>>,
    unknown: Option<String>,
}

impl KeyBuilder {
    pub fn set<T: AsValue>(self, column: &Column<T>, value: T) -> Self {
        self.set_value(column.def(), value.as_value())
    }

    pub fn set_value(mut self, column: &ColumnDef, value: Value) -> Self {
        match self.identity.position(column) {
            Some(i) => self.values[i] = Some(value),
            None => {
                self.unknown.get_or_insert_with(|| column.name().to_string());
            }
        }
        self
    }

    pub fn build(self) -> Result<CompositeKey> {
        let fail = |error: SqlError| {
            let error = Error::new(error);
            log::error!("{:#}", error);
            Err(error)
        };
        if let Some(column) = self.unknown {
            return fail(SqlError::UnknownComponent {
                table: self.identity.table.name.clone(),
                column,
            });
        }
        let mut values = Vec::with_capacity(self.values.len());
        for (column, value) in self.identity.columns.iter().zip(self.values) {
            let Some(value) = value else {
                return fail(SqlError::MissingComponent {
                    table: self.identity.table.name.clone(),
                    column: column.name().to_string(),
                });
            };
            values.push(column.column_type.decode(&CANONICAL, value)?);
        }
        Ok(CompositeKey {
            identity: self.identity,
            values: values.into(),
        })
    }
}

/// Anything usable where a row key is expected: a [`CompositeKey`] or the bare value of a single
/// column identity.
pub trait IntoKey {
    fn into_key(self, identity: &Identity) -> Result<CompositeKey>;
}

impl IntoKey for CompositeKey {
    fn into_key(self, identity: &Identity) -> Result<CompositeKey> {
        if self.identity != *identity {
            let error = Error::msg(format!(
                "The key of `{}` cannot identify a row of `{}`",
                self.identity.table.full_name(),
                identity.table.full_name()
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(self)
    }
}

impl IntoKey for &CompositeKey {
    fn into_key(self, identity: &Identity) -> Result<CompositeKey> {
        self.clone().into_key(identity)
    }
}

impl<T: AsValue> IntoKey for T {
    fn into_key(self, identity: &Identity) -> Result<CompositeKey> {
        let Some(column) = identity.columns().first() else {
            let error = Error::msg(format!(
                "Table `{}` has no primary key, its rows cannot be looked up by key",
                identity.table.full_name()
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        CompositeKey::builder(identity)
            .set_value(column, self.as_value())
            .build()
    }
}

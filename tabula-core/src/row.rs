use crate::{
    AsValue, CodecContext, CompositeKey, Context as _, Error, Expr, ExprExt, Identity, RawRow, Result, SqlError,
    Table, Value,
};
use std::{collections::HashMap, sync::Arc};

/// Position of every expression of a projection in the rows it produces.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldIndex {
    fields: Vec<Expr>,
    lookup: HashMap<Expr, usize>,
}

impl FieldIndex {
    pub fn new(fields: Vec<Expr>) -> Self {
        let mut lookup = HashMap::with_capacity(fields.len() * 2);
        for (i, field) in fields.iter().enumerate() {
            lookup.entry(field.clone()).or_insert(i);
        }
        // An aliased expression can also be read through the expression itself
        for (i, field) in fields.iter().enumerate() {
            if let Expr::Alias(inner, ..) = field {
                lookup.entry(Expr::clone(inner)).or_insert(i);
            }
        }
        Self { fields, lookup }
    }

    pub fn fields(&self) -> &[Expr] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn position(&self, expr: &Expr) -> Option<usize> {
        self.lookup.get(expr).copied()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Slot {
    NotInitialized,
    Set { raw: Value, decoded: Value },
}

/// One record of a result set, every field of the projection has exactly one slot.
///
/// A slot that was never set is distinct from a slot set to NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    index: Arc<FieldIndex>,
    slots: Box<[Slot]>,
}

impl ResultRow {
    /// Row with every slot not initialized.
    pub fn new(index: Arc<FieldIndex>) -> Self {
        let slots = vec![Slot::NotInitialized; index.len()].into_boxed_slice();
        Self { index, slots }
    }

    /// Decode a row received from the connection.
    ///
    /// Columns are matched by position when the counts agree, by label otherwise.
    pub fn from_raw(index: Arc<FieldIndex>, row: &dyn RawRow, context: &CodecContext) -> Result<Self> {
        let positional = row.column_count() == index.len();
        let labels: Vec<Option<&str>> = (0..row.column_count()).map(|i| row.label(i)).collect();
        let mut slots = Vec::with_capacity(index.len());
        for (i, field) in index.fields().iter().enumerate() {
            let column = if positional {
                Some(i)
            } else {
                field.label().and_then(|label| {
                    labels
                        .iter()
                        .position(|v| v.is_some_and(|v| v.eq_ignore_ascii_case(label)))
                })
            };
            let Some(column) = column else {
                slots.push(Slot::NotInitialized);
                continue;
            };
            let column_type = field.column_type();
            let raw = row.value(column)?;
            // Primitive accessors turn NULL into zero, the flag is the truth
            let decoded = if row.is_null(column)? {
                column_type.empty_value()
            } else {
                column_type.read(context, row, column).with_context(|| {
                    format!("While decoding the field {} of the result row", field)
                })?
            };
            slots.push(Slot::Set { raw, decoded });
        }
        Ok(Self {
            index,
            slots: slots.into_boxed_slice(),
        })
    }

    /// Row for a record not inserted yet, holding the client side defaults of the table.
    ///
    /// Nullable columns without a default start as NULL, the others stay not initialized.
    pub fn with_defaults(table: &Table) -> Self {
        let fields = table.columns().iter().cloned().map(Expr::Column).collect();
        let mut result = Self::new(Arc::new(FieldIndex::new(fields)));
        for (i, column) in table.columns().iter().enumerate() {
            let value = match (&column.client_default, &column.default) {
                (Some(default), ..) => default.produce(),
                (None, Some(Expr::Literal(value, ..))) => value.clone(),
                _ if column.nullable => column.column_type.empty_value(),
                _ => continue,
            };
            result.slots[i] = Slot::Set {
                raw: value.clone(),
                decoded: value,
            };
        }
        result
    }

    pub fn fields(&self) -> &[Expr] {
        self.index.fields()
    }

    fn slot(&self, expr: &Expr) -> Result<&Slot> {
        let Some(position) = self.index.position(expr) else {
            return Err(Error::new(SqlError::NotInRecordSet {
                expression: expr.to_string(),
            }));
        };
        Ok(&self.slots[position])
    }

    /// Decoded value of the expression.
    pub fn get_value(&self, expr: &Expr) -> Result<&Value> {
        match self.slot(expr)? {
            Slot::Set { decoded, .. } => Ok(decoded),
            Slot::NotInitialized => Err(Error::new(SqlError::NotInitialized {
                expression: expr.to_string(),
            })),
        }
    }

    /// Value as the connection returned it, before decoding.
    pub fn raw(&self, expr: &Expr) -> Result<&Value> {
        match self.slot(expr)? {
            Slot::Set { raw, .. } => Ok(raw),
            Slot::NotInitialized => Err(Error::new(SqlError::NotInitialized {
                expression: expr.to_string(),
            })),
        }
    }

    /// Typed value of a column or expression of the projection.
    pub fn get<T: AsValue>(&self, expr: &impl ExprExt<T>) -> Result<T> {
        let expr = expr.to_expr();
        T::try_from_value(self.get_value(&expr)?.clone())
            .with_context(|| format!("While reading {} from the result row", expr))
    }

    /// Same as [`ResultRow::get`] but `None` when the expression is absent or not set.
    pub fn get_or_none<T: AsValue>(&self, expr: &impl ExprExt<T>) -> Option<T> {
        let expr = expr.to_expr();
        let value = self.get_value(&expr).ok()?.clone();
        T::try_from_value(value).ok()
    }

    /// The expression is part of the row and its slot was set.
    pub fn has_value(&self, expr: &Expr) -> bool {
        matches!(self.slot(expr), Ok(Slot::Set { .. }))
    }

    /// Store a value in the slot of the expression.
    pub fn set<T: AsValue>(&mut self, expr: &impl ExprExt<T>, value: T) -> Result<()> {
        let expr = expr.to_expr();
        let Some(position) = self.index.position(&expr) else {
            return Err(Error::new(SqlError::NotInRecordSet {
                expression: expr.to_string(),
            }));
        };
        let value = value.as_value();
        self.slots[position] = Slot::Set {
            raw: value.clone(),
            decoded: value,
        };
        Ok(())
    }

    /// Identity of the row, the projection must contain every identity column.
    pub fn key(&self, identity: &Identity) -> Result<CompositeKey> {
        let mut builder = CompositeKey::builder(identity);
        for column in identity.columns() {
            let value = self.get_value(&Expr::Column(column.clone()))?;
            builder = builder.set_value(column, value.clone());
        }
        builder.build()
    }
}

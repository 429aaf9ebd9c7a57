use crate::{AsValue, ColumnType, Expr, IntoOperand, TableRef, Value};
use std::{
    fmt::{self, Debug, Formatter},
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::Arc,
};

/// Name of a column, qualified by its table.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ColumnRef {
    pub name: String,
    pub table: String,
    pub schema: String,
}

impl ColumnRef {
    pub fn table_ref(&self) -> TableRef {
        TableRef {
            name: self.table.clone(),
            schema: self.schema.clone(),
            alias: String::new(),
        }
    }
}

/// Referential action of a foreign key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    NoAction,
    Restrict,
    Cascade,
    SetNull,
    SetDefault,
}

/// Value generated by the database or by the client when the insert omits the column.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generated {
    #[default]
    None,
    /// Integer assigned by the database.
    AutoIncrement,
    /// Random UUID assigned by the client before the insert.
    Uuid,
}

/// Default computed on the client when a new record is created.
#[derive(Clone)]
pub enum ClientDefault {
    Value(Value),
    Supplier(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl ClientDefault {
    pub fn produce(&self) -> Value {
        match self {
            ClientDefault::Value(v) => v.clone(),
            ClientDefault::Supplier(f) => f(),
        }
    }
}

impl Debug for ClientDefault {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ClientDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            ClientDefault::Supplier(..) => f.write_str("Supplier(..)"),
        }
    }
}

/// Schema level description of a column.
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub column_ref: ColumnRef,
    pub column_type: ColumnType,
    pub nullable: bool,
    /// Server side default, rendered inline in the DDL.
    pub default: Option<Expr>,
    pub client_default: Option<ClientDefault>,
    pub generated: Generated,
    pub unique: bool,
    pub references: Option<ColumnRef>,
    pub on_delete: Option<Action>,
    pub on_update: Option<Action>,
    pub comment: String,
}

impl ColumnDef {
    pub fn new(column_ref: ColumnRef, column_type: ColumnType) -> Self {
        Self {
            column_ref,
            column_type,
            nullable: false,
            default: None,
            client_default: None,
            generated: Generated::None,
            unique: false,
            references: None,
            on_delete: None,
            on_update: None,
            comment: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.column_ref.name
    }

    pub fn table(&self) -> &str {
        &self.column_ref.table
    }

    pub fn is_auto_increment(&self) -> bool {
        self.generated == Generated::AutoIncrement
    }
}

/// Columns are the same when they have the same qualified name.
impl PartialEq for ColumnDef {
    fn eq(&self, other: &Self) -> bool {
        self.column_ref == other.column_ref
    }
}

impl Eq for ColumnDef {}

impl Hash for ColumnDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.column_ref.hash(state);
    }
}

/// Anything that designates a column of a table.
pub trait AsColumn {
    fn column_def(&self) -> &Arc<ColumnDef>;
}

impl AsColumn for Arc<ColumnDef> {
    fn column_def(&self) -> &Arc<ColumnDef> {
        self
    }
}

/// Typed handle on a column, `T` is the Rust type its values decode into.
pub struct Column<T> {
    def: Arc<ColumnDef>,
    _type: PhantomData<fn() -> T>,
}

impl<T> Column<T> {
    pub(crate) fn new(def: Arc<ColumnDef>) -> Self {
        Self {
            def,
            _type: PhantomData,
        }
    }

    pub fn def(&self) -> &Arc<ColumnDef> {
        &self.def
    }

    pub fn name(&self) -> &str {
        self.def.name()
    }

    pub fn column_type(&self) -> ColumnType {
        self.def.column_type
    }
}

impl<T: AsValue> Column<T> {
    /// Assignment used by inserts and updates.
    pub fn to(&self, value: impl IntoOperand<T>) -> Assignment {
        Assignment {
            column: self.def.clone(),
            value: value.into_operand(Some(self.def.column_type)),
        }
    }
}

impl<T> AsColumn for Column<T> {
    fn column_def(&self) -> &Arc<ColumnDef> {
        &self.def
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self::new(self.def.clone())
    }
}

impl<T> Debug for Column<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Column").field(&self.def.column_ref).finish()
    }
}

impl<T> PartialEq for Column<T> {
    fn eq(&self, other: &Self) -> bool {
        self.def == other.def
    }
}

impl<T> Eq for Column<T> {}

impl<T> Hash for Column<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.def.hash(state);
    }
}

/// `column = value` pair of an insert row or an update.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub column: Arc<ColumnDef>,
    pub value: Expr,
}

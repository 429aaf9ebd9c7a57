use crate::{
    Action, AsColumn, AsValue, ClientDefault, Column, ColumnDef, ColumnRef, ColumnType, Dialect,
    EnumStorage, Error, Expr, Generated, Identity, Result, SqlEnum, SqlError,
};
use rust_decimal::Decimal;
use std::{
    hash::{Hash, Hasher},
    marker::PhantomData,
    sync::Arc,
};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Name of a table, optionally in a schema and under an alias.
#[derive(Default, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableRef {
    pub name: String,
    pub schema: String,
    pub alias: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Name the statement uses to refer to this table: the alias when present.
    pub fn reference_name(&self) -> &str {
        if self.alias.is_empty() {
            &self.name
        } else {
            &self.alias
        }
    }

    pub fn full_name(&self) -> String {
        let mut result = String::new();
        if !self.alias.is_empty() {
            result.push_str(&self.alias);
        } else {
            if !self.schema.is_empty() {
                result.push_str(&self.schema);
                result.push('.');
            }
            result.push_str(&self.name);
        }
        result
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForeignKey {
    pub columns: Vec<Arc<ColumnDef>>,
    pub target: TableRef,
    pub target_columns: Vec<String>,
    pub on_delete: Option<Action>,
    pub on_update: Option<Action>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<Arc<ColumnDef>>,
    pub unique: bool,
}

#[derive(Debug)]
pub struct TableDef {
    pub table_ref: TableRef,
    pub columns: Vec<Arc<ColumnDef>>,
    pub primary_key: Vec<Arc<ColumnDef>>,
    /// Multi column unique constraints, single column ones live in [`ColumnDef::unique`].
    pub unique: Vec<Vec<Arc<ColumnDef>>>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indices: Vec<IndexDef>,
}

/// Shared, immutable table definition. Clones are cheap.
#[derive(Debug, Clone)]
pub struct Table(Arc<TableDef>);

impl Table {
    pub fn builder(name: impl Into<String>) -> TableBuilder {
        TableBuilder {
            table_ref: TableRef::new(name),
            columns: Vec::new(),
            primary_key: Vec::new(),
            unique: Vec::new(),
            foreign_keys: Vec::new(),
            indices: Vec::new(),
        }
    }

    pub fn def(&self) -> &TableDef {
        &self.0
    }

    pub fn table_ref(&self) -> &TableRef {
        &self.0.table_ref
    }

    pub fn name(&self) -> &str {
        &self.0.table_ref.name
    }

    pub fn schema(&self) -> &str {
        &self.0.table_ref.schema
    }

    pub fn columns(&self) -> &[Arc<ColumnDef>] {
        &self.0.columns
    }

    pub fn column(&self, name: &str) -> Option<&Arc<ColumnDef>> {
        self.0.columns.iter().find(|c| c.name() == name)
    }

    pub fn primary_key(&self) -> &[Arc<ColumnDef>] {
        &self.0.primary_key
    }

    /// The columns that identify a row: the primary key.
    pub fn identity(&self) -> Identity {
        Identity::new(self.0.table_ref.clone(), self.0.primary_key.clone())
    }

    /// Same table under another name, columns are rebound to the alias.
    pub fn alias(&self, alias: impl Into<String>) -> Table {
        let alias = alias.into();
        let rebind = |c: &Arc<ColumnDef>| {
            let mut column = ColumnDef::clone(c);
            column.column_ref.table = alias.clone();
            column.column_ref.schema = String::new();
            Arc::new(column)
        };
        let columns: Vec<_> = self.0.columns.iter().map(rebind).collect();
        let find = |c: &Arc<ColumnDef>| {
            columns
                .iter()
                .find(|v| v.name() == c.name())
                .cloned()
                .unwrap_or_else(|| rebind(c))
        };
        Table(Arc::new(TableDef {
            table_ref: TableRef {
                alias: alias.clone(),
                ..self.0.table_ref.clone()
            },
            primary_key: self.0.primary_key.iter().map(find).collect(),
            unique: self
                .0
                .unique
                .iter()
                .map(|u| u.iter().map(find).collect())
                .collect(),
            foreign_keys: Vec::new(),
            indices: Vec::new(),
            columns,
        }))
    }

    /// Typed handle on a column of an aliased table, by name.
    pub fn typed_column<T>(&self, column: &Column<T>) -> Option<Column<T>> {
        self.column(column.name()).cloned().map(Column::new)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.0.table_ref == other.0.table_ref
    }
}

impl Eq for Table {}

impl Hash for Table {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.table_ref.hash(state);
    }
}

/// Collects the columns and constraints of a table.
///
/// Column methods return a [`ColumnBuilder`] whose `add` registers the column and hands back its
/// typed handle.
#[derive(Debug)]
pub struct TableBuilder {
    table_ref: TableRef,
    columns: Vec<Arc<ColumnDef>>,
    primary_key: Vec<Arc<ColumnDef>>,
    unique: Vec<Vec<Arc<ColumnDef>>>,
    foreign_keys: Vec<ForeignKey>,
    indices: Vec<IndexDef>,
}

macro_rules! typed_column {
    ($($name:ident: $ty:ty => $column_type:expr,)+) => {
        $(
            pub fn $name(&mut self, name: impl Into<String>) -> ColumnBuilder<'_, $ty> {
                self.column(name, $column_type)
            }
        )+
    };
}

impl TableBuilder {
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.table_ref.schema = schema.into();
        self
    }

    pub fn column<T>(
        &mut self,
        name: impl Into<String>,
        column_type: ColumnType,
    ) -> ColumnBuilder<'_, T> {
        let column_ref = ColumnRef {
            name: name.into(),
            table: self.table_ref.name.clone(),
            schema: self.table_ref.schema.clone(),
        };
        ColumnBuilder {
            def: ColumnDef::new(column_ref, column_type),
            table: self,
            _type: PhantomData,
        }
    }

    typed_column! {
        boolean: bool => ColumnType::BOOLEAN,
        tiny: i8 => ColumnType::TINYINT,
        short: i16 => ColumnType::SMALLINT,
        integer: i32 => ColumnType::INTEGER,
        long: i64 => ColumnType::BIGINT,
        real: f32 => ColumnType::REAL,
        double: f64 => ColumnType::DOUBLE,
        text: String => ColumnType::TEXT,
        blob: Vec<u8> => ColumnType::BLOB,
        uuid: Uuid => ColumnType::UUID,
        date: Date => ColumnType::DATE,
        time: Time => ColumnType::TIME,
        datetime: PrimitiveDateTime => ColumnType::DATETIME,
        timestamp: OffsetDateTime => ColumnType::INSTANT,
        duration: time::Duration => ColumnType::DURATION,
    }

    pub fn varchar(&mut self, name: impl Into<String>, length: u32) -> ColumnBuilder<'_, String> {
        self.column(name, ColumnType::varchar(length))
    }

    pub fn char(&mut self, name: impl Into<String>, length: u32) -> ColumnBuilder<'_, String> {
        self.column(name, ColumnType::char(length))
    }

    pub fn decimal(
        &mut self,
        name: impl Into<String>,
        precision: u8,
        scale: u8,
    ) -> ColumnBuilder<'_, Decimal> {
        self.column(name, ColumnType::decimal(precision, scale))
    }

    pub fn enumeration<E: SqlEnum>(
        &mut self,
        name: impl Into<String>,
        storage: EnumStorage,
    ) -> ColumnBuilder<'_, E> {
        self.column(name, ColumnType::enumeration::<E>(storage))
    }

    pub fn primary_key(&mut self, columns: &[&dyn AsColumn]) -> &mut Self {
        self.primary_key = columns.iter().map(|c| c.column_def().clone()).collect();
        self
    }

    pub fn unique(&mut self, columns: &[&dyn AsColumn]) -> &mut Self {
        self.unique
            .push(columns.iter().map(|c| c.column_def().clone()).collect());
        self
    }

    pub fn index(&mut self, name: impl Into<String>, columns: &[&dyn AsColumn]) -> &mut Self {
        self.push_index(name.into(), columns, false)
    }

    pub fn unique_index(
        &mut self,
        name: impl Into<String>,
        columns: &[&dyn AsColumn],
    ) -> &mut Self {
        self.push_index(name.into(), columns, true)
    }

    fn push_index(&mut self, name: String, columns: &[&dyn AsColumn], unique: bool) -> &mut Self {
        self.indices.push(IndexDef {
            name,
            columns: columns.iter().map(|c| c.column_def().clone()).collect(),
            unique,
        });
        self
    }

    /// Multi column foreign key, the referenced columns are matched by position.
    pub fn foreign_key(
        &mut self,
        columns: &[&dyn AsColumn],
        target: &[&dyn AsColumn],
        on_delete: Option<Action>,
        on_update: Option<Action>,
    ) -> &mut Self {
        let target_table = target
            .first()
            .map(|c| c.column_def().column_ref.table_ref())
            .unwrap_or_default();
        self.foreign_keys.push(ForeignKey {
            columns: columns.iter().map(|c| c.column_def().clone()).collect(),
            target: target_table,
            target_columns: target
                .iter()
                .map(|c| c.column_def().name().to_string())
                .collect(),
            on_delete,
            on_update,
        });
        self
    }

    pub fn build(self) -> Result<Table> {
        let invalid = |message: String| {
            let error = Error::msg(message);
            log::error!("{:#}", error);
            Err(error)
        };
        let foreign = |c: &Arc<ColumnDef>| !self.columns.contains(c);
        if let Some(c) = self
            .primary_key
            .iter()
            .chain(self.unique.iter().flatten())
            .chain(self.indices.iter().flat_map(|v| v.columns.iter()))
            .chain(self.foreign_keys.iter().flat_map(|v| v.columns.iter()))
            .find(|c| foreign(c))
        {
            return invalid(format!(
                "Column `{}` used in a constraint of `{}` does not belong to the table",
                c.column_ref.name, self.table_ref.name
            ));
        }
        for (i, c) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|v| v.name() == c.name()) {
                return invalid(format!(
                    "Column `{}` is declared twice in `{}`",
                    c.name(),
                    self.table_ref.name
                ));
            }
        }
        if self.foreign_keys.iter().any(|f| f.columns.len() != f.target_columns.len()) {
            return invalid(format!(
                "A foreign key of `{}` does not reference as many columns as it declares",
                self.table_ref.name
            ));
        }
        Ok(Table(Arc::new(TableDef {
            table_ref: self.table_ref,
            columns: self.columns,
            primary_key: self.primary_key,
            unique: self.unique,
            foreign_keys: self.foreign_keys,
            indices: self.indices,
        })))
    }

    /// Fails when the table cannot be created on the dialect.
    pub(crate) fn check_dialect(table: &Table, dialect: Dialect) -> Result<()> {
        let pk = table.primary_key();
        if pk.len() > 1
            && pk.iter().any(|c| c.is_auto_increment())
            && !dialect.supports_auto_increment_in_composite_key()
        {
            return Err(SqlError::unsupported(
                dialect,
                "Auto increment column in a composite primary key",
            ));
        }
        Ok(())
    }
}

/// Options of a column being declared.
#[derive(Debug)]
pub struct ColumnBuilder<'b, T> {
    table: &'b mut TableBuilder,
    def: ColumnDef,
    _type: PhantomData<fn() -> T>,
}

impl<'b, T> ColumnBuilder<'b, T> {
    /// The column accepts NULL, values decode into `Option<T>`.
    pub fn nullable(self) -> ColumnBuilder<'b, Option<T>> {
        ColumnBuilder {
            table: self.table,
            def: ColumnDef {
                nullable: true,
                ..self.def
            },
            _type: PhantomData,
        }
    }

    /// Server side default expression.
    pub fn default_expression(mut self, expr: impl Into<Expr>) -> Self {
        self.def.default = Some(expr.into());
        self
    }

    /// Value assigned on the client when an insert omits the column.
    pub fn client_default_with(mut self, f: impl Fn() -> T + Send + Sync + 'static) -> Self
    where
        T: AsValue,
    {
        self.def.client_default = Some(ClientDefault::Supplier(Arc::new(move || f().as_value())));
        self
    }

    /// Integer generated by the database.
    pub fn auto_increment(mut self) -> Self {
        self.def.generated = Generated::AutoIncrement;
        self
    }

    /// Random UUID generated on the client when the insert omits the column.
    pub fn auto_generate(mut self) -> Self {
        self.def.generated = Generated::Uuid;
        self
    }

    pub fn unique(mut self) -> Self {
        self.def.unique = true;
        self
    }

    pub fn references<R>(mut self, column: &Column<R>) -> Self {
        self.def.references = Some(column.def().column_ref.clone());
        self
    }

    pub fn on_delete(mut self, action: Action) -> Self {
        self.def.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: Action) -> Self {
        self.def.on_update = Some(action);
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.def.comment = comment.into();
        self
    }

    /// Register the column in the table.
    pub fn add(self) -> Column<T> {
        let def = Arc::new(self.def);
        self.table.columns.push(def.clone());
        Column::new(def)
    }
}

impl<'b, T: AsValue> ColumnBuilder<'b, T> {
    /// Server side default value, rendered as a literal.
    pub fn default_value(mut self, value: T) -> Self {
        let column_type = self.def.column_type;
        self.def.default = Some(Expr::Literal(value.as_value(), column_type));
        self
    }

    /// Constant value assigned on the client when an insert omits the column.
    pub fn client_default(mut self, value: T) -> Self {
        self.def.client_default = Some(ClientDefault::Value(value.as_value()));
        self
    }
}

use crate::{
    BinaryOpType, CodecContext, Column, ColumnDef, ColumnRef, ColumnType, Dialect, Function, Query,
    UnaryOpType, Value,
    writer::Context,
};
use std::{
    borrow::Cow,
    fmt::{self, Display, Formatter},
    sync::Arc,
};

/// Untyped node of a SQL expression tree.
///
/// Children are shared, cloning an expression never copies the tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expr {
    /// Column of a table taking part in the statement.
    Column(Arc<ColumnDef>),
    /// Column of a derived table or an alias, referenced by name only.
    Reference(ColumnRef, ColumnType),
    /// Value bound as a statement parameter.
    Param(Value, ColumnType),
    /// Value rendered inline in the SQL text.
    Literal(Value, ColumnType),
    /// SQL text copied verbatim.
    Raw(Cow<'static, str>, ColumnType),
    Unary(UnaryOpType, Arc<Expr>),
    Binary(BinaryOpType, Arc<Expr>, Arc<Expr>),
    Call(Function, Arc<[Expr]>),
    Cast(Arc<Expr>, ColumnType),
    Alias(Arc<Expr>, String),
    SubQuery(Arc<Query>),
    Exists(Arc<Query>),
    /// `expr IN (...)`, negated when the flag is set.
    InList(Arc<Expr>, Arc<[Expr]>, bool),
    Asterisk,
}

impl Expr {
    pub fn param(value: impl Into<Value>) -> Expr {
        let value = value.into();
        let column_type = ColumnType::for_value(&value);
        Expr::Param(value, column_type)
    }

    pub fn literal(value: impl Into<Value>) -> Expr {
        let value = value.into();
        let column_type = ColumnType::for_value(&value);
        Expr::Literal(value, column_type)
    }

    pub fn raw(sql: impl Into<Cow<'static, str>>) -> Expr {
        Expr::Raw(sql.into(), ColumnType::TEXT)
    }

    /// Column `name` of the table or derived table known as `table` in the statement.
    pub fn reference(table: impl Into<String>, name: impl Into<String>, column_type: ColumnType) -> Expr {
        Expr::Reference(
            ColumnRef {
                name: name.into(),
                table: table.into(),
                schema: String::new(),
            },
            column_type,
        )
    }

    pub fn binary(op: BinaryOpType, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary(op, lhs.into(), rhs.into())
    }

    pub fn unary(op: UnaryOpType, arg: Expr) -> Expr {
        Expr::Unary(op, arg.into())
    }

    pub fn call(function: Function, args: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Call(function, args.into_iter().collect())
    }

    pub fn alias(self, name: impl Into<String>) -> Expr {
        Expr::Alias(self.unaliased().clone().into(), name.into())
    }

    pub fn and(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOpType::And, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        Expr::binary(BinaryOpType::Or, self, rhs)
    }

    /// The expression without its alias.
    pub fn unaliased(&self) -> &Expr {
        match self {
            Expr::Alias(v, ..) => v,
            v => v,
        }
    }

    /// Name of the result column, when it is not generated by the database.
    pub fn label(&self) -> Option<&str> {
        match self {
            Expr::Alias(_, name) => Some(name),
            Expr::Column(c) => Some(c.name()),
            Expr::Reference(c, ..) => Some(&c.name),
            _ => None,
        }
    }

    pub fn column_type(&self) -> ColumnType {
        match self {
            Expr::Column(c) => c.column_type,
            Expr::Reference(_, t)
            | Expr::Param(_, t)
            | Expr::Literal(_, t)
            | Expr::Raw(_, t)
            | Expr::Cast(_, t) => *t,
            Expr::Unary(UnaryOpType::Not, ..) => ColumnType::BOOLEAN,
            Expr::Unary(UnaryOpType::Negative, v) => v.column_type(),
            Expr::Binary(op, lhs, ..) => {
                if op.is_comparison() || op.is_logical() {
                    ColumnType::BOOLEAN
                } else {
                    lhs.column_type()
                }
            }
            Expr::Call(Function::Count | Function::CountDistinct, ..) => ColumnType::BIGINT,
            Expr::Call(Function::Avg, ..) => ColumnType::DOUBLE,
            Expr::Call(_, args) => args
                .first()
                .map(Expr::column_type)
                .unwrap_or(ColumnType::TEXT),
            Expr::Alias(v, ..) => v.column_type(),
            Expr::SubQuery(q) => q
                .projection
                .first()
                .map(Expr::column_type)
                .unwrap_or(ColumnType::TEXT),
            Expr::Exists(..) | Expr::InList(..) => ColumnType::BOOLEAN,
            Expr::Asterisk => ColumnType::TEXT,
        }
    }

    pub fn is_aggregate(&self) -> bool {
        match self {
            Expr::Call(f, args) => f.is_aggregate() || args.iter().any(Expr::is_aggregate),
            Expr::Unary(_, v) | Expr::Cast(v, ..) | Expr::Alias(v, ..) => v.is_aggregate(),
            Expr::Binary(_, l, r) => l.is_aggregate() || r.is_aggregate(),
            _ => false,
        }
    }

    /// Visit this expression and its children in pre-order, sub-queries are not entered.
    pub fn visit<'e>(&'e self, f: &mut dyn FnMut(&'e Expr)) {
        f(self);
        match self {
            Expr::Unary(_, v) | Expr::Cast(v, ..) | Expr::Alias(v, ..) => v.visit(f),
            Expr::Binary(_, l, r) => {
                l.visit(f);
                r.visit(f);
            }
            Expr::Call(_, args) => args.iter().for_each(|v| v.visit(f)),
            Expr::InList(v, list, ..) => {
                v.visit(f);
                list.iter().for_each(|v| v.visit(f));
            }
            _ => {}
        }
    }

    /// Render the expression with inline values, as diagnostics show it.
    pub fn to_sql(&self, dialect: Dialect) -> crate::Result<String> {
        let mut context = Context::inline(CodecContext::new(dialect));
        let mut out = String::with_capacity(32);
        dialect
            .sql_writer()
            .write_expr(&mut context, &mut out, self)?;
        Ok(out)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self.to_sql(Dialect::Postgres) {
            Ok(v) => f.write_str(&v),
            Err(..) => write!(f, "{:?}", self),
        }
    }
}

impl From<Arc<ColumnDef>> for Expr {
    fn from(value: Arc<ColumnDef>) -> Self {
        Expr::Column(value)
    }
}

impl<T> From<Column<T>> for Expr {
    fn from(value: Column<T>) -> Self {
        Expr::Column(value.def().clone())
    }
}

impl<T> From<&Column<T>> for Expr {
    fn from(value: &Column<T>) -> Self {
        Expr::Column(value.def().clone())
    }
}

impl From<Query> for Expr {
    fn from(value: Query) -> Self {
        Expr::SubQuery(value.into())
    }
}

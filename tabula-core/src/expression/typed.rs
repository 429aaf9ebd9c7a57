use crate::{
    AsValue, BinaryOpType, Column, ColumnType, Expr, Function, Order, Ordered, Query, UnaryOpType,
};
use std::{
    borrow::Cow,
    fmt::{self, Debug, Display, Formatter},
    marker::PhantomData,
};

/// Expression whose result decodes into `T`.
pub struct TypedExpr<T> {
    expr: Expr,
    _type: PhantomData<fn() -> T>,
}

/// Boolean expression used in `WHERE`, `HAVING` and `ON`.
pub type Condition = TypedExpr<bool>;

impl<T> TypedExpr<T> {
    pub fn new(expr: Expr) -> Self {
        Self {
            expr,
            _type: PhantomData,
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }
}

impl TypedExpr<bool> {
    pub fn and(self, rhs: Condition) -> Condition {
        Condition::new(self.expr.and(rhs.expr))
    }

    pub fn or(self, rhs: Condition) -> Condition {
        Condition::new(self.expr.or(rhs.expr))
    }

    pub fn not(self) -> Condition {
        Condition::new(Expr::unary(UnaryOpType::Not, self.expr))
    }
}

impl<T> Clone for TypedExpr<T> {
    fn clone(&self) -> Self {
        Self::new(self.expr.clone())
    }
}

impl<T> Debug for TypedExpr<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("TypedExpr").field(&self.expr).finish()
    }
}

impl<T> Display for TypedExpr<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.expr, f)
    }
}

impl<T> PartialEq for TypedExpr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.expr == other.expr
    }
}

impl<T> From<TypedExpr<T>> for Expr {
    fn from(value: TypedExpr<T>) -> Self {
        value.expr
    }
}

impl<T> From<&TypedExpr<T>> for Expr {
    fn from(value: &TypedExpr<T>) -> Self {
        value.expr.clone()
    }
}

/// Right hand side of an operation on an expression of type `T`.
///
/// Bare values become parameters converted by the codec of the other side.
pub trait IntoOperand<T> {
    fn into_operand(self, hint: Option<ColumnType>) -> Expr;
}

impl<T: AsValue> IntoOperand<T> for T {
    fn into_operand(self, hint: Option<ColumnType>) -> Expr {
        let value = self.as_value();
        let column_type = hint.unwrap_or_else(|| ColumnType::for_value(&value));
        Expr::Param(value, column_type)
    }
}

impl IntoOperand<String> for &str {
    fn into_operand(self, hint: Option<ColumnType>) -> Expr {
        self.to_string().into_operand(hint)
    }
}

impl IntoOperand<Option<String>> for &str {
    fn into_operand(self, hint: Option<ColumnType>) -> Expr {
        self.to_string().into_operand(hint)
    }
}

impl<T> IntoOperand<T> for Column<T> {
    fn into_operand(self, _hint: Option<ColumnType>) -> Expr {
        self.into()
    }
}

impl<T> IntoOperand<T> for &Column<T> {
    fn into_operand(self, _hint: Option<ColumnType>) -> Expr {
        self.into()
    }
}

impl<T> IntoOperand<T> for TypedExpr<T> {
    fn into_operand(self, _hint: Option<ColumnType>) -> Expr {
        self.expr
    }
}

impl<T> IntoOperand<T> for &TypedExpr<T> {
    fn into_operand(self, _hint: Option<ColumnType>) -> Expr {
        self.expr.clone()
    }
}

/// Operations shared by columns and typed expressions.
pub trait ExprExt<T> {
    fn to_expr(&self) -> Expr;

    fn compare(&self, op: BinaryOpType, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        let lhs = self.to_expr();
        let rhs = rhs.into_operand(Some(lhs.column_type()));
        let op = match (&rhs, op) {
            (Expr::Param(v, ..), BinaryOpType::Equal) if v.is_null() => BinaryOpType::Is,
            (Expr::Param(v, ..), BinaryOpType::NotEqual) if v.is_null() => BinaryOpType::IsNot,
            (_, op) => op,
        };
        let rhs = match (&rhs, op) {
            (Expr::Param(..), BinaryOpType::Is | BinaryOpType::IsNot) => {
                Expr::Raw("NULL".into(), ColumnType::TEXT)
            }
            _ => rhs,
        };
        Condition::new(Expr::binary(op, lhs, rhs))
    }

    fn equal(&self, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        self.compare(BinaryOpType::Equal, rhs)
    }

    fn not_equal(&self, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        self.compare(BinaryOpType::NotEqual, rhs)
    }

    fn less(&self, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        self.compare(BinaryOpType::Less, rhs)
    }

    fn less_eq(&self, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        self.compare(BinaryOpType::LessEqual, rhs)
    }

    fn greater(&self, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        self.compare(BinaryOpType::Greater, rhs)
    }

    fn greater_eq(&self, rhs: impl IntoOperand<T>) -> Condition
    where
        Self: Sized,
    {
        self.compare(BinaryOpType::GreaterEqual, rhs)
    }

    fn like(&self, pattern: impl Into<String>) -> Condition
    where
        Self: Sized,
    {
        let lhs = self.to_expr();
        let rhs = Expr::Param(pattern.into().as_value(), ColumnType::TEXT);
        Condition::new(Expr::binary(BinaryOpType::Like, lhs, rhs))
    }

    fn not_like(&self, pattern: impl Into<String>) -> Condition
    where
        Self: Sized,
    {
        let lhs = self.to_expr();
        let rhs = Expr::Param(pattern.into().as_value(), ColumnType::TEXT);
        Condition::new(Expr::binary(BinaryOpType::NotLike, lhs, rhs))
    }

    fn is_null(&self) -> Condition {
        Condition::new(Expr::binary(BinaryOpType::Is, self.to_expr(), null()))
    }

    fn is_not_null(&self) -> Condition {
        Condition::new(Expr::binary(BinaryOpType::IsNot, self.to_expr(), null()))
    }

    fn is_in<V: IntoOperand<T>>(&self, values: impl IntoIterator<Item = V>) -> Condition
    where
        Self: Sized,
    {
        in_list(self.to_expr(), values, false)
    }

    fn not_in<V: IntoOperand<T>>(&self, values: impl IntoIterator<Item = V>) -> Condition
    where
        Self: Sized,
    {
        in_list(self.to_expr(), values, true)
    }

    fn plus(&self, rhs: impl IntoOperand<T>) -> TypedExpr<T>
    where
        Self: Sized,
    {
        arithmetic(self.to_expr(), BinaryOpType::Addition, rhs)
    }

    fn minus(&self, rhs: impl IntoOperand<T>) -> TypedExpr<T>
    where
        Self: Sized,
    {
        arithmetic(self.to_expr(), BinaryOpType::Subtraction, rhs)
    }

    fn times(&self, rhs: impl IntoOperand<T>) -> TypedExpr<T>
    where
        Self: Sized,
    {
        arithmetic(self.to_expr(), BinaryOpType::Multiplication, rhs)
    }

    fn divided_by(&self, rhs: impl IntoOperand<T>) -> TypedExpr<T>
    where
        Self: Sized,
    {
        arithmetic(self.to_expr(), BinaryOpType::Division, rhs)
    }

    fn negated(&self) -> TypedExpr<T> {
        TypedExpr::new(Expr::unary(UnaryOpType::Negative, self.to_expr()))
    }

    fn alias(&self, name: impl Into<String>) -> TypedExpr<T>
    where
        Self: Sized,
    {
        TypedExpr::new(self.to_expr().alias(name))
    }

    fn asc(&self) -> Ordered {
        Ordered {
            order: Order::Asc,
            expr: self.to_expr(),
        }
    }

    fn desc(&self) -> Ordered {
        Ordered {
            order: Order::Desc,
            expr: self.to_expr(),
        }
    }
}

impl<T> ExprExt<T> for Column<T> {
    fn to_expr(&self) -> Expr {
        self.into()
    }
}

impl<T> ExprExt<T> for TypedExpr<T> {
    fn to_expr(&self) -> Expr {
        self.expr.clone()
    }
}

fn null() -> Expr {
    Expr::Raw("NULL".into(), ColumnType::TEXT)
}

fn in_list<T, V: IntoOperand<T>>(
    lhs: Expr,
    values: impl IntoIterator<Item = V>,
    negated: bool,
) -> Condition {
    let hint = lhs.column_type();
    let list = values
        .into_iter()
        .map(|v| v.into_operand(Some(hint)))
        .collect();
    Condition::new(Expr::InList(lhs.into(), list, negated))
}

fn arithmetic<T>(lhs: Expr, op: BinaryOpType, rhs: impl IntoOperand<T>) -> TypedExpr<T> {
    let rhs = rhs.into_operand(Some(lhs.column_type()));
    TypedExpr::new(Expr::binary(op, lhs, rhs))
}

/// `COUNT(expr)`, NULL values are not counted.
pub fn count<T>(expr: &impl ExprExt<T>) -> TypedExpr<i64> {
    TypedExpr::new(Expr::call(Function::Count, [expr.to_expr()]))
}

pub fn count_distinct<T>(expr: &impl ExprExt<T>) -> TypedExpr<i64> {
    TypedExpr::new(Expr::call(Function::CountDistinct, [expr.to_expr()]))
}

/// `COUNT(*)`
pub fn count_all() -> TypedExpr<i64> {
    TypedExpr::new(Expr::call(Function::Count, [Expr::Asterisk]))
}

pub fn sum<T>(expr: &impl ExprExt<T>) -> TypedExpr<Option<T>> {
    TypedExpr::new(Expr::call(Function::Sum, [expr.to_expr()]))
}

pub fn min<T>(expr: &impl ExprExt<T>) -> TypedExpr<Option<T>> {
    TypedExpr::new(Expr::call(Function::Min, [expr.to_expr()]))
}

pub fn max<T>(expr: &impl ExprExt<T>) -> TypedExpr<Option<T>> {
    TypedExpr::new(Expr::call(Function::Max, [expr.to_expr()]))
}

pub fn avg<T>(expr: &impl ExprExt<T>) -> TypedExpr<Option<f64>> {
    TypedExpr::new(Expr::call(Function::Avg, [expr.to_expr()]))
}

pub fn lower(expr: &impl ExprExt<String>) -> TypedExpr<String> {
    TypedExpr::new(Expr::call(Function::Lower, [expr.to_expr()]))
}

pub fn upper(expr: &impl ExprExt<String>) -> TypedExpr<String> {
    TypedExpr::new(Expr::call(Function::Upper, [expr.to_expr()]))
}

/// First non NULL between `expr` and `fallback`.
pub fn coalesce<T>(expr: &impl ExprExt<Option<T>>, fallback: impl IntoOperand<T>) -> TypedExpr<T> {
    let lhs = expr.to_expr();
    let rhs = fallback.into_operand(Some(lhs.column_type()));
    TypedExpr::new(Expr::call(Function::Coalesce, [lhs, rhs]))
}

/// Value bound as a parameter.
pub fn value<T: AsValue>(value: T) -> TypedExpr<T> {
    TypedExpr::new(Expr::param(value.as_value()))
}

/// Value rendered inline in the SQL text.
pub fn literal<T: AsValue>(value: T) -> TypedExpr<T> {
    TypedExpr::new(Expr::literal(value.as_value()))
}

/// SQL text copied verbatim, decoded with `column_type`.
pub fn raw<T>(sql: impl Into<Cow<'static, str>>, column_type: ColumnType) -> TypedExpr<T> {
    TypedExpr::new(Expr::Raw(sql.into(), column_type))
}

pub fn cast<T>(expr: impl Into<Expr>, column_type: ColumnType) -> TypedExpr<T> {
    TypedExpr::new(Expr::Cast(expr.into().into(), column_type))
}

/// Scalar sub-select, the query must produce a single column.
pub fn sub_query<T>(query: Query) -> TypedExpr<T> {
    TypedExpr::new(Expr::SubQuery(query.into()))
}

pub fn exists(query: Query) -> Condition {
    Condition::new(Expr::Exists(query.into()))
}

pub fn not_exists(query: Query) -> Condition {
    exists(query).not()
}

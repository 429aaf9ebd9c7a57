use crate::{
    Condition, Dialect, Error, Expr, Function, JoinType, Ordered, Result, SqlError, Table,
    TypedExpr,
};
use std::sync::Arc;

/// Where the rows of a query come from.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Source {
    Table(Table),
    Join(Arc<Join>),
    /// Derived table, with the alias it is known by.
    SubQuery(Arc<Query>, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Join {
    pub join_type: JoinType,
    pub lhs: Source,
    pub rhs: Source,
    pub on: Option<Expr>,
}

impl Source {
    pub fn join(self, join_type: JoinType, rhs: impl Into<Source>, on: Option<Condition>) -> Source {
        Source::Join(Arc::new(Join {
            join_type,
            lhs: self,
            rhs: rhs.into(),
            on: on.map(TypedExpr::into_expr),
        }))
    }

    pub fn inner_join(self, rhs: impl Into<Source>, on: Condition) -> Source {
        self.join(JoinType::Inner, rhs, Some(on))
    }

    pub fn left_join(self, rhs: impl Into<Source>, on: Condition) -> Source {
        self.join(JoinType::Left, rhs, Some(on))
    }

    pub fn cross_join(self, rhs: impl Into<Source>) -> Source {
        self.join(JoinType::Cross, rhs, None)
    }

    pub fn select(self, projection: impl IntoIterator<Item = impl Into<Expr>>) -> Query {
        Query::new(self, projection)
    }

    /// Select every column of every table of the source.
    pub fn select_all(self) -> Query {
        let projection = self.columns();
        Query::new(self, projection)
    }

    /// Columns the source makes available, in declaration order.
    pub fn columns(&self) -> Vec<Expr> {
        match self {
            Source::Table(t) => t.columns().iter().cloned().map(Expr::Column).collect(),
            Source::Join(j) => {
                let mut result = j.lhs.columns();
                result.extend(j.rhs.columns());
                result
            }
            Source::SubQuery(q, alias) => q
                .fields()
                .iter()
                .filter_map(|e| {
                    e.label()
                        .map(|l| Expr::reference(alias.clone(), l, e.column_type()))
                })
                .collect(),
        }
    }

    /// Names the statement can qualify columns with.
    pub fn reference_names(&self) -> Vec<&str> {
        match self {
            Source::Table(t) => vec![t.table_ref().reference_name()],
            Source::Join(j) => {
                let mut result = j.lhs.reference_names();
                result.extend(j.rhs.reference_names());
                result
            }
            Source::SubQuery(_, alias) => vec![alias.as_str()],
        }
    }

    /// Columns must be qualified by their table name.
    pub fn qualify_columns(&self) -> bool {
        !matches!(self, Source::Table(..))
    }
}

impl From<Table> for Source {
    fn from(value: Table) -> Self {
        Source::Table(value)
    }
}

impl From<&Table> for Source {
    fn from(value: &Table) -> Self {
        Source::Table(value.clone())
    }
}

/// A `SELECT` statement.
///
/// Builder methods consume and return the query, `adjust_*` methods edit it in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query {
    pub projection: Vec<Expr>,
    pub source: Source,
    pub predicate: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub having: Option<Expr>,
    pub order_by: Vec<Ordered>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub distinct: bool,
    pub for_update: bool,
}

impl Query {
    pub fn new(source: impl Into<Source>, projection: impl IntoIterator<Item = impl Into<Expr>>) -> Query {
        Query {
            projection: projection.into_iter().map(Into::into).collect(),
            source: source.into(),
            predicate: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
            distinct: false,
            for_update: false,
        }
    }

    /// Replace the condition.
    pub fn filter(mut self, condition: Condition) -> Self {
        self.predicate = Some(condition.into_expr());
        self
    }

    /// Combine the condition with the existing one using `AND`.
    pub fn and_where(mut self, condition: Condition) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(v) => v.and(condition.into_expr()),
            None => condition.into_expr(),
        });
        self
    }

    /// Combine the condition with the existing one using `OR`.
    pub fn or_where(mut self, condition: Condition) -> Self {
        self.predicate = Some(match self.predicate.take() {
            Some(v) => v.or(condition.into_expr()),
            None => condition.into_expr(),
        });
        self
    }

    pub fn group_by(mut self, exprs: impl IntoIterator<Item = impl Into<Expr>>) -> Self {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// Set the `HAVING` condition, it can be set only once.
    pub fn having(mut self, condition: Condition) -> Result<Self> {
        if self.having.is_some() {
            let error = Error::new(SqlError::DuplicateHaving);
            log::error!("{:#}", error);
            return Err(error);
        }
        self.having = Some(condition.into_expr());
        Ok(self)
    }

    pub fn order_by(mut self, ordered: Ordered) -> Self {
        self.order_by.push(ordered);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Lock the selected rows, ignored by the dialects that cannot.
    pub fn for_update(mut self) -> Self {
        self.for_update = true;
        self
    }

    pub fn adjust_projection(&mut self, f: impl FnOnce(&mut Vec<Expr>)) -> &mut Self {
        f(&mut self.projection);
        self
    }

    pub fn adjust_source(&mut self, f: impl FnOnce(Source) -> Source) -> &mut Self {
        let source = self.source.clone();
        self.source = f(source);
        self
    }

    pub fn adjust_where(&mut self, f: impl FnOnce(Option<Expr>) -> Option<Expr>) -> &mut Self {
        self.predicate = f(self.predicate.take());
        self
    }

    pub fn adjust_having(&mut self, f: impl FnOnce(Option<Expr>) -> Option<Expr>) -> &mut Self {
        self.having = f(self.having.take());
        self
    }

    /// The projection without repeated expressions, in order of first appearance.
    pub fn fields(&self) -> Vec<Expr> {
        let mut result: Vec<Expr> = Vec::with_capacity(self.projection.len());
        for expr in &self.projection {
            if !result.contains(expr) {
                result.push(expr.clone());
            }
        }
        result
    }

    /// The projection contains the same expression more than once.
    pub fn has_duplicate_fields(&self) -> bool {
        self.fields().len() != self.projection.len()
    }

    /// Query returning the number of rows this query returns.
    pub fn count_query(&self) -> Query {
        let flat = !self.distinct
            && self.group_by.is_empty()
            && self.having.is_none()
            && self.limit.is_none()
            && self.offset.is_none();
        let count = Expr::call(Function::Count, [Expr::Asterisk]);
        if flat {
            let mut query = Query::new(self.source.clone(), [count]);
            query.predicate = self.predicate.clone();
            return query;
        }
        let mut inner = self.clone();
        inner.projection = self.unique_aliases();
        inner.for_update = false;
        if inner.limit.is_none() && inner.offset.is_none() {
            inner.order_by.clear();
        }
        Query::new(Source::SubQuery(inner.into(), "subquery".into()), [count])
    }

    /// Query that finds out whether this query returns any row.
    ///
    /// A locking query keeps every row it matches, unless the dialect ignores the lock anyway.
    pub fn exists_query(&self, dialect: Dialect) -> Query {
        if self.for_update && dialect.supports_select_for_update() {
            return self.clone();
        }
        self.clone().limit(1)
    }

    /// The fields, aliased so that every one has a distinct name when used as a derived table.
    pub fn unique_aliases(&self) -> Vec<Expr> {
        let mut counter = 0;
        self.fields()
            .into_iter()
            .map(|e| match e {
                Expr::Alias(..) => e,
                Expr::Column(ref c) => {
                    let alias = format!("{}_{}", c.column_ref.table, c.name());
                    e.alias(alias)
                }
                e => {
                    counter += 1;
                    e.alias(format!("exp{}", counter))
                }
            })
            .collect()
    }
}

impl Table {
    pub fn select(&self, projection: impl IntoIterator<Item = impl Into<Expr>>) -> Query {
        Query::new(self, projection)
    }

    pub fn select_all(&self) -> Query {
        Source::from(self).select_all()
    }

    pub fn join(&self, join_type: JoinType, rhs: impl Into<Source>, on: Option<Condition>) -> Source {
        Source::from(self).join(join_type, rhs, on)
    }
}

/// Heterogeneous list of expressions, for projections and groupings.
///
/// ```ignore
/// let query = books.select(exprs![&id, &title, count_all()]);
/// ```
#[macro_export]
macro_rules! exprs {
    ($($e:expr),* $(,)?) => {
        [$($crate::Expr::from($e)),*]
    };
}

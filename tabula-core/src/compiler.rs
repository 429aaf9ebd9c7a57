use crate::{
    CodecContext, ColumnType, Context as _, Dialect, Error, Expr, FieldIndex, Prepared, Query,
    Result, Source, SqlError, Statement, TableBuilder, Value, truncate_long,
    writer::{Context, SqlWriter},
};
use std::sync::Arc;
use time::UtcOffset;

/// SQL text of a statement together with its parameters in placeholder order.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    pub sql: String,
    pub params: Vec<(Value, ColumnType)>,
    /// Layout of the produced rows, for statements that return rows.
    pub fields: Option<Arc<FieldIndex>>,
    pub codec: CodecContext,
}

impl CompiledStatement {
    pub fn dialect(&self) -> Dialect {
        self.codec.dialect
    }

    /// Bind every parameter through the codec of its column.
    pub fn bind_to<P: Prepared + ?Sized>(&self, prepared: &mut P) -> Result<()> {
        for (i, (value, column_type)) in self.params.iter().enumerate() {
            column_type
                .bind(&self.codec, prepared, i as u64 + 1, value)
                .with_context(|| {
                    format!(
                        "While binding the parameter {} of the query:\n{}",
                        i + 1,
                        truncate_long!(self.sql)
                    )
                })?;
        }
        Ok(())
    }
}

/// Turns statements into dialect specific SQL.
///
/// The compiler holds no state besides the codec settings, one can be shared freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Compiler {
    codec: CodecContext,
}

/// Compile with the default settings of the dialect.
pub fn compile(statement: &Statement, dialect: Dialect) -> Result<CompiledStatement> {
    Compiler::new(dialect).compile(statement)
}

impl Compiler {
    pub const fn new(dialect: Dialect) -> Self {
        Self {
            codec: CodecContext::new(dialect),
        }
    }

    pub const fn with_time_zone(mut self, time_zone: UtcOffset) -> Self {
        self.codec = self.codec.with_time_zone(time_zone);
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.codec.dialect
    }

    pub fn codec(&self) -> &CodecContext {
        &self.codec
    }

    pub fn compile(&self, statement: &Statement) -> Result<CompiledStatement> {
        let mut context = Context::new(self.codec);
        let sql = self.write(&mut context, statement)?;
        let fields = match statement {
            Statement::Query(query) => Some(Arc::new(FieldIndex::new(query.fields()))),
            Statement::Insert(insert) if !insert.returning.is_empty() => {
                Some(Arc::new(FieldIndex::new(insert.returning.clone())))
            }
            _ => None,
        };
        Ok(CompiledStatement {
            sql,
            params: context.params,
            fields,
            codec: self.codec,
        })
    }

    /// Compile with every value rendered as a literal, as logs and scripts want it.
    pub fn compile_inline(&self, statement: &Statement) -> Result<String> {
        self.write(&mut Context::inline(self.codec), statement)
    }

    fn write(&self, context: &mut Context, statement: &Statement) -> Result<String> {
        let dialect = self.codec.dialect;
        let result = validate(statement, dialect).and_then(|_| {
            let writer = dialect.sql_writer();
            let mut out = String::with_capacity(128);
            write_statement(writer, context, &mut out, statement)?;
            Ok(out)
        });
        result.map_err(|e| {
            let error = e.context(format!(
                "While compiling {} for {}",
                statement_kind(statement),
                dialect
            ));
            log::error!("{:#}", error);
            error
        })
    }
}

fn write_statement(
    writer: &dyn SqlWriter,
    context: &mut Context,
    out: &mut String,
    statement: &Statement,
) -> Result<()> {
    match statement {
        Statement::Query(v) => writer.write_query(context, out, v),
        Statement::Insert(v) => writer.write_insert(context, out, v),
        Statement::Update(v) => writer.write_update(context, out, v),
        Statement::Delete(v) => writer.write_delete(context, out, v),
        Statement::CreateTable(v) => writer.write_create_table(context, out, v),
        Statement::DropTable(v) => writer.write_drop_table(context, out, v),
        Statement::CreateIndex(v) => writer.write_create_index(context, out, v),
        Statement::CreateSchema(v) => writer.write_create_schema(context, out, v),
        Statement::DropSchema(v) => writer.write_drop_schema(context, out, v),
    }
}

fn statement_kind(statement: &Statement) -> &'static str {
    match statement {
        Statement::Query(..) => "a query",
        Statement::Insert(..) => "an insert",
        Statement::Update(..) => "an update",
        Statement::Delete(..) => "a delete",
        Statement::CreateTable(..) => "a table creation",
        Statement::DropTable(..) => "a table drop",
        Statement::CreateIndex(..) => "an index creation",
        Statement::CreateSchema(..) => "a schema creation",
        Statement::DropSchema(..) => "a schema drop",
    }
}

/// Checks that every column the statement mentions belongs to a table the statement reads.
fn validate(statement: &Statement, dialect: Dialect) -> Result<()> {
    match statement {
        Statement::Query(query) => validate_query(query, &mut Vec::new()),
        Statement::Insert(insert) => {
            let table = insert.table.table_ref().reference_name();
            let scope = vec![table];
            if let Some(c) = insert
                .rows
                .iter()
                .flatten()
                .find(|v| !insert.table.columns().contains(&v.column))
            {
                return Err(dangling(&Expr::Column(c.column.clone()), c.column.table()));
            }
            for assignment in insert.rows.iter().flatten() {
                validate_expr(&assignment.value, &scope)?;
            }
            insert
                .returning
                .iter()
                .try_for_each(|v| validate_expr(v, &scope))
        }
        Statement::Update(update) => {
            let scope = vec![update.table.table_ref().reference_name()];
            for assignment in &update.assignments {
                if !update.table.columns().contains(&assignment.column) {
                    return Err(dangling(
                        &Expr::Column(assignment.column.clone()),
                        assignment.column.table(),
                    ));
                }
                validate_expr(&assignment.value, &scope)?;
            }
            update
                .predicate
                .iter()
                .try_for_each(|v| validate_expr(v, &scope))
        }
        Statement::Delete(delete) => {
            let scope = vec![delete.table.table_ref().reference_name()];
            delete
                .predicate
                .iter()
                .try_for_each(|v| validate_expr(v, &scope))
        }
        Statement::CreateTable(create) => TableBuilder::check_dialect(&create.table, dialect),
        _ => Ok(()),
    }
}

/// `scope` holds the names visible from the enclosing queries, correlated sub-queries use them.
fn validate_query<'q>(query: &'q Query, scope: &mut Vec<&'q str>) -> Result<()> {
    let outer = scope.len();
    validate_source(&query.source, scope)?;
    let exprs = query
        .projection
        .iter()
        .chain(query.predicate.iter())
        .chain(query.group_by.iter())
        .chain(query.having.iter())
        .chain(query.order_by.iter().map(|v| &v.expr));
    let result = exprs
        .into_iter()
        .try_for_each(|v| validate_expr_scoped(v, scope));
    scope.truncate(outer);
    result
}

fn validate_source<'q>(source: &'q Source, scope: &mut Vec<&'q str>) -> Result<()> {
    match source {
        Source::Table(table) => scope.push(table.table_ref().reference_name()),
        Source::Join(join) => {
            validate_source(&join.lhs, scope)?;
            validate_source(&join.rhs, scope)?;
            if let Some(on) = &join.on {
                validate_expr_scoped(on, scope)?;
            }
        }
        Source::SubQuery(query, alias) => {
            // Derived tables do not see the enclosing query
            validate_query(query, &mut Vec::new())?;
            scope.push(alias.as_str());
        }
    }
    Ok(())
}

fn validate_expr(expr: &Expr, scope: &[&str]) -> Result<()> {
    let mut scope = scope.to_vec();
    validate_expr_scoped(expr, &mut scope)
}

fn validate_expr_scoped<'q>(expr: &'q Expr, scope: &mut Vec<&'q str>) -> Result<()> {
    let mut result = Ok(());
    let mut queries: Vec<&'q Query> = Vec::new();
    expr.visit(&mut |e| {
        if result.is_err() {
            return;
        }
        let table = match e {
            Expr::Column(c) => c.table(),
            Expr::Reference(c, ..) => &c.table,
            Expr::SubQuery(q) | Expr::Exists(q) => {
                queries.push(q.as_ref());
                return;
            }
            _ => return,
        };
        if !table.is_empty() && !scope.contains(&table) {
            result = Err(dangling(e, table));
        }
    });
    result?;
    queries
        .into_iter()
        .try_for_each(|q| validate_query(q, scope))
}

fn dangling(expr: &Expr, table: &str) -> Error {
    Error::new(SqlError::DanglingReference {
        expression: expr.to_string(),
        table: table.to_string(),
    })
}

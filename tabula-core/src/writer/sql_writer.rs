use crate::{
    Action, BinaryOpType, ColumnDef, ColumnRef, ColumnType, CreateIndex, CreateSchema,
    CreateTable, Delete, Dialect, DropSchema, DropTable, Error, Expr, Function, IdentifierManager,
    Insert, IsolationLevel, JoinType, Order, Ordered, Query, Result, Source, SqlError, TableRef,
    UnaryOpType, Update, Value, possibly_parenthesized, try_separated_by,
    util::write_integer,
    writer::{Context, Fragment},
};
use std::sync::Arc;

/// Dialect printer converting statements and expressions into SQL text.
///
/// Every method has the portable rendering as default, dialect writers override what differs.
pub trait SqlWriter: Send + Sync {
    fn as_dyn(&self) -> &dyn SqlWriter;

    fn dialect(&self) -> Dialect;

    fn identifiers(&self) -> &'static IdentifierManager {
        self.dialect().identifier_manager()
    }

    /// Whether the current fragment context allows alias declaration.
    fn alias_declaration(&self, context: &mut Context) -> bool {
        matches!(
            context.fragment,
            Fragment::SqlSelect | Fragment::SqlReturning
        )
    }

    /// Write a single name, quoted when the dialect requires it.
    fn write_identifier(&self, _context: &mut Context, out: &mut String, name: &str) -> Result<()> {
        let identifiers = self.identifiers();
        identifiers.check_name_length(name)?;
        identifiers.write_if_necessary(out, name);
        Ok(())
    }

    /// Render a table reference with optional alias.
    fn write_table_ref(&self, context: &mut Context, out: &mut String, value: &TableRef) -> Result<()> {
        if !value.schema.is_empty() {
            self.write_identifier(context, out, &value.schema)?;
            out.push('.');
        }
        self.write_identifier(context, out, &value.name)?;
        if !value.alias.is_empty()
            && matches!(context.fragment, Fragment::SqlSelectFrom | Fragment::SqlJoin)
        {
            out.push(' ');
            self.write_identifier(context, out, &value.alias)?;
        }
        Ok(())
    }

    /// Render a column reference optionally qualifying with schema/table.
    fn write_column_ref(&self, context: &mut Context, out: &mut String, value: &ColumnRef) -> Result<()> {
        if context.qualify_columns && !value.table.is_empty() {
            if !value.schema.is_empty() {
                self.write_identifier(context, out, &value.schema)?;
                out.push('.');
            }
            self.write_identifier(context, out, &value.table)?;
            out.push('.');
        }
        self.write_identifier(context, out, &value.name)
    }

    /// Render the SQL type of a column.
    fn write_column_type(&self, _context: &mut Context, out: &mut String, value: &ColumnType) {
        value.write_sql_type(self.dialect(), out);
    }

    /// Render a value as a literal through its codec.
    fn write_literal(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Value,
        column_type: &ColumnType,
    ) -> Result<()> {
        column_type.render_literal(&context.codec, value, out)
    }

    /// Render a value as a placeholder, or as a literal in inline mode.
    fn write_param(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Value,
        column_type: &ColumnType,
    ) -> Result<()> {
        if context.inline {
            return self.write_literal(context, out, value, column_type);
        }
        context.params.push((value.clone(), *column_type));
        self.write_placeholder(context, out);
        Ok(())
    }

    /// Render parameter placeholder (dialect may override).
    fn write_placeholder(&self, _context: &mut Context, out: &mut String) {
        out.push('?');
    }

    /// Precedence table for unary operators.
    fn expression_unary_op_precedence(&self, value: &UnaryOpType) -> i32 {
        match value {
            UnaryOpType::Negative => 1250,
            UnaryOpType::Not => 250,
        }
    }

    /// Precedence table for binary operators.
    fn expression_binary_op_precedence(&self, value: &BinaryOpType) -> i32 {
        match value {
            BinaryOpType::Or => 100,
            BinaryOpType::And => 200,
            BinaryOpType::Equal => 300,
            BinaryOpType::NotEqual => 300,
            BinaryOpType::Less => 300,
            BinaryOpType::Greater => 300,
            BinaryOpType::LessEqual => 300,
            BinaryOpType::GreaterEqual => 300,
            BinaryOpType::Is => 400,
            BinaryOpType::IsNot => 400,
            BinaryOpType::Like => 400,
            BinaryOpType::NotLike => 400,
            BinaryOpType::BitwiseOr => 500,
            BinaryOpType::BitwiseAnd => 600,
            BinaryOpType::ShiftLeft => 700,
            BinaryOpType::ShiftRight => 700,
            BinaryOpType::Subtraction => 800,
            BinaryOpType::Addition => 800,
            BinaryOpType::Multiplication => 900,
            BinaryOpType::Division => 900,
            BinaryOpType::Remainder => 900,
        }
    }

    /// Lower numbers bind weaker, atoms never need parentheses.
    fn expression_precedence(&self, value: &Expr) -> i32 {
        match value {
            Expr::Unary(op, ..) => self.expression_unary_op_precedence(op),
            Expr::Binary(op, ..) => self.expression_binary_op_precedence(op),
            Expr::InList(..) => 400,
            Expr::Cast(..) => 1100,
            Expr::Alias(..) => 1200,
            _ => i32::MAX,
        }
    }

    /// Render any expression.
    fn write_expr(&self, context: &mut Context, out: &mut String, value: &Expr) -> Result<()> {
        match value {
            Expr::Column(c) => self.write_column_ref(context, out, &c.column_ref),
            Expr::Reference(c, ..) => {
                let mut context = context.switch_fragment(context.fragment);
                context.qualify_columns = true;
                self.write_column_ref(&mut context, out, c)
            }
            Expr::Param(v, t) => self.write_param(context, out, v, t),
            Expr::Literal(v, t) => self.write_literal(context, out, v, t),
            Expr::Raw(v, ..) => {
                out.push_str(v);
                Ok(())
            }
            Expr::Unary(op, arg) => self.write_expression_unary_op(context, out, *op, arg),
            Expr::Binary(op, lhs, rhs) => {
                self.write_expression_binary_op(context, out, *op, lhs, rhs)
            }
            Expr::Call(function, args) => self.write_function_call(context, out, *function, args),
            Expr::Cast(v, t) => self.write_cast(context, out, v, t),
            Expr::Alias(v, alias) => self.write_alias(context, out, v, alias),
            Expr::SubQuery(query) => {
                out.push('(');
                self.write_query(context, out, query)?;
                out.push(')');
                Ok(())
            }
            Expr::Exists(query) => {
                out.push_str("EXISTS (");
                self.write_query(context, out, query)?;
                out.push(')');
                Ok(())
            }
            Expr::InList(v, list, negated) => self.write_in_list(context, out, v, list, *negated),
            Expr::Asterisk => {
                out.push('*');
                Ok(())
            }
        }
    }

    /// Render unary operator expression.
    fn write_expression_unary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        op: UnaryOpType,
        arg: &Expr,
    ) -> Result<()> {
        match op {
            UnaryOpType::Negative => out.push('-'),
            UnaryOpType::Not => out.push_str("NOT "),
        };
        possibly_parenthesized!(
            out,
            self.expression_precedence(arg) <= self.expression_unary_op_precedence(&op),
            self.write_expr(context, out, arg)?
        );
        Ok(())
    }

    /// Render binary operator expression handling precedence / parenthesis.
    fn write_expression_binary_op(
        &self,
        context: &mut Context,
        out: &mut String,
        op: BinaryOpType,
        lhs: &Expr,
        rhs: &Expr,
    ) -> Result<()> {
        let infix = match op {
            BinaryOpType::Multiplication => " * ",
            BinaryOpType::Division => " / ",
            BinaryOpType::Remainder => " % ",
            BinaryOpType::Addition => " + ",
            BinaryOpType::Subtraction => " - ",
            BinaryOpType::ShiftLeft => " << ",
            BinaryOpType::ShiftRight => " >> ",
            BinaryOpType::BitwiseAnd => " & ",
            BinaryOpType::BitwiseOr => " | ",
            BinaryOpType::Is => " IS ",
            BinaryOpType::IsNot => " IS NOT ",
            BinaryOpType::Like => " LIKE ",
            BinaryOpType::NotLike => " NOT LIKE ",
            BinaryOpType::Equal => " = ",
            BinaryOpType::NotEqual => " <> ",
            BinaryOpType::Less => " < ",
            BinaryOpType::LessEqual => " <= ",
            BinaryOpType::Greater => " > ",
            BinaryOpType::GreaterEqual => " >= ",
            BinaryOpType::And => " AND ",
            BinaryOpType::Or => " OR ",
        };
        let precedence = self.expression_binary_op_precedence(&op);
        possibly_parenthesized!(
            out,
            self.expression_precedence(lhs) < precedence,
            self.write_expr(context, out, lhs)?
        );
        out.push_str(infix);
        possibly_parenthesized!(
            out,
            self.expression_precedence(rhs) <= precedence,
            self.write_expr(context, out, rhs)?
        );
        Ok(())
    }

    fn write_function_call(
        &self,
        context: &mut Context,
        out: &mut String,
        function: Function,
        args: &[Expr],
    ) -> Result<()> {
        out.push_str(function.name());
        out.push('(');
        if function == Function::CountDistinct {
            out.push_str("DISTINCT ");
        }
        try_separated_by(out, args, |out, v| self.write_expr(context, out, v), ", ")?;
        out.push(')');
        Ok(())
    }

    fn write_cast(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Expr,
        column_type: &ColumnType,
    ) -> Result<()> {
        out.push_str("CAST(");
        self.write_expr(context, out, value)?;
        out.push_str(" AS ");
        self.write_column_type(context, out, column_type);
        out.push(')');
        Ok(())
    }

    /// Aliases are declared in the projection, grouping and ordering refer to them by name,
    /// elsewhere the aliased expression is written.
    fn write_alias(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Expr,
        alias: &str,
    ) -> Result<()> {
        if matches!(
            context.fragment,
            Fragment::SqlSelectGroupBy | Fragment::SqlSelectOrderBy
        ) {
            return self.write_identifier(context, out, alias);
        }
        self.write_expr(context, out, value)?;
        if self.alias_declaration(context) {
            out.push_str(" AS ");
            self.write_identifier(context, out, alias)?;
        }
        Ok(())
    }

    fn write_in_list(
        &self,
        context: &mut Context,
        out: &mut String,
        value: &Expr,
        list: &[Expr],
        negated: bool,
    ) -> Result<()> {
        if list.is_empty() {
            // Nothing is in an empty list
            out.push_str(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }
        possibly_parenthesized!(
            out,
            self.expression_precedence(value) <= 400,
            self.write_expr(context, out, value)?
        );
        out.push_str(if negated { " NOT IN (" } else { " IN (" });
        try_separated_by(out, list, |out, v| self.write_expr(context, out, v), ", ")?;
        out.push(')');
        Ok(())
    }

    /// Render ordered expression inside ORDER BY.
    fn write_ordered(&self, context: &mut Context, out: &mut String, value: &Ordered) -> Result<()> {
        self.write_expr(context, out, &value.expr)?;
        out.push_str(match value.order {
            Order::Asc => " ASC",
            Order::Desc => " DESC",
        });
        Ok(())
    }

    /// Render join keyword(s) for the given join type.
    fn write_join_type(&self, _context: &mut Context, out: &mut String, join_type: &JoinType) -> Result<()> {
        out.push_str(match &join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => "FULL OUTER JOIN",
            JoinType::Cross => "CROSS JOIN",
        });
        Ok(())
    }

    /// Render the `FROM` part of a query.
    fn write_source(&self, context: &mut Context, out: &mut String, source: &Source) -> Result<()> {
        match source {
            Source::Table(table) => self.write_table_ref(context, out, table.table_ref()),
            Source::Join(join) => {
                let mut context = context.switch_fragment(Fragment::SqlJoin);
                context.qualify_columns = true;
                self.write_source(&mut context, out, &join.lhs)?;
                out.push(' ');
                self.write_join_type(&mut context, out, &join.join_type)?;
                out.push(' ');
                possibly_parenthesized!(
                    out,
                    matches!(join.rhs, Source::Join(..)),
                    self.write_source(&mut context, out, &join.rhs)?
                );
                if let Some(on) = &join.on {
                    out.push_str(" ON ");
                    self.write_expr(&mut context, out, on)?;
                }
                Ok(())
            }
            Source::SubQuery(query, alias) => {
                out.push('(');
                self.write_query(context, out, query)?;
                out.push_str(") ");
                self.write_identifier(context, out, alias)
            }
        }
    }

    /// Emit a SELECT statement.
    fn write_query(&self, context: &mut Context, out: &mut String, query: &Query) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlSelect);
        context.qualify_columns = query.source.qualify_columns();
        out.push_str("SELECT ");
        if query.distinct {
            out.push_str("DISTINCT ");
        }
        let fields = query.fields();
        if fields.is_empty() {
            out.push('*');
        }
        try_separated_by(
            out,
            &fields,
            |out, v| self.write_expr(&mut context, out, v),
            ", ",
        )?;
        out.push_str("\nFROM ");
        self.write_source(
            &mut context.switch_fragment(Fragment::SqlSelectFrom),
            out,
            &query.source,
        )?;
        if let Some(predicate) = &query.predicate {
            out.push_str("\nWHERE ");
            self.write_expr(
                &mut context.switch_fragment(Fragment::SqlSelectWhere),
                out,
                predicate,
            )?;
        }
        if !query.group_by.is_empty() {
            out.push_str("\nGROUP BY ");
            let mut context = context.switch_fragment(Fragment::SqlSelectGroupBy);
            try_separated_by(
                out,
                &query.group_by,
                |out, v| self.write_expr(&mut context, out, v),
                ", ",
            )?;
        }
        if let Some(having) = &query.having {
            out.push_str("\nHAVING ");
            self.write_expr(
                &mut context.switch_fragment(Fragment::SqlSelectHaving),
                out,
                having,
            )?;
        }
        self.write_order_by(&mut context, out, query)?;
        self.write_limit_offset(&mut context, out, query.limit, query.offset)?;
        if query.for_update {
            self.write_for_update(&mut context, out)?;
        }
        Ok(())
    }

    fn write_order_by(&self, context: &mut Context, out: &mut String, query: &Query) -> Result<()> {
        if query.order_by.is_empty() {
            return Ok(());
        }
        out.push_str("\nORDER BY ");
        let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        try_separated_by(
            out,
            &query.order_by,
            |out, v| self.write_ordered(&mut context, out, v),
            ", ",
        )
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<()> {
        if let Some(limit) = limit {
            out.push_str("\nLIMIT ");
            write_integer!(out, limit);
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
        Ok(())
    }

    /// Row locking, skipped on the dialects without it.
    fn write_for_update(&self, _context: &mut Context, out: &mut String) -> Result<()> {
        if self.dialect().supports_select_for_update() {
            out.push_str("\nFOR UPDATE");
        } else {
            log::warn!(
                "{} does not support row locking, FOR UPDATE is ignored",
                self.dialect()
            );
        }
        Ok(())
    }

    /// Emit INSERT (single/multi-row) optionally with the conflict handling.
    fn write_insert(&self, context: &mut Context, out: &mut String, insert: &Insert) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlInsertInto);
        context.qualify_columns = false;
        out.push_str("INSERT INTO ");
        self.write_table_ref(&mut context, out, insert.table.table_ref())?;
        let columns = insert.columns();
        if columns.is_empty() {
            if insert.rows.len() > 1 {
                return Err(SqlError::unsupported(
                    self.dialect(),
                    "Multi row insert of default values",
                ));
            }
            self.write_insert_default_values(&mut context, out)?;
        } else {
            out.push_str(" (");
            try_separated_by(
                out,
                &columns,
                |out, v| self.write_identifier(&mut context, out, v.name()),
                ", ",
            )?;
            out.push_str(") VALUES\n");
            let mut context = context.switch_fragment(Fragment::SqlInsertIntoValues);
            let single = insert.rows.len() == 1;
            for (i, row) in insert.rows.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                out.push('(');
                try_separated_by(
                    out,
                    &columns,
                    |out, column| match row.iter().find(|v| &v.column == column) {
                        Some(assignment) => self.write_expr(&mut context, out, &assignment.value),
                        None if !single => self.write_insert_default(&mut context, out),
                        None => Ok(()),
                    },
                    ", ",
                )?;
                out.push(')');
            }
        }
        if insert.upsert {
            self.write_upsert(&mut context, out, insert, &columns)?;
        }
        if !insert.returning.is_empty() {
            self.write_returning(&mut context, out, &insert.returning)?;
        }
        Ok(())
    }

    /// Insert of a row where every column takes its default.
    fn write_insert_default_values(&self, _context: &mut Context, out: &mut String) -> Result<()> {
        out.push_str(" DEFAULT VALUES");
        Ok(())
    }

    /// Value of a column that a row of a multi row insert omits.
    fn write_insert_default(&self, _context: &mut Context, out: &mut String) -> Result<()> {
        out.push_str("DEFAULT");
        Ok(())
    }

    /// Emit ON CONFLICT DO UPDATE fragment for upsert.
    fn write_upsert(
        &self,
        context: &mut Context,
        out: &mut String,
        insert: &Insert,
        columns: &[Arc<ColumnDef>],
    ) -> Result<()> {
        if !self.dialect().supports_upsert() {
            return Err(SqlError::unsupported(self.dialect(), "Upsert"));
        }
        let pk = insert.table.primary_key();
        if pk.is_empty() {
            return Err(Error::msg(format!(
                "Upsert into `{}` requires a primary key",
                insert.table.name()
            )));
        }
        let mut context = context.switch_fragment(Fragment::SqlInsertIntoOnConflict);
        out.push_str("\nON CONFLICT (");
        try_separated_by(
            out,
            pk,
            |out, v| self.write_identifier(&mut context, out, v.name()),
            ", ",
        )?;
        out.push(')');
        let updated: Vec<_> = columns.iter().filter(|c| !pk.contains(*c)).collect();
        if updated.is_empty() {
            out.push_str(" DO NOTHING");
            return Ok(());
        }
        out.push_str(" DO UPDATE SET\n");
        try_separated_by(
            out,
            updated,
            |out, v| {
                self.write_identifier(&mut context, out, v.name())?;
                out.push_str(" = EXCLUDED.");
                self.write_identifier(&mut context, out, v.name())
            },
            ",\n",
        )
    }

    fn write_returning(&self, context: &mut Context, out: &mut String, exprs: &[Expr]) -> Result<()> {
        if !self.dialect().supports_returning() {
            return Err(SqlError::unsupported(self.dialect(), "RETURNING clause"));
        }
        let mut context = context.switch_fragment(Fragment::SqlReturning);
        out.push_str("\nRETURNING ");
        try_separated_by(
            out,
            exprs,
            |out, v| self.write_expr(&mut context, out, v),
            ", ",
        )
    }

    fn write_update(&self, context: &mut Context, out: &mut String, update: &Update) -> Result<()> {
        if update.assignments.is_empty() {
            return Err(Error::msg(format!(
                "Update of `{}` does not set any column",
                update.table.name()
            )));
        }
        let mut context = context.switch_fragment(Fragment::SqlUpdateSet);
        context.qualify_columns = false;
        out.push_str("UPDATE ");
        self.write_table_ref(&mut context, out, update.table.table_ref())?;
        out.push_str(" SET\n");
        try_separated_by(
            out,
            &update.assignments,
            |out, v| {
                self.write_identifier(&mut context, out, v.column.name())?;
                out.push_str(" = ");
                self.write_expr(&mut context, out, &v.value)
            },
            ",\n",
        )?;
        if let Some(predicate) = &update.predicate {
            out.push_str("\nWHERE ");
            self.write_expr(
                &mut context.switch_fragment(Fragment::SqlUpdateWhere),
                out,
                predicate,
            )?;
        }
        Ok(())
    }

    /// Emit DELETE statement with WHERE clause.
    fn write_delete(&self, context: &mut Context, out: &mut String, delete: &Delete) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlDeleteFrom);
        context.qualify_columns = false;
        out.push_str("DELETE FROM ");
        self.write_table_ref(&mut context, out, delete.table.table_ref())?;
        if let Some(predicate) = &delete.predicate {
            out.push_str("\nWHERE ");
            self.write_expr(
                &mut context.switch_fragment(Fragment::SqlDeleteFromWhere),
                out,
                predicate,
            )?;
        }
        Ok(())
    }

    /// Emit CREATE TABLE with columns and constraints.
    fn write_create_table(
        &self,
        context: &mut Context,
        out: &mut String,
        create: &CreateTable,
    ) -> Result<()> {
        let table = &create.table;
        let mut context = context.switch_fragment(Fragment::SqlCreateTable);
        context.qualify_columns = false;
        out.push_str("CREATE TABLE ");
        if create.if_not_exists {
            self.write_if_not_exists(&mut context, out)?;
        }
        self.write_table_ref(&mut context, out, table.table_ref())?;
        out.push_str(" (\n");
        let single_pk = table.primary_key().len() == 1;
        try_separated_by(
            out,
            table.columns(),
            |out, v| {
                let primary_key = single_pk && table.primary_key().contains(v);
                self.write_create_table_column_fragment(&mut context, out, v, primary_key)
            },
            ",\n",
        )?;
        if table.primary_key().len() > 1 {
            out.push_str(",\nPRIMARY KEY (");
            let mut context = context.switch_fragment(Fragment::SqlCreateTablePrimaryKey);
            try_separated_by(
                out,
                table.primary_key(),
                |out, v| self.write_identifier(&mut context, out, v.name()),
                ", ",
            )?;
            out.push(')');
        }
        for unique in &table.def().unique {
            out.push_str(",\nUNIQUE (");
            let mut context = context.switch_fragment(Fragment::SqlCreateTableUnique);
            try_separated_by(
                out,
                unique,
                |out, v| self.write_identifier(&mut context, out, v.name()),
                ", ",
            )?;
            out.push(')');
        }
        for foreign_key in &table.def().foreign_keys {
            out.push_str(",\nFOREIGN KEY (");
            try_separated_by(
                out,
                &foreign_key.columns,
                |out, v| self.write_identifier(&mut context, out, v.name()),
                ", ",
            )?;
            out.push_str(") REFERENCES ");
            self.write_table_ref(&mut context, out, &foreign_key.target)?;
            out.push('(');
            try_separated_by(
                out,
                &foreign_key.target_columns,
                |out, v| self.write_identifier(&mut context, out, v),
                ", ",
            )?;
            out.push(')');
            self.write_references_actions(
                &mut context,
                out,
                foreign_key.on_delete,
                foreign_key.on_update,
            );
        }
        out.push_str("\n)");
        Ok(())
    }

    fn write_if_not_exists(&self, _context: &mut Context, out: &mut String) -> Result<()> {
        if !self.dialect().supports_if_not_exists() {
            return Err(SqlError::unsupported(self.dialect(), "IF NOT EXISTS"));
        }
        out.push_str("IF NOT EXISTS ");
        Ok(())
    }

    fn write_if_exists(&self, _context: &mut Context, out: &mut String) -> Result<()> {
        if !self.dialect().supports_drop_if_exists() {
            return Err(SqlError::unsupported(self.dialect(), "DROP TABLE IF EXISTS"));
        }
        out.push_str("IF EXISTS ");
        Ok(())
    }

    /// Emit single column definition fragment.
    fn write_create_table_column_fragment(
        &self,
        context: &mut Context,
        out: &mut String,
        column: &ColumnDef,
        primary_key: bool,
    ) -> Result<()> {
        self.write_identifier(context, out, column.name())?;
        out.push(' ');
        self.write_column_type(context, out, &column.column_type);
        if column.is_auto_increment() {
            self.write_auto_increment(context, out, column, primary_key)?;
        }
        if let Some(default) = &column.default {
            out.push_str(" DEFAULT ");
            let mut context = context.switch_fragment(Fragment::SqlCreateTableDefault);
            context.inline = true;
            self.write_expr(&mut context, out, default)?;
        }
        if !column.nullable && !primary_key {
            out.push_str(" NOT NULL");
        }
        if primary_key {
            self.write_primary_key_inline(context, out, column)?;
        }
        if column.unique && !primary_key {
            out.push_str(" UNIQUE");
        }
        if let Some(references) = &column.references {
            out.push_str(" REFERENCES ");
            self.write_table_ref(context, out, &references.table_ref())?;
            out.push('(');
            self.write_identifier(context, out, &references.name)?;
            out.push(')');
            self.write_references_actions(context, out, column.on_delete, column.on_update);
        }
        if !column.comment.is_empty() {
            self.write_column_comment_inline(context, out, column)?;
        }
        Ok(())
    }

    /// Single column primary key.
    fn write_primary_key_inline(
        &self,
        _context: &mut Context,
        out: &mut String,
        _column: &ColumnDef,
    ) -> Result<()> {
        out.push_str(" PRIMARY KEY");
        Ok(())
    }

    /// Integer generated by the database, written right after the column type.
    fn write_auto_increment(
        &self,
        _context: &mut Context,
        out: &mut String,
        _column: &ColumnDef,
        _primary_key: bool,
    ) -> Result<()> {
        out.push_str(" GENERATED BY DEFAULT AS IDENTITY");
        Ok(())
    }

    fn write_references_actions(
        &self,
        context: &mut Context,
        out: &mut String,
        on_delete: Option<Action>,
        on_update: Option<Action>,
    ) {
        if let Some(on_delete) = &on_delete {
            out.push_str(" ON DELETE ");
            self.write_create_table_references_action(context, out, on_delete);
        }
        if let Some(on_update) = &on_update {
            out.push_str(" ON UPDATE ");
            self.write_create_table_references_action(context, out, on_update);
        }
    }

    /// Emit referential action keyword.
    fn write_create_table_references_action(
        &self,
        _context: &mut Context,
        out: &mut String,
        action: &Action,
    ) {
        out.push_str(match action {
            Action::NoAction => "NO ACTION",
            Action::Restrict => "RESTRICT",
            Action::Cascade => "CASCADE",
            Action::SetNull => "SET NULL",
            Action::SetDefault => "SET DEFAULT",
        });
    }

    /// Only the dialects with inline column comments write them.
    fn write_column_comment_inline(
        &self,
        _context: &mut Context,
        _out: &mut String,
        column: &ColumnDef,
    ) -> Result<()> {
        log::debug!(
            "{} has no inline column comments, the comment of `{}` is not written",
            self.dialect(),
            column.name()
        );
        Ok(())
    }

    /// Emit DROP TABLE statement.
    fn write_drop_table(&self, context: &mut Context, out: &mut String, drop: &DropTable) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlDropTable);
        out.push_str("DROP TABLE ");
        if drop.if_exists {
            self.write_if_exists(&mut context, out)?;
        }
        self.write_table_ref(&mut context, out, &drop.table)?;
        if drop.cascade {
            out.push_str(" CASCADE");
        }
        Ok(())
    }

    fn write_create_index(
        &self,
        context: &mut Context,
        out: &mut String,
        create: &CreateIndex,
    ) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlCreateIndex);
        context.qualify_columns = false;
        out.push_str("CREATE ");
        if create.index.unique {
            out.push_str("UNIQUE ");
        }
        out.push_str("INDEX ");
        if create.if_not_exists {
            self.write_if_not_exists(&mut context, out)?;
        }
        self.write_identifier(&mut context, out, &create.index.name)?;
        out.push_str(" ON ");
        self.write_table_ref(&mut context, out, create.table.table_ref())?;
        out.push_str(" (");
        try_separated_by(
            out,
            &create.index.columns,
            |out, v| self.write_identifier(&mut context, out, v.name()),
            ", ",
        )?;
        out.push(')');
        Ok(())
    }

    /// Emit CREATE SCHEMA.
    fn write_create_schema(
        &self,
        context: &mut Context,
        out: &mut String,
        create: &CreateSchema,
    ) -> Result<()> {
        if !self.dialect().supports_schemas() {
            return Err(SqlError::unsupported(self.dialect(), "Schemas"));
        }
        let mut context = context.switch_fragment(Fragment::SqlCreateSchema);
        out.push_str("CREATE SCHEMA ");
        if create.if_not_exists {
            self.write_if_not_exists(&mut context, out)?;
        }
        self.write_identifier(&mut context, out, &create.name)
    }

    /// Emit DROP SCHEMA.
    fn write_drop_schema(&self, context: &mut Context, out: &mut String, drop: &DropSchema) -> Result<()> {
        if !self.dialect().supports_schemas() {
            return Err(SqlError::unsupported(self.dialect(), "Schemas"));
        }
        let mut context = context.switch_fragment(Fragment::SqlDropSchema);
        out.push_str("DROP SCHEMA ");
        if drop.if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_identifier(&mut context, out, &drop.name)?;
        if drop.cascade {
            out.push_str(" CASCADE");
        }
        Ok(())
    }

    fn write_isolation_level(&self, out: &mut String, isolation: IsolationLevel) {
        out.push_str("ISOLATION LEVEL ");
        out.push_str(isolation.sql());
    }

    /// Emit the statements starting a transaction, separated by `;\n`.
    fn write_transaction_begin(
        &self,
        out: &mut String,
        isolation: Option<IsolationLevel>,
        read_only: bool,
    ) {
        out.push_str("BEGIN");
        if isolation.is_some() || read_only {
            out.push_str(";\nSET TRANSACTION ");
            if let Some(isolation) = isolation {
                self.write_isolation_level(out, isolation);
                if read_only {
                    out.push_str(", ");
                }
            }
            if read_only {
                out.push_str("READ ONLY");
            }
        }
    }

    /// Emit COMMIT statement.
    fn write_transaction_commit(&self, out: &mut String) {
        out.push_str("COMMIT");
    }

    /// Emit ROLLBACK statement.
    fn write_transaction_rollback(&self, out: &mut String) {
        out.push_str("ROLLBACK");
    }

    fn write_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("SAVEPOINT ");
        self.identifiers().write_if_necessary(out, name);
    }

    /// Nothing is written by the dialects that release savepoints implicitly.
    fn write_release_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("RELEASE SAVEPOINT ");
        self.identifiers().write_if_necessary(out, name);
    }

    fn write_rollback_to_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("ROLLBACK TO SAVEPOINT ");
        self.identifiers().write_if_necessary(out, name);
    }
}

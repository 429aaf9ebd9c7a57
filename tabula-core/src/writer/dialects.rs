use crate::{
    ColumnDef, Dialect, Insert, IsolationLevel, JoinType, Query, Result, SqlError,
    codec::write_quoted_string,
    util::write_integer,
    writer::{Context, Fragment, SqlWriter},
};
use std::sync::Arc;

pub struct PostgresSqlWriter {}

impl SqlWriter for PostgresSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn write_placeholder(&self, context: &mut Context, out: &mut String) {
        out.push('$');
        write_integer!(out, context.params.len());
    }
}

pub struct MySqlSqlWriter {}

impl SqlWriter for MySqlSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    fn write_join_type(&self, _context: &mut Context, out: &mut String, join_type: &JoinType) -> Result<()> {
        out.push_str(match join_type {
            JoinType::Inner => "INNER JOIN",
            JoinType::Left => "LEFT JOIN",
            JoinType::Right => "RIGHT JOIN",
            JoinType::Full => return Err(SqlError::unsupported(Dialect::MySql, "FULL OUTER JOIN")),
            JoinType::Cross => "CROSS JOIN",
        });
        Ok(())
    }

    /// MySQL cannot skip rows without a row count, the largest one stands for no limit.
    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<()> {
        match (limit, offset) {
            (Some(limit), _) => {
                out.push_str("\nLIMIT ");
                write_integer!(out, limit);
            }
            (None, Some(..)) => out.push_str("\nLIMIT 18446744073709551615"),
            (None, None) => {}
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
        Ok(())
    }

    fn write_insert_default_values(&self, _context: &mut Context, out: &mut String) -> Result<()> {
        out.push_str(" () VALUES ()");
        Ok(())
    }

    fn write_upsert(
        &self,
        context: &mut Context,
        out: &mut String,
        insert: &Insert,
        columns: &[Arc<ColumnDef>],
    ) -> Result<()> {
        let pk = insert.table.primary_key();
        let mut context = context.switch_fragment(Fragment::SqlInsertIntoOnConflict);
        out.push_str("\nON DUPLICATE KEY UPDATE\n");
        let updated: Vec<_> = columns.iter().filter(|c| !pk.contains(*c)).collect();
        // Assigning a key column to itself turns the statement into insert or ignore
        let updated = if updated.is_empty() {
            pk.iter().take(1).collect()
        } else {
            updated
        };
        crate::try_separated_by(
            out,
            updated,
            |out, v| {
                self.write_identifier(&mut context, out, v.name())?;
                out.push_str(" = VALUES(");
                self.write_identifier(&mut context, out, v.name())?;
                out.push(')');
                Ok(())
            },
            ",\n",
        )
    }

    fn write_auto_increment(
        &self,
        _context: &mut Context,
        out: &mut String,
        _column: &ColumnDef,
        _primary_key: bool,
    ) -> Result<()> {
        out.push_str(" AUTO_INCREMENT");
        Ok(())
    }

    fn write_column_comment_inline(
        &self,
        _context: &mut Context,
        out: &mut String,
        column: &ColumnDef,
    ) -> Result<()> {
        out.push_str(" COMMENT ");
        write_quoted_string(out, &column.comment);
        Ok(())
    }

    fn write_transaction_begin(
        &self,
        out: &mut String,
        isolation: Option<IsolationLevel>,
        read_only: bool,
    ) {
        if let Some(isolation) = isolation {
            out.push_str("SET TRANSACTION ");
            self.write_isolation_level(out, isolation);
            out.push_str(";\n");
        }
        out.push_str("START TRANSACTION");
        if read_only {
            out.push_str(" READ ONLY");
        }
    }
}

pub struct SqliteSqlWriter {}

impl SqlWriter for SqliteSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    /// A negative limit means no limit.
    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<()> {
        match (limit, offset) {
            (Some(limit), _) => {
                out.push_str("\nLIMIT ");
                write_integer!(out, limit);
            }
            (None, Some(..)) => out.push_str("\nLIMIT -1"),
            (None, None) => {}
        }
        if let Some(offset) = offset {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
        }
        Ok(())
    }

    fn write_insert_default(&self, _context: &mut Context, _out: &mut String) -> Result<()> {
        Err(SqlError::unsupported(
            Dialect::Sqlite,
            "DEFAULT in a multi row insert",
        ))
    }

    fn write_primary_key_inline(
        &self,
        _context: &mut Context,
        out: &mut String,
        column: &ColumnDef,
    ) -> Result<()> {
        out.push_str(" PRIMARY KEY");
        if column.is_auto_increment() {
            out.push_str(" AUTOINCREMENT");
        }
        Ok(())
    }

    /// Only an `INTEGER PRIMARY KEY` column can be generated.
    fn write_auto_increment(
        &self,
        _context: &mut Context,
        _out: &mut String,
        _column: &ColumnDef,
        primary_key: bool,
    ) -> Result<()> {
        if !primary_key {
            return Err(SqlError::unsupported(
                Dialect::Sqlite,
                "Auto increment column outside a single column primary key",
            ));
        }
        Ok(())
    }

    fn write_drop_table(
        &self,
        context: &mut Context,
        out: &mut String,
        drop: &crate::DropTable,
    ) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlDropTable);
        out.push_str("DROP TABLE ");
        if drop.if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_table_ref(&mut context, out, &drop.table)
    }

    /// SQLite transactions are always serializable, a read only one sets the connection read only.
    fn write_transaction_begin(
        &self,
        out: &mut String,
        _isolation: Option<IsolationLevel>,
        read_only: bool,
    ) {
        if read_only {
            out.push_str("PRAGMA query_only = ON;\n");
        }
        out.push_str("BEGIN");
    }
}

pub struct H2SqlWriter {}

impl SqlWriter for H2SqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::H2
    }

    fn write_transaction_begin(
        &self,
        out: &mut String,
        isolation: Option<IsolationLevel>,
        _read_only: bool,
    ) {
        if let Some(isolation) = isolation {
            out.push_str("SET SESSION CHARACTERISTICS AS TRANSACTION ");
            self.write_isolation_level(out, isolation);
            out.push_str(";\n");
        }
        out.push_str("BEGIN");
    }
}

pub struct OracleSqlWriter {}

impl SqlWriter for OracleSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::Oracle
    }

    fn write_limit_offset(
        &self,
        _context: &mut Context,
        out: &mut String,
        limit: Option<u64>,
        offset: Option<u64>,
    ) -> Result<()> {
        write_offset_fetch(out, limit, offset, false);
        Ok(())
    }

    fn write_insert_default_values(&self, _context: &mut Context, _out: &mut String) -> Result<()> {
        Err(SqlError::unsupported(
            Dialect::Oracle,
            "Insert of a row made only of default values",
        ))
    }

    fn write_drop_table(
        &self,
        context: &mut Context,
        out: &mut String,
        drop: &crate::DropTable,
    ) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlDropTable);
        out.push_str("DROP TABLE ");
        if drop.if_exists {
            self.write_if_exists(&mut context, out)?;
        }
        self.write_table_ref(&mut context, out, &drop.table)?;
        if drop.cascade {
            out.push_str(" CASCADE CONSTRAINTS");
        }
        Ok(())
    }

    /// Transactions start implicitly, only their characteristics are set.
    fn write_transaction_begin(
        &self,
        out: &mut String,
        isolation: Option<IsolationLevel>,
        read_only: bool,
    ) {
        if read_only {
            out.push_str("SET TRANSACTION READ ONLY");
        } else if let Some(isolation) = isolation {
            out.push_str("SET TRANSACTION ");
            self.write_isolation_level(out, isolation);
        }
    }

    fn write_release_savepoint(&self, _out: &mut String, _name: &str) {}
}

pub struct SqlServerSqlWriter {}

impl SqlWriter for SqlServerSqlWriter {
    fn as_dyn(&self) -> &dyn SqlWriter {
        self
    }

    fn dialect(&self) -> Dialect {
        Dialect::SqlServer
    }

    /// Offset and fetch require an ordering.
    fn write_order_by(&self, context: &mut Context, out: &mut String, query: &Query) -> Result<()> {
        if query.order_by.is_empty() {
            if query.limit.is_some() || query.offset.is_some() {
                out.push_str("\nORDER BY (SELECT NULL)");
            }
            return Ok(());
        }
        out.push_str("\nORDER BY ");
        let mut context = context.switch_fragment(Fragment::SqlSelectOrderBy);
        crate::try_separated_by(
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
        write_offset_fetch(out, limit, offset, true);
        Ok(())
    }

    fn write_auto_increment(
        &self,
        _context: &mut Context,
        out: &mut String,
        _column: &ColumnDef,
        _primary_key: bool,
    ) -> Result<()> {
        out.push_str(" IDENTITY(1,1)");
        Ok(())
    }

    fn write_drop_table(
        &self,
        context: &mut Context,
        out: &mut String,
        drop: &crate::DropTable,
    ) -> Result<()> {
        let mut context = context.switch_fragment(Fragment::SqlDropTable);
        out.push_str("DROP TABLE ");
        if drop.if_exists {
            out.push_str("IF EXISTS ");
        }
        self.write_table_ref(&mut context, out, &drop.table)
    }

    fn write_transaction_begin(
        &self,
        out: &mut String,
        isolation: Option<IsolationLevel>,
        _read_only: bool,
    ) {
        if let Some(isolation) = isolation {
            out.push_str("SET TRANSACTION ");
            self.write_isolation_level(out, isolation);
            out.push_str(";\n");
        }
        out.push_str("BEGIN TRANSACTION");
    }

    fn write_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("SAVE TRANSACTION ");
        self.identifiers().write_if_necessary(out, name);
    }

    fn write_release_savepoint(&self, _out: &mut String, _name: &str) {}

    fn write_rollback_to_savepoint(&self, out: &mut String, name: &str) {
        out.push_str("ROLLBACK TRANSACTION ");
        self.identifiers().write_if_necessary(out, name);
    }
}

/// Standard row limiting clause of Oracle and SQL Server.
fn write_offset_fetch(out: &mut String, limit: Option<u64>, offset: Option<u64>, offset_required: bool) {
    match offset {
        Some(offset) => {
            out.push_str("\nOFFSET ");
            write_integer!(out, offset);
            out.push_str(" ROWS");
        }
        None if offset_required && limit.is_some() => out.push_str("\nOFFSET 0 ROWS"),
        None => {}
    }
    if let Some(limit) = limit {
        out.push_str(if offset.is_some() || offset_required {
            "\nFETCH NEXT "
        } else {
            "\nFETCH FIRST "
        });
        write_integer!(out, limit);
        out.push_str(" ROWS ONLY");
    }
}

use crate::{
    CancelHandle, CompiledStatement, Compiler, CompositeKey, Connection, Context as _,
    CreateTable, DatabaseConfig, DatabaseMetadata, Dialect, DropTable, Error, Executable, Expr,
    Insert, IntoKey, Query, Result, ResultRow, RowsAffected, SqlError, Statement, Table, Value,
    closed_connection,
    stream::{Stream, StreamExt, TryStreamExt},
    truncate_long,
};
use async_stream::try_stream;
use std::{pin::pin, sync::Arc};

/// Life cycle of a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionState {
    NotStarted,
    Active,
    Committed,
    RolledBack,
}

/// A unit of work bound to one connection for its whole life.
///
/// Statements run in the order they are issued. Every statement method requires the transaction
/// to be [`TransactionState::Active`].
pub struct Transaction<C: Connection> {
    connection: Option<C>,
    compiler: Compiler,
    config: Arc<DatabaseConfig>,
    state: TransactionState,
    attempt: u32,
    savepoints: Vec<String>,
}

impl<C: Connection> Transaction<C> {
    /// Start a transaction on the connection, applying the isolation and access mode of the
    /// configuration.
    /// Start a transaction on the connection.
    ///
    /// When the transaction cannot start the connection is closed before the error is returned.
    pub async fn begin(connection: C, config: Arc<DatabaseConfig>, attempt: u32) -> Result<Self> {
        let dialect = connection.dialect();
        let mut result = Self {
            connection: Some(connection),
            compiler: Compiler::new(dialect).with_time_zone(config.default_time_zone),
            config,
            state: TransactionState::NotStarted,
            attempt,
            savepoints: Vec::new(),
        };
        if let Err(error) = result.start().await {
            if let Some(connection) = result.connection.take() {
                if !connection.is_closed() {
                    if let Err(e) = connection.close().await {
                        log::warn!("Could not close the connection: {:#}", e);
                    }
                }
            }
            return Err(error);
        }
        Ok(result)
    }

    async fn start(&mut self) -> Result<()> {
        let dialect = self.dialect();
        let config = self.config.clone();
        let connection = self.connection()?;
        if connection.is_closed() {
            return Err(closed_connection(dialect));
        }
        connection.set_query_timeout(config.statement_timeout)?;
        connection.set_fetch_size(config.default_fetch_size);
        connection
            .begin(config.isolation_level, config.read_only)
            .await
            .with_context(|| format!("While starting a transaction on {}", dialect))?;
        log::debug!("Transaction started on {} (attempt {})", dialect, self.attempt);
        self.state = TransactionState::Active;
        Ok(())
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// Attempt this unit of work is running, starting from 1.
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn dialect(&self) -> Dialect {
        self.compiler.dialect()
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    /// Names of the savepoints still valid, the oldest first.
    pub fn savepoints(&self) -> &[String] {
        &self.savepoints
    }

    fn connection(&mut self) -> Result<&mut C> {
        let dialect = self.compiler.dialect();
        self.connection
            .as_mut()
            .ok_or_else(|| closed_connection(dialect))
    }

    fn ensure_active(&self) -> Result<()> {
        if self.state != TransactionState::Active {
            let error = Error::new(SqlError::TransactionNotActive { state: self.state });
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    async fn prepare(&mut self, compiled: &CompiledStatement) -> Result<Executable<C::Prepared>> {
        log::debug!("{}", truncate_long!(compiled.sql));
        let mut executable = self
            .connection()?
            .prepare(compiled.sql.clone())
            .await
            .with_context(|| {
                format!("While preparing the query:\n{}", truncate_long!(compiled.sql))
            })?;
        if !compiled.params.is_empty() {
            compiled.bind_to(executable.prepared_mut()?)?;
        }
        Ok(executable)
    }

    /// Execute a statement that produces no rows.
    pub async fn exec(&mut self, statement: impl Into<Statement>) -> Result<RowsAffected> {
        let statement = statement.into();
        self.ensure_active()?;
        let compiled = self.compiler.compile(&statement)?;
        self.execute_compiled(&compiled).await
    }

    async fn execute_compiled(&mut self, compiled: &CompiledStatement) -> Result<RowsAffected> {
        let executable = self.prepare(compiled).await?;
        self.connection()?
            .execute(executable)
            .await
            .with_context(|| {
                format!("While executing the query:\n{}", truncate_long!(compiled.sql))
            })
    }

    /// Execute the statements one after the other, the counts are summed.
    pub async fn exec_batch(
        &mut self,
        statements: impl IntoIterator<Item = Statement>,
    ) -> Result<RowsAffected> {
        let statements: Vec<Statement> = statements.into_iter().collect();
        let mut result = RowsAffected::default();
        for statement in statements {
            result.extend([self.exec(statement).await?]);
        }
        Ok(result)
    }

    /// Stream the rows of the query.
    pub fn select<'t>(&'t mut self, query: &Query) -> impl Stream<Item = Result<ResultRow>> + Send + 't {
        let compiled = self.compiler.compile(&Statement::Query(query.clone()));
        try_stream! {
            self.ensure_active()?;
            let compiled = compiled?;
            let fields = compiled
                .fields
                .clone()
                .ok_or_else(|| Error::msg("The statement does not produce rows"))?;
            let executable = self.prepare(&compiled).await?;
            let connection = self.connection()?;
            let mut stream = pin!(connection.fetch(executable));
            while let Some(row) = stream.next().await {
                let row = row.with_context(|| {
                    format!("While fetching the rows of the query:\n{}", truncate_long!(compiled.sql))
                })?;
                yield ResultRow::from_raw(fields.clone(), &row, &compiled.codec)?;
            }
        }
    }

    pub async fn fetch_all(&mut self, query: &Query) -> Result<Vec<ResultRow>> {
        self.select(query).try_collect().await
    }

    /// The first row of the query, the remaining ones are discarded.
    pub async fn fetch_one(&mut self, query: &Query) -> Result<Option<ResultRow>> {
        let mut stream = pin!(self.select(query));
        stream.try_next().await
    }

    /// Number of rows the query returns, honoring its distinct, grouping, limit and offset.
    pub async fn count(&mut self, query: &Query) -> Result<i64> {
        let count = query.count_query();
        let Some(row) = self.fetch_one(&count).await? else {
            return Ok(0);
        };
        let value = row
            .fields()
            .first()
            .map(|field| row.get_value(field))
            .transpose()?
            .cloned()
            .unwrap_or(Value::Int64(None));
        Ok(value.as_i64().unwrap_or(0))
    }

    /// The query returns no row.
    pub async fn is_empty(&mut self, query: &Query) -> Result<bool> {
        let exists = query.exists_query(self.dialect());
        Ok(self.fetch_one(&exists).await?.is_none())
    }

    /// Row of the table identified by the key.
    pub async fn find_by_key(&mut self, table: &Table, key: impl IntoKey) -> Result<Option<ResultRow>> {
        let key = key.into_key(&table.identity())?;
        self.fetch_one(&table.select_all().filter(key.condition()))
            .await
    }

    /// Insert a single row and return its identity, including the values generated by the
    /// database.
    pub async fn insert_and_get_key(&mut self, insert: Insert) -> Result<CompositeKey> {
        self.ensure_active()?;
        let identity = insert.table.identity();
        if self.dialect().supports_returning() {
            let insert = insert.returning(identity.columns().iter().cloned().map(Expr::Column));
            let compiled = self.compiler.compile(&insert.into())?;
            let fields = compiled.fields.clone();
            let executable = self.prepare(&compiled).await?;
            let row = {
                let mut stream = pin!(self.connection()?.fetch(executable));
                stream.try_next().await?
            };
            let (Some(fields), Some(row)) = (fields, row) else {
                let error = Error::msg("The insert did not return the generated key");
                log::error!("{:#}", error);
                return Err(error);
            };
            return ResultRow::from_raw(fields, &row, &compiled.codec)?.key(&identity);
        }
        let compiled = self.compiler.compile(&Statement::Insert(insert.clone()))?;
        let affected = self.execute_compiled(&compiled).await?;
        let mut builder = CompositeKey::builder(&identity);
        for column in identity.columns() {
            match insert.value(0, column) {
                Some(Expr::Param(value, ..) | Expr::Literal(value, ..)) => {
                    builder = builder.set_value(column, value.clone());
                }
                _ if column.is_auto_increment() => {
                    if let Some(id) = affected.last_affected_id {
                        builder = builder.set_value(column, Value::Int64(Some(id)));
                    }
                }
                _ => {}
            }
        }
        builder.build()
    }

    pub async fn metadata(&mut self) -> Result<DatabaseMetadata> {
        self.ensure_active()?;
        self.connection()?.metadata().await
    }

    pub async fn table_exists(&mut self, table: &Table) -> Result<bool> {
        let dialect = self.dialect();
        Ok(self
            .metadata()
            .await?
            .table(dialect, table.table_ref())
            .is_some())
    }

    /// Create the table and its indices.
    ///
    /// On dialects without `IF NOT EXISTS` the existence is checked through the metadata.
    pub async fn create_table(&mut self, create: &CreateTable) -> Result<()> {
        let mut create = create.clone();
        if create.if_not_exists && !self.dialect().supports_if_not_exists() {
            if self.table_exists(&create.table).await? {
                log::debug!("Table {} already exists", create.table.table_ref().full_name());
                return Ok(());
            }
            create.if_not_exists = false;
        }
        for statement in create.statements() {
            self.exec(statement).await?;
        }
        Ok(())
    }

    /// Drop the table.
    ///
    /// On dialects without `DROP TABLE IF EXISTS` the existence is checked through the metadata.
    pub async fn drop_table(&mut self, drop: &DropTable) -> Result<()> {
        let mut drop = drop.clone();
        if drop.if_exists && !self.dialect().supports_drop_if_exists() {
            let dialect = self.dialect();
            if self.metadata().await?.table(dialect, &drop.table).is_none() {
                log::debug!("Table {} does not exist", drop.table.full_name());
                return Ok(());
            }
            drop.if_exists = false;
        }
        self.exec(drop).await?;
        Ok(())
    }

    pub async fn set_savepoint(&mut self, name: &str) -> Result<()> {
        self.ensure_active()?;
        self.connection()?.set_savepoint(name).await?;
        self.savepoints.push(name.to_string());
        Ok(())
    }

    /// Release the savepoint and the ones created after it.
    pub async fn release_savepoint(&mut self, name: &str) -> Result<()> {
        self.ensure_active()?;
        let position = self.savepoint_position(name)?;
        self.connection()?.release_savepoint(name).await?;
        self.savepoints.truncate(position);
        Ok(())
    }

    /// Undo the work done after the savepoint, the savepoints created after it are discarded.
    pub async fn rollback_to_savepoint(&mut self, name: &str) -> Result<()> {
        self.ensure_active()?;
        let position = self.savepoint_position(name)?;
        self.connection()?.rollback_to_savepoint(name).await?;
        self.savepoints.truncate(position + 1);
        Ok(())
    }

    fn savepoint_position(&self, name: &str) -> Result<usize> {
        self.savepoints.iter().rposition(|v| v == name).ok_or_else(|| {
            let error = Error::new(SqlError::UnknownSavepoint {
                name: name.to_string(),
            });
            log::error!("{:#}", error);
            error
        })
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.connection
            .as_ref()
            .map(Connection::cancel_handle)
            .unwrap_or_else(CancelHandle::unsupported)
    }

    pub async fn commit(&mut self) -> Result<()> {
        self.ensure_active()?;
        let dialect = self.dialect();
        self.connection()?
            .commit()
            .await
            .with_context(|| format!("While committing a transaction on {}", dialect))?;
        self.finish(TransactionState::Committed);
        Ok(())
    }

    pub async fn rollback(&mut self) -> Result<()> {
        self.ensure_active()?;
        let dialect = self.dialect();
        // Whatever happens the transaction is over
        self.finish(TransactionState::RolledBack);
        self.connection()?
            .rollback()
            .await
            .with_context(|| format!("While rolling back a transaction on {}", dialect))
    }

    fn finish(&mut self, state: TransactionState) {
        log::debug!("Transaction on {} is {:?}", self.dialect(), state);
        self.state = state;
        self.savepoints.clear();
    }

    /// Give the connection back, the transaction must be over.
    pub fn into_connection(mut self) -> Option<C> {
        if self.state == TransactionState::Active {
            log::warn!("Connection taken from a transaction still active, it will be rolled back by the database");
            self.state = TransactionState::RolledBack;
        }
        self.connection.take()
    }
}

impl<C: Connection> Drop for Transaction<C> {
    fn drop(&mut self) {
        if self.state == TransactionState::Active {
            log::warn!(
                "Transaction on {} dropped while active, the work is left to the database to discard",
                self.compiler.dialect()
            );
        }
    }
}

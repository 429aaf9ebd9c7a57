use crate::{
    DatabaseMetadata, Dialect, Error, Executable, Prepared, QueryResult, Result, RowLabeled,
    RowsAffected, truncate_long,
    stream::{Stream, StreamExt, TryStreamExt},
};
use std::{fmt, future::Future, sync::Arc, time::Duration};

/// Isolation of concurrent transactions, the codes are the JDBC ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IsolationLevel {
    ReadUncommitted = 1,
    ReadCommitted = 2,
    RepeatableRead = 4,
    Serializable = 8,
}

impl IsolationLevel {
    pub fn sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadUncommitted => "READ UNCOMMITTED",
            IsolationLevel::ReadCommitted => "READ COMMITTED",
            IsolationLevel::RepeatableRead => "REPEATABLE READ",
            IsolationLevel::Serializable => "SERIALIZABLE",
        }
    }

    pub fn code(&self) -> i32 {
        *self as i32
    }

    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            1 => IsolationLevel::ReadUncommitted,
            2 => IsolationLevel::ReadCommitted,
            4 => IsolationLevel::RepeatableRead,
            8 => IsolationLevel::Serializable,
            _ => return None,
        })
    }

    /// Parse the SQL name, with spaces, dashes or underscores between the words.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_uppercase().replace(['_', '-'], " ");
        [
            IsolationLevel::ReadUncommitted,
            IsolationLevel::ReadCommitted,
            IsolationLevel::RepeatableRead,
            IsolationLevel::Serializable,
        ]
        .into_iter()
        .find(|v| v.sql() == name)
    }
}

/// Best effort interruption of the statement running on a connection.
#[derive(Clone)]
pub struct CancelHandle(Option<Arc<dyn Fn() -> bool + Send + Sync>>);

impl CancelHandle {
    pub fn new(cancel: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self(Some(Arc::new(cancel)))
    }

    /// Handle of a connection that cannot interrupt statements.
    pub fn unsupported() -> Self {
        Self(None)
    }

    /// Request the interruption, `false` when the connection could not act on it.
    pub fn cancel(&self) -> bool {
        match &self.0 {
            Some(cancel) => cancel(),
            None => {
                log::debug!("The connection cannot interrupt statements, the result will be discarded");
                false
            }
        }
    }
}

impl fmt::Debug for CancelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CancelHandle")
            .field(&self.0.is_some())
            .finish()
    }
}

/// A physical connection, the boundary every adapter implements.
///
/// Statements run in the order they are issued. The transaction control methods have a default
/// built from the SQL of the dialect writer.
pub trait Connection: Send + Sized {
    type Prepared: Prepared;

    fn dialect(&self) -> Dialect;

    fn prepare(&mut self, sql: String) -> impl Future<Output = Result<Executable<Self::Prepared>>> + Send;

    /// Run a statement, producing rows and affected counts.
    fn run(&mut self, query: Executable<Self::Prepared>) -> impl Stream<Item = Result<QueryResult>> + Send;

    /// Run the statement and keep only the rows.
    fn fetch(&mut self, query: Executable<Self::Prepared>) -> impl Stream<Item = Result<RowLabeled>> + Send {
        self.run(query).filter_map(|v| async move {
            match v {
                Ok(QueryResult::Row(v)) => Some(Ok(v)),
                Err(e) => Some(Err(e)),
                _ => None,
            }
        })
    }

    /// Run the statement and return the total number of rows affected.
    fn execute(&mut self, query: Executable<Self::Prepared>) -> impl Future<Output = Result<RowsAffected>> + Send {
        self.run(query)
            .filter_map(|v| async move {
                match v {
                    Ok(QueryResult::Affected(v)) => Some(Ok(v)),
                    Err(e) => Some(Err(e)),
                    _ => None,
                }
            })
            .try_collect()
    }

    /// Execute each `;\n` separated statement of the text, empty ones are skipped.
    fn execute_script(&mut self, sql: String) -> impl Future<Output = Result<()>> + Send {
        async move {
            for statement in sql.split(";\n").map(str::trim).filter(|v| !v.is_empty()) {
                log::debug!("{}", truncate_long!(statement));
                self.execute(statement.into()).await?;
            }
            Ok(())
        }
    }

    fn begin(
        &mut self,
        isolation: Option<IsolationLevel>,
        read_only: bool,
    ) -> impl Future<Output = Result<()>> + Send {
        let mut sql = String::new();
        self.dialect()
            .sql_writer()
            .write_transaction_begin(&mut sql, isolation, read_only);
        self.execute_script(sql)
    }

    fn commit(&mut self) -> impl Future<Output = Result<()>> + Send {
        let mut sql = String::new();
        self.dialect().sql_writer().write_transaction_commit(&mut sql);
        self.execute_script(sql)
    }

    fn rollback(&mut self) -> impl Future<Output = Result<()>> + Send {
        let mut sql = String::new();
        self.dialect()
            .sql_writer()
            .write_transaction_rollback(&mut sql);
        self.execute_script(sql)
    }

    fn set_savepoint(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send {
        let mut sql = String::new();
        self.dialect().sql_writer().write_savepoint(&mut sql, name);
        self.execute_script(sql)
    }

    fn release_savepoint(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send {
        let mut sql = String::new();
        self.dialect()
            .sql_writer()
            .write_release_savepoint(&mut sql, name);
        self.execute_script(sql)
    }

    fn rollback_to_savepoint(&mut self, name: &str) -> impl Future<Output = Result<()>> + Send {
        let mut sql = String::new();
        self.dialect()
            .sql_writer()
            .write_rollback_to_savepoint(&mut sql, name);
        self.execute_script(sql)
    }

    /// Limit the duration of the following statements, `None` removes the limit.
    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        if timeout.is_some() {
            log::debug!(
                "The {} connection does not support statement timeouts, the setting is ignored",
                self.dialect()
            );
        }
        Ok(())
    }

    /// Number of rows fetched per round trip, a hint the connection may ignore.
    fn set_fetch_size(&mut self, _fetch_size: Option<u32>) {}

    fn cancel_handle(&self) -> CancelHandle {
        CancelHandle::unsupported()
    }

    fn metadata(&mut self) -> impl Future<Output = Result<DatabaseMetadata>> + Send;

    fn is_closed(&self) -> bool;

    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// Opens the connections of one database.
pub trait ConnectionProvider: Send + Sync {
    type Connection: Connection;

    fn dialect(&self) -> Dialect;

    fn connect(&self) -> impl Future<Output = Result<Self::Connection>> + Send;
}

pub(crate) fn closed_connection(dialect: Dialect) -> Error {
    let error = Error::msg(format!("The {} connection is closed", dialect));
    log::error!("{:#}", error);
    error
}

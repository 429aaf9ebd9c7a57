use crate::{
    CBox, SqlitePrepared, SqliteProvider,
    extract::{driver_error, extract_name, extract_value},
};
use async_stream::try_stream;
use libsqlite3_sys::{
    SQLITE_DONE, SQLITE_OK, SQLITE_OPEN_CREATE, SQLITE_OPEN_FULLMUTEX, SQLITE_OPEN_READWRITE,
    SQLITE_OPEN_URI, SQLITE_ROW, sqlite3, sqlite3_busy_timeout, sqlite3_close,
    sqlite3_column_count, sqlite3_db_handle, sqlite3_finalize,
    sqlite3_interrupt, sqlite3_last_insert_rowid, sqlite3_open_v2, sqlite3_prepare_v2,
    sqlite3_step, sqlite3_stmt, sqlite3_total_changes64,
};
use std::{
    ffi::{CStr, CString, c_char, c_int},
    pin::pin,
    ptr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicPtr, Ordering},
    },
    time::Duration,
};

// The bundled libsqlite3-sys bindings blocklist `sqlite3_close_v2`, but the
// symbol is present in the bundled SQLite library.
unsafe extern "C" {
    fn sqlite3_close_v2(db: *mut sqlite3) -> c_int;
}
use tabula_core::{
    CancelHandle, ColumnMetadata, Connection, Context, DatabaseMetadata, Dialect, Error,
    Executable, ForeignKeyMetadata, IndexMetadata, IsolationLevel, QueryResult, Result,
    RowLabeled, RowsAffected, TableMetadata, Value, truncate_long,
    stream::{Stream, StreamExt, TryStreamExt},
};
use tokio::task::spawn_blocking;

/// Milliseconds a statement waits on a locked database before failing with `SQLITE_BUSY`.
const BUSY_TIMEOUT_MS: c_int = 1000;

/// Shared with the cancel handles, cleared when the connection closes.
struct Interrupt(Mutex<*mut sqlite3>);

unsafe impl Send for Interrupt {}
unsafe impl Sync for Interrupt {}

impl Interrupt {
    fn interrupt(&self) -> bool {
        match self.0.lock() {
            Ok(connection) if !connection.is_null() => {
                unsafe { sqlite3_interrupt(*connection) };
                true
            }
            _ => false,
        }
    }

    fn clear(&self) {
        if let Ok(mut connection) = self.0.lock() {
            *connection = ptr::null_mut();
        }
    }
}

/// Connection to a SQLite database file.
pub struct SqliteConnection {
    pub(crate) connection: CBox<*mut sqlite3>,
    interrupt: Arc<Interrupt>,
    read_only: bool,
}

impl SqliteConnection {
    /// Open the database at `sqlite://path`, a query string is passed to SQLite as URI
    /// parameters (`mode`, `cache`, ...).
    pub async fn open(url: &str) -> Result<Self> {
        let prefix = format!("{}://", SqliteProvider::SCHEME);
        let Some(location) = url.strip_prefix(&prefix) else {
            let error = Error::msg(format!(
                "Expected the SQLite connection URL to start with `{}`, found `{}`",
                prefix, url
            ));
            log::error!("{:#}", error);
            return Err(error);
        };
        let context = || format!("While opening the SQLite database `{}`", url);
        let location = if location.contains('?') && !location.starts_with("file:") {
            format!("file:{}", location)
        } else {
            location.to_string()
        };
        let filename = CString::new(location).with_context(context)?;
        let mut connection = CBox::new(ptr::null_mut(), |p| unsafe {
            sqlite3_close(p);
        });
        let rc = unsafe {
            sqlite3_open_v2(
                filename.as_ptr(),
                &mut *connection,
                SQLITE_OPEN_URI | SQLITE_OPEN_READWRITE | SQLITE_OPEN_CREATE | SQLITE_OPEN_FULLMUTEX,
                ptr::null(),
            )
        };
        if rc != SQLITE_OK {
            let error = if connection.is_null() {
                Error::msg("SQLite could not allocate the connection").context(context())
            } else {
                driver_error(*connection).context(context())
            };
            log::error!("{:#}", error);
            return Err(error);
        }
        unsafe {
            sqlite3_busy_timeout(*connection, BUSY_TIMEOUT_MS);
        }
        let interrupt = Arc::new(Interrupt(Mutex::new(*connection)));
        let mut result = Self {
            connection,
            interrupt,
            read_only: false,
        };
        result
            .execute_script("PRAGMA foreign_keys = ON".into())
            .await?;
        Ok(result)
    }

    /// Compile the first statement of `sql`, returning it with the text that follows it.
    async fn prepare_first(&mut self, sql: String) -> Result<(CBox<*mut sqlite3_stmt>, String)> {
        let connection = AtomicPtr::new(*self.connection);
        spawn_blocking(move || unsafe {
            let connection = connection.load(Ordering::Relaxed);
            let context = || format!("While preparing the query:\n{}", truncate_long!(sql));
            let source = CString::new(sql.as_bytes()).with_context(context)?;
            let mut statement = CBox::new(ptr::null_mut(), |p| {
                sqlite3_finalize(p);
            });
            let mut tail: *const c_char = ptr::null();
            let rc = sqlite3_prepare_v2(
                connection,
                source.as_ptr(),
                -1,
                &mut *statement,
                &mut tail,
            );
            if rc != SQLITE_OK {
                let error = driver_error(connection).context(context());
                log::error!("{:#}", error);
                return Err(error);
            }
            let remaining = if tail.is_null() {
                String::new()
            } else {
                CStr::from_ptr(tail).to_string_lossy().into_owned()
            };
            Ok((statement, remaining))
        })
        .await?
    }

    pub(crate) fn run_prepared(
        &mut self,
        statement: CBox<*mut sqlite3_stmt>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        try_stream! {
            let (count, changes) = unsafe {
                (
                    sqlite3_column_count(*statement),
                    sqlite3_total_changes64(sqlite3_db_handle(*statement)),
                )
            };
            let labels = (0..count)
                .map(|i| extract_name(*statement, i))
                .collect::<Result<Arc<[_]>>>()?;
            loop {
                match unsafe { sqlite3_step(*statement) } {
                    SQLITE_DONE => break,
                    SQLITE_ROW => {
                        let values = (0..count)
                            .map(|i| extract_value(*statement, i))
                            .collect::<Result<Box<[_]>>>()?;
                        yield QueryResult::Row(RowLabeled::new(labels.clone(), values));
                    }
                    _ => {
                        let error = unsafe { driver_error(sqlite3_db_handle(*statement)) };
                        log::error!("{:#}", error);
                        Err::<(), Error>(error)?;
                    }
                }
            }
            let (changes, last_id) = unsafe {
                let connection = sqlite3_db_handle(*statement);
                (
                    sqlite3_total_changes64(connection) - changes,
                    sqlite3_last_insert_rowid(connection),
                )
            };
            yield QueryResult::Affected(RowsAffected {
                rows_affected: changes.max(0) as u64,
                last_affected_id: (changes > 0).then_some(last_id),
            });
        }
    }

    /// Run every statement of the text, one after the other.
    pub(crate) fn run_unprepared(&mut self, sql: String) -> impl Stream<Item = Result<QueryResult>> + Send {
        try_stream! {
            let mut remaining = sql;
            while !remaining.trim().is_empty() {
                let (statement, tail) = self.prepare_first(remaining).await?;
                remaining = tail;
                // Comments and whitespace compile to nothing
                if statement.is_null() {
                    continue;
                }
                let mut stream = pin!(self.run_prepared(statement));
                while let Some(value) = stream.next().await {
                    yield value?;
                }
            }
        }
    }

    async fn rows(&mut self, sql: &str) -> Result<Vec<RowLabeled>> {
        self.fetch(sql.into()).try_collect().await
    }
}

fn text(row: &RowLabeled, name: &str) -> String {
    match row.get_column(name) {
        Some(Value::Varchar(Some(v))) => v.clone(),
        Some(Value::Int64(Some(v))) => v.to_string(),
        _ => String::new(),
    }
}

fn flag(row: &RowLabeled, name: &str) -> bool {
    matches!(row.get_column(name), Some(Value::Int64(Some(v))) if *v != 0)
}

/// Identifier quoted for the pragma functions.
fn quoted(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

impl Connection for SqliteConnection {
    type Prepared = SqlitePrepared;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn prepare(&mut self, sql: String) -> Result<Executable<SqlitePrepared>> {
        let (statement, tail) = self.prepare_first(sql.clone()).await?;
        if statement.is_null() || !tail.trim().is_empty() {
            let error = Error::msg("Exactly one statement can be prepared at a time").context(
                format!("While preparing the query:\n{}", truncate_long!(sql)),
            );
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Executable::Prepared(SqlitePrepared::new(statement)))
    }

    fn run(
        &mut self,
        query: Executable<SqlitePrepared>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        try_stream! {
            match query {
                Executable::Raw(sql) => {
                    let mut stream = pin!(self.run_unprepared(sql));
                    while let Some(value) = stream.next().await {
                        yield value?;
                    }
                }
                Executable::Prepared(prepared) => {
                    let mut stream = pin!(self.run_prepared(prepared.statement));
                    while let Some(value) = stream.next().await {
                        yield value?;
                    }
                }
            }
        }
    }

    async fn begin(&mut self, isolation: Option<IsolationLevel>, read_only: bool) -> Result<()> {
        if isolation.is_some_and(|v| v != IsolationLevel::Serializable) {
            log::debug!("SQLite transactions are always serializable, the isolation level is ignored");
        }
        let mut sql = String::new();
        Dialect::Sqlite
            .sql_writer()
            .write_transaction_begin(&mut sql, isolation, read_only);
        self.read_only = read_only;
        self.execute_script(sql).await
    }

    async fn commit(&mut self) -> Result<()> {
        self.execute_script("COMMIT".into()).await?;
        self.leave_read_only().await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.execute_script("ROLLBACK".into()).await?;
        self.leave_read_only().await
    }

    /// SQLite statements only wait on locks, the timeout bounds that wait.
    fn set_query_timeout(&mut self, timeout: Option<Duration>) -> Result<()> {
        let millis = timeout
            .map(|v| c_int::try_from(v.as_millis()).unwrap_or(c_int::MAX))
            .unwrap_or(BUSY_TIMEOUT_MS);
        let rc = unsafe { sqlite3_busy_timeout(*self.connection, millis) };
        if rc != SQLITE_OK {
            let error = driver_error(*self.connection).context("While setting the busy timeout");
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }

    fn cancel_handle(&self) -> CancelHandle {
        let interrupt = self.interrupt.clone();
        CancelHandle::new(move || interrupt.interrupt())
    }

    async fn metadata(&mut self) -> Result<DatabaseMetadata> {
        let mut result = DatabaseMetadata::default();
        let tables = self
            .rows("SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name")
            .await?;
        for table in tables {
            let name = text(&table, "name");
            let columns = self
                .rows(&format!("PRAGMA table_info({})", quoted(&name)))
                .await?
                .iter()
                .map(|row| ColumnMetadata {
                    name: text(row, "name"),
                    sql_type: text(row, "type"),
                    nullable: !flag(row, "notnull") && !flag(row, "pk"),
                    default: row
                        .get_column("dflt_value")
                        .filter(|v| !v.is_null())
                        .map(|_| text(row, "dflt_value")),
                    primary_key: flag(row, "pk"),
                })
                .collect();
            let mut indices = Vec::new();
            for index in self
                .rows(&format!("PRAGMA index_list({})", quoted(&name)))
                .await?
            {
                let index_name = text(&index, "name");
                let columns = self
                    .rows(&format!("PRAGMA index_info({})", quoted(&index_name)))
                    .await?
                    .iter()
                    .map(|row| text(row, "name"))
                    .collect();
                indices.push(IndexMetadata {
                    name: index_name,
                    columns,
                    unique: flag(&index, "unique"),
                });
            }
            let mut foreign_keys: Vec<(String, ForeignKeyMetadata)> = Vec::new();
            for row in self
                .rows(&format!("PRAGMA foreign_key_list({})", quoted(&name)))
                .await?
            {
                let id = text(&row, "id");
                let position = match foreign_keys.iter().position(|(k, _)| *k == id) {
                    Some(position) => position,
                    None => {
                        foreign_keys.push((
                            id,
                            ForeignKeyMetadata {
                                target_table: text(&row, "table"),
                                ..Default::default()
                            },
                        ));
                        foreign_keys.len() - 1
                    }
                };
                let foreign_key = &mut foreign_keys[position].1;
                foreign_key.columns.push(text(&row, "from"));
                foreign_key.target_columns.push(text(&row, "to"));
            }
            result.tables.push(TableMetadata {
                schema: String::new(),
                name,
                columns,
                indices,
                foreign_keys: foreign_keys.into_iter().map(|(_, v)| v).collect(),
            });
        }
        Ok(result)
    }

    fn is_closed(&self) -> bool {
        self.connection.is_null()
    }

    async fn close(mut self) -> Result<()> {
        self.interrupt.clear();
        let connection = std::mem::replace(&mut self.connection.ptr, ptr::null_mut());
        if connection.is_null() {
            return Ok(());
        }
        let rc = unsafe { sqlite3_close_v2(connection) };
        if rc != SQLITE_OK {
            let error = Error::msg(format!("SQLite could not close the connection (code {})", rc));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }
}

impl SqliteConnection {
    async fn leave_read_only(&mut self) -> Result<()> {
        if self.read_only {
            self.read_only = false;
            self.execute_script("PRAGMA query_only = OFF".into()).await?;
        }
        Ok(())
    }
}

impl Drop for SqliteConnection {
    fn drop(&mut self) {
        self.interrupt.clear();
    }
}

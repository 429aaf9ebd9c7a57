use std::{
    collections::VecDeque,
    fmt::{self, Display},
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tabula::{
    Connection, ConnectionProvider, DatabaseMetadata, Dialect, DriverError, Error, Executable,
    Prepared, QueryResult, Result, RowLabeled, RowsAffected, Value, stream,
    stream::Stream,
};

/// Statement received by a [`MockConnection`].
#[derive(Debug, Clone, PartialEq)]
pub struct MockCall {
    /// Connection that ran it, counting from 1 in opening order.
    pub connection: usize,
    pub sql: String,
    pub params: Vec<Value>,
}

type Handler = dyn Fn(&MockCall) -> Result<Vec<QueryResult>> + Send + Sync;

struct Failure {
    prefix: String,
    remaining: usize,
    error: DriverError,
}

#[derive(Default)]
struct MockState {
    handler: Mutex<Option<Arc<Handler>>>,
    failures: Mutex<VecDeque<Failure>>,
    calls: Mutex<Vec<MockCall>>,
    metadata: Mutex<DatabaseMetadata>,
    opened: AtomicUsize,
    closed: AtomicUsize,
}

/// Provider of scripted connections, used to exercise the transaction manager without a
/// database.
///
/// Every statement is recorded. Results come from the handler, by default statements returning
/// rows produce none and the others affect one row.
#[derive(Clone)]
pub struct MockProvider {
    dialect: Dialect,
    state: Arc<MockState>,
}

impl MockProvider {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            state: Default::default(),
        }
    }

    pub fn with_handler(
        self,
        handler: impl Fn(&MockCall) -> Result<Vec<QueryResult>> + Send + Sync + 'static,
    ) -> Self {
        if let Ok(mut current) = self.state.handler.lock() {
            *current = Some(Arc::new(handler));
        }
        self
    }

    pub fn with_metadata(self, metadata: DatabaseMetadata) -> Self {
        if let Ok(mut current) = self.state.metadata.lock() {
            *current = metadata;
        }
        self
    }

    /// The next `times` statements starting with `prefix` fail with `error`.
    pub fn fail(&self, prefix: &str, times: usize, error: DriverError) {
        if let Ok(mut failures) = self.state.failures.lock() {
            failures.push_back(Failure {
                prefix: prefix.to_string(),
                remaining: times,
                error,
            });
        }
    }

    /// Fail the next `times` statements starting with `prefix` with a serialization failure.
    pub fn conflict(&self, prefix: &str, times: usize) {
        self.fail(
            prefix,
            times,
            DriverError::new("could not serialize access due to concurrent update")
                .with_sql_state("40001"),
        );
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state
            .calls
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default()
    }

    /// The SQL of every statement received, in order.
    pub fn log(&self) -> Vec<String> {
        self.calls().into_iter().map(|v| v.sql).collect()
    }

    pub fn clear_log(&self) {
        if let Ok(mut calls) = self.state.calls.lock() {
            calls.clear();
        }
    }

    pub fn opened_connections(&self) -> usize {
        self.state.opened.load(Ordering::Relaxed)
    }

    pub fn closed_connections(&self) -> usize {
        self.state.closed.load(Ordering::Relaxed)
    }
}

impl ConnectionProvider for MockProvider {
    type Connection = MockConnection;

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn connect(&self) -> Result<MockConnection> {
        let id = self.state.opened.fetch_add(1, Ordering::Relaxed) + 1;
        Ok(MockConnection {
            id,
            dialect: self.dialect,
            state: self.state.clone(),
            closed: false,
        })
    }
}

/// Statement prepared by a [`MockConnection`].
#[derive(Debug, Clone)]
pub struct MockPrepared {
    pub sql: String,
    pub params: Vec<Value>,
}

impl Prepared for MockPrepared {
    fn bind_index(&mut self, value: Value, index: u64) -> Result<()> {
        let index = index as usize;
        if index == 0 {
            return Err(Error::msg("Parameter indices start from 1"));
        }
        if self.params.len() < index {
            self.params.resize(index, Value::Null);
        }
        self.params[index - 1] = value;
        Ok(())
    }

    fn clear_bindings(&mut self) -> Result<()> {
        self.params.clear();
        Ok(())
    }

    fn parameter_count(&self) -> usize {
        self.params.len()
    }
}

impl Display for MockPrepared {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

pub struct MockConnection {
    id: usize,
    dialect: Dialect,
    state: Arc<MockState>,
    closed: bool,
}

impl MockConnection {
    fn respond(&self, call: MockCall) -> Result<Vec<QueryResult>> {
        if let Ok(mut calls) = self.state.calls.lock() {
            calls.push(call.clone());
        }
        if let Ok(mut failures) = self.state.failures.lock() {
            if let Some(position) = failures
                .iter()
                .position(|v| v.remaining > 0 && call.sql.starts_with(&v.prefix))
            {
                let failure = &mut failures[position];
                failure.remaining -= 1;
                let error = failure.error.clone();
                if failure.remaining == 0 {
                    failures.remove(position);
                }
                return Err(Error::new(error));
            }
        }
        let handler = self.state.handler.lock().ok().and_then(|v| v.clone());
        match handler {
            Some(handler) => handler(&call),
            None if call.sql.starts_with("SELECT") || call.sql.contains("RETURNING") => {
                Ok(Vec::new())
            }
            None => Ok(vec![QueryResult::Affected(RowsAffected::new(1))]),
        }
    }
}

impl Connection for MockConnection {
    type Prepared = MockPrepared;

    fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn prepare(&mut self, sql: String) -> Result<Executable<MockPrepared>> {
        Ok(Executable::Prepared(MockPrepared {
            sql,
            params: Vec::new(),
        }))
    }

    fn run(
        &mut self,
        query: Executable<MockPrepared>,
    ) -> impl Stream<Item = Result<QueryResult>> + Send {
        let (sql, params) = match query {
            Executable::Raw(sql) => (sql, Vec::new()),
            Executable::Prepared(prepared) => (prepared.sql, prepared.params),
        };
        let results = match self.respond(MockCall {
            connection: self.id,
            sql,
            params,
        }) {
            Ok(results) => results.into_iter().map(Ok).collect(),
            Err(error) => vec![Err(error)],
        };
        stream::iter(results)
    }

    async fn metadata(&mut self) -> Result<DatabaseMetadata> {
        Ok(self
            .state
            .metadata
            .lock()
            .map(|v| v.clone())
            .unwrap_or_default())
    }

    fn is_closed(&self) -> bool {
        self.closed
    }

    async fn close(mut self) -> Result<()> {
        self.closed = true;
        self.state.closed.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}

/// Row of labeled values, as a connection returns it.
pub fn row(labels: &[&str], values: Vec<Value>) -> QueryResult {
    QueryResult::Row(RowLabeled::new(
        labels.iter().map(|v| v.to_string()).collect(),
        values.into_boxed_slice(),
    ))
}

use crate::{
    CleanupError, CompiledStatement, Compiler, Connection, ConnectionProvider, DatabaseConfig,
    Dialect, Error, Result, Statement, Transaction, TransactionState, is_transient,
};
use futures::FutureExt;
use std::{
    panic::{self, AssertUnwindSafe},
    sync::Arc,
};

/// Handle of one database: the provider of its connections and the settings of its transactions.
///
/// Handles are independent, several can coexist in the same process.
pub struct Database<P: ConnectionProvider> {
    provider: P,
    config: Arc<DatabaseConfig>,
}

impl<P: ConnectionProvider> Database<P> {
    pub fn new(provider: P, config: DatabaseConfig) -> Self {
        Self {
            provider,
            config: Arc::new(config),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.provider.dialect()
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Compiler producing the same SQL the transactions of this database run.
    pub fn compiler(&self) -> Compiler {
        Compiler::new(self.dialect()).with_time_zone(self.config.default_time_zone)
    }

    pub fn compile(&self, statement: &Statement) -> Result<CompiledStatement> {
        self.compiler().compile(statement)
    }

    /// Run the unit of work inside a transaction.
    ///
    /// The transaction is committed when the work succeeds and rolled back when it fails or
    /// panics. A work failing with a transient conflict runs again on a fresh connection, up to
    /// `max_attempts` times, after which the last failure is returned.
    pub async fn transaction<T>(
        &self,
        mut work: impl AsyncFnMut(&mut Transaction<P::Connection>) -> Result<T>,
    ) -> Result<T> {
        let mut attempt = 1;
        loop {
            let result = async {
                let connection = self.provider.connect().await?;
                let mut transaction =
                    Transaction::begin(connection, self.config.clone(), attempt).await?;
                let outcome = AssertUnwindSafe(work(&mut transaction))
                    .catch_unwind()
                    .await;
                let result = match outcome {
                    Ok(Ok(value)) => match transaction.state() {
                        TransactionState::Active => match transaction.commit().await {
                            Ok(()) => Ok(value),
                            Err(error) => Err(Self::abort(&mut transaction, error).await),
                        },
                        _ => Ok(value),
                    },
                    Ok(Err(error)) => Err(Self::abort(&mut transaction, error).await),
                    Err(payload) => {
                        if transaction.state() == TransactionState::Active {
                            if let Err(e) = transaction.rollback().await {
                                log::error!("Rollback after a panic failed: {:#}", e);
                            }
                        }
                        Self::release(transaction).await;
                        panic::resume_unwind(payload);
                    }
                };
                Self::release(transaction).await;
                result
            }
            .await;
            match result {
                Err(error) if attempt < self.config.max_attempts && is_transient(&error) => {
                    let delay = self.config.retry_delay(attempt);
                    log::warn!(
                        "Transient conflict on attempt {} of {}, retrying in {:?}: {:#}",
                        attempt,
                        self.config.max_attempts,
                        delay,
                        error
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
                result => return result,
            }
        }
    }

    /// Roll back after a failure, surfacing both errors when the rollback fails too.
    async fn abort(transaction: &mut Transaction<P::Connection>, error: Error) -> Error {
        if transaction.state() != TransactionState::Active {
            return error;
        }
        match transaction.rollback().await {
            Ok(()) => error,
            Err(cleanup) => {
                let error = Error::new(CleanupError {
                    original: error,
                    cleanup,
                });
                log::error!("{:#}", error);
                error
            }
        }
    }

    async fn release(transaction: Transaction<P::Connection>) {
        if let Some(connection) = transaction.into_connection() {
            if let Err(e) = connection.close().await {
                log::warn!("Could not close the connection: {:#}", e);
            }
        }
    }
}

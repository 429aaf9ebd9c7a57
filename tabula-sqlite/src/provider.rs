use crate::SqliteConnection;
use tabula_core::{ConnectionProvider, Database, DatabaseConfig, Dialect, Error, Result};

/// Opens a new connection to the same SQLite database for every transaction.
#[derive(Debug, Clone)]
pub struct SqliteProvider {
    url: String,
}

impl SqliteProvider {
    pub const SCHEME: &'static str = "sqlite";

    /// Provider of `sqlite://path[?sqlite_uri_parameters]`.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url = url.into();
        if !url.starts_with(&format!("{}://", Self::SCHEME)) {
            let error = Error::msg(format!(
                "Expected the SQLite connection URL to start with `{}://`, found `{}`",
                Self::SCHEME,
                url
            ));
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(Self { url })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl ConnectionProvider for SqliteProvider {
    type Connection = SqliteConnection;

    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    fn connect(&self) -> impl Future<Output = Result<SqliteConnection>> + Send {
        SqliteConnection::open(&self.url)
    }
}

/// Database handle for the URL, the transaction settings are read from its query string.
///
/// ```no_run
/// # async fn run() -> tabula_core::Result<()> {
/// let database = tabula_sqlite::open("sqlite://app.sqlite?mode=rwc&max_attempts=5")?;
/// # Ok(())
/// # }
/// ```
pub fn open(url: &str) -> Result<Database<SqliteProvider>> {
    let (config, url) = DatabaseConfig::from_url(url)?;
    Ok(Database::new(SqliteProvider::new(url)?, config))
}

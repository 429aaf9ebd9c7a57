use crate::{
    Error, IdentifierManager, Result,
    util::write_integer,
    writer::{
        H2SqlWriter, MySqlSqlWriter, OracleSqlWriter, PostgresSqlWriter, SqlServerSqlWriter,
        SqlWriter, SqliteSqlWriter,
    },
};
use std::fmt::{self, Display};

/// Database product whose SQL rules drive compilation and value conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Postgres,
    MySql,
    Sqlite,
    H2,
    Oracle,
    SqlServer,
}

impl Dialect {
    pub const ALL: [Dialect; 6] = [
        Dialect::Postgres,
        Dialect::MySql,
        Dialect::Sqlite,
        Dialect::H2,
        Dialect::Oracle,
        Dialect::SqlServer,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dialect::Postgres => "PostgreSQL",
            Dialect::MySql => "MySQL",
            Dialect::Sqlite => "SQLite",
            Dialect::H2 => "H2",
            Dialect::Oracle => "Oracle",
            Dialect::SqlServer => "SQL Server",
        }
    }

    /// Resolve the dialect from the scheme of a connection URL.
    pub fn from_url(url: &str) -> Result<Dialect> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme)
            .or_else(|| url.split_once(':').map(|(scheme, _)| scheme))
            .unwrap_or(url)
            .to_ascii_lowercase();
        Ok(match scheme.as_str() {
            "postgres" | "postgresql" => Dialect::Postgres,
            "mysql" | "mariadb" => Dialect::MySql,
            "sqlite" => Dialect::Sqlite,
            "h2" => Dialect::H2,
            "oracle" => Dialect::Oracle,
            "sqlserver" | "mssql" => Dialect::SqlServer,
            _ => {
                let error = Error::msg(format!(
                    "Cannot determine the dialect of the connection url `{}`",
                    url
                ));
                log::error!("{:#}", error);
                return Err(error);
            }
        })
    }

    pub fn sql_writer(&self) -> &'static dyn SqlWriter {
        match self {
            Dialect::Postgres => &PostgresSqlWriter {},
            Dialect::MySql => &MySqlSqlWriter {},
            Dialect::Sqlite => &SqliteSqlWriter {},
            Dialect::H2 => &H2SqlWriter {},
            Dialect::Oracle => &OracleSqlWriter {},
            Dialect::SqlServer => &SqlServerSqlWriter {},
        }
    }

    pub fn identifier_manager(&self) -> &'static IdentifierManager {
        match self {
            Dialect::Postgres => &IdentifierManager::POSTGRES,
            Dialect::MySql => &IdentifierManager::MYSQL,
            Dialect::Sqlite => &IdentifierManager::SQLITE,
            Dialect::H2 => &IdentifierManager::H2,
            Dialect::Oracle => &IdentifierManager::ORACLE,
            Dialect::SqlServer => &IdentifierManager::SQL_SERVER,
        }
    }

    pub fn supports_select_for_update(&self) -> bool {
        !matches!(self, Dialect::Sqlite | Dialect::SqlServer)
    }

    pub fn supports_if_not_exists(&self) -> bool {
        !matches!(self, Dialect::Oracle | Dialect::SqlServer)
    }

    pub fn supports_drop_if_exists(&self) -> bool {
        !matches!(self, Dialect::Oracle)
    }

    pub fn supports_multiple_result_sets(&self) -> bool {
        matches!(self, Dialect::MySql | Dialect::SqlServer)
    }

    pub fn supports_returning(&self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Sqlite)
    }

    pub fn supports_upsert(&self) -> bool {
        matches!(self, Dialect::Postgres | Dialect::Sqlite | Dialect::MySql)
    }

    pub fn supports_schemas(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// Offset can be rendered without a row limit.
    pub fn supports_offset_without_limit(&self) -> bool {
        !matches!(self, Dialect::MySql | Dialect::Sqlite)
    }

    /// Auto increment columns can be part of a composite primary key.
    pub fn supports_auto_increment_in_composite_key(&self) -> bool {
        !matches!(self, Dialect::Sqlite)
    }

    /// Dates and times are exchanged as fixed pattern text instead of native temporal types.
    pub fn uses_textual_temporals(&self) -> bool {
        matches!(self, Dialect::Sqlite | Dialect::Oracle)
    }

    /// Convert `?` placeholders into the numbered form the dialect expects.
    ///
    /// Question marks inside string literals and quoted identifiers are left untouched.
    pub fn rewrite_placeholders(&self, sql: &str) -> String {
        if *self != Dialect::Postgres {
            return sql.to_string();
        }
        let mut out = String::with_capacity(sql.len() + 8);
        let mut index = 0u32;
        let mut quote: Option<char> = None;
        for c in sql.chars() {
            match quote {
                Some(q) if c == q => quote = None,
                Some(_) => {}
                None if c == '\'' || c == '"' => quote = Some(c),
                None if c == '?' => {
                    index += 1;
                    out.push('$');
                    write_integer!(out, index);
                    continue;
                }
                None => {}
            }
            out.push(c);
        }
        out
    }
}

impl Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

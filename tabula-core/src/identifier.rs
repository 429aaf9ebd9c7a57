use crate::{Dialect, Error, Result, SqlError};

/// Reserved words of SQL:2003, sorted for binary search.
const SQL_RESERVED: &[&str] = &[
    "ABS", "ALL", "ALLOCATE", "ALTER", "AND", "ANY", "ARE", "ARRAY", "AS", "ASENSITIVE",
    "ASYMMETRIC", "AT", "ATOMIC", "AUTHORIZATION", "AVG", "BEGIN", "BETWEEN", "BIGINT", "BINARY",
    "BLOB", "BOOLEAN", "BOTH", "BY", "CALL", "CALLED", "CASCADED", "CASE", "CAST", "CEIL",
    "CHAR", "CHARACTER", "CHECK", "CLOB", "CLOSE", "COLLATE", "COLUMN", "COMMIT", "CONDITION",
    "CONNECT", "CONSTRAINT", "CONTINUE", "CORRESPONDING", "COUNT", "CREATE", "CROSS", "CUBE",
    "CURRENT", "CURRENT_DATE", "CURRENT_TIME", "CURRENT_TIMESTAMP", "CURRENT_USER", "CURSOR",
    "CYCLE", "DATE", "DAY", "DEALLOCATE", "DEC", "DECIMAL", "DECLARE", "DEFAULT", "DELETE",
    "DEREF", "DESCRIBE", "DETERMINISTIC", "DISCONNECT", "DISTINCT", "DO", "DOUBLE", "DROP",
    "DYNAMIC", "EACH", "ELEMENT", "ELSE", "ELSEIF", "END", "ESCAPE", "EXCEPT", "EXEC",
    "EXECUTE", "EXISTS", "EXIT", "EXTERNAL", "FALSE", "FETCH", "FILTER", "FLOAT", "FOR",
    "FOREIGN", "FREE", "FROM", "FULL", "FUNCTION", "GET", "GLOBAL", "GRANT", "GROUP",
    "GROUPING", "HANDLER", "HAVING", "HOLD", "HOUR", "IDENTITY", "IF", "IMMEDIATE", "IN",
    "INDICATOR", "INNER", "INOUT", "INPUT", "INSENSITIVE", "INSERT", "INT", "INTEGER",
    "INTERSECT", "INTERVAL", "INTO", "IS", "ITERATE", "JOIN", "LANGUAGE", "LARGE", "LATERAL",
    "LEADING", "LEAVE", "LEFT", "LIKE", "LOCAL", "LOCALTIME", "LOCALTIMESTAMP", "LOOP", "MATCH",
    "MAX", "MEMBER", "MERGE", "METHOD", "MIN", "MINUTE", "MODIFIES", "MODULE", "MONTH",
    "MULTISET", "NATIONAL", "NATURAL", "NCHAR", "NCLOB", "NEW", "NO", "NONE", "NOT", "NULL",
    "NUMERIC", "OF", "OLD", "ON", "ONLY", "OPEN", "OR", "ORDER", "OUT", "OUTER", "OUTPUT",
    "OVER", "OVERLAPS", "PARAMETER", "PARTITION", "PRECISION", "PREPARE", "PRIMARY",
    "PROCEDURE", "RANGE", "READS", "REAL", "RECURSIVE", "REF", "REFERENCES", "REFERENCING",
    "RELEASE", "REPEAT", "RESIGNAL", "RESULT", "RETURN", "RETURNS", "REVOKE", "RIGHT",
    "ROLLBACK", "ROLLUP", "ROW", "ROWS", "SAVEPOINT", "SCOPE", "SCROLL", "SEARCH", "SECOND",
    "SELECT", "SENSITIVE", "SESSION_USER", "SET", "SIGNAL", "SIMILAR", "SMALLINT", "SOME",
    "SPECIFIC", "SPECIFICTYPE", "SQL", "SQLEXCEPTION", "SQLSTATE", "SQLWARNING", "START",
    "STATIC", "SUBMULTISET", "SUM", "SYMMETRIC", "SYSTEM", "SYSTEM_USER", "TABLE", "THEN",
    "TIME", "TIMESTAMP", "TIMEZONE_HOUR", "TIMEZONE_MINUTE", "TO", "TRAILING", "TRANSLATION",
    "TREAT", "TRIGGER", "TRUE", "UNDO", "UNION", "UNIQUE", "UNKNOWN", "UNNEST", "UNTIL",
    "UPDATE", "USER", "USING", "VALUE", "VALUES", "VARCHAR", "VARYING", "WHEN", "WHENEVER",
    "WHERE", "WHILE", "WINDOW", "WITH", "WITHIN", "WITHOUT", "YEAR",
];

/// How unquoted identifiers are stored in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierCase {
    Upper,
    Lower,
    /// Stored as written, compared case-insensitively.
    Preserved,
}

/// Quoting, casing and length rules for names of one dialect.
#[derive(Debug, PartialEq, Eq)]
pub struct IdentifierManager {
    pub dialect: Dialect,
    pub quote_open: char,
    pub quote_close: char,
    pub case: IdentifierCase,
    /// Unquoted names keep their mixed case.
    pub supports_mixed_identifiers: bool,
    /// Quoted names keep their mixed case.
    pub supports_mixed_quoted_identifiers: bool,
    /// Dialect keywords on top of the SQL reserved words.
    pub keywords: &'static [&'static str],
    /// Characters allowed in unquoted names besides letters, digits and underscore.
    pub extra_name_characters: &'static str,
    /// Zero means unlimited.
    pub max_name_length: usize,
}

impl IdentifierManager {
    pub const POSTGRES: IdentifierManager = IdentifierManager {
        dialect: Dialect::Postgres,
        quote_open: '"',
        quote_close: '"',
        case: IdentifierCase::Lower,
        supports_mixed_identifiers: false,
        supports_mixed_quoted_identifiers: true,
        keywords: &["ANALYSE", "ANALYZE", "LIMIT", "OFFSET", "PLACING", "RETURNING", "VARIADIC"],
        extra_name_characters: "$",
        max_name_length: 63,
    };
    pub const MYSQL: IdentifierManager = IdentifierManager {
        dialect: Dialect::MySql,
        quote_open: '`',
        quote_close: '`',
        case: IdentifierCase::Preserved,
        supports_mixed_identifiers: true,
        supports_mixed_quoted_identifiers: true,
        keywords: &["KEY", "KEYS", "LIMIT", "RLIKE", "STRAIGHT_JOIN", "XOR", "ZEROFILL"],
        extra_name_characters: "$",
        max_name_length: 64,
    };
    pub const SQLITE: IdentifierManager = IdentifierManager {
        dialect: Dialect::Sqlite,
        quote_open: '"',
        quote_close: '"',
        case: IdentifierCase::Preserved,
        supports_mixed_identifiers: true,
        supports_mixed_quoted_identifiers: true,
        keywords: &["ABORT", "AUTOINCREMENT", "GLOB", "INDEX", "ISNULL", "LIMIT", "NOTNULL", "REGEXP"],
        extra_name_characters: "",
        max_name_length: 0,
    };
    pub const H2: IdentifierManager = IdentifierManager {
        dialect: Dialect::H2,
        quote_open: '"',
        quote_close: '"',
        case: IdentifierCase::Upper,
        supports_mixed_identifiers: false,
        supports_mixed_quoted_identifiers: true,
        keywords: &["LIMIT", "MINUS", "OFFSET", "QUALIFY", "REGEXP", "ROWNUM", "TOP"],
        extra_name_characters: "",
        max_name_length: 0,
    };
    pub const ORACLE: IdentifierManager = IdentifierManager {
        dialect: Dialect::Oracle,
        quote_open: '"',
        quote_close: '"',
        case: IdentifierCase::Upper,
        supports_mixed_identifiers: false,
        supports_mixed_quoted_identifiers: true,
        keywords: &["ACCESS", "LEVEL", "MINUS", "MODE", "NUMBER", "ROWID", "ROWNUM", "SIZE", "UID"],
        extra_name_characters: "$#",
        max_name_length: 128,
    };
    pub const SQL_SERVER: IdentifierManager = IdentifierManager {
        dialect: Dialect::SqlServer,
        quote_open: '[',
        quote_close: ']',
        case: IdentifierCase::Preserved,
        supports_mixed_identifiers: true,
        supports_mixed_quoted_identifiers: true,
        keywords: &["IDENTITY_INSERT", "NOCHECK", "PIVOT", "TOP", "TRAN", "TRUNCATE", "UNPIVOT"],
        extra_name_characters: "@#$",
        max_name_length: 128,
    };

    /// Wrap the name in the dialect quotes, doubling any closing quote inside it.
    pub fn quote(&self, name: &str) -> String {
        let mut out = String::with_capacity(name.len() + 2);
        self.write_quoted(&mut out, name);
        out
    }

    pub fn write_quoted(&self, out: &mut String, name: &str) {
        out.push(self.quote_open);
        for c in name.chars() {
            if c == self.quote_close {
                out.push(c);
            }
            out.push(c);
        }
        out.push(self.quote_close);
    }

    pub fn is_quoted(&self, name: &str) -> bool {
        name.len() >= 2 && name.starts_with(self.quote_open) && name.ends_with(self.quote_close)
    }

    pub fn is_reserved_word(&self, name: &str) -> bool {
        let upper = name.to_ascii_uppercase();
        SQL_RESERVED.binary_search(&upper.as_str()).is_ok()
            || self.keywords.iter().any(|v| v.eq_ignore_ascii_case(name))
    }

    /// Zero means unlimited.
    pub fn max_name_length(&self) -> usize {
        self.max_name_length
    }

    /// The case unquoted identifiers are stored in.
    pub fn in_proper_case(&self, name: &str) -> String {
        match self.case {
            IdentifierCase::Upper => name.to_uppercase(),
            IdentifierCase::Lower => name.to_lowercase(),
            IdentifierCase::Preserved => name.to_string(),
        }
    }

    fn is_valid_unquoted(&self, name: &str) -> bool {
        let mut chars = name.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        (first.is_ascii_alphabetic() || first == '_')
            && chars.all(|c| {
                c.is_ascii_alphanumeric() || c == '_' || self.extra_name_characters.contains(c)
            })
    }

    fn has_mixed_case(name: &str) -> bool {
        name.chars().any(char::is_lowercase) && name.chars().any(char::is_uppercase)
    }

    /// Whether a single name part must be quoted to keep its meaning.
    pub fn needs_quotes(&self, name: &str) -> bool {
        if self.is_quoted(name) {
            return false;
        }
        if self.is_reserved_word(name) || !self.is_valid_unquoted(name) {
            return true;
        }
        !self.supports_mixed_identifiers
            && self.supports_mixed_quoted_identifiers
            && Self::has_mixed_case(name)
    }

    /// Quote every dot separated part of the name that needs it.
    pub fn quote_if_necessary(&self, name: &str) -> String {
        if self.is_quoted(name) {
            return name.to_string();
        }
        let mut out = String::with_capacity(name.len() + 2);
        for (i, part) in name.split('.').enumerate() {
            if i > 0 {
                out.push('.');
            }
            self.write_if_necessary(&mut out, part);
        }
        out
    }

    pub fn write_if_necessary(&self, out: &mut String, name: &str) {
        if self.needs_quotes(name) {
            self.write_quoted(out, name);
        } else {
            out.push_str(name);
        }
    }

    /// The form the catalog stores the name in.
    ///
    /// Quoted names are stored verbatim; unquoted names are folded, unless they would be quoted
    /// by [`Self::quote_if_necessary`].
    pub fn normalize(&self, name: &str) -> String {
        if self.is_quoted(name) {
            let inner = &name[self.quote_open.len_utf8()..name.len() - self.quote_close.len_utf8()];
            let doubled = format!("{0}{0}", self.quote_close);
            return inner.replace(&doubled, &self.quote_close.to_string());
        }
        if self.needs_quotes(name) {
            return name.to_string();
        }
        self.in_proper_case(name)
    }

    /// Whether a declared name and a name read from the database metadata designate the same object.
    pub fn matches(&self, declared: &str, stored: &str) -> bool {
        let declared = self.normalize(declared);
        let stored = self.normalize(stored);
        match self.case {
            IdentifierCase::Preserved => declared.eq_ignore_ascii_case(&stored),
            _ => declared == stored,
        }
    }

    pub fn check_name_length(&self, name: &str) -> Result<()> {
        let length = name.chars().count();
        if self.max_name_length > 0 && length > self.max_name_length {
            let error = Error::new(SqlError::IdentifierTooLong {
                dialect: self.dialect,
                name: name.to_string(),
                length,
                max: self.max_name_length,
            });
            log::error!("{:#}", error);
            return Err(error);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tabula::{Dialect, IdentifierManager, SqlError, sql_error};

    #[test]
    fn quote() {
        assert_eq!(IdentifierManager::POSTGRES.quote("Order"), "\"Order\"");
        assert_eq!(IdentifierManager::MYSQL.quote("my`name"), "`my``name`");
        assert_eq!(IdentifierManager::SQL_SERVER.quote("a]b"), "[a]]b]");
        assert_eq!(IdentifierManager::ORACLE.quote("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert!(IdentifierManager::SQL_SERVER.is_quoted("[x]"));
        assert!(!IdentifierManager::SQL_SERVER.is_quoted("\"x\""));
        assert!(!IdentifierManager::POSTGRES.is_quoted("\""));
    }

    #[test]
    fn reserved_words() {
        let postgres = Dialect::Postgres.identifier_manager();
        assert!(postgres.is_reserved_word("select"));
        assert!(postgres.is_reserved_word("Returning"));
        assert!(!postgres.is_reserved_word("customer"));
        let mysql = Dialect::MySql.identifier_manager();
        assert!(mysql.is_reserved_word("key"));
        assert!(!postgres.is_reserved_word("key"));
        assert!(Dialect::Oracle.identifier_manager().is_reserved_word("number"));
    }

    #[test]
    fn needs_quotes() {
        for dialect in Dialect::ALL {
            let identifiers = dialect.identifier_manager();
            assert!(identifiers.needs_quotes("order"), "{dialect}");
            assert!(identifiers.needs_quotes("first name"), "{dialect}");
            assert!(identifiers.needs_quotes("1st"), "{dialect}");
            assert!(!identifiers.needs_quotes("customer_id"), "{dialect}");
            assert!(!identifiers.needs_quotes("UPPER_CASE"), "{dialect}");
        }
        assert!(IdentifierManager::POSTGRES.needs_quotes("MixedCase"));
        assert!(IdentifierManager::ORACLE.needs_quotes("MixedCase"));
        assert!(IdentifierManager::H2.needs_quotes("MixedCase"));
        assert!(!IdentifierManager::MYSQL.needs_quotes("MixedCase"));
        assert!(!IdentifierManager::SQLITE.needs_quotes("MixedCase"));
        assert!(!IdentifierManager::SQL_SERVER.needs_quotes("MixedCase"));
        assert!(!IdentifierManager::POSTGRES.needs_quotes("price$"));
        assert!(IdentifierManager::SQLITE.needs_quotes("price$"));
        assert!(!IdentifierManager::SQL_SERVER.needs_quotes("tmp#total"));
        assert!(IdentifierManager::SQL_SERVER.needs_quotes("@variable"));
    }

    #[test]
    fn quote_if_necessary() {
        let postgres = Dialect::Postgres.identifier_manager();
        assert_eq!(postgres.quote_if_necessary("sales.order"), "sales.\"order\"");
        assert_eq!(postgres.quote_if_necessary("sales.Item"), "sales.\"Item\"");
        assert_eq!(postgres.quote_if_necessary("\"a.b\""), "\"a.b\"");
        assert_eq!(postgres.quote_if_necessary("plain"), "plain");
        let sql_server = Dialect::SqlServer.identifier_manager();
        assert_eq!(sql_server.quote_if_necessary("dbo.user"), "dbo.[user]");
        let mut out = String::from("SELECT ");
        Dialect::MySql
            .identifier_manager()
            .write_if_necessary(&mut out, "group");
        assert_eq!(out, "SELECT `group`");
    }

    #[test]
    fn normalize() {
        assert_eq!(IdentifierManager::POSTGRES.normalize("Customer"), "Customer");
        assert_eq!(IdentifierManager::POSTGRES.normalize("CUSTOMER"), "customer");
        assert_eq!(IdentifierManager::POSTGRES.normalize("\"Customer\""), "Customer");
        assert_eq!(IdentifierManager::ORACLE.normalize("customer"), "CUSTOMER");
        assert_eq!(IdentifierManager::H2.normalize("\"say \"\"hi\"\"\""), "say \"hi\"");
        assert_eq!(IdentifierManager::MYSQL.normalize("Customer"), "Customer");
        assert_eq!(IdentifierManager::SQL_SERVER.normalize("[My]]Table]"), "My]Table");
        assert_eq!(IdentifierManager::POSTGRES.normalize("order"), "order");
    }

    #[test]
    fn matches() {
        assert!(IdentifierManager::ORACLE.matches("customer", "CUSTOMER"));
        assert!(!IdentifierManager::ORACLE.matches("\"customer\"", "CUSTOMER"));
        assert!(IdentifierManager::POSTGRES.matches("CUSTOMER", "customer"));
        assert!(!IdentifierManager::POSTGRES.matches("Customer", "customer"));
        assert!(IdentifierManager::MYSQL.matches("Customer", "customer"));
        assert!(IdentifierManager::SQLITE.matches("\"Customer\"", "CUSTOMER"));
        assert!(!IdentifierManager::SQL_SERVER.matches("customer", "client"));
    }

    #[test]
    fn name_length() {
        let postgres = Dialect::Postgres.identifier_manager();
        assert!(postgres.check_name_length(&"x".repeat(63)).is_ok());
        let error = postgres
            .check_name_length(&"x".repeat(64))
            .expect_err("Names longer than 63 characters are rejected");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::IdentifierTooLong {
                dialect: Dialect::Postgres,
                length: 64,
                max: 63,
                ..
            })
        ));
        assert!(
            Dialect::Sqlite
                .identifier_manager()
                .check_name_length(&"x".repeat(1000))
                .is_ok()
        );
        assert_eq!(Dialect::Oracle.identifier_manager().max_name_length(), 128);
    }

    #[test]
    fn dialect_from_url() {
        for (url, dialect) in [
            ("postgres://localhost/db", Dialect::Postgres),
            ("postgresql://user@host:5432/db", Dialect::Postgres),
            ("MySQL://root@localhost/db", Dialect::MySql),
            ("mariadb://localhost/db", Dialect::MySql),
            ("sqlite://:memory:", Dialect::Sqlite),
            ("sqlite:data.db", Dialect::Sqlite),
            ("h2://mem/test", Dialect::H2),
            ("oracle://localhost:1521/xe", Dialect::Oracle),
            ("sqlserver://localhost", Dialect::SqlServer),
            ("mssql://localhost", Dialect::SqlServer),
        ] {
            assert_eq!(
                Dialect::from_url(url).expect("Failed to resolve the dialect"),
                dialect,
                "{url}"
            );
        }
        assert!(Dialect::from_url("redis://localhost").is_err());
        assert!(Dialect::from_url("").is_err());
    }

    #[test]
    fn dialect_names() {
        let names: Vec<String> = Dialect::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(
            names,
            ["PostgreSQL", "MySQL", "SQLite", "H2", "Oracle", "SQL Server"]
        );
    }

    #[test]
    fn rewrite_placeholders() {
        assert_eq!(
            Dialect::Postgres
                .rewrite_placeholders("SELECT a FROM t WHERE a = ? AND b = '?' AND \"c?\" = ?"),
            "SELECT a FROM t WHERE a = $1 AND b = '?' AND \"c?\" = $2"
        );
        assert_eq!(
            Dialect::Postgres.rewrite_placeholders("SELECT 'it''s ?' WHERE x = ?"),
            "SELECT 'it''s ?' WHERE x = $1"
        );
        assert_eq!(
            Dialect::MySql.rewrite_placeholders("SELECT ? FROM t"),
            "SELECT ? FROM t"
        );
    }
}

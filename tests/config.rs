#[cfg(test)]
mod tests {
    use std::time::Duration;
    use tabula::{DatabaseConfig, IsolationLevel};
    use tabula_tests::silent_logs;
    use time::{UtcOffset, macros::offset};

    #[test]
    fn from_url() {
        let (config, rest) = DatabaseConfig::from_url(
            "postgres://user@localhost:5432/shop?isolation=repeatable_read&max_attempts=5\
             &sslmode=require&fetch_size=100&time_zone=%2B02:00&timeout_ms=1500\
             &retry_delay_ms=10&read_only=true&schema=sales",
        )
        .expect("Failed to read the configuration");
        assert_eq!(rest, "postgres://user@localhost:5432/shop?sslmode=require");
        assert_eq!(
            config,
            DatabaseConfig {
                isolation_level: Some(IsolationLevel::RepeatableRead),
                default_fetch_size: Some(100),
                max_attempts: 5,
                min_retry_delay: Duration::from_millis(10),
                max_retry_delay: Duration::from_millis(10),
                default_time_zone: offset!(+2),
                statement_timeout: Some(Duration::from_millis(1500)),
                read_only: true,
                default_schema: Some("sales".into()),
            }
        );
    }

    #[test]
    fn from_url_without_parameters() {
        let (config, rest) =
            DatabaseConfig::from_url("sqlite://:memory:").expect("Failed to read the url");
        assert_eq!(config, DatabaseConfig::default());
        assert_eq!(rest, "sqlite://:memory:");

        let (config, rest) = DatabaseConfig::from_url("mysql://localhost/db?time_zone=utc")
            .expect("Failed to read the url");
        assert_eq!(config.default_time_zone, UtcOffset::UTC);
        assert_eq!(rest, "mysql://localhost/db");

        let (config, _) = DatabaseConfig::from_url("h2://mem/test?time_zone=-05:30")
            .expect("Failed to read the url");
        assert_eq!(config.default_time_zone, offset!(-5:30));
    }

    #[test]
    fn retry_delay_bounds() {
        let (config, _) = DatabaseConfig::from_url(
            "postgres://localhost/db?max_retry_delay_ms=250&retry_delay_ms=100",
        )
        .expect("Failed to read the url");
        assert_eq!(config.retry_delay(0), Duration::from_millis(100));
        assert_eq!(config.retry_delay(1), Duration::from_millis(100));
        assert_eq!(config.retry_delay(2), Duration::from_millis(200));
        assert_eq!(config.retry_delay(3), Duration::from_millis(250));
        assert_eq!(config.retry_delay(10), Duration::from_millis(250));

        // The upper bound never falls below the lower one
        let config = DatabaseConfig {
            min_retry_delay: Duration::from_millis(100),
            ..Default::default()
        };
        assert_eq!(config.retry_delay(5), Duration::from_millis(100));
        assert_eq!(DatabaseConfig::default().retry_delay(3), Duration::ZERO);
    }

    #[test]
    fn invalid_values() {
        silent_logs! {
            for url in [
                "postgres://localhost/db?max_attempts=zero",
                "postgres://localhost/db?isolation=snapshot",
                "postgres://localhost/db?time_zone=mars",
                "postgres://localhost/db?read_only=maybe",
                "postgres://localhost/db?timeout_ms=-1",
            ] {
                let error = DatabaseConfig::from_url(url).expect_err("The value is invalid");
                assert!(format!("{:#}", error).contains("Invalid value"), "{url}");
            }
            let error = DatabaseConfig::from_url("postgres://localhost/db?max_attempts=0")
                .expect_err("At least one attempt is needed");
            assert!(format!("{:#}", error).contains("must be at least 1"));
        }
    }

    #[test]
    fn builder() {
        let config = DatabaseConfig::builder()
            .isolation_level(IsolationLevel::ReadUncommitted)
            .default_fetch_size(500)
            .max_attempts(0)
            .retry_delay(Duration::from_millis(20), Duration::from_millis(5))
            .default_time_zone(offset!(+9))
            .statement_timeout(Duration::from_secs(30))
            .read_only(true)
            .default_schema("archive")
            .build();
        assert_eq!(config.isolation_level, Some(IsolationLevel::ReadUncommitted));
        assert_eq!(config.default_fetch_size, Some(500));
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.min_retry_delay, Duration::from_millis(20));
        assert_eq!(config.max_retry_delay, Duration::from_millis(20));
        assert_eq!(config.default_time_zone, offset!(+9));
        assert_eq!(config.statement_timeout, Some(Duration::from_secs(30)));
        assert!(config.read_only);
        assert_eq!(config.default_schema.as_deref(), Some("archive"));
    }

    #[test]
    fn isolation_levels() {
        for (name, level) in [
            ("read uncommitted", IsolationLevel::ReadUncommitted),
            ("READ_COMMITTED", IsolationLevel::ReadCommitted),
            ("repeatable-read", IsolationLevel::RepeatableRead),
            (" Serializable ", IsolationLevel::Serializable),
        ] {
            assert_eq!(IsolationLevel::from_name(name), Some(level), "{name}");
            assert_eq!(IsolationLevel::from_code(level.code()), Some(level));
        }
        assert_eq!(IsolationLevel::from_name("snapshot"), None);
        assert_eq!(IsolationLevel::ReadCommitted.code(), 2);
        assert_eq!(IsolationLevel::Serializable.code(), 8);
        assert_eq!(IsolationLevel::from_code(3), None);
        assert_eq!(IsolationLevel::RepeatableRead.sql(), "REPEATABLE READ");
    }
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use rust_decimal::Decimal;
    use tabula::{
        Column, Compiler, Dialect, ExprExt, Source, SqlError, Statement, Table, TypedExpr, Value,
        compile, count_all, exists, exprs, lower, sql_error,
    };

    struct Books {
        table: Table,
        id: Column<i64>,
        title: Column<String>,
        released: Column<i32>,
        price: Column<Decimal>,
        author: Column<Option<String>>,
    }

    fn books() -> Books {
        let mut t = Table::builder("book");
        let id = t.long("id").auto_increment().add();
        let title = t.varchar("title", 80).add();
        let released = t.integer("released").default_value(2000).add();
        let price = t.decimal("price", 8, 2).add();
        let author = t.varchar("author", 40).nullable().add();
        t.primary_key(&[&id]);
        Books {
            table: t.build().expect("Failed to define the book table"),
            id,
            title,
            released,
            price,
            author,
        }
    }

    fn sql(statement: impl Into<Statement>, dialect: Dialect) -> String {
        compile(&statement.into(), dialect)
            .expect("Failed to compile")
            .sql
    }

    #[test]
    fn select_filter_order_limit() {
        let b = books();
        let query = b
            .table
            .select(exprs![&b.title, &b.released])
            .filter(b.released.greater(1990).and(b.title.like("The%")))
            .order_by(b.released.desc())
            .limit(10);
        let compiled =
            compile(&query.clone().into(), Dialect::Sqlite).expect("Failed to compile");
        assert_eq!(
            compiled.sql,
            indoc! {"
                SELECT title, released
                FROM book
                WHERE released > ? AND title LIKE ?
                ORDER BY released DESC
                LIMIT 10
            "}
            .trim()
        );
        assert_eq!(compiled.params.len(), 2);
        assert_eq!(compiled.params[0].0, Value::Int32(Some(1990)));
        assert_eq!(compiled.params[1].0, Value::Varchar(Some("The%".into())));
        assert_eq!(compiled.fields.as_ref().map(|v| v.len()), Some(2));

        assert_eq!(
            sql(query, Dialect::Postgres),
            indoc! {"
                SELECT title, released
                FROM book
                WHERE released > $1 AND title LIKE $2
                ORDER BY released DESC
                LIMIT 10
            "}
            .trim()
        );
    }

    #[test]
    fn select_all_and_distinct() {
        let b = books();
        assert_eq!(
            sql(b.table.select_all(), Dialect::H2),
            indoc! {"
                SELECT id, title, released, price, author
                FROM book
            "}
            .trim()
        );
        assert_eq!(
            sql(b.table.select([&b.author]).distinct(), Dialect::MySql),
            indoc! {"
                SELECT DISTINCT author
                FROM book
            "}
            .trim()
        );
    }

    #[test]
    fn offset_without_limit() {
        let b = books();
        let query = b.table.select([&b.title]).offset(20);
        assert_eq!(
            sql(query.clone(), Dialect::Sqlite),
            "SELECT title\nFROM book\nLIMIT -1\nOFFSET 20"
        );
        assert_eq!(
            sql(query.clone(), Dialect::MySql),
            "SELECT title\nFROM book\nLIMIT 18446744073709551615\nOFFSET 20"
        );
        assert_eq!(
            sql(query.clone(), Dialect::Postgres),
            "SELECT title\nFROM book\nOFFSET 20"
        );
        assert_eq!(
            sql(query.clone(), Dialect::Oracle),
            "SELECT title\nFROM book\nOFFSET 20 ROWS"
        );
        assert_eq!(
            sql(query, Dialect::SqlServer),
            "SELECT title\nFROM book\nORDER BY (SELECT NULL)\nOFFSET 20 ROWS"
        );
    }

    #[test]
    fn limit_and_offset() {
        let b = books();
        let query = b.table.select([&b.title]).limit(5).offset(20);
        assert_eq!(
            sql(query.clone(), Dialect::Postgres),
            "SELECT title\nFROM book\nLIMIT 5\nOFFSET 20"
        );
        assert_eq!(
            sql(query, Dialect::Oracle),
            "SELECT title\nFROM book\nOFFSET 20 ROWS\nFETCH NEXT 5 ROWS ONLY"
        );
        let query = b.table.select([&b.title]).limit(5);
        assert_eq!(
            sql(query.clone(), Dialect::Oracle),
            "SELECT title\nFROM book\nFETCH FIRST 5 ROWS ONLY"
        );
        assert_eq!(
            sql(query, Dialect::SqlServer),
            "SELECT title\nFROM book\nORDER BY (SELECT NULL)\nOFFSET 0 ROWS\nFETCH NEXT 5 ROWS ONLY"
        );
        let query = b
            .table
            .select([&b.title])
            .order_by(b.title.asc())
            .limit(5);
        assert_eq!(
            sql(query, Dialect::SqlServer),
            "SELECT title\nFROM book\nORDER BY title ASC\nOFFSET 0 ROWS\nFETCH NEXT 5 ROWS ONLY"
        );
    }

    #[test]
    fn for_update() {
        let b = books();
        let query = b
            .table
            .select([&b.id])
            .filter(b.id.equal(7))
            .for_update();
        assert_eq!(
            sql(query.clone(), Dialect::Postgres),
            "SELECT id\nFROM book\nWHERE id = $1\nFOR UPDATE"
        );
        assert_eq!(
            sql(query, Dialect::Sqlite),
            "SELECT id\nFROM book\nWHERE id = ?"
        );
    }

    #[test]
    fn group_by_alias_and_having() {
        let b = books();
        let total = count_all().alias("total");
        let query = b
            .table
            .select(exprs![&b.author, &total])
            .group_by([&b.author])
            .having(count_all().greater(1))
            .expect("Failed to set the having clause")
            .order_by(total.desc());
        assert_eq!(
            sql(query.clone(), Dialect::Sqlite),
            indoc! {"
                SELECT author, COUNT(*) AS total
                FROM book
                GROUP BY author
                HAVING COUNT(*) > ?
                ORDER BY total DESC
            "}
            .trim()
        );
        let error = query
            .having(count_all().less(10))
            .expect_err("The having clause can be set once");
        assert!(matches!(sql_error(&error), Some(SqlError::DuplicateHaving)));
    }

    #[test]
    fn duplicated_projection() {
        let b = books();
        let query = b.table.select(exprs![&b.title, lower(&b.title), &b.title]);
        assert!(query.has_duplicate_fields());
        let compiled = compile(&query.into(), Dialect::Postgres).expect("Failed to compile");
        assert_eq!(compiled.sql, "SELECT title, LOWER(title)\nFROM book");
        assert_eq!(compiled.fields.map(|v| v.len()), Some(2));
    }

    #[test]
    fn precedence() {
        let b = books();
        let cheap = b.price.less(Decimal::new(10, 0));
        let old = b.released.less(1900);
        let query = b
            .table
            .select([&b.title])
            .filter(cheap.or(old).and(b.author.is_not_null()));
        assert_eq!(
            sql(query, Dialect::Sqlite),
            "SELECT title\nFROM book\nWHERE (price < ? OR released < ?) AND author IS NOT NULL"
        );
        let discounted: TypedExpr<Decimal> = b.price.minus(Decimal::ONE).times(Decimal::TWO);
        let query = b.table.select([discounted]);
        assert_eq!(
            sql(query, Dialect::Sqlite),
            "SELECT (price - ?) * ?\nFROM book"
        );
        let query = b
            .table
            .select([&b.title])
            .filter(b.released.greater(1900).not());
        assert_eq!(
            sql(query, Dialect::Sqlite),
            "SELECT title\nFROM book\nWHERE NOT released > ?"
        );
    }

    #[test]
    fn null_comparisons() {
        let b = books();
        let query = b.table.select([&b.title]).filter(b.author.equal(None));
        assert_eq!(
            sql(query, Dialect::Postgres),
            "SELECT title\nFROM book\nWHERE author IS NULL"
        );
        let query = b.table.select([&b.title]).filter(b.author.not_equal(None));
        assert_eq!(
            sql(query, Dialect::Postgres),
            "SELECT title\nFROM book\nWHERE author IS NOT NULL"
        );
    }

    #[test]
    fn in_list() {
        let b = books();
        let query = b
            .table
            .delete()
            .filter(b.released.less(1900).or(b.title.is_in(["Emma", "Dune"])));
        let compiled = compile(&query.into(), Dialect::Postgres).expect("Failed to compile");
        assert_eq!(
            compiled.sql,
            "DELETE FROM book\nWHERE released < $1 OR title IN ($2, $3)"
        );
        assert_eq!(compiled.params.len(), 3);
        assert!(compiled.fields.is_none());

        let query = b.table.select([&b.title]).filter(b.title.is_in(Vec::<String>::new()));
        assert_eq!(sql(query, Dialect::MySql), "SELECT title\nFROM book\nWHERE 1 = 0");
        let query = b
            .table
            .select([&b.title])
            .filter(b.title.not_in(Vec::<String>::new()));
        assert_eq!(sql(query, Dialect::MySql), "SELECT title\nFROM book\nWHERE 1 = 1");
    }

    #[test]
    fn insert_rows() {
        let b = books();
        let insert = b
            .table
            .insert()
            .row([b.title.to("Dune"), b.released.to(1965)])
            .row([b.title.to("Emma"), b.released.to(1815)]);
        let compiled = compile(&insert.into(), Dialect::Postgres).expect("Failed to compile");
        assert_eq!(
            compiled.sql,
            indoc! {"
                INSERT INTO book (title, released) VALUES
                ($1, $2),
                ($3, $4)
            "}
            .trim()
        );
        assert_eq!(
            compiled
                .params
                .iter()
                .map(|(v, ..)| v.clone())
                .collect::<Vec<_>>(),
            [
                Value::Varchar(Some("Dune".into())),
                Value::Int32(Some(1965)),
                Value::Varchar(Some("Emma".into())),
                Value::Int32(Some(1815)),
            ]
        );
    }

    #[test]
    fn insert_with_missing_values() {
        let b = books();
        let insert = b
            .table
            .insert()
            .row([b.title.to("Dune"), b.released.to(1965)])
            .row([b.title.to("Emma")]);
        assert_eq!(
            sql(insert.clone(), Dialect::Postgres),
            "INSERT INTO book (title, released) VALUES\n($1, $2),\n($3, DEFAULT)"
        );
        let error = compile(&insert.into(), Dialect::Sqlite)
            .expect_err("SQLite has no DEFAULT in a multi row insert");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::UnsupportedByDialect {
                dialect: Dialect::Sqlite,
                ..
            })
        ));
    }

    #[test]
    fn insert_default_values() {
        let mut t = Table::builder("counter");
        let id = t.long("id").auto_increment().add();
        t.primary_key(&[&id]);
        let counter = t.build().expect("Failed to define the counter table");
        let insert = counter.insert().row([]);
        assert_eq!(
            sql(insert.clone(), Dialect::Postgres),
            "INSERT INTO counter DEFAULT VALUES"
        );
        assert_eq!(
            sql(insert.clone(), Dialect::MySql),
            "INSERT INTO counter () VALUES ()"
        );
        assert!(compile(&insert.into(), Dialect::Oracle).is_err());
    }

    #[test]
    fn upsert() {
        let b = books();
        let insert = b
            .table
            .insert()
            .row([b.id.to(1), b.title.to("Dune"), b.released.to(1965)])
            .on_conflict_update();
        assert_eq!(
            sql(insert.clone(), Dialect::Sqlite),
            indoc! {"
                INSERT INTO book (id, title, released) VALUES
                (?, ?, ?)
                ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                released = EXCLUDED.released
            "}
            .trim()
        );
        assert_eq!(
            sql(insert.clone(), Dialect::MySql),
            indoc! {"
                INSERT INTO book (id, title, released) VALUES
                (?, ?, ?)
                ON DUPLICATE KEY UPDATE
                title = VALUES(title),
                released = VALUES(released)
            "}
            .trim()
        );
        let error = compile(&insert.into(), Dialect::Oracle).expect_err("Oracle has no upsert");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::UnsupportedByDialect {
                dialect: Dialect::Oracle,
                ..
            })
        ));
    }

    #[test]
    fn returning() {
        let b = books();
        let insert = b
            .table
            .insert()
            .row([b.title.to("Dune"), b.price.to(Decimal::new(1999, 2))])
            .returning([&b.id]);
        let compiled =
            compile(&insert.clone().into(), Dialect::Postgres).expect("Failed to compile");
        assert_eq!(
            compiled.sql,
            "INSERT INTO book (title, price) VALUES\n($1, $2)\nRETURNING id"
        );
        assert_eq!(compiled.fields.map(|v| v.len()), Some(1));
        let error = compile(&insert.into(), Dialect::MySql).expect_err("MySQL has no RETURNING");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::UnsupportedByDialect {
                dialect: Dialect::MySql,
                ..
            })
        ));
    }

    #[test]
    fn update() {
        let b = books();
        let update = b
            .table
            .update()
            .set(b.price.to(b.price.times(Decimal::new(11, 1))))
            .set(b.title.to("Untitled"))
            .filter(b.author.is_null());
        assert_eq!(
            sql(update, Dialect::Sqlite),
            indoc! {"
                UPDATE book SET
                price = price * ?,
                title = ?
                WHERE author IS NULL
            "}
            .trim()
        );
        let empty = b.table.update().filter(b.id.equal(1));
        assert!(compile(&empty.into(), Dialect::Sqlite).is_err());
    }

    #[test]
    fn delete_all() {
        let b = books();
        assert_eq!(sql(b.table.delete(), Dialect::H2), "DELETE FROM book");
    }

    #[test]
    fn create_table() {
        let b = books();
        assert_eq!(
            sql(b.table.create_if_not_exists(), Dialect::Sqlite),
            indoc! {"
                CREATE TABLE IF NOT EXISTS book (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title VARCHAR(80) NOT NULL,
                released INTEGER DEFAULT 2000 NOT NULL,
                price DECIMAL(8, 2) NOT NULL,
                author VARCHAR(40)
                )
            "}
            .trim()
        );
        assert_eq!(
            sql(b.table.create(), Dialect::Postgres),
            indoc! {"
                CREATE TABLE book (
                id BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY,
                title VARCHAR(80) NOT NULL,
                released INTEGER DEFAULT 2000 NOT NULL,
                price DECIMAL(8, 2) NOT NULL,
                author VARCHAR(40)
                )
            "}
            .trim()
        );
        assert_eq!(
            sql(b.table.create(), Dialect::MySql),
            indoc! {"
                CREATE TABLE book (
                id BIGINT AUTO_INCREMENT PRIMARY KEY,
                title VARCHAR(80) NOT NULL,
                released INT DEFAULT 2000 NOT NULL,
                price DECIMAL(8, 2) NOT NULL,
                author VARCHAR(40)
                )
            "}
            .trim()
        );
        assert_eq!(
            sql(b.table.create(), Dialect::SqlServer),
            indoc! {"
                CREATE TABLE book (
                id BIGINT IDENTITY(1,1) PRIMARY KEY,
                title NVARCHAR(80) NOT NULL,
                released INTEGER DEFAULT 2000 NOT NULL,
                price DECIMAL(8, 2) NOT NULL,
                author NVARCHAR(40)
                )
            "}
            .trim()
        );
        for dialect in [Dialect::Oracle, Dialect::SqlServer] {
            let error = compile(&b.table.create_if_not_exists().into(), dialect)
                .expect_err("IF NOT EXISTS is not supported");
            assert!(matches!(
                sql_error(&error),
                Some(SqlError::UnsupportedByDialect { .. })
            ));
        }
        assert_eq!(
            sql(b.table.drop_table(true), Dialect::Postgres),
            "DROP TABLE IF EXISTS book"
        );
        assert_eq!(sql(b.table.drop_table(false), Dialect::Oracle), "DROP TABLE book");
        assert_eq!(
            sql(b.table.drop_table(true), Dialect::SqlServer),
            "DROP TABLE IF EXISTS book"
        );
        let error = compile(&b.table.drop_table(true).into(), Dialect::Oracle)
            .expect_err("Oracle has no DROP TABLE IF EXISTS");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::UnsupportedByDialect { .. })
        ));
    }

    #[test]
    fn create_table_with_constraints() {
        let mut t = Table::builder("writer");
        let writer_id = t.long("id").add();
        let name = t.varchar("name", 40).unique().add();
        t.primary_key(&[&writer_id]);
        let writer = t.build().expect("Failed to define the writer table");

        let mut t = Table::builder("novel");
        let novel_id = t.long("id").add();
        let writer_ref = t
            .long("writer_id")
            .references(&writer_id)
            .on_delete(tabula::Action::Cascade)
            .add();
        let title = t.varchar("title", 80).add();
        t.primary_key(&[&novel_id]);
        t.unique(&[&writer_ref, &title]);
        t.index("novel_title", &[&title]);
        let novel = t.build().expect("Failed to define the novel table");

        assert_eq!(
            sql(writer.create(), Dialect::Postgres),
            indoc! {"
                CREATE TABLE writer (
                id BIGINT PRIMARY KEY,
                name VARCHAR(40) NOT NULL UNIQUE
                )
            "}
            .trim()
        );
        let statements = novel.create_if_not_exists().statements();
        assert_eq!(statements.len(), 2);
        let compiled: Vec<String> = statements
            .into_iter()
            .map(|v| sql(v, Dialect::Postgres))
            .collect();
        assert_eq!(
            compiled[0],
            indoc! {"
                CREATE TABLE IF NOT EXISTS novel (
                id BIGINT PRIMARY KEY,
                writer_id BIGINT NOT NULL REFERENCES writer(id) ON DELETE CASCADE,
                title VARCHAR(80) NOT NULL,
                UNIQUE (writer_id, title)
                )
            "}
            .trim()
        );
        assert_eq!(
            compiled[1],
            "CREATE INDEX IF NOT EXISTS novel_title ON novel (title)"
        );
    }

    #[test]
    fn composite_key_with_auto_increment() {
        let mut t = Table::builder("order_line");
        let order_id = t.long("order_id").auto_increment().add();
        let line = t.integer("line").add();
        t.primary_key(&[&order_id, &line]);
        let order_line = t.build().expect("Failed to define the order_line table");
        assert_eq!(
            sql(order_line.create(), Dialect::Postgres),
            indoc! {"
                CREATE TABLE order_line (
                order_id BIGINT GENERATED BY DEFAULT AS IDENTITY NOT NULL,
                line INTEGER NOT NULL,
                PRIMARY KEY (order_id, line)
                )
            "}
            .trim()
        );
        let error = compile(&order_line.create().into(), Dialect::Sqlite)
            .expect_err("SQLite cannot generate part of a composite key");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::UnsupportedByDialect {
                dialect: Dialect::Sqlite,
                ..
            })
        ));
    }

    #[test]
    fn join() {
        let mut t = Table::builder("writer");
        let writer_id = t.long("id").add();
        let name = t.varchar("name", 40).add();
        t.primary_key(&[&writer_id]);
        let writer = t.build().expect("Failed to define the writer table");

        let mut t = Table::builder("novel");
        let novel_id = t.long("id").add();
        let writer_ref = t.long("writer_id").add();
        let title = t.varchar("title", 80).add();
        t.primary_key(&[&novel_id]);
        let novel = t.build().expect("Failed to define the novel table");

        let query = Source::from(&novel)
            .left_join(&writer, writer_ref.equal(&writer_id))
            .select(exprs![&title, &name])
            .filter(name.like("A%"));
        assert_eq!(
            sql(query, Dialect::Sqlite),
            indoc! {"
                SELECT novel.title, writer.name
                FROM novel LEFT JOIN writer ON novel.writer_id = writer.id
                WHERE writer.name LIKE ?
            "}
            .trim()
        );

        let query = Source::from(&novel)
            .join(tabula::JoinType::Full, &writer, Some(writer_ref.equal(&writer_id)))
            .select([&title]);
        let error = compile(&query.into(), Dialect::MySql).expect_err("MySQL has no full join");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::UnsupportedByDialect { .. })
        ));

        // Aliased table
        let other = novel.alias("other");
        let other_title = other.typed_column(&title).expect("Missing the aliased title");
        let query = Source::from(&novel)
            .cross_join(&other)
            .select(exprs![&title, &other_title])
            .filter(title.less(&other_title));
        assert_eq!(
            sql(query, Dialect::Postgres),
            indoc! {"
                SELECT novel.title, other.title
                FROM novel CROSS JOIN novel other
                WHERE novel.title < other.title
            "}
            .trim()
        );
    }

    #[test]
    fn dangling_reference() {
        let b = books();
        let mut t = Table::builder("writer");
        let name = t.varchar("name", 40).add();
        t.build().expect("Failed to define the writer table");

        let query = b.table.select([&b.title]).filter(name.equal("Austen"));
        let error = compile(&query.into(), Dialect::Sqlite)
            .expect_err("The writer table is not part of the query");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::DanglingReference { table, .. }) if table == "writer"
        ));

        let update = b.table.update().set(b.title.to(&name));
        assert!(matches!(
            sql_error(&compile(&update.into(), Dialect::Sqlite).expect_err("Dangling value")),
            Some(SqlError::DanglingReference { .. })
        ));
    }

    #[test]
    fn sub_queries() {
        let b = books();
        let mut t = Table::builder("writer");
        let name = t.varchar("name", 40).add();
        let writer = t.build().expect("Failed to define the writer table");

        // Correlated sub-query sees the enclosing table
        let query = b.table.select([&b.title]).filter(exists(
            writer
                .select([&name])
                .filter(name.equal(&b.title)),
        ));
        assert_eq!(
            sql(query, Dialect::Postgres),
            indoc! {"
                SELECT title
                FROM book
                WHERE EXISTS (SELECT name
                FROM writer
                WHERE name = title)
            "}
            .trim()
        );

        let count = b.table.select([&b.title]).limit(2).count_query();
        assert_eq!(
            sql(count, Dialect::Sqlite),
            indoc! {"
                SELECT COUNT(*)
                FROM (SELECT title AS book_title
                FROM book
                LIMIT 2) subquery
            "}
            .trim()
        );
        let count = b
            .table
            .select([&b.title])
            .filter(b.released.greater(2000))
            .count_query();
        assert_eq!(
            sql(count, Dialect::Sqlite),
            "SELECT COUNT(*)\nFROM book\nWHERE released > ?"
        );

        // Having keeps the aggregate inside the derived table
        let count = b
            .table
            .select([count_all()])
            .having(count_all().greater(5))
            .expect("Failed to set the having clause")
            .count_query();
        assert_eq!(
            sql(count, Dialect::Sqlite),
            indoc! {"
                SELECT COUNT(*)
                FROM (SELECT COUNT(*) AS exp1
                FROM book
                HAVING COUNT(*) > ?) subquery
            "}
            .trim()
        );
    }

    #[test]
    fn exists_query_locking() {
        let b = books();
        let query = b
            .table
            .select([&b.id])
            .filter(b.id.equal(7))
            .for_update();
        assert_eq!(
            sql(query.exists_query(Dialect::Postgres), Dialect::Postgres),
            "SELECT id\nFROM book\nWHERE id = $1\nFOR UPDATE"
        );
        assert_eq!(
            sql(query.exists_query(Dialect::Sqlite), Dialect::Sqlite),
            "SELECT id\nFROM book\nWHERE id = ?\nLIMIT 1"
        );
        assert_eq!(
            sql(
                b.table.select([&b.id]).exists_query(Dialect::Postgres),
                Dialect::Postgres
            ),
            "SELECT id\nFROM book\nLIMIT 1"
        );
    }

    #[test]
    fn inline_values() {
        let b = books();
        let query: Statement = b
            .table
            .select([&b.title])
            .filter(b.title.equal("O'Brien").and(b.released.greater_eq(1900)))
            .into();
        assert_eq!(
            Compiler::new(Dialect::Postgres)
                .compile_inline(&query)
                .expect("Failed to compile"),
            "SELECT title\nFROM book\nWHERE title = 'O''Brien' AND released >= 1900"
        );
        assert_eq!(
            Compiler::new(Dialect::SqlServer)
                .compile_inline(&query)
                .expect("Failed to compile"),
            "SELECT title\nFROM book\nWHERE title = N'O''Brien' AND released >= 1900"
        );
        let path: Statement = b
            .table
            .select([&b.title])
            .filter(b.title.equal("C:\\books"))
            .into();
        assert_eq!(
            Compiler::new(Dialect::MySql)
                .compile_inline(&path)
                .expect("Failed to compile"),
            "SELECT title\nFROM book\nWHERE title = 'C:\\\\books'"
        );
    }

    #[test]
    fn quoted_identifiers() {
        let mut t = Table::builder("order");
        let id = t.long("id").add();
        let group = t.varchar("group", 10).add();
        let mixed = t.integer("ItemCount").add();
        t.primary_key(&[&id]);
        let order = t.build().expect("Failed to define the order table");
        let query = order
            .select(exprs![&group, &mixed])
            .filter(id.equal(1));
        assert_eq!(
            sql(query.clone(), Dialect::Postgres),
            "SELECT \"group\", \"ItemCount\"\nFROM \"order\"\nWHERE id = $1"
        );
        assert_eq!(
            sql(query.clone(), Dialect::MySql),
            "SELECT `group`, ItemCount\nFROM `order`\nWHERE id = ?"
        );
        assert_eq!(
            sql(query, Dialect::SqlServer),
            "SELECT [group], ItemCount\nFROM [order]\nWHERE id = ?"
        );
    }

    #[test]
    fn identifier_too_long() {
        let name = "a".repeat(64);
        let mut t = Table::builder(name.as_str());
        let id = t.long("id").add();
        t.primary_key(&[&id]);
        let table = t.build().expect("Failed to define the table");
        let error = compile(&table.select_all().into(), Dialect::Postgres)
            .expect_err("Postgres names are limited to 63 characters");
        assert!(matches!(
            sql_error(&error),
            Some(SqlError::IdentifierTooLong { max: 63, length: 64, .. })
        ));
        assert!(compile(&table.select_all().into(), Dialect::MySql).is_ok());
    }

    #[test]
    fn time_zone_of_the_compiler() {
        let mut t = Table::builder("event");
        let at = t.timestamp("at").add();
        let event = t.build().expect("Failed to define the event table");
        let instant = time::macros::datetime!(2024-03-01 10:30:00 UTC);
        let query: Statement = event.select([&at]).filter(at.less(instant)).into();
        let compiler = Compiler::new(Dialect::Postgres)
            .with_time_zone(time::macros::offset!(+2));
        assert_eq!(
            compiler.compile_inline(&query).expect("Failed to compile"),
            "SELECT at\nFROM event\nWHERE at < '2024-03-01 12:30:00+02:00'"
        );
        assert_eq!(
            Compiler::new(Dialect::Sqlite)
                .compile_inline(&query)
                .expect("Failed to compile"),
            "SELECT at\nFROM event\nWHERE at < '2024-03-01 10:30:00'"
        );
    }
}

use crate::silent_logs;
use std::sync::LazyLock;
use tabula::{
    Column, ConnectionProvider, Database, Error, ExprExt, SqlError, Table, TransactionState,
    sql_error,
};
use tokio::sync::Mutex;

pub async fn transactions<P: ConnectionProvider>(database: &Database<P>) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    let mut t = Table::builder("ledger");
    let id = t.long("id").add();
    let amount = t.integer("amount").add();
    t.primary_key(&[&id]);
    let ledger = t.build().expect("Failed to define the ledger table");

    // Setup
    database
        .transaction(async |tx| {
            tx.drop_table(&ledger.drop_table(true)).await?;
            tx.create_table(&ledger.create()).await
        })
        .await
        .expect("Failed to create the ledger table");

    // A failing unit of work leaves nothing behind
    silent_logs! {
        let error = database
            .transaction(async |tx| {
                assert_eq!(tx.attempt(), 1);
                tx.exec(ledger.insert().row([id.to(1), amount.to(100)]))
                    .await?;
                Err::<(), _>(Error::msg("Insufficient funds"))
            })
            .await
            .expect_err("The unit of work must fail");
        assert_eq!(error.to_string(), "Insufficient funds");
    }
    assert!(entries(database, &ledger, &id).await.is_empty());

    // Savepoints
    database
        .transaction(async |tx| {
            tx.exec(ledger.insert().row([id.to(1), amount.to(100)]))
                .await?;
            tx.set_savepoint("first").await?;
            tx.exec(ledger.insert().row([id.to(2), amount.to(-40)]))
                .await?;
            tx.set_savepoint("second").await?;
            tx.exec(ledger.insert().row([id.to(3), amount.to(-70)]))
                .await?;
            assert_eq!(tx.savepoints(), ["first", "second"]);
            tx.rollback_to_savepoint("first").await?;
            assert_eq!(tx.savepoints(), ["first"]);
            assert_eq!(tx.count(&ledger.select_all()).await?, 1);
            silent_logs! {
                let unknown = tx
                    .release_savepoint("second")
                    .await
                    .expect_err("The second savepoint is gone");
                assert!(matches!(
                    sql_error(&unknown),
                    Some(SqlError::UnknownSavepoint { name }) if name == "second"
                ));
            }
            tx.exec(ledger.insert().row([id.to(4), amount.to(-10)]))
                .await?;
            tx.release_savepoint("first").await?;
            assert!(tx.savepoints().is_empty());
            Ok(())
        })
        .await
        .expect("Failed to use the savepoints");
    assert_eq!(entries(database, &ledger, &id).await, [1, 4]);

    // Explicit commit inside the unit of work
    database
        .transaction(async |tx| {
            tx.exec(ledger.insert().row([id.to(5), amount.to(20)]))
                .await?;
            tx.commit().await?;
            assert_eq!(tx.state(), TransactionState::Committed);
            silent_logs! {
                let closed = tx
                    .exec(ledger.delete())
                    .await
                    .expect_err("A committed transaction takes no more statements");
                assert!(matches!(
                    sql_error(&closed),
                    Some(SqlError::TransactionNotActive {
                        state: TransactionState::Committed
                    })
                ));
            }
            Ok(())
        })
        .await
        .expect("Failed to commit explicitly");
    assert_eq!(entries(database, &ledger, &id).await, [1, 4, 5]);

    // Explicit rollback with a successful outcome
    let outcome = database
        .transaction(async |tx| {
            tx.exec(ledger.update().set(amount.to(0))).await?;
            tx.rollback().await?;
            Ok(tx.state())
        })
        .await
        .expect("Failed to roll back explicitly");
    assert_eq!(outcome, TransactionState::RolledBack);
    let total = database
        .transaction(async |tx| {
            tx.count(&ledger.select_all().filter(amount.equal(0)))
                .await
        })
        .await
        .expect("Failed to count the zeroed entries");
    assert_eq!(total, 0);

    // A transient conflict runs the unit of work again from scratch
    if database.config().max_attempts >= 2 {
        silent_logs! {
            let attempt = database
                .transaction(async |tx| {
                    let attempt = tx.attempt();
                    tx.exec(ledger.insert().row([id.to(10 + i64::from(attempt)), amount.to(1)]))
                        .await?;
                    if attempt == 1 {
                        return Err(Error::new(SqlError::TransientConflict {
                            message: "could not serialize access".into(),
                        }));
                    }
                    Ok(attempt)
                })
                .await
                .expect("The second attempt must commit");
            assert_eq!(attempt, 2);
        }
        assert_eq!(entries(database, &ledger, &id).await, [1, 4, 5, 12]);
    }
}

async fn entries<P: ConnectionProvider>(
    database: &Database<P>,
    ledger: &Table,
    id: &Column<i64>,
) -> Vec<i64> {
    database
        .transaction(async |tx| {
            let rows = tx
                .fetch_all(&ledger.select([id]).order_by(id.asc()))
                .await?;
            rows.iter().map(|row| row.get(id)).collect()
        })
        .await
        .expect("Failed to read the ledger")
}

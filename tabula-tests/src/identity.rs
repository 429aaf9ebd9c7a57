use crate::silent_logs;
use std::{collections::HashSet, sync::LazyLock};
use tabula::{
    CompositeKey, ConnectionProvider, Database, ExprExt, SqlError, Table, sql_error,
};
use uuid::Uuid;
use tokio::sync::Mutex;

pub async fn identity<P: ConnectionProvider>(database: &Database<P>) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    let generated = database
        .dialect()
        .supports_auto_increment_in_composite_key();
    let mut t = Table::builder("order_line");
    let order_id = if generated {
        t.long("order_id").auto_increment().add()
    } else {
        t.long("order_id").add()
    };
    let line = t.integer("line").add();
    let product = t.varchar("product", 40).add();
    let quantity = t.integer("quantity").default_value(1).add();
    t.primary_key(&[&order_id, &line]);
    let order_line = t.build().expect("Failed to define the order_line table");
    let identity = order_line.identity();
    assert!(identity.is_composite());

    // Setup
    database
        .transaction(async |tx| {
            tx.drop_table(&order_line.drop_table(true)).await?;
            tx.create_table(&order_line.create()).await
        })
        .await
        .expect("Failed to create the order_line table");

    // Insert and read back the key
    let key = database
        .transaction(async |tx| {
            let mut values = vec![line.to(1), product.to("bolt"), quantity.to(10)];
            if !generated {
                values.push(order_id.to(700));
            }
            tx.insert_and_get_key(order_line.insert().row(values)).await
        })
        .await
        .expect("Failed to insert the first order line");
    assert_eq!(key.get(&line).expect("Missing line"), 1);
    let id = key.get(&order_id).expect("Missing order id");
    if !generated {
        assert_eq!(id, 700);
    }
    database
        .transaction(async |tx| {
            tx.exec(order_line.insert().row([
                order_id.to(id),
                line.to(2),
                product.to("nut"),
            ]))
            .await
        })
        .await
        .expect("Failed to insert the second order line");

    // Components given in any order produce the same key
    let reversed = CompositeKey::builder(&identity)
        .set(&line, 1)
        .set(&order_id, id)
        .build()
        .expect("Failed to build the key");
    assert_eq!(reversed, key);
    let keys: HashSet<CompositeKey> = [key.clone(), reversed.clone()].into_iter().collect();
    assert_eq!(keys.len(), 1);

    // Lookup by key
    let (first, second) = database
        .transaction(async |tx| {
            let first = tx.find_by_key(&order_line, &reversed).await?;
            let second = CompositeKey::builder(&identity)
                .set(&order_id, id)
                .set(&line, 2)
                .build()?;
            let second = tx.find_by_key(&order_line, second).await?;
            Ok((first, second))
        })
        .await
        .expect("Failed to find the order lines by key");
    let first = first.expect("The first order line must exist");
    assert_eq!(first.get(&product).expect("Missing product"), "bolt");
    assert_eq!(first.key(&identity).expect("Failed to read the key"), key);
    let second = second.expect("The second order line must exist");
    assert_eq!(second.get(&quantity).expect("Missing quantity"), 1);

    // Count by part of the key
    let lines = database
        .transaction(async |tx| {
            tx.count(&order_line.select_all().filter(order_id.equal(id)))
                .await
        })
        .await
        .expect("Failed to count the order lines");
    assert_eq!(lines, 2);

    // Incomplete and foreign components
    silent_logs! {
        let missing = CompositeKey::builder(&identity)
            .set(&line, 1)
            .build()
            .expect_err("A key without order_id must be rejected");
        assert!(matches!(
            sql_error(&missing),
            Some(SqlError::MissingComponent { column, .. }) if column == "order_id"
        ));
        let unknown = CompositeKey::builder(&identity)
            .set(&order_id, id)
            .set(&line, 1)
            .set(&product, "bolt".to_string())
            .build()
            .expect_err("A key with a non identity column must be rejected");
        assert!(matches!(
            sql_error(&unknown),
            Some(SqlError::UnknownComponent { column, .. }) if column == "product"
        ));
        let scalar = database
            .transaction(async |tx| tx.find_by_key(&order_line, id).await)
            .await
            .expect_err("A scalar cannot identify a row of a composite identity");
        assert!(matches!(
            sql_error(&scalar),
            Some(SqlError::MissingComponent { column, .. }) if column == "line"
        ));
    }

    // Key made of a database generated integer and a client generated uuid
    let mut t = Table::builder("shipment");
    let shipment_id = if generated {
        t.long("id").auto_increment().add()
    } else {
        t.long("id").add()
    };
    let tracking = t.uuid("tracking").auto_generate().add();
    let carrier = t.varchar("carrier", 40).add();
    t.primary_key(&[&shipment_id, &tracking]);
    let shipment = t.build().expect("Failed to define the shipment table");
    let shipment_identity = shipment.identity();
    database
        .transaction(async |tx| {
            tx.drop_table(&shipment.drop_table(true)).await?;
            tx.create_table(&shipment.create()).await
        })
        .await
        .expect("Failed to create the shipment table");
    let mut keys = Vec::new();
    for (number, name) in [(1_i64, "dhl"), (2, "ups")] {
        let key = database
            .transaction(async |tx| {
                let mut values = vec![carrier.to(name)];
                if !generated {
                    values.push(shipment_id.to(number));
                }
                tx.insert_and_get_key(shipment.insert().row(values)).await
            })
            .await
            .expect("Failed to insert the shipment");
        keys.push(key);
    }
    let first: Uuid = keys[0].get(&tracking).expect("Missing tracking");
    let second: Uuid = keys[1].get(&tracking).expect("Missing tracking");
    assert_ne!(first, second);
    assert_ne!(
        keys[0].get(&shipment_id).expect("Missing id"),
        keys[1].get(&shipment_id).expect("Missing id")
    );
    for (key, name) in keys.iter().zip(["dhl", "ups"]) {
        let found = database
            .transaction(async |tx| tx.find_by_key(&shipment, key).await)
            .await
            .expect("Failed to find the shipment by key")
            .expect("The shipment must exist");
        assert_eq!(found.get(&carrier).expect("Missing carrier"), name);
        assert_eq!(
            found.key(&shipment_identity).expect("Failed to read the key"),
            *key
        );
    }
}

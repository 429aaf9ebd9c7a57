use std::sync::LazyLock;
use tabula::{Action, ConnectionProvider, Database, Table};
use tokio::sync::Mutex;

pub async fn catalog<P: ConnectionProvider>(database: &Database<P>) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    let mut t = Table::builder("catalog_group");
    let group_id = t.integer("id").add();
    let group_name = t.varchar("name", 40).unique().add();
    t.primary_key(&[&group_id]);
    let group = t.build().expect("Failed to define the catalog_group table");

    let mut t = Table::builder("catalog_item");
    let item_id = t.integer("id").add();
    let item_group = t
        .integer("group_id")
        .references(&group_id)
        .on_delete(Action::Cascade)
        .add();
    let label = t.varchar("label", 80).nullable().add();
    t.primary_key(&[&item_id]);
    t.index("catalog_item_label", &[&label]);
    let item = t.build().expect("Failed to define the catalog_item table");

    // Setup
    let existed = database
        .transaction(async |tx| {
            tx.drop_table(&item.drop_table(true)).await?;
            tx.drop_table(&group.drop_table(true)).await?;
            tx.table_exists(&item).await
        })
        .await
        .expect("Failed to drop the catalog tables");
    assert!(!existed);
    database
        .transaction(async |tx| {
            tx.create_table(&group.create_if_not_exists()).await?;
            tx.create_table(&item.create_if_not_exists()).await?;
            // Creating again is a no-op
            tx.create_table(&item.create_if_not_exists()).await
        })
        .await
        .expect("Failed to create the catalog tables");

    let (exists, metadata) = database
        .transaction(async |tx| Ok((tx.table_exists(&item).await?, tx.metadata().await?)))
        .await
        .expect("Failed to read the metadata");
    assert!(exists);

    let dialect = database.dialect();
    let identifiers = dialect.identifier_manager();
    let stored = metadata
        .table(dialect, item.table_ref())
        .expect("The catalog must contain catalog_item");
    assert!(identifiers.matches(item.name(), &stored.name));
    let names: Vec<&str> = stored.columns.iter().map(|v| v.name.as_str()).collect();
    assert_eq!(names.len(), 3);
    for (declared, stored) in [item_id.name(), item_group.name(), label.name()]
        .into_iter()
        .zip(names)
    {
        assert!(identifiers.matches(declared, stored));
    }
    let id_column = stored
        .column(dialect, item_id.name())
        .expect("Missing the id column");
    assert!(id_column.primary_key);
    let label_column = stored
        .column(dialect, label.name())
        .expect("Missing the label column");
    assert!(label_column.nullable);
    assert!(
        stored
            .indices
            .iter()
            .any(|v| identifiers.matches("catalog_item_label", &v.name)
                && v.columns.len() == 1
                && identifiers.matches(label.name(), &v.columns[0]))
    );
    assert!(stored.foreign_keys.iter().any(|v| {
        identifiers.matches(group.name(), &v.target_table)
            && v.columns.len() == 1
            && identifiers.matches(item_group.name(), &v.columns[0])
    }));
    let stored_group = metadata
        .table(dialect, group.table_ref())
        .expect("The catalog must contain catalog_group");
    assert!(stored_group.indices.iter().any(|v| v.unique
        && v.columns.len() == 1
        && identifiers.matches(group_name.name(), &v.columns[0])));

    // Referential action
    let orphans = database
        .transaction(async |tx| {
            tx.exec(group.insert().row([group_id.to(1), group_name.to("tools")]))
                .await?;
            tx.exec(
                item.insert()
                    .row([item_id.to(1), item_group.to(1), label.to("hammer")])
                    .row([item_id.to(2), item_group.to(1), label.to(None)]),
            )
            .await?;
            tx.exec(group.delete()).await?;
            tx.count(&item.select_all()).await
        })
        .await
        .expect("Failed to exercise the cascade");
    assert_eq!(orphans, 0);
}

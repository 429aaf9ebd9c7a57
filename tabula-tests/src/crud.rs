use rust_decimal::Decimal;
use std::sync::LazyLock;
use tabula::{ConnectionProvider, Database, ExprExt, Table, count_all, exprs, lower};
use tokio::sync::Mutex;

pub async fn crud<P: ConnectionProvider>(database: &Database<P>) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    let mut t = Table::builder("employee");
    let id = t.long("id").auto_increment().add();
    let name = t.varchar("name", 60).add();
    let department = t.varchar("department", 30).add();
    let salary = t.decimal("salary", 10, 2).add();
    let manager = t.long("manager").nullable().add();
    t.primary_key(&[&id]);
    let employee = t.build().expect("Failed to define the employee table");

    // Setup
    database
        .transaction(async |tx| {
            tx.drop_table(&employee.drop_table(true)).await?;
            tx.create_table(&employee.create_if_not_exists()).await
        })
        .await
        .expect("Failed to create the employee table");

    // Insert
    let affected = database
        .transaction(async |tx| {
            tx.exec(
                employee
                    .insert()
                    .row([
                        name.to("Ada"),
                        department.to("research"),
                        salary.to(Decimal::new(5200_00, 2)),
                        manager.to(None),
                    ])
                    .row([
                        name.to("Brian"),
                        department.to("research"),
                        salary.to(Decimal::new(4100_50, 2)),
                        manager.to(Some(1)),
                    ])
                    .row([
                        name.to("Carla"),
                        department.to("sales"),
                        salary.to(Decimal::new(3900_00, 2)),
                        manager.to(Some(1)),
                    ])
                    .row([
                        name.to("Dario"),
                        department.to("sales"),
                        salary.to(Decimal::new(3100_25, 2)),
                        manager.to(Some(3)),
                    ]),
            )
            .await
        })
        .await
        .expect("Failed to insert the employees");
    assert_eq!(affected.rows_affected, 4);

    // Filter and order
    let rows = database
        .transaction(async |tx| {
            tx.fetch_all(
                &employee
                    .select(exprs![&name, &salary])
                    .filter(department.equal("research"))
                    .order_by(salary.desc()),
            )
            .await
        })
        .await
        .expect("Failed to query the research department");
    let names: Vec<String> = rows
        .iter()
        .map(|row| row.get(&name).expect("Missing name"))
        .collect();
    assert_eq!(names, ["Ada", "Brian"]);
    assert_eq!(
        rows[1].get(&salary).expect("Missing salary"),
        Decimal::new(4100_50, 2)
    );

    // Nullable column
    let boss = database
        .transaction(async |tx| {
            tx.fetch_one(&employee.select([&name]).filter(manager.is_null()))
                .await
        })
        .await
        .expect("Failed to query the employees without manager")
        .expect("Expected an employee without manager");
    assert_eq!(boss.get(&name).expect("Missing name"), "Ada");

    // Count honors limit and offset
    let (all, limited, skipped) = database
        .transaction(async |tx| {
            let query = employee.select_all();
            let all = tx.count(&query).await?;
            let limited = tx.count(&query.clone().limit(2)).await?;
            let skipped = tx.count(&query.clone().offset(3)).await?;
            Ok((all, limited, skipped))
        })
        .await
        .expect("Failed to count the employees");
    assert_eq!(all, 4);
    assert_eq!(limited, 2);
    assert_eq!(skipped, 1);

    // Update
    let affected = database
        .transaction(async |tx| {
            tx.exec(
                employee
                    .update()
                    .set(salary.to(salary.plus(Decimal::new(100_00, 2))))
                    .filter(department.equal("sales")),
            )
            .await
        })
        .await
        .expect("Failed to raise the sales salaries");
    assert_eq!(affected.rows_affected, 2);
    let carla = database
        .transaction(async |tx| {
            tx.fetch_one(&employee.select([&salary]).filter(name.equal("Carla")))
                .await
        })
        .await
        .expect("Failed to query Carla")
        .expect("Carla must exist");
    assert_eq!(
        carla.get(&salary).expect("Missing salary"),
        Decimal::new(4000_00, 2)
    );

    // Group by with alias
    let heads = count_all().alias("heads");
    let rows = database
        .transaction(async |tx| {
            tx.fetch_all(
                &employee
                    .select(exprs![&department, &heads])
                    .group_by([&department])
                    .order_by(department.asc()),
            )
            .await
        })
        .await
        .expect("Failed to group the employees by department");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].get(&department).expect("Missing department"), "research");
    assert_eq!(rows[0].get(&heads).expect("Missing count"), 2);
    assert_eq!(rows[1].get(&heads).expect("Missing count"), 2);

    // A repeated projection is fetched once
    let query = employee
        .select(exprs![&name, lower(&name), &name])
        .filter(id.equal(2));
    assert!(query.has_duplicate_fields());
    let row = database
        .transaction(async |tx| tx.fetch_one(&query).await)
        .await
        .expect("Failed to run the query with a repeated field")
        .expect("Brian must exist");
    assert_eq!(row.fields().len(), 2);
    assert_eq!(row.get(&lower(&name)).expect("Missing lower"), "brian");
    assert_eq!(row.get(&name).expect("Missing name"), "Brian");

    // Locking read where the dialect has one
    if database.dialect().supports_select_for_update() {
        database
            .transaction(async |tx| {
                tx.fetch_all(&employee.select([&id]).filter(id.equal(1)).for_update())
                    .await
            })
            .await
            .expect("Failed to lock the first employee");
    }

    // Generated key
    let key = database
        .transaction(async |tx| {
            tx.insert_and_get_key(employee.insert().row([
                name.to("Elena"),
                department.to("support"),
                salary.to(Decimal::new(2800_00, 2)),
                manager.to(Some(1)),
            ]))
            .await
        })
        .await
        .expect("Failed to insert Elena");
    let generated = key.get(&id).expect("The key must contain the generated id");
    assert_eq!(generated, 5);
    let elena = database
        .transaction(async |tx| tx.find_by_key(&employee, generated).await)
        .await
        .expect("Failed to find Elena by key")
        .expect("Elena must exist");
    assert_eq!(elena.get(&name).expect("Missing name"), "Elena");
    assert_eq!(elena.get(&manager).expect("Missing manager"), Some(1));
    assert_eq!(
        elena.key(&employee.identity()).expect("Failed to read the key"),
        key
    );

    // Delete
    let affected = database
        .transaction(async |tx| {
            tx.exec(employee.delete().filter(department.is_in(["sales", "support"])))
                .await
        })
        .await
        .expect("Failed to delete the employees");
    assert_eq!(affected.rows_affected, 3);
    let (remaining, sales_empty) = database
        .transaction(async |tx| {
            let remaining = tx.count(&employee.select_all()).await?;
            let sales_empty = tx
                .is_empty(&employee.select([&id]).filter(department.equal("sales")))
                .await?;
            Ok((remaining, sales_empty))
        })
        .await
        .expect("Failed to inspect the remaining employees");
    assert_eq!(remaining, 2);
    assert!(sales_empty);
}

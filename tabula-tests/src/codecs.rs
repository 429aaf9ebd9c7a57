use rust_decimal::Decimal;
use std::sync::LazyLock;
use tabula::{ConnectionProvider, Database, EnumStorage, ExprExt, Table, sql_enum};
use time::{Date, Duration, Month, PrimitiveDateTime, Time, UtcOffset};
use tokio::sync::Mutex;
use uuid::Uuid;

sql_enum! {
    pub enum Priority {
        Low,
        Normal,
        Urgent,
    }
}

pub async fn codecs<P: ConnectionProvider>(database: &Database<P>) {
    static MUTEX: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    let _lock = MUTEX.lock().await;

    let mut t = Table::builder("codec_sample");
    let id = t.integer("id").add();
    let flag = t.boolean("flag").add();
    let tiny = t.tiny("tiny").add();
    let short = t.short("short").add();
    let long = t.long("long").add();
    let real = t.real("real").add();
    let double = t.double("double").add();
    let price = t.decimal("price", 12, 4).add();
    let code = t.char("code", 3).add();
    let note = t.text("note").nullable().add();
    let payload = t.blob("payload").add();
    let external = t.uuid("external").nullable().add();
    let day = t.date("day").add();
    let clock = t.time("clock").add();
    let moment = t.datetime("moment").add();
    let instant = t.timestamp("instant").add();
    let elapsed = t.duration("elapsed").add();
    let priority = t
        .enumeration::<Priority>("priority", EnumStorage::Name)
        .add();
    let rank = t
        .enumeration::<Priority>("rank", EnumStorage::Ordinal)
        .default_value(Priority::Normal)
        .add();
    t.primary_key(&[&id]);
    let sample = t.build().expect("Failed to define the codec_sample table");

    // Setup
    database
        .transaction(async |tx| {
            tx.drop_table(&sample.drop_table(true)).await?;
            tx.create_table(&sample.create()).await
        })
        .await
        .expect("Failed to create the codec_sample table");

    let uuid = Uuid::parse_str("5e915574-bb30-4430-98cf-c5854f61fbbd").expect("Invalid uuid");
    let date = Date::from_calendar_date(2024, Month::February, 29).expect("Invalid date");
    let time = Time::from_hms_milli(13, 45, 30, 250).expect("Invalid time");
    let timestamp = PrimitiveDateTime::new(date, time);
    let offset = UtcOffset::from_hms(2, 0, 0).expect("Invalid offset");
    let zoned = timestamp.assume_offset(offset);
    let duration = Duration::new(90_061, 500_000_000);

    // Every value set
    database
        .transaction(async |tx| {
            tx.exec(sample.insert().row([
                id.to(1),
                flag.to(true),
                tiny.to(-8),
                short.to(-1600),
                long.to(9_007_199_254_740_993),
                real.to(1.5),
                double.to(std::f64::consts::PI),
                price.to(Decimal::new(-12_345_6789, 4)),
                code.to("EUR"),
                note.to("Quoted 'text' with ? inside"),
                payload.to(vec![0, 1, 2, 254, 255]),
                external.to(Some(uuid)),
                day.to(date),
                clock.to(time),
                moment.to(timestamp),
                instant.to(zoned),
                elapsed.to(duration),
                priority.to(Priority::Urgent),
                rank.to(Priority::Low),
            ]))
            .await
        })
        .await
        .expect("Failed to insert the full sample");

    // Nulls and defaults
    database
        .transaction(async |tx| {
            tx.exec(sample.insert().row([
                id.to(2),
                flag.to(false),
                tiny.to(i8::MAX),
                short.to(i16::MIN),
                long.to(i64::MIN),
                real.to(0.0),
                double.to(-0.5),
                price.to(Decimal::ZERO),
                code.to("USD"),
                note.to(None),
                payload.to(Vec::new()),
                external.to(None),
                day.to(date),
                clock.to(Time::MIDNIGHT),
                moment.to(timestamp),
                instant.to(zoned),
                elapsed.to(Duration::ZERO),
                priority.to(Priority::Low),
            ]))
            .await
        })
        .await
        .expect("Failed to insert the sparse sample");

    let rows = database
        .transaction(async |tx| {
            tx.fetch_all(&sample.select_all().order_by(id.asc()))
                .await
        })
        .await
        .expect("Failed to read the samples");
    assert_eq!(rows.len(), 2);

    let full = &rows[0];
    assert!(full.get(&flag).expect("Missing flag"));
    assert_eq!(full.get(&tiny).expect("Missing tiny"), -8);
    assert_eq!(full.get(&short).expect("Missing short"), -1600);
    assert_eq!(full.get(&long).expect("Missing long"), 9_007_199_254_740_993);
    assert_eq!(full.get(&real).expect("Missing real"), 1.5);
    assert_eq!(
        full.get(&double).expect("Missing double"),
        std::f64::consts::PI
    );
    assert_eq!(
        full.get(&price).expect("Missing price"),
        Decimal::new(-12_345_6789, 4)
    );
    assert_eq!(full.get(&code).expect("Missing code"), "EUR");
    assert_eq!(
        full.get(&note).expect("Missing note").as_deref(),
        Some("Quoted 'text' with ? inside")
    );
    assert_eq!(
        full.get(&payload).expect("Missing payload"),
        [0, 1, 2, 254, 255]
    );
    assert_eq!(full.get(&external).expect("Missing external"), Some(uuid));
    assert_eq!(full.get(&day).expect("Missing day"), date);
    assert_eq!(full.get(&clock).expect("Missing clock"), time);
    assert_eq!(full.get(&moment).expect("Missing moment"), timestamp);
    assert_eq!(full.get(&instant).expect("Missing instant"), zoned);
    assert_eq!(full.get(&elapsed).expect("Missing elapsed"), duration);
    assert_eq!(
        full.get(&priority).expect("Missing priority"),
        Priority::Urgent
    );
    assert_eq!(full.get(&rank).expect("Missing rank"), Priority::Low);

    let sparse = &rows[1];
    assert!(!sparse.get(&flag).expect("Missing flag"));
    assert_eq!(sparse.get(&tiny).expect("Missing tiny"), i8::MAX);
    assert_eq!(sparse.get(&short).expect("Missing short"), i16::MIN);
    assert_eq!(sparse.get(&long).expect("Missing long"), i64::MIN);
    assert_eq!(sparse.get(&price).expect("Missing price"), Decimal::ZERO);
    assert_eq!(sparse.get(&note).expect("Missing note"), None);
    assert!(sparse.get(&payload).expect("Missing payload").is_empty());
    assert_eq!(sparse.get(&external).expect("Missing external"), None);
    assert_eq!(sparse.get(&clock).expect("Missing clock"), Time::MIDNIGHT);
    assert_eq!(sparse.get(&elapsed).expect("Missing elapsed"), Duration::ZERO);
    assert_eq!(sparse.get(&rank).expect("Missing rank"), Priority::Normal);

    // Values compare in the database after encoding
    let matching = database
        .transaction(async |tx| {
            tx.count(
                &sample
                    .select_all()
                    .filter(priority.equal(Priority::Urgent))
                    .and_where(external.equal(Some(uuid)))
                    .and_where(day.equal(date)),
            )
            .await
        })
        .await
        .expect("Failed to filter by encoded values");
    assert_eq!(matching, 1);
    let missing = database
        .transaction(async |tx| tx.count(&sample.select_all().filter(external.is_null())).await)
        .await
        .expect("Failed to filter by null");
    assert_eq!(missing, 1);
}

//! Build statements from request-style parameters.
//!
//! Run with:
//!   cargo run --example dynamic_where -p sqlweave
//!
//! Set `RUST_LOG=sqlweave=debug` to see every built statement with inlined
//! literals.

use sqlweave::prelude::*;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const TABLES: &str = r#"
[tables.Order]
table = "T_ORDER"

[[tables.Order.columns]]
field = "id"
type = "integer"
primary_key = true

[[tables.Order.columns]]
field = "orderNo"

[[tables.Order.columns]]
field = "customerId"
type = "integer"

[[tables.Order.columns]]
field = "amount"
type = "decimal"

[[tables.Order.columns]]
field = "state"
type = "integer"
default = 0

[tables.Customer]
table = "T_CUSTOMER"

[[tables.Customer.columns]]
field = "id"
type = "integer"
primary_key = true

[[tables.Customer.columns]]
field = "name"
"#;

fn show(title: &str, sql: &SqlBuffer, dialect: &dyn Dialect) {
    let prepared = sql.to_prepared_sql();
    println!("== {title}");
    println!("   sql:    {}", prepared.sql);
    println!("   values: {:?}", prepared.values);
    println!("   debug:  {}", sql.to_executable_sql(dialect));
}

fn main() -> SqlResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let registry = Arc::new(TableRegistry::from_toml_str(TABLES)?);

    // Parameters as they would arrive from a search form.
    let params = vec![
        ("amount$GreaterEqualsThen", vec!["100"]),
        ("state$In", vec!["1", "2", "3"]),
        ("orderNo$StartsWith", vec!["2024"]),
        ("customerId", vec![""]),
    ];
    let conditions = DbWhere::from_params(params);
    let orderings = Orderings::parse("amount desc nulls last, id")?;
    let paging = Paging::page(2, 25)?;

    for version in ["mysql.8", "postgresql", "oracle.11", "sqlserver.2008", "db2.10.5"] {
        let engine = SqlEngine::builder(version.parse()?)
            .scanner(registry.clone())
            .build()?;
        let orders = engine.table("Order")?;
        let sql = orders.list(&conditions, &orderings, &paging)?;
        show(version, &sql, engine.dialect().as_ref());
    }

    let engine = SqlEngine::builder("mysql.8".parse()?)
        .scanner(registry)
        .build()?;

    let mut update = DbUpdate::new();
    update.set("state", 4).add("amount", 10);
    let mut by_id = DbWhere::new();
    by_id.on("id$In", vec![7, 8]);
    show(
        "update",
        &engine.table("Order")?.update(&update, &by_id)?,
        engine.dialect().as_ref(),
    );

    let join = engine.join(
        &TableJoin::new(TableItem::new("Order", "o")).join(
            JoinItem::new(JoinType::Inner, TableItem::new("Customer", "c").result_field("customer"))
                .on("o.customerId", "c.id"),
        ),
    )?;
    let mut filter = DbWhere::new();
    filter.on("c.name$Like", "smith");
    show(
        "join",
        &join.find(&filter, &Orderings::new().desc("o.amount"))?,
        engine.dialect().as_ref(),
    );
    for route in join.routes() {
        println!(
            "   {} -> {}.{}",
            route.label,
            route.result_field.as_deref().unwrap_or("<root>"),
            route.field_name
        );
    }

    Ok(())
}

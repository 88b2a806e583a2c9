use super::*;
use crate::config::DialectOptions;
use crate::dialect::{DbType, DbVersion, create_dialect};
use crate::model::{JoinItem, JoinType, MetadataCache, TableDef, TableItem, TableJoin, TableRegistry};
use std::sync::Arc;

fn dialect(db_type: DbType) -> Arc<dyn Dialect> {
    create_dialect(DbVersion::new(db_type), DialectOptions::default())
}

fn people() -> AllFieldColumn {
    AllFieldColumn::new(
        FieldColumns::new(
            "Person",
            vec![
                FieldColumn::new("id", "id").primary_key(),
                FieldColumn::new("name", "name"),
                FieldColumn::new("age", "age"),
                FieldColumn::new("state", "state").default_value(0),
                FieldColumn::new("score", "score"),
                FieldColumn::new("parentId", "parent_id"),
                FieldColumn::new("createTime", "create_time").read_only(),
            ],
        )
        .unwrap(),
    )
}

fn render(buffer: &SqlBuffer) -> (String, Vec<Value>) {
    let prepared = buffer.to_prepared_sql();
    (prepared.sql, prepared.values)
}

// ==================== WHERE ====================

#[test]
fn where_clause_on_mysql() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut conditions = DbWhere::new();
    conditions
        .on_op("age", "GreaterThen", 18)
        .on_op("state", "In", vec![1, 2, 3]);

    let mut sql = helper.build_conditions_sql(&conditions).unwrap();
    assert_eq!(render(&sql).0, "AND age > ? AND state IN (?, ?, ?)");

    sql.insert_prefix("WHERE", Some("AND|OR"));
    assert_eq!(
        render(&sql),
        (
            "WHERE age > ? AND state IN (?, ?, ?)".to_string(),
            vec![Value::Int(18), Value::Int(1), Value::Int(2), Value::Int(3)]
        )
    );
    assert_eq!(render(&helper.build_where_sql(&conditions).unwrap()), render(&sql));
}

#[test]
fn empty_where_is_blank() {
    let columns = people();
    let dialect = dialect(DbType::PostgreSql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    assert!(helper.build_where_sql(&DbWhere::new()).unwrap().is_blank());
    assert!(helper.build_where_sql(&DbWhere::everything()).unwrap().is_blank());
}

#[test]
fn groups_render_in_parentheses() {
    let columns = people();
    let dialect = dialect(DbType::PostgreSql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut conditions = DbWhere::new();
    conditions
        .on("age$ge", 18)
        .or_group(|g| {
            g.on("name", "ann").on("name$IsNull", Value::Null);
        })
        .not_group(|g| {
            g.on("state", 9);
        })
        .and_group(|_| {});

    assert_eq!(
        render(&helper.build_where_sql(&conditions).unwrap()).0,
        "WHERE age >= ? AND (name = ? OR name IS NULL) AND NOT (state = ?)"
    );
}

#[test]
fn unknown_fields_are_reported_together() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut conditions = DbWhere::new();
    conditions.on("foo", 1).on("age", 2).or_group(|g| {
        g.on("bar", 3).on("foo", 4);
    });

    match helper.build_where_sql(&conditions).unwrap_err() {
        SqlError::UnsupportedField { entity, fields, .. } => {
            assert_eq!(entity, "Person");
            assert_eq!(fields, vec!["foo".to_string(), "bar".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn read_only_fields_are_not_conditions() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut conditions = DbWhere::new();
    conditions.on("createTime", "2024-01-01");
    assert!(helper.build_where_sql(&conditions).unwrap_err().is_unsupported());
}

#[test]
fn operator_problems_are_unsupported() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut unknown_op = DbWhere::new();
    unknown_op.on("age$Roughly", 3);
    assert!(helper.build_where_sql(&unknown_op).unwrap_err().is_unsupported());

    let mut scalar_in = DbWhere::new();
    scalar_in.on_op("age", "In", 3);
    assert!(helper.build_where_sql(&scalar_in).unwrap_err().is_unsupported());

    let mut empty_in = DbWhere::new();
    empty_in.on_op("age", "In", Value::List(vec![]));
    assert!(helper.build_where_sql(&empty_in).unwrap_err().is_empty_input());
}

#[test]
fn empty_between_is_empty_input() {
    let columns = people();
    let dialect = dialect(DbType::PostgreSql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    for op in ["Between", "NotBetween"] {
        let mut conditions = DbWhere::new();
        conditions.on_op("state", op, Vec::<i64>::new());
        match helper.build_where_sql(&conditions).unwrap_err() {
            SqlError::EmptyInput { field, .. } => assert_eq!(field, "state"),
            other => panic!("{op}: unexpected error {other:?}"),
        }
    }

    // A single bound is still a shape error.
    let mut one = DbWhere::new();
    one.on_op("state", "Between", vec![1]);
    assert!(helper.build_where_sql(&one).unwrap_err().is_unsupported());
}

#[test]
fn byte_vectors_feed_list_operators() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut conditions = DbWhere::new();
    conditions.on("state$In", vec![1u8, 2]);
    assert_eq!(
        render(&helper.build_where_sql(&conditions).unwrap()),
        (
            "WHERE state IN (?, ?)".to_string(),
            vec![Value::Int(1), Value::Int(2)]
        )
    );
}

// ==================== ORDER BY / SET / INSERT ====================

#[test]
fn order_by() {
    let columns = people();
    let registry = OperatorRegistry::with_defaults();
    let pg = dialect(DbType::PostgreSql);
    let helper = FragmentHelper::new(pg.as_ref(), &registry, &columns);

    let orderings = Orderings::parse("age desc nulls last, name").unwrap();
    assert_eq!(
        render(&helper.build_order_by_sql(&orderings).unwrap()).0,
        "ORDER BY age DESC NULLS LAST, name ASC"
    );
    assert!(helper.build_order_by_sql(&Orderings::new()).unwrap().is_blank());

    let mysql = dialect(DbType::MySql);
    let helper = FragmentHelper::new(mysql.as_ref(), &registry, &columns);
    assert_eq!(
        render(&helper.build_order_by_sql(&orderings).unwrap()).0,
        "ORDER BY CASE WHEN age IS NULL THEN 1 ELSE 0 END, age DESC, name ASC"
    );

    let err = helper
        .build_order_by_sql(&Orderings::new().asc("nope"))
        .unwrap_err();
    assert!(err.is_unsupported());
}

#[test]
fn update_set_strips_leading_comma() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut update = DbUpdate::new();
    update.set("name", "bob").add("score", 5).to_null("state");
    assert_eq!(
        render(&helper.build_update_set_sql(&update).unwrap()),
        (
            "SET name = ?, score = score + ?, state = NULL".to_string(),
            vec![Value::from("bob"), Value::Int(5)]
        )
    );
    assert!(helper.build_update_set_sql(&DbUpdate::new()).unwrap().is_blank());
}

#[test]
fn update_rejects_non_updatable() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut update = DbUpdate::new();
    update.set("id", 1).set("createTime", "x").set("name", "a");
    match helper.build_update_set_sql(&update).unwrap_err() {
        SqlError::UnsupportedField { fields, .. } => {
            assert_eq!(fields, vec!["id".to_string(), "createTime".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn insert_fills_defaults() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut values = DbInsert::new();
    values.set("name", "ann").set("id", 7);
    let (cols, vals) = helper.build_insert_sql(&values).unwrap();
    assert_eq!(render(&cols).0, "(id, name, state)");
    assert_eq!(
        render(&vals),
        (
            "(?, ?, ?)".to_string(),
            vec![Value::Int(7), Value::from("ann"), Value::Int(0)]
        )
    );

    let mut bad = DbInsert::new();
    bad.set("createTime", "x");
    assert!(helper.build_insert_sql(&bad).unwrap_err().is_unsupported());
}

#[test]
fn select_fields_and_in() {
    let columns = people();
    let dialect = dialect(DbType::MySql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let picked = columns.include(&["name", "age"]).unwrap();
    assert_eq!(render(&helper.build_select_fields_sql(&picked)).0, "name, age");

    assert_eq!(
        render(&helper.build_in_sql("parentId", vec![Value::Int(1), Value::Int(2)]).unwrap()).0,
        "parent_id IN (?, ?)"
    );
    assert_eq!(
        render(&helper.build_not_in_sql("age", vec![Value::Int(1)]).unwrap()).0,
        "age NOT IN (?)"
    );
    assert!(helper.build_in_sql("ghost", vec![Value::Int(1)]).unwrap_err().is_unsupported());
}

// ==================== Joins / children ====================

#[test]
fn join_from_clause() {
    let registry = TableRegistry::new()
        .table(
            "User",
            TableDef::new("TB_USER")
                .column(FieldColumn::from_field("id").primary_key())
                .column(FieldColumn::from_field("name"))
                .column(FieldColumn::from_field("deptId")),
        )
        .table(
            "Dept",
            TableDef::new("TB_DEPT")
                .column(FieldColumn::from_field("id").primary_key())
                .column(FieldColumn::from_field("name")),
        );
    let cache = MetadataCache::new(Arc::new(registry));
    let join = cache
        .join(
            &TableJoin::new(TableItem::new("User", "u")).join(
                JoinItem::new(JoinType::Left, TableItem::new("Dept", "d").result_field("dept"))
                    .on("u.deptId", "d.id"),
            ),
        )
        .unwrap();

    let dialect = dialect(DbType::PostgreSql);
    let operators = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &operators, join.columns());

    assert_eq!(
        render(&helper.build_join_from_sql(&join).unwrap()).0,
        "FROM TB_USER u LEFT JOIN TB_DEPT d ON u.DEPT_ID = d.ID"
    );
    assert_eq!(
        render(&helper.build_select_fields_sql(join.columns().all())).0,
        "u.ID AS u_ID, u.NAME AS u_NAME, u.DEPT_ID, d.ID AS d_ID, d.NAME AS d_NAME"
    );

    let mut conditions = DbWhere::new();
    conditions.on("d.name", "ops");
    assert_eq!(
        render(&helper.build_where_sql(&conditions).unwrap()).0,
        "WHERE d.NAME = ?"
    );

    let mut ambiguous = DbWhere::new();
    ambiguous.on("name", "ops");
    assert!(helper.build_where_sql(&ambiguous).unwrap_err().is_ambiguous());
}

#[test]
fn find_children_filters_result() {
    let columns = people();
    let dialect = dialect(DbType::PostgreSql);
    let registry = OperatorRegistry::with_defaults();
    let helper = FragmentHelper::new(dialect.as_ref(), &registry, &columns);

    let mut conditions = DbWhere::new();
    conditions.on("state", 1);
    let sql = helper
        .build_find_children_sql(
            "T_PERSON",
            "id",
            "parentId",
            vec![Value::Int(1)],
            &conditions,
            &Orderings::new().asc("name"),
        )
        .unwrap();
    assert_eq!(
        render(&sql),
        (
            "WITH RECURSIVE RECURSIVE_CHILDREN AS (SELECT * FROM T_PERSON WHERE id IN (?) UNION \
             SELECT T_.* FROM T_PERSON T_ INNER JOIN RECURSIVE_CHILDREN C_ ON T_.parent_id = C_.id) \
             SELECT id, name, age, state, score, parent_id, create_time FROM RECURSIVE_CHILDREN \
             WHERE state = ? ORDER BY name ASC"
                .to_string(),
            vec![Value::Int(1), Value::Int(1)]
        )
    );

    let err = helper
        .build_find_children_sql("T_PERSON", "id", "parentId", vec![], &DbWhere::new(), &Orderings::new())
        .unwrap_err();
    assert!(err.is_empty_input());
}

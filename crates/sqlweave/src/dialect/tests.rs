use super::*;
use crate::config::OmissionConfig;
use crate::error::SqlError;

fn dialect(version: &str) -> Arc<dyn Dialect> {
    create_dialect(version.parse().unwrap(), DialectOptions::default())
}

fn paged(version: &str, base: &str, paging: Paging) -> (String, Vec<Value>) {
    let mut sql = SqlBuffer::with_text(base);
    dialect(version).process_paging_sql(&mut sql, &paging).unwrap();
    let prepared = sql.to_prepared_sql();
    (prepared.sql, prepared.values)
}

fn ints(values: &[i64]) -> Vec<Value> {
    values.iter().map(|v| Value::Int(*v)).collect()
}

fn children_query() -> ChildrenQuery {
    let mut where_sql = SqlBuffer::with_text("WHERE STATUS = ");
    where_sql.add_variable(1);
    ChildrenQuery {
        table: "DEPT".to_string(),
        code_column: "CODE".to_string(),
        parent_column: "PARENT_CODE".to_string(),
        select_columns: vec!["CODE".to_string(), "NAME".to_string()],
        start_codes: vec![Value::from("A")],
        where_sql,
        order_sql: SqlBuffer::with_text("ORDER BY CODE ASC"),
    }
}

// ==================== Versions ====================

#[test]
fn parses_versions() {
    let v: DbVersion = "oracle.12.2".parse().unwrap();
    assert_eq!(v.db_type, DbType::Oracle);
    assert_eq!((v.major, v.minor), (Some(12), Some(2)));
    assert!(v.at_least(12, 1));
    assert!(!v.at_least(18, 0));

    let v: DbVersion = "postgres".parse().unwrap();
    assert_eq!(v.db_type, DbType::PostgreSql);
    assert!(v.at_least(99, 0));

    assert!("foo.1".parse::<DbVersion>().is_err());
    assert!("mysql.x".parse::<DbVersion>().is_err());
}

#[test]
fn sqlserver_internal_versions_map_to_years() {
    let v: DbVersion = "sqlserver.10".parse().unwrap();
    assert_eq!(v.major, Some(2008));
    assert_eq!(v.to_string(), "sqlserver.2008");
    assert_eq!("mssql.2012".parse::<DbVersion>().unwrap().major, Some(2012));
}

// ==================== Paging ====================

#[test]
fn no_paging_leaves_sql_untouched() {
    for v in ["oracle.11", "mysql", "postgresql", "sqlserver.2008", "db2.10", "sqlite"] {
        let (sql, values) = paged(v, "SELECT * FROM t", Paging::NONE);
        assert_eq!(sql, "SELECT * FROM t", "{v}");
        assert!(values.is_empty());
    }
}

#[test]
fn mysql_limit() {
    assert_eq!(
        paged("mysql.8", "SELECT * FROM t", Paging::offset(0, 10)),
        ("SELECT * FROM t LIMIT ?".to_string(), ints(&[10]))
    );
    assert_eq!(
        paged("mariadb.10.1", "SELECT * FROM t", Paging::offset(20, 10)),
        ("SELECT * FROM t LIMIT ?, ?".to_string(), ints(&[20, 10]))
    );
}

#[test]
fn postgres_and_sqlite_limit_offset() {
    for v in ["postgresql", "sqlite"] {
        assert_eq!(
            paged(v, "SELECT * FROM t", Paging::page(3, 10).unwrap()),
            ("SELECT * FROM t LIMIT ? OFFSET ?".to_string(), ints(&[10, 20]))
        );
    }
}

#[test]
fn oracle_legacy_rownum_wrapping() {
    assert_eq!(
        paged("oracle.11", "SELECT * FROM t", Paging::offset(20, 10)),
        (
            "SELECT * FROM (SELECT T_.*, ROWNUM ROWNUM_ FROM (SELECT * FROM t) T_ WHERE ROWNUM <= ?) WHERE ROWNUM_ > ?"
                .to_string(),
            ints(&[30, 20])
        )
    );
    assert_eq!(
        paged("oracle.11", "SELECT * FROM t", Paging::offset(0, 10)),
        (
            "SELECT * FROM (SELECT * FROM t) WHERE ROWNUM <= ?".to_string(),
            ints(&[10])
        )
    );
}

#[test]
fn oracle_12_offset_fetch() {
    assert_eq!(
        paged("oracle.12", "SELECT * FROM t", Paging::offset(20, 10)),
        (
            "SELECT * FROM t OFFSET ? ROWS FETCH NEXT ? ROWS ONLY".to_string(),
            ints(&[20, 10])
        )
    );
    assert_eq!(
        paged("oracle.19", "SELECT * FROM t", Paging::offset(0, 5)).0,
        "SELECT * FROM t FETCH FIRST ? ROWS ONLY"
    );
}

#[test]
fn sqlserver_2012_adds_order_by_only_when_missing() {
    assert_eq!(
        paged("sqlserver.2012", "SELECT * FROM t", Paging::offset(20, 10)),
        (
            "SELECT * FROM t ORDER BY (SELECT NULL) OFFSET ? ROWS FETCH NEXT ? ROWS ONLY".to_string(),
            ints(&[20, 10])
        )
    );
    assert_eq!(
        paged("sqlserver", "SELECT * FROM t ORDER BY id", Paging::offset(0, 10)).0,
        "SELECT * FROM t ORDER BY id OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
    );
    assert_eq!(
        paged(
            "sqlserver.2019",
            "SELECT * FROM (SELECT * FROM t ORDER BY id) x",
            Paging::offset(0, 10)
        )
        .0,
        "SELECT * FROM (SELECT * FROM t ORDER BY id) x ORDER BY (SELECT NULL) OFFSET ? ROWS FETCH NEXT ? ROWS ONLY"
    );
}

#[test]
fn sqlserver_legacy_top_and_row_number() {
    assert_eq!(
        paged("sqlserver.2008", "SELECT * FROM t", Paging::offset(0, 10)),
        ("SELECT TOP (?) * FROM t".to_string(), ints(&[10]))
    );
    assert_eq!(
        paged("sqlserver.2008", "select distinct a FROM t", Paging::offset(0, 10)).0,
        "SELECT DISTINCT TOP (?) a FROM t"
    );
    assert_eq!(
        paged("sqlserver.2005", "SELECT * FROM t ORDER BY id", Paging::offset(20, 10)),
        (
            "SELECT * FROM (SELECT *, ROW_NUMBER() OVER (ORDER BY id) AS ROW_NUM_ FROM t) R_ \
             WHERE ROW_NUM_ > ? AND ROW_NUM_ <= ? ORDER BY ROW_NUM_"
                .to_string(),
            ints(&[20, 30])
        )
    );
    assert_eq!(
        paged("sqlserver.2008", "SELECT a FROM t", Paging::offset(20, 10)).0,
        "SELECT * FROM (SELECT a, ROW_NUMBER() OVER (ORDER BY (SELECT NULL)) AS ROW_NUM_ FROM t) R_ \
         WHERE ROW_NUM_ > ? AND ROW_NUM_ <= ? ORDER BY ROW_NUM_"
    );
}

#[test]
fn legacy_row_number_follows_statement_order() {
    let mut sql = SqlBuffer::with_text("SELECT ID, NAME FROM (SELECT * FROM t ORDER BY x) s WHERE AGE > ");
    sql.add_variable(18).append(" ORDER BY NAME DESC, ID");
    dialect("db2.10")
        .process_paging_sql(&mut sql, &Paging::offset(10, 5))
        .unwrap();
    let prepared = sql.to_prepared_sql();
    assert_eq!(
        prepared.sql,
        "SELECT * FROM (SELECT ID, NAME, ROW_NUMBER() OVER (ORDER BY NAME DESC, ID) AS ROW_NUM_ \
         FROM (SELECT * FROM t ORDER BY x) s WHERE AGE > ?) R_ \
         WHERE ROW_NUM_ > ? AND ROW_NUM_ <= ? ORDER BY ROW_NUM_"
    );
    assert_eq!(prepared.values, ints(&[18, 10, 15]));

    let mut distinct = SqlBuffer::with_text("SELECT DISTINCT NAME FROM t ORDER BY NAME");
    dialect("sqlserver.2008")
        .process_paging_sql(&mut distinct, &Paging::offset(10, 5))
        .unwrap();
    assert_eq!(
        distinct.to_prepared_sql().sql,
        "SELECT * FROM (SELECT ROW_NUMBER() OVER (ORDER BY NAME) AS ROW_NUM_, T_.* FROM \
         (SELECT DISTINCT NAME FROM t) T_) R_ WHERE ROW_NUM_ > ? AND ROW_NUM_ <= ? ORDER BY ROW_NUM_"
    );
}

#[test]
fn sqlserver_legacy_paging_requires_select() {
    let mut sql = SqlBuffer::with_text("WITH x AS (SELECT 1) SELECT * FROM x");
    let err = dialect("sqlserver.2008")
        .process_paging_sql(&mut sql, &Paging::offset(0, 10))
        .unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));
    assert_eq!(sql.to_prepared_sql().sql, "WITH x AS (SELECT 1) SELECT * FROM x");
}

#[test]
fn db2_paging() {
    assert_eq!(
        paged("db2.11.1", "SELECT * FROM t", Paging::offset(20, 10)),
        (
            "SELECT * FROM t OFFSET ? ROWS FETCH FIRST ? ROWS ONLY".to_string(),
            ints(&[20, 10])
        )
    );
    assert_eq!(
        paged("db2.10", "SELECT * FROM t", Paging::offset(20, 10)),
        (
            "SELECT * FROM (SELECT ROW_NUMBER() OVER () AS ROW_NUM_, T_.* FROM (SELECT * FROM t) T_) R_ \
             WHERE ROW_NUM_ > ? AND ROW_NUM_ <= ? ORDER BY ROW_NUM_"
                .to_string(),
            ints(&[20, 30])
        )
    );
}

// ==================== LIKE ====================

#[test]
fn like_patterns_escape_wildcards() {
    let prepared = dialect("mysql").build_like_sql("50%_off").to_prepared_sql();
    assert_eq!(prepared.sql, r"LIKE CONCAT('%', ?, '%') ESCAPE '\\'");
    assert_eq!(prepared.values, vec![Value::from(r"50\%\_off")]);

    let prepared = dialect("postgresql").build_starts_with_sql(r"a\b").to_prepared_sql();
    assert_eq!(prepared.sql, r"LIKE ? || '%' ESCAPE '\'");
    assert_eq!(prepared.values, vec![Value::from(r"a\\b")]);

    let prepared = dialect("sqlserver").build_ends_with_sql("x").to_prepared_sql();
    assert_eq!(prepared.sql, r"LIKE '%' + ? ESCAPE '\'");

    let prepared = dialect("oracle").build_like_sql("x").to_prepared_sql();
    assert_eq!(prepared.sql, r"LIKE '%' || ? || '%' ESCAPE '\'");
}

// ==================== IN lists ====================

#[test]
fn in_list_single_and_many() {
    let d = dialect("mysql");
    let sql = build_in_sql(d.as_ref(), "STATE", ints(&[1])).unwrap();
    assert_eq!(sql.to_prepared_sql().sql, "STATE IN (?)");

    let sql = build_not_in_sql(d.as_ref(), "STATE", ints(&[1, 2, 3])).unwrap();
    assert_eq!(sql.to_prepared_sql().sql, "STATE NOT IN (?, ?, ?)");
}

#[test]
fn in_list_rejects_empty() {
    let d = dialect("mysql");
    let err = build_in_sql(d.as_ref(), "STATE", Vec::new()).unwrap_err();
    assert!(err.is_empty_input());
    let err = build_not_in_sql(d.as_ref(), "STATE", Vec::new()).unwrap_err();
    assert!(matches!(err, SqlError::EmptyInput { ref operator, .. } if operator == "NotIn"));
}

#[test]
fn in_list_chunks_at_dialect_limit() {
    let d = create_dialect(
        "oracle".parse().unwrap(),
        DialectOptions::new().max_in_items(2),
    );
    let sql = build_in_sql(d.as_ref(), "ID", ints(&[1, 2, 3])).unwrap();
    let prepared = sql.to_prepared_sql();
    assert_eq!(prepared.sql, "(ID IN (?, ?) OR ID IN (?))");
    assert_eq!(prepared.values, ints(&[1, 2, 3]));

    let sql = build_not_in_sql(d.as_ref(), "ID", ints(&[1, 2, 3])).unwrap();
    assert_eq!(sql.to_prepared_sql().sql, "(ID NOT IN (?, ?) AND ID NOT IN (?))");
}

#[test]
fn oracle_caps_in_lists_at_1000() {
    assert_eq!(dialect("oracle").max_in_items(), Some(1000));
    assert_eq!(dialect("postgresql").max_in_items(), None);

    let values: Vec<Value> = (0..1001).map(Value::Int).collect();
    let sql = build_in_sql(dialect("oracle").as_ref(), "ID", values).unwrap();
    let prepared = sql.to_prepared_sql();
    assert_eq!(prepared.values.len(), 1001);
    assert!(prepared.sql.ends_with(" OR ID IN (?))"));
}

#[test]
fn long_in_lists_are_shortened_only_in_logged_sql() {
    let options = DialectOptions::new().omission(OmissionConfig {
        threshold: 4,
        keep: 1,
    });
    let d = create_dialect("mysql".parse().unwrap(), options);
    let sql = build_in_sql(d.as_ref(), "ID", ints(&[1, 2, 3, 4, 5, 6])).unwrap();

    assert_eq!(sql.to_executable_sql(d.as_ref()), "ID IN (1, /* ... 4 more ... */, 6)");
    assert_eq!(sql.to_prepared_sql().values.len(), 6);
}

// ==================== Literals & ordering ====================

#[test]
fn literals_per_product() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let datetime = date.and_hms_opt(3, 4, 5).unwrap();

    assert_eq!(dialect("mysql").variable_to_string(&Value::from(r"it's a\b")), r"'it''s a\\b'");
    assert_eq!(dialect("postgresql").variable_to_string(&Value::from(r"a\b")), r"'a\b'");
    assert_eq!(dialect("oracle").variable_to_string(&Value::Bool(true)), "1");
    assert_eq!(dialect("postgresql").variable_to_string(&Value::Bool(false)), "FALSE");
    assert_eq!(
        dialect("oracle").variable_to_string(&Value::Date(date)),
        "TO_DATE('2024-01-02', 'YYYY-MM-DD')"
    );
    assert_eq!(
        dialect("postgresql").variable_to_string(&Value::DateTime(datetime)),
        "TIMESTAMP '2024-01-02 03:04:05'"
    );
    assert_eq!(
        dialect("postgresql").variable_to_string(&Value::Bytes(vec![0xAB, 0x01])),
        r"'\xAB01'::bytea"
    );
    assert_eq!(dialect("sqlserver").variable_to_string(&Value::Bytes(vec![0xAB])), "0xAB");
    assert_eq!(dialect("sqlite").variable_to_string(&Value::Null), "NULL");
}

#[test]
fn nulls_ordering_native_or_emulated() {
    assert_eq!(
        dialect("postgresql").build_order_item("NAME", OrderType::Desc, Some(NullsOrder::Last)),
        "NAME DESC NULLS LAST"
    );
    assert_eq!(
        dialect("mysql").build_order_item("NAME", OrderType::Desc, Some(NullsOrder::Last)),
        "CASE WHEN NAME IS NULL THEN 1 ELSE 0 END, NAME DESC"
    );
    assert_eq!(
        dialect("sqlserver").build_order_item("NAME", OrderType::Asc, Some(NullsOrder::First)),
        "CASE WHEN NAME IS NULL THEN 0 ELSE 1 END, NAME ASC"
    );
    assert_eq!(dialect("mysql").build_order_item("NAME", OrderType::Asc, None), "NAME ASC");
}

// ==================== Children lookup ====================

#[test]
fn children_with_recursive_cte() {
    let prepared = dialect("postgresql")
        .build_find_children_sql(&children_query())
        .unwrap()
        .to_prepared_sql();
    assert_eq!(
        prepared.sql,
        "WITH RECURSIVE RECURSIVE_CHILDREN AS (SELECT * FROM DEPT WHERE CODE IN (?) UNION \
         SELECT T_.* FROM DEPT T_ INNER JOIN RECURSIVE_CHILDREN C_ ON T_.PARENT_CODE = C_.CODE) \
         SELECT CODE, NAME FROM RECURSIVE_CHILDREN WHERE STATUS = ? ORDER BY CODE ASC"
    );
    assert_eq!(prepared.values, vec![Value::from("A"), Value::Int(1)]);

    for v in ["mysql.8", "mariadb.10.2", "sqlite"] {
        let sql = dialect(v).build_find_children_sql(&children_query()).unwrap();
        assert!(sql.to_prepared_sql().sql.starts_with("WITH RECURSIVE "), "{v}");
    }
}

#[test]
fn children_on_sqlserver_and_db2_use_union_all() {
    for v in ["sqlserver", "db2"] {
        let sql = dialect(v)
            .build_find_children_sql(&children_query())
            .unwrap()
            .to_prepared_sql()
            .sql;
        assert!(sql.starts_with("WITH RECURSIVE_CHILDREN AS ("), "{v}");
        assert!(sql.contains(" UNION ALL "), "{v}");
    }
}

#[test]
fn overlapping_roots_return_each_row_once() {
    let mut query = children_query();
    query.start_codes = vec![Value::from("A"), Value::from("A1")];

    for v in ["sqlserver", "db2"] {
        let sql = dialect(v)
            .build_find_children_sql(&query)
            .unwrap()
            .to_prepared_sql()
            .sql;
        assert!(
            sql.ends_with(
                ") SELECT CODE, NAME FROM (SELECT * FROM DEPT WHERE CODE IN \
                 (SELECT CODE FROM RECURSIVE_CHILDREN)) D_ WHERE STATUS = ? ORDER BY CODE ASC"
            ),
            "{v}: {sql}"
        );
    }

    let oracle = dialect("oracle").build_find_children_sql(&query).unwrap();
    assert!(oracle.to_prepared_sql().sql.contains("WHERE CODE IN (SELECT CODE FROM DEPT START WITH"));
    assert_eq!(
        oracle.values(),
        vec![Value::from("A"), Value::from("A1"), Value::Int(1)]
    );
}

#[test]
fn children_on_oracle_use_connect_by() {
    let prepared = dialect("oracle.11")
        .build_find_children_sql(&children_query())
        .unwrap()
        .to_prepared_sql();
    assert_eq!(
        prepared.sql,
        "SELECT CODE, NAME FROM (SELECT * FROM DEPT WHERE CODE IN (SELECT CODE FROM DEPT \
         START WITH CODE IN (?) CONNECT BY NOCYCLE PRIOR CODE = PARENT_CODE)) D_ \
         WHERE STATUS = ? ORDER BY CODE ASC"
    );
}

#[test]
fn children_on_old_mysql_call_procedure() {
    let prepared = dialect("mysql.5.7")
        .build_find_children_sql(&children_query())
        .unwrap()
        .to_prepared_sql();
    assert_eq!(prepared.sql, "CALL RECURSIVE_FIND_CHILDREN(?, ?, ?, ?, ?, ?, ?)");
    assert_eq!(
        prepared.values,
        vec![
            Value::from("DEPT"),
            Value::from("CODE"),
            Value::from("PARENT_CODE"),
            Value::from("A"),
            Value::from("CODE, NAME"),
            Value::from("WHERE STATUS = 1"),
            Value::from("ORDER BY CODE ASC"),
        ]
    );

    let custom = create_dialect(
        "mariadb.10.1".parse().unwrap(),
        DialectOptions::new().recursive_procedure("FIND_TREE"),
    );
    let sql = custom.build_find_children_sql(&children_query()).unwrap();
    assert!(sql.to_prepared_sql().sql.starts_with("CALL FIND_TREE("));
}

#[test]
fn old_mysql_procedure_gets_full_filter_text() {
    let mut query = children_query();
    let mut where_sql = SqlBuffer::with_text("WHERE STATE IN (");
    where_sql.add_variables(1..=60).append(")");
    query.where_sql = where_sql;

    let values = dialect("mysql.5.7")
        .build_find_children_sql(&query)
        .unwrap()
        .values();
    let expected = (1..=60).map(|n| n.to_string()).collect::<Vec<_>>().join(", ");
    assert_eq!(values[5], Value::Text(format!("WHERE STATE IN ({expected})")));
}

#[test]
fn old_mysql_procedure_rejects_comma_in_root_code() {
    let mut query = children_query();
    query.start_codes = vec![Value::from("A,B")];
    let err = dialect("mysql.5.7").build_find_children_sql(&query).unwrap_err();
    assert!(matches!(err, SqlError::Validation(_)));
}

#[test]
fn children_require_roots() {
    let mut query = children_query();
    query.start_codes.clear();
    for v in ["oracle", "mysql.5.7", "postgresql"] {
        let err = dialect(v).build_find_children_sql(&query).unwrap_err();
        assert!(err.is_empty_input(), "{v}");
    }
}

use super::*;
use crate::config::DialectOptions;
use crate::dialect::{DbType, DbVersion, create_dialect};
use crate::error::SqlError;

fn mysql() -> Arc<dyn Dialect> {
    create_dialect(DbVersion::new(DbType::MySql), DialectOptions::default())
}

fn render(registry: &OperatorRegistry, scope: OperatorScope, token: &str, value: Value) -> SqlResult<(String, Vec<Value>)> {
    let op = registry.resolve(scope, token, &value).expect("operator not found");
    let prepared = op.build_sql("COL", &value, mysql().as_ref())?.to_prepared_sql();
    Ok((prepared.sql, prepared.values))
}

fn where_sql(token: &str, value: impl Into<Value>) -> (String, Vec<Value>) {
    render(&OperatorRegistry::with_defaults(), OperatorScope::Where, token, value.into()).unwrap()
}

#[derive(Debug)]
struct Custom(OperatorMeta);

impl BinaryOperator for Custom {
    fn meta(&self) -> &OperatorMeta {
        &self.0
    }

    fn build_sql(&self, column: &str, value: &Value, _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
        let mut sql = SqlBuffer::with_text(format!("{column} ~ "));
        sql.add_variable(value.clone());
        Ok(sql)
    }
}

// ==================== Metadata ====================

#[test]
fn name_is_first_ascii_identifier() {
    assert_eq!(OperatorMeta::new(">=", &["大于等于", "GreaterEqualsThen"]).name(), Some("GreaterEqualsThen"));
    assert_eq!(OperatorMeta::new("BETWEEN", &["Between"]).name(), Some("BETWEEN"));
    assert_eq!(OperatorMeta::new("IS NULL", &["IsNull"]).name(), Some("IsNull"));
    assert_eq!(OperatorMeta::new("~", &["匹配"]).name(), None);
}

#[test]
fn matching_is_case_insensitive() {
    let meta = OperatorMeta::new(">", &["GreaterThen", "gt"]);
    assert!(meta.matches("greaterthen"));
    assert!(meta.matches(" GT "));
    assert!(meta.matches(">"));
    assert!(!meta.matches(">="));
    assert!(!meta.matches(""));
}

// ==================== Built-ins ====================

#[test]
fn equals_null_and_empty_render_is_null() {
    assert_eq!(where_sql("Equals", Value::Null), ("COL IS NULL".to_string(), vec![]));
    assert_eq!(where_sql("=", ""), ("COL IS NULL".to_string(), vec![]));
    assert_eq!(
        where_sql("eq", "x"),
        ("COL = ?".to_string(), vec![Value::from("x")])
    );
}

#[test]
fn not_equals_null_renders_is_not_null() {
    assert_eq!(where_sql("NotEquals", Value::Null), ("COL IS NOT NULL".to_string(), vec![]));
    assert_eq!(where_sql("<>", 3), ("COL != ?".to_string(), vec![Value::Int(3)]));
}

#[test]
fn comparisons() {
    assert_eq!(where_sql("GreaterThen", 18).0, "COL > ?");
    assert_eq!(where_sql("GreaterThan", 18).0, "COL > ?");
    assert_eq!(where_sql("LessEqualsThen", 18).0, "COL <= ?");
    assert_eq!(where_sql("ge", 18).0, "COL >= ?");
    assert_eq!(where_sql("lt", 18).0, "COL < ?");

    let err = render(&OperatorRegistry::with_defaults(), OperatorScope::Where, "gt", Value::Null).unwrap_err();
    assert!(err.is_empty_input());
}

#[test]
fn unary_operators_ignore_values() {
    assert_eq!(where_sql("IsNull", 5), ("COL IS NULL".to_string(), vec![]));
    assert_eq!(where_sql("is not null", "x"), ("COL IS NOT NULL".to_string(), vec![]));
}

#[test]
fn like_family_uses_dialect() {
    assert_eq!(
        where_sql("Like", "a_b"),
        (
            r"COL LIKE CONCAT('%', ?, '%') ESCAPE '\\'".to_string(),
            vec![Value::from(r"a\_b")]
        )
    );
    assert_eq!(
        where_sql("NotLike", "x").0,
        r"COL NOT LIKE CONCAT('%', ?, '%') ESCAPE '\\'"
    );
    assert_eq!(where_sql("StartsWith", "x").0, r"COL LIKE CONCAT(?, '%') ESCAPE '\\'");
    assert_eq!(where_sql("EndsWith", 7).1, vec![Value::from("7")]);

    let err = render(&OperatorRegistry::with_defaults(), OperatorScope::Where, "Like", Value::Null).unwrap_err();
    assert!(err.is_empty_input());
}

#[test]
fn between_and_open_ranges() {
    assert_eq!(
        where_sql("Between", vec![1, 9]),
        ("COL BETWEEN ? AND ?".to_string(), vec![Value::Int(1), Value::Int(9)])
    );
    assert_eq!(where_sql("NotBetween", vec![1, 9]).0, "COL NOT BETWEEN ? AND ?");
    assert_eq!(where_sql("Between", vec![Value::Int(1), Value::Null]).0, "COL >= ?");
    assert_eq!(where_sql("Between", vec![Value::Null, Value::Int(9)]).0, "COL <= ?");
    assert_eq!(where_sql("NotBetween", vec![Value::Int(1), Value::Null]).0, "COL < ?");
    assert_eq!(where_sql("NotBetween", vec![Value::Null, Value::Int(9)]).0, "COL > ?");

    let err = render(
        &OperatorRegistry::with_defaults(),
        OperatorScope::Where,
        "Between",
        Value::List(vec![Value::Null, Value::Null]),
    )
    .unwrap_err();
    assert!(err.is_empty_input());
}

#[test]
fn in_uses_in_syntax_even_for_one_value() {
    assert_eq!(where_sql("In", vec![5]), ("COL IN (?)".to_string(), vec![Value::Int(5)]));
    assert_eq!(where_sql("NotIn", vec![1, 2]).0, "COL NOT IN (?, ?)");

    let err = render(
        &OperatorRegistry::with_defaults(),
        OperatorScope::Where,
        "In",
        Value::List(vec![]),
    )
    .unwrap_err();
    assert!(err.is_empty_input());
}

#[test]
fn value_shape_is_checked() {
    let registry = OperatorRegistry::with_defaults();
    let op_in = registry.find(OperatorScope::Where, "In", Arity::Multivariate).unwrap();
    assert!(op_in.check_value(&Value::Int(1)).is_err());
    assert!(op_in.check_value(&Value::from(vec![1])).is_ok());

    let between = registry.find(OperatorScope::Where, "Between", Arity::Ternary).unwrap();
    assert!(between.check_value(&Value::from(vec![1, 2, 3])).is_err());

    let eq = registry.find(OperatorScope::Where, "Equals", Arity::Binary).unwrap();
    assert!(eq.check_value(&Value::from(vec![1])).is_err());
}

#[test]
fn update_operators() {
    let registry = OperatorRegistry::with_defaults();
    assert_eq!(
        render(&registry, OperatorScope::Update, "Set", Value::Int(1)).unwrap(),
        ("COL = ?".to_string(), vec![Value::Int(1)])
    );
    assert_eq!(
        render(&registry, OperatorScope::Update, "Add", Value::Int(2)).unwrap(),
        ("COL = COL + ?".to_string(), vec![Value::Int(2)])
    );
    assert_eq!(
        render(&registry, OperatorScope::Update, "ToNull", Value::Int(2)).unwrap(),
        ("COL = NULL".to_string(), vec![])
    );
    // scopes are separate
    assert!(registry.resolve(OperatorScope::Update, "In", &Value::Null).is_none());
    assert!(registry.resolve(OperatorScope::Where, "ToNull", &Value::Null).is_none());
}

// ==================== Registration ====================

#[test]
fn rejects_operator_without_ascii_name() {
    let mut registry = OperatorRegistry::new();
    let err = registry
        .register_where(Operator::binary(Custom(OperatorMeta::new("~", &["匹配"]))))
        .unwrap_err();
    assert!(matches!(err, SqlError::Configuration(_)));
}

#[test]
fn rejects_token_collision_in_same_family() {
    let mut registry = OperatorRegistry::with_defaults();
    let err = registry
        .register_where(Operator::binary(Custom(OperatorMeta::new("~", &["Regex", "gt"]))))
        .unwrap_err();
    assert!(matches!(err, SqlError::Configuration(_)));

    // Same token in another family or scope is fine.
    registry
        .register_update(Operator::binary(Custom(OperatorMeta::new("~", &["Regex", "gt"]))))
        .unwrap();
}

#[test]
fn same_name_replaces_builtin() {
    let mut registry = OperatorRegistry::with_defaults();
    let before = registry.operators(OperatorScope::Where).len();
    registry
        .register_where(Operator::binary(Custom(OperatorMeta::new("~", &["Like"]))))
        .unwrap_err();
    registry
        .register_where(Operator::binary(Custom(OperatorMeta::new("LIKE", &["Like"]))))
        .unwrap();

    assert_eq!(registry.operators(OperatorScope::Where).len(), before);
    assert_eq!(where_sql_with(&registry, "Like", "x"), "COL ~ ?");
}

fn where_sql_with(registry: &OperatorRegistry, token: &str, value: &str) -> String {
    render(registry, OperatorScope::Where, token, Value::from(value)).unwrap().0
}

#[test]
fn shape_picks_family_for_shared_tokens() {
    #[derive(Debug)]
    struct AnyOf(OperatorMeta);

    impl MultivariateOperator for AnyOf {
        fn meta(&self) -> &OperatorMeta {
            &self.0
        }

        fn build_sql(&self, column: &str, values: &[Value], _dialect: &dyn Dialect) -> SqlResult<SqlBuffer> {
            let mut sql = SqlBuffer::with_text(format!("{column} = ANY("));
            sql.add_variables(values.iter().cloned()).append(")");
            Ok(sql)
        }
    }

    let mut registry = OperatorRegistry::with_defaults();
    registry
        .register_where(Operator::multivariate(AnyOf(OperatorMeta::new("Equals", &[]))))
        .unwrap();

    let scalar = registry.resolve(OperatorScope::Where, "Equals", &Value::Int(1)).unwrap();
    assert_eq!(scalar.arity(), Arity::Binary);
    let list = registry
        .resolve(OperatorScope::Where, "Equals", &Value::from(vec![1, 2, 3]))
        .unwrap();
    assert_eq!(list.arity(), Arity::Multivariate);
}

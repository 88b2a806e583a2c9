use super::{Arity, Operator, update_operators, where_operators};
use crate::error::{SqlError, SqlResult};
use crate::value::Value;

/// Where an operator may be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorScope {
    /// WHERE predicates.
    Where,
    /// UPDATE SET assignments.
    Update,
}

#[derive(Debug, Clone, Default)]
struct OperatorSet {
    operators: Vec<Operator>,
}

impl OperatorSet {
    fn family(&self, arity: Arity) -> impl Iterator<Item = &Operator> {
        self.operators.iter().filter(move |op| op.arity() == arity)
    }

    fn register(&mut self, operator: Operator) -> SqlResult<()> {
        let Some(name) = operator.meta().name() else {
            return Err(SqlError::configuration(format!(
                "operator '{}' has no plain ASCII identifier among its type and aliases",
                operator.meta().op_type()
            )));
        };

        let tokens = operator.meta().tokens();
        for existing in self.family(operator.arity()) {
            if existing.name() == name {
                continue;
            }
            if let Some(token) = existing.meta().tokens().into_iter().find(|t| tokens.contains(t)) {
                return Err(SqlError::configuration(format!(
                    "operator '{name}' collides with '{}' on token '{token}'",
                    existing.name()
                )));
            }
        }

        let arity = operator.arity();
        match self
            .operators
            .iter_mut()
            .find(|op| op.arity() == arity && op.name() == name)
        {
            Some(slot) => {
                tracing::debug!(target: "sqlweave.registry", operator = name, ?arity, "replacing operator");
                *slot = operator;
            }
            None => {
                tracing::trace!(target: "sqlweave.registry", operator = name, ?arity, "registered operator");
                self.operators.push(operator);
            }
        }
        Ok(())
    }

    fn find(&self, token: &str, arity: Arity) -> Option<&Operator> {
        self.family(arity).find(|op| op.meta().matches(token))
    }

    fn resolve(&self, token: &str, value: &Value) -> Option<&Operator> {
        let candidates: Vec<&Operator> = self
            .operators
            .iter()
            .filter(|op| op.meta().matches(token))
            .collect();
        if candidates.len() <= 1 {
            return candidates.into_iter().next();
        }

        let preference: &[Arity] = match value {
            Value::List(items) if items.len() == 2 => {
                &[Arity::Ternary, Arity::Multivariate, Arity::Binary, Arity::Unary]
            }
            Value::List(_) => &[Arity::Multivariate, Arity::Ternary, Arity::Binary, Arity::Unary],
            Value::Null => &[Arity::Unary, Arity::Binary, Arity::Ternary, Arity::Multivariate],
            _ => &[Arity::Binary, Arity::Unary, Arity::Multivariate, Arity::Ternary],
        };
        preference
            .iter()
            .find_map(|arity| candidates.iter().copied().find(|op| op.arity() == *arity))
    }
}

/// Operator lookup by name, SQL token or alias.
///
/// Built once at startup (explicit registration, no scanning) and then
/// shared read-only, typically behind an `Arc`.
///
/// ```ignore
/// let registry = OperatorRegistry::with_defaults();
/// let op = registry.resolve(OperatorScope::Where, "gt", &Value::from(18)).unwrap();
/// assert_eq!(op.name(), "GreaterThen");
/// ```
#[derive(Debug, Clone, Default)]
pub struct OperatorRegistry {
    where_ops: OperatorSet,
    update_ops: OperatorSet,
}

impl OperatorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every built-in WHERE and UPDATE operator.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for op in where_operators() {
            registry
                .where_ops
                .register(op)
                .unwrap_or_else(|e| unreachable!("built-in WHERE operators collide: {e}"));
        }
        for op in update_operators() {
            registry
                .update_ops
                .register(op)
                .unwrap_or_else(|e| unreachable!("built-in UPDATE operators collide: {e}"));
        }
        registry
    }

    fn set(&self, scope: OperatorScope) -> &OperatorSet {
        match scope {
            OperatorScope::Where => &self.where_ops,
            OperatorScope::Update => &self.update_ops,
        }
    }

    /// Register an operator.
    ///
    /// Fails with a configuration error when the operator has no ASCII
    /// identifier name, or when one of its tokens is already claimed by a
    /// different operator of the same arity in the same scope. An operator
    /// with an already registered name replaces the earlier one.
    pub fn register(&mut self, scope: OperatorScope, operator: Operator) -> SqlResult<()> {
        match scope {
            OperatorScope::Where => self.where_ops.register(operator),
            OperatorScope::Update => self.update_ops.register(operator),
        }
    }

    /// Register a WHERE operator.
    pub fn register_where(&mut self, operator: Operator) -> SqlResult<()> {
        self.register(OperatorScope::Where, operator)
    }

    /// Register an UPDATE operator.
    pub fn register_update(&mut self, operator: Operator) -> SqlResult<()> {
        self.register(OperatorScope::Update, operator)
    }

    /// Find the operator of one arity family matching `token`.
    pub fn find(&self, scope: OperatorScope, token: &str, arity: Arity) -> Option<Operator> {
        self.set(scope).find(token, arity).cloned()
    }

    /// Find the operator matching `token`, using the value's shape to pick a
    /// family when the token is claimed by several.
    pub fn resolve(&self, scope: OperatorScope, token: &str, value: &Value) -> Option<Operator> {
        self.set(scope).resolve(token, value).cloned()
    }

    /// Registered operators of a scope, in registration order.
    pub fn operators(&self, scope: OperatorScope) -> &[Operator] {
        &self.set(scope).operators
    }
}

use crate::ast::{CastKind, Expr, Literal};
use crate::parse::{parse_expression, ExprParseError};
use crate::registry::TypeRegistry;
use crate::value::Value;

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error("Unknown type '{name}' in expression")]
    UnknownType { name: String },

    #[error("Unknown static member '{type_name}.{member}'")]
    UnknownMember { type_name: String, member: String },

    #[error("No constructor of '{type_name}' accepts {arity} argument(s)")]
    NoMatchingConstructor { type_name: String, arity: usize },

    #[error("Constructor argument {index} of '{type_name}' expects {expected}, got {actual}")]
    ArgumentType {
        type_name: String,
        index: usize,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Cannot cast {actual} to {target}")]
    InvalidCast {
        target: &'static str,
        actual: &'static str,
    },
}

/// Either half of the expression pipeline can fail: the text may not parse,
/// or a parsed expression may reference symbols the registry doesn't know.
#[derive(Debug, thiserror::Error)]
pub enum ExpressionError {
    #[error(transparent)]
    Parse(#[from] ExprParseError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),
}

/// An expression parsed once and held for repeated evaluation.
///
/// Construction parses eagerly, so malformed text is rejected where the
/// expression is declared (rule-load time) and the per-trigger path only
/// walks the cached AST.
#[derive(Debug, Clone)]
pub struct CompiledExpression {
    source: String,
    expr: Expr,
}

impl CompiledExpression {
    pub fn new(text: &str) -> Result<Self, ExprParseError> {
        let expr = parse_expression(text)?;
        Ok(Self {
            source: text.to_string(),
            expr,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Evaluate the cached form. Pure value construction; resolution
    /// failures propagate and are never downgraded.
    pub fn evaluate(&self, registry: &TypeRegistry) -> Result<Value, EvaluationError> {
        eval_expr(&self.expr, registry)
    }
}

/// One-shot parse and evaluate.
pub fn evaluate_expression(
    text: &str,
    registry: &TypeRegistry,
) -> Result<Value, ExpressionError> {
    let compiled = CompiledExpression::new(text)?;
    Ok(compiled.evaluate(registry)?)
}

fn eval_expr(expr: &Expr, registry: &TypeRegistry) -> Result<Value, EvaluationError> {
    match expr {
        Expr::Literal(literal) => Ok(literal_value(literal)),
        Expr::Cast { target, value } => {
            let inner = eval_expr(value, registry)?;
            cast_value(*target, inner)
        }
        Expr::New { type_name, args } => {
            let values = args
                .iter()
                .map(|arg| eval_expr(arg, registry))
                .collect::<Result<Vec<_>, _>>()?;
            registry.construct(type_name, &values)
        }
        Expr::StaticMember { type_name, member } => registry.static_member(type_name, member),
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => Value::Null,
        Literal::Bool(b) => Value::Bool(*b),
        Literal::Int(i) => Value::Int(*i),
        Literal::Float(f) => Value::Float(*f),
        Literal::Str(s) => Value::Str(s.clone()),
    }
}

fn cast_value(target: CastKind, value: Value) -> Result<Value, EvaluationError> {
    let actual = value.kind();
    match target {
        CastKind::Int | CastKind::Long => match value {
            Value::Int(i) => Ok(Value::Int(i)),
            Value::Float(f) => Ok(Value::Int(f as i64)),
            _ => Err(EvaluationError::InvalidCast {
                target: target.name(),
                actual,
            }),
        },
        CastKind::Float | CastKind::Double => match value {
            Value::Int(i) => Ok(Value::Float(i as f64)),
            Value::Float(f) => Ok(Value::Float(f)),
            _ => Err(EvaluationError::InvalidCast {
                target: target.name(),
                actual,
            }),
        },
        CastKind::Bool => match value {
            Value::Bool(b) => Ok(Value::Bool(b)),
            _ => Err(EvaluationError::InvalidCast {
                target: target.name(),
                actual,
            }),
        },
        CastKind::Str => match value {
            Value::Str(s) => Ok(Value::Str(s)),
            _ => Err(EvaluationError::InvalidCast {
                target: target.name(),
                actual,
            }),
        },
    }
}

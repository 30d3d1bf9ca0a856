use faultline_expr::{
    CompiledExpression, EvaluationError, ExceptionValue, ExpressionError, TypeRegistry, Value,
};

use crate::context::RuntimeContext;

/// Construction-time failure of an expression-backed fault. Surfaced while
/// rules load, so a malformed rule set is rejected before any interception
/// happens.
#[derive(Debug, thiserror::Error)]
pub enum FaultError {
    #[error(transparent)]
    Expression(#[from] ExpressionError),

    #[error("Throw expression '{source_text}' produced {actual}, expected an exception")]
    NotAnException {
        source_text: String,
        actual: &'static str,
    },
}

/// Retrieval-time failure. Rules are validated at load, so hitting this
/// after activation is unexpected; it propagates as the invocation's result
/// rather than degrading to a silent no-op.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error("Fault expression produced {actual}, expected an exception")]
    NotAnException { actual: &'static str },
}

/// What a triggered rule does to the intercepted call.
#[derive(Debug)]
pub struct Fault {
    kind: FaultKind,
}

#[derive(Debug)]
enum FaultKind {
    NoOp,
    ThrowFixed { exception: ExceptionValue },
    ThrowExpr { expr: CompiledExpression },
    ReturnFixed { value: Value },
    ReturnExpr { expr: CompiledExpression },
}

impl Fault {
    /// Leaves the call untouched even when the condition triggers.
    pub fn no_op() -> Self {
        Self { kind: FaultKind::NoOp }
    }

    /// Throw a pre-built exception. Every retrieval hands back the same
    /// value, so callers must not assume a fresh instance per call.
    pub fn throw(exception: ExceptionValue) -> Self {
        Self {
            kind: FaultKind::ThrowFixed { exception },
        }
    }

    /// Throw an exception built from an expression, re-evaluated on every
    /// retrieval. The text is parsed and trial-evaluated here so an
    /// unresolvable or non-exception expression fails at rule load.
    pub fn throw_expression(text: &str, registry: &TypeRegistry) -> Result<Self, FaultError> {
        let expr = CompiledExpression::new(text).map_err(ExpressionError::from)?;
        match expr.evaluate(registry).map_err(ExpressionError::from)? {
            Value::Exception(_) => Ok(Self {
                kind: FaultKind::ThrowExpr { expr },
            }),
            other => Err(FaultError::NotAnException {
                source_text: text.to_string(),
                actual: other.kind(),
            }),
        }
    }

    /// Substitute a fixed return value.
    pub fn return_value(value: Value) -> Self {
        Self {
            kind: FaultKind::ReturnFixed { value },
        }
    }

    /// Substitute a return value built from an expression, re-evaluated on
    /// every retrieval and trial-evaluated here.
    pub fn return_expression(text: &str, registry: &TypeRegistry) -> Result<Self, FaultError> {
        let expr = CompiledExpression::new(text).map_err(ExpressionError::from)?;
        expr.evaluate(registry).map_err(ExpressionError::from)?;
        Ok(Self {
            kind: FaultKind::ReturnExpr { expr },
        })
    }

    /// Compute the outcome for a triggered call.
    pub fn retrieve(
        &self,
        _context: &RuntimeContext<'_>,
        registry: &TypeRegistry,
    ) -> Result<Outcome, DispatchError> {
        match &self.kind {
            FaultKind::NoOp => Ok(Outcome::none()),
            FaultKind::ThrowFixed { exception } => Ok(Outcome::throws(exception.clone())),
            FaultKind::ThrowExpr { expr } => match expr.evaluate(registry)? {
                Value::Exception(exception) => Ok(Outcome::throws(exception)),
                other => Err(DispatchError::NotAnException {
                    actual: other.kind(),
                }),
            },
            FaultKind::ReturnFixed { value } => Ok(Outcome::returns(value.clone())),
            FaultKind::ReturnExpr { expr } => Ok(Outcome::returns(expr.evaluate(registry)?)),
        }
    }
}

/// Result of a fault retrieval: an exception to throw, a value to return,
/// or neither (leave the call alone). Never both — the constructors make
/// the states mutually exclusive, and the exception always takes precedence
/// downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    exception: Option<ExceptionValue>,
    return_value: Option<Value>,
}

impl Outcome {
    /// The empty outcome: the original call proceeds unmodified.
    pub fn none() -> Self {
        Self {
            exception: None,
            return_value: None,
        }
    }

    pub fn throws(exception: ExceptionValue) -> Self {
        Self {
            exception: Some(exception),
            return_value: None,
        }
    }

    pub fn returns(value: Value) -> Self {
        Self {
            exception: None,
            return_value: Some(value),
        }
    }

    pub fn exception(&self) -> Option<&ExceptionValue> {
        self.exception.as_ref()
    }

    pub fn return_value(&self) -> Option<&Value> {
        self.return_value.as_ref()
    }

    pub fn is_empty(&self) -> bool {
        self.exception.is_none() && self.return_value.is_none()
    }

    /// Destructure for the interception mechanism. Check the exception
    /// first: if it is present the call must throw, regardless of the
    /// return slot.
    pub fn into_parts(self) -> (Option<ExceptionValue>, Option<Value>) {
        (self.exception, self.return_value)
    }
}

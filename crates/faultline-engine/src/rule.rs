use serde::Deserialize;

use faultline_expr::{TypeRegistry, Value};
use faultline_signature::{parse_signature, MethodSignature, SignatureParseError};

use crate::condition::{Condition, ConstructionError};
use crate::fault::{Fault, FaultError};

/// One loaded rule: a target-method pattern bound to a condition and a
/// fault. Immutable after load except for the condition's internal
/// counters.
#[derive(Debug)]
pub struct FaultRule {
    target: MethodSignature,
    condition: Condition,
    fault: Fault,
}

impl FaultRule {
    pub fn new(target: MethodSignature, condition: Condition, fault: Fault) -> Self {
        Self {
            target,
            condition,
            fault,
        }
    }

    pub fn target(&self) -> &MethodSignature {
        &self.target
    }

    pub fn condition(&self) -> &Condition {
        &self.condition
    }

    pub fn fault(&self) -> &Fault {
        &self.fault
    }
}

// ── Declarative descriptors ──────────────────────────────────────────

/// Top-level shape of a rule document.
#[derive(Debug, Clone, Deserialize)]
pub struct RuleSetSpec {
    pub rules: Vec<RuleSpec>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuleSpec {
    /// Target method signature text, e.g. `"Foo.Bar(int)"`.
    pub target: String,
    pub condition: ConditionSpec,
    pub fault: FaultSpec,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConditionSpec {
    Always,
    Never,
    OnlyOnce,
    OnNthCall { n: u64 },
    EveryNthCall { n: u64 },
    OnNthCallBy { n: u64, caller: String },
    CalledBy { caller: String },
    StackContains { method: String },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FaultSpec {
    NoOp,
    /// Throw the result of an exception expression. The field is optional
    /// so an absent exception surfaces as a construction error instead of
    /// a document-shape error.
    Throw { exception: Option<String> },
    /// Return the result of an expression.
    Return { expression: String },
    /// Return a plain JSON literal.
    ReturnValue { value: serde_json::Value },
}

// ── Loading ──────────────────────────────────────────────────────────

/// Why a single rule failed to build.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    #[error(transparent)]
    Signature(#[from] SignatureParseError),

    #[error(transparent)]
    Construction(#[from] ConstructionError),

    #[error(transparent)]
    Fault(#[from] FaultError),

    #[error("Unsupported literal for return value: {kind}")]
    UnsupportedLiteral { kind: &'static str },
}

/// Why a rule document was rejected. Any error rejects the entire set —
/// a session with only some of its rules active could mask the very bugs
/// being tested for.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("Rule document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Rule {index} ('{target}'): {source}")]
    Rule {
        index: usize,
        target: String,
        source: RuleError,
    },
}

/// Ordered, fully-validated rule collection — the Loaded state. Insertion
/// order is semantically significant: the first matching rule wins at
/// dispatch.
#[derive(Debug)]
pub struct RuleSet {
    rules: Vec<FaultRule>,
}

impl RuleSet {
    /// Wrap programmatically-built rules. Conditions and faults validate
    /// themselves at construction, so a vector of rules is valid by
    /// definition.
    pub fn new(rules: Vec<FaultRule>) -> Self {
        Self { rules }
    }

    /// Load and validate a JSON rule document, rejecting the whole set on
    /// the first malformed rule.
    pub fn from_json(json: &str, registry: &TypeRegistry) -> Result<Self, LoadError> {
        let spec: RuleSetSpec = serde_json::from_str(json)?;
        Self::from_specs(&spec.rules, registry)
    }

    pub fn from_specs(specs: &[RuleSpec], registry: &TypeRegistry) -> Result<Self, LoadError> {
        let mut rules = Vec::with_capacity(specs.len());
        for (index, spec) in specs.iter().enumerate() {
            let rule = build_rule(spec, registry).map_err(|source| LoadError::Rule {
                index,
                target: spec.target.clone(),
                source,
            })?;
            tracing::debug!(index, method = %rule.target(), "fault rule loaded");
            rules.push(rule);
        }
        Ok(Self { rules })
    }

    pub fn rules(&self) -> &[FaultRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn into_rules(self) -> Vec<FaultRule> {
        self.rules
    }
}

fn build_rule(spec: &RuleSpec, registry: &TypeRegistry) -> Result<FaultRule, RuleError> {
    let target = parse_signature(&spec.target)?;
    let condition = build_condition(&spec.condition)?;
    let fault = build_fault(&spec.fault, registry)?;
    Ok(FaultRule::new(target, condition, fault))
}

fn build_condition(spec: &ConditionSpec) -> Result<Condition, RuleError> {
    Ok(match spec {
        ConditionSpec::Always => Condition::always(),
        ConditionSpec::Never => Condition::never(),
        ConditionSpec::OnlyOnce => Condition::only_once(),
        ConditionSpec::OnNthCall { n } => Condition::on_nth_call(*n)?,
        ConditionSpec::EveryNthCall { n } => Condition::every_nth_call(*n)?,
        ConditionSpec::OnNthCallBy { n, caller } => {
            Condition::on_nth_call_by(*n, parse_signature(caller)?)?
        }
        ConditionSpec::CalledBy { caller } => Condition::called_by(parse_signature(caller)?),
        ConditionSpec::StackContains { method } => {
            Condition::stack_contains(parse_signature(method)?)
        }
    })
}

fn build_fault(spec: &FaultSpec, registry: &TypeRegistry) -> Result<Fault, RuleError> {
    match spec {
        FaultSpec::NoOp => Ok(Fault::no_op()),
        FaultSpec::Throw { exception: None } => {
            Err(RuleError::Construction(ConstructionError::MissingException))
        }
        FaultSpec::Throw {
            exception: Some(expression),
        } => Ok(Fault::throw_expression(expression, registry)?),
        FaultSpec::Return { expression } => Ok(Fault::return_expression(expression, registry)?),
        FaultSpec::ReturnValue { value } => Ok(Fault::return_value(json_literal(value)?)),
    }
}

/// Map a JSON literal onto an expression value. Composite shapes are not
/// return values; authors wanting structured results use an expression.
fn json_literal(value: &serde_json::Value) -> Result<Value, RuleError> {
    match value {
        serde_json::Value::Null => Ok(Value::Null),
        serde_json::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Int(i))
            } else if let Some(f) = n.as_f64() {
                Ok(Value::Float(f))
            } else {
                Err(RuleError::UnsupportedLiteral { kind: "number" })
            }
        }
        serde_json::Value::String(s) => Ok(Value::Str(s.clone())),
        serde_json::Value::Array(_) => Err(RuleError::UnsupportedLiteral { kind: "array" }),
        serde_json::Value::Object(_) => Err(RuleError::UnsupportedLiteral { kind: "object" }),
    }
}

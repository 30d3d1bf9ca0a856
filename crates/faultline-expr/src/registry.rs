use std::collections::HashMap;
use std::sync::Arc;

use crate::eval::EvaluationError;
use crate::value::{ExceptionValue, Value};

/// Factory for one constructible type; receives already-evaluated argument
/// values and builds the result or reports why it can't.
pub type ConstructorFn =
    Arc<dyn Fn(&[Value]) -> Result<Value, EvaluationError> + Send + Sync>;

/// Closed set of types an expression may construct and static members it may
/// read.
///
/// The original engine resolved any type name reflectively at runtime; here
/// the constructible set is a registry populated up front, so an expression
/// referencing an unknown symbol fails at rule-load time instead of at
/// trigger time. Harnesses extend the set with [`register_exception`] or
/// [`register_constructor`] before loading rules.
///
/// [`register_exception`]: TypeRegistry::register_exception
/// [`register_constructor`]: TypeRegistry::register_constructor
pub struct TypeRegistry {
    constructors: HashMap<String, ConstructorFn>,
    statics: HashMap<String, Value>,
}

/// Well-known exception types registered by default, mirroring the set the
/// original acceptance tests construct from rule text.
const BUILTIN_EXCEPTIONS: &[&str] = &[
    "System.Exception",
    "System.SystemException",
    "System.ApplicationException",
    "System.InvalidOperationException",
    "System.ArgumentException",
    "System.ArgumentNullException",
    "System.ArgumentOutOfRangeException",
    "System.NullReferenceException",
    "System.NotSupportedException",
    "System.NotImplementedException",
    "System.IndexOutOfRangeException",
    "System.FormatException",
    "System.TimeoutException",
    "System.OperationCanceledException",
    "System.UnauthorizedAccessException",
    "System.IO.IOException",
    "System.IO.FileNotFoundException",
    "System.IO.DirectoryNotFoundException",
];

impl TypeRegistry {
    /// Registry pre-populated with the well-known exception types and static
    /// members.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for name in BUILTIN_EXCEPTIONS {
            registry.register_exception(name);
        }

        registry.register_static("System.String", "Empty", Value::Str(String::new()));
        registry.register_static("System.Int32", "MaxValue", Value::Int(i64::from(i32::MAX)));
        registry.register_static("System.Int32", "MinValue", Value::Int(i64::from(i32::MIN)));
        registry.register_static("System.Int64", "MaxValue", Value::Int(i64::MAX));
        registry.register_static("System.Int64", "MinValue", Value::Int(i64::MIN));
        registry.register_static("System.Double", "MaxValue", Value::Float(f64::MAX));
        registry.register_static("System.Double", "MinValue", Value::Float(f64::MIN));
        registry.register_static("System.Boolean", "TrueString", Value::Str("True".into()));
        registry.register_static("System.Boolean", "FalseString", Value::Str("False".into()));

        registry
    }

    /// Registry with no constructible types or static members at all.
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
            statics: HashMap::new(),
        }
    }

    /// Register an exception type constructible with the standard overloads:
    /// `()`, `(message)`, and `(message, inner)`.
    pub fn register_exception(&mut self, type_name: &str) {
        self.constructors
            .insert(type_name.to_string(), exception_factory(type_name));
    }

    /// Register an arbitrary factory for a type name.
    pub fn register_constructor(&mut self, type_name: &str, factory: ConstructorFn) {
        self.constructors.insert(type_name.to_string(), factory);
    }

    pub fn register_static(&mut self, type_name: &str, member: &str, value: Value) {
        self.statics
            .insert(format!("{type_name}.{member}"), value);
    }

    pub fn construct(
        &self,
        type_name: &str,
        args: &[Value],
    ) -> Result<Value, EvaluationError> {
        let factory =
            self.constructors
                .get(type_name)
                .ok_or_else(|| EvaluationError::UnknownType {
                    name: type_name.to_string(),
                })?;
        factory(args)
    }

    pub fn static_member(
        &self,
        type_name: &str,
        member: &str,
    ) -> Result<Value, EvaluationError> {
        self.statics
            .get(&format!("{type_name}.{member}"))
            .cloned()
            .ok_or_else(|| EvaluationError::UnknownMember {
                type_name: type_name.to_string(),
                member: member.to_string(),
            })
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("constructors", &self.constructors.keys().collect::<Vec<_>>())
            .field("statics", &self.statics)
            .finish()
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn exception_factory(type_name: &str) -> ConstructorFn {
    let type_name = type_name.to_string();
    Arc::new(move |args: &[Value]| match args {
        [] => Ok(Value::Exception(ExceptionValue::new(
            &type_name,
            default_message(&type_name),
        ))),
        [Value::Str(message)] => Ok(Value::Exception(ExceptionValue::new(&type_name, message))),
        [other] => Err(EvaluationError::ArgumentType {
            type_name: type_name.clone(),
            index: 0,
            expected: "string",
            actual: other.kind(),
        }),
        [Value::Str(message), Value::Exception(inner)] => Ok(Value::Exception(
            ExceptionValue::with_inner(&type_name, message, inner.clone()),
        )),
        [Value::Str(_), other] => Err(EvaluationError::ArgumentType {
            type_name: type_name.clone(),
            index: 1,
            expected: "exception",
            actual: other.kind(),
        }),
        [other, _] => Err(EvaluationError::ArgumentType {
            type_name: type_name.clone(),
            index: 0,
            expected: "string",
            actual: other.kind(),
        }),
        _ => Err(EvaluationError::NoMatchingConstructor {
            type_name: type_name.clone(),
            arity: args.len(),
        }),
    })
}

/// Message an exception carries when constructed without one, matching the
/// runtime the original targeted.
fn default_message(type_name: &str) -> String {
    format!("Exception of type '{type_name}' was thrown.")
}

use std::fmt;

/// Runtime value produced by evaluating an expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Exception(ExceptionValue),
}

impl Value {
    /// Short kind name used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Exception(_) => "exception",
        }
    }
}

/// A constructed exception instance: type name, message, and an optional
/// inner exception. This is the object graph a throw fault hands back to
/// the interception mechanism.
#[derive(Debug, Clone, PartialEq)]
pub struct ExceptionValue {
    type_name: String,
    message: String,
    inner: Option<Box<ExceptionValue>>,
}

impl ExceptionValue {
    pub fn new(type_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            inner: None,
        }
    }

    pub fn with_inner(
        type_name: impl Into<String>,
        message: impl Into<String>,
        inner: ExceptionValue,
    ) -> Self {
        Self {
            type_name: type_name.into(),
            message: message.into(),
            inner: Some(Box::new(inner)),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn inner(&self) -> Option<&ExceptionValue> {
        self.inner.as_deref()
    }
}

impl fmt::Display for ExceptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.type_name, self.message)?;
        if let Some(inner) = &self.inner {
            write!(f, " ---> {inner}")?;
        }
        Ok(())
    }
}

//! Fault-injection rule engine.
//!
//! Given an intercepted call site (target signature, caller, invocation
//! count), the engine decides whether to alter control flow and computes
//! the substituted exception or return value. The interception mechanism
//! itself is an external collaborator: it calls [`FaultSession::intercept`]
//! on every intercepted method entry and applies the returned [`Outcome`]
//! (throw the exception if present, otherwise substitute the return value,
//! otherwise let the original call proceed).

pub mod condition;
pub mod context;
pub mod fault;
pub mod filter;
pub mod repository;
pub mod rule;
pub mod session;
pub mod settings;

pub use condition::{Condition, ConstructionError};
pub use context::RuntimeContext;
pub use fault::{DispatchError, Fault, FaultError, Outcome};
pub use filter::{FilterError, MethodFilter};
pub use repository::RuleRepository;
pub use rule::{
    ConditionSpec, FaultRule, FaultSpec, LoadError, RuleError, RuleSet, RuleSetSpec, RuleSpec,
};
pub use session::FaultSession;
pub use settings::{HarnessSettings, SettingsProblem};

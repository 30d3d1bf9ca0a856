use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use faultline_signature::MethodSignature;

use crate::context::RuntimeContext;

#[derive(Debug, thiserror::Error)]
pub enum ConstructionError {
    #[error("Call count for {condition} must be positive")]
    NonPositiveCount { condition: &'static str },

    #[error("Throw fault requires an exception value")]
    MissingException,
}

/// Decides, per intercepted call, whether a rule's fault fires.
///
/// Counting variants own their mutable state as atomics, so `trigger` takes
/// `&self` and stays exact when the interception mechanism delivers
/// concurrent calls for the same target: no two calls can both be credited
/// with the Nth match, and none is skipped.
#[derive(Debug)]
pub struct Condition {
    kind: ConditionKind,
}

#[derive(Debug)]
enum ConditionKind {
    Always,
    Never,
    OnlyOnce {
        fired: AtomicBool,
    },
    OnNthCall {
        n: u64,
    },
    EveryNthCall {
        n: u64,
    },
    OnNthCallBy {
        n: u64,
        caller: MethodSignature,
        matched: AtomicU64,
    },
    CalledBy {
        caller: MethodSignature,
    },
    StackContains {
        method: MethodSignature,
    },
}

impl Condition {
    /// Triggers on every call.
    pub fn always() -> Self {
        Self {
            kind: ConditionKind::Always,
        }
    }

    /// Never triggers; used to turn a rule off without removing it.
    pub fn never() -> Self {
        Self {
            kind: ConditionKind::Never,
        }
    }

    /// Triggers on the first evaluation only.
    pub fn only_once() -> Self {
        Self {
            kind: ConditionKind::OnlyOnce {
                fired: AtomicBool::new(false),
            },
        }
    }

    /// Triggers exactly when the target's shared call count equals `n`.
    pub fn on_nth_call(n: u64) -> Result<Self, ConstructionError> {
        if n == 0 {
            return Err(ConstructionError::NonPositiveCount {
                condition: "on_nth_call",
            });
        }
        Ok(Self {
            kind: ConditionKind::OnNthCall { n },
        })
    }

    /// Triggers on every multiple of `n` of the shared call count.
    pub fn every_nth_call(n: u64) -> Result<Self, ConstructionError> {
        if n == 0 {
            return Err(ConstructionError::NonPositiveCount {
                condition: "every_nth_call",
            });
        }
        Ok(Self {
            kind: ConditionKind::EveryNthCall { n },
        })
    }

    /// Triggers on the `n`-th call made by `caller`. The match counter is
    /// private to this condition and advances only when the caller matches,
    /// unlike the shared call count read by [`Condition::on_nth_call`].
    pub fn on_nth_call_by(n: u64, caller: MethodSignature) -> Result<Self, ConstructionError> {
        if n == 0 {
            return Err(ConstructionError::NonPositiveCount {
                condition: "on_nth_call_by",
            });
        }
        Ok(Self {
            kind: ConditionKind::OnNthCallBy {
                n,
                caller,
                matched: AtomicU64::new(0),
            },
        })
    }

    /// Triggers whenever the immediate caller matches.
    pub fn called_by(caller: MethodSignature) -> Self {
        Self {
            kind: ConditionKind::CalledBy { caller },
        }
    }

    /// Triggers when any captured stack frame matches.
    pub fn stack_contains(method: MethodSignature) -> Self {
        Self {
            kind: ConditionKind::StackContains { method },
        }
    }

    /// Decide whether the fault should fire for this call.
    pub fn trigger(&self, context: &RuntimeContext<'_>) -> bool {
        match &self.kind {
            ConditionKind::Always => true,
            ConditionKind::Never => false,
            ConditionKind::OnlyOnce { fired } => fired
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok(),
            ConditionKind::OnNthCall { n } => context.called_times() == *n,
            ConditionKind::EveryNthCall { n } => {
                context.called_times() > 0 && context.called_times() % *n == 0
            }
            ConditionKind::OnNthCallBy { n, caller, matched } => {
                context.caller() == Some(caller)
                    && matched.fetch_add(1, Ordering::SeqCst) + 1 == *n
            }
            ConditionKind::CalledBy { caller } => context.caller() == Some(caller),
            ConditionKind::StackContains { method } => {
                context.call_stack().iter().any(|frame| frame == method)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use faultline_signature::parse_signature;

    #[test]
    fn test_zero_count_rejected() {
        assert!(Condition::on_nth_call(0).is_err());
        assert!(Condition::every_nth_call(0).is_err());
        let caller = parse_signature("Foo.Caller()").unwrap();
        assert!(Condition::on_nth_call_by(0, caller).is_err());
    }

    #[test]
    fn test_always_and_never() {
        let target = parse_signature("Foo.Bar(int)").unwrap();
        let ctx = RuntimeContext::new(&target, None, 1);
        assert!(Condition::always().trigger(&ctx));
        assert!(!Condition::never().trigger(&ctx));
    }

    #[test]
    fn test_only_once_fires_a_single_time() {
        let target = parse_signature("Foo.Bar(int)").unwrap();
        let condition = Condition::only_once();
        let fired: Vec<bool> = (1..=10)
            .map(|i| condition.trigger(&RuntimeContext::new(&target, None, i)))
            .collect();
        assert_eq!(fired.iter().filter(|&&f| f).count(), 1);
        assert!(fired[0]);
    }
}

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use faultline_expr::TypeRegistry;
use faultline_signature::MethodSignature;

use crate::context::RuntimeContext;
use crate::fault::{DispatchError, Outcome};
use crate::repository::RuleRepository;
use crate::rule::RuleSet;

/// Entry point the interception mechanism calls on every intercepted
/// method entry.
///
/// Lifecycle: an unloaded session answers every call with the empty
/// outcome; [`RuleSet`] is the loaded (validated) state; [`activate`]
/// produces the active session. Rules never change after activation — only
/// the conditions' internal counters and the per-target call counts do,
/// and both are atomics, so the session is shared across threads without a
/// lock and unrelated target signatures never contend.
///
/// [`activate`]: FaultSession::activate
#[derive(Debug)]
pub struct FaultSession {
    repository: RuleRepository,
    call_counts: HashMap<MethodSignature, AtomicU64>,
    registry: Arc<TypeRegistry>,
}

impl FaultSession {
    /// Activate a validated rule set. `registry` should be the same
    /// registry the rules were loaded against, so retrieval resolves
    /// exactly what load-time validation resolved.
    pub fn activate(rule_set: RuleSet, registry: Arc<TypeRegistry>) -> Self {
        let repository = RuleRepository::build(rule_set.into_rules());
        let call_counts = repository
            .targets()
            .map(|target| (target.clone(), AtomicU64::new(0)))
            .collect();
        tracing::info!(
            rules = repository.rule_count(),
            targets = repository.target_count(),
            "fault session activated"
        );
        Self {
            repository,
            call_counts,
            registry,
        }
    }

    /// A session with no rules: every interception is a no-op. This is the
    /// unloaded state, useful as a disabled default in harnesses.
    pub fn unloaded() -> Self {
        Self {
            repository: RuleRepository::default(),
            call_counts: HashMap::new(),
            registry: Arc::new(TypeRegistry::empty()),
        }
    }

    pub fn repository(&self) -> &RuleRepository {
        &self.repository
    }

    /// Record one call to `target` and decide its outcome.
    ///
    /// The session owns the per-signature call counter: the increment is a
    /// single fetch-add, so concurrent calls each observe a distinct count
    /// and "trigger on the Nth call" stays exact. Targets with no rules
    /// return the empty outcome without counting.
    pub fn intercept(
        &self,
        target: &MethodSignature,
        caller: Option<&MethodSignature>,
    ) -> Result<Outcome, DispatchError> {
        let Some(counter) = self.call_counts.get(target) else {
            return Ok(Outcome::none());
        };
        let called_times = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let context = RuntimeContext::new(target, caller, called_times);
        self.dispatch(&context)
    }

    /// [`intercept`] for hooks that capture a call stack; the caller is
    /// derived from frame 1 and stack-aware conditions see every frame.
    ///
    /// [`intercept`]: FaultSession::intercept
    pub fn intercept_with_stack(
        &self,
        target: &MethodSignature,
        call_stack: &[MethodSignature],
    ) -> Result<Outcome, DispatchError> {
        let Some(counter) = self.call_counts.get(target) else {
            return Ok(Outcome::none());
        };
        let called_times = counter.fetch_add(1, Ordering::SeqCst) + 1;
        let context = RuntimeContext::from_stack(target, call_stack, called_times);
        self.dispatch(&context)
    }

    /// Decide the outcome for an externally-built context, for harnesses
    /// that track call counts themselves. Rules are evaluated in load
    /// order; the first triggered condition's fault decides, and later
    /// conditions are not evaluated at all. No trigger is not an error —
    /// the original call proceeds.
    pub fn dispatch(&self, context: &RuntimeContext<'_>) -> Result<Outcome, DispatchError> {
        for rule in self.repository.lookup(context.target()) {
            if rule.condition().trigger(context) {
                tracing::trace!(
                    method = %context.target(),
                    called_times = context.called_times(),
                    "fault rule triggered"
                );
                return rule.fault().retrieve(context, &self.registry);
            }
        }
        Ok(Outcome::none())
    }
}

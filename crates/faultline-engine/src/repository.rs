use std::collections::HashMap;

use faultline_signature::MethodSignature;

use crate::rule::FaultRule;

/// Rules bucketed by canonical target signature.
///
/// Lookup is a structural-equality hash query — no wildcard or partial
/// matching — so the dispatch path stays O(1) amortized regardless of rule
/// count. Buckets preserve insertion order; the first rule whose condition
/// triggers wins.
#[derive(Debug, Default)]
pub struct RuleRepository {
    buckets: HashMap<MethodSignature, Vec<FaultRule>>,
    rule_count: usize,
}

impl RuleRepository {
    pub(crate) fn build(rules: Vec<FaultRule>) -> Self {
        let rule_count = rules.len();
        let mut buckets: HashMap<MethodSignature, Vec<FaultRule>> = HashMap::new();
        for rule in rules {
            buckets.entry(rule.target().clone()).or_default().push(rule);
        }
        Self {
            buckets,
            rule_count,
        }
    }

    /// All rules whose target equals `target`, in load order. Empty when no
    /// rule matches.
    pub fn lookup(&self, target: &MethodSignature) -> &[FaultRule] {
        self.buckets
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Distinct target signatures with at least one rule.
    pub fn targets(&self) -> impl Iterator<Item = &MethodSignature> {
        self.buckets.keys()
    }

    pub fn rule_count(&self) -> usize {
        self.rule_count
    }

    pub fn target_count(&self) -> usize {
        self.buckets.len()
    }
}

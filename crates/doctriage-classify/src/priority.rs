//! Deterministic priority escalation.

use doctriage_core::Priority;
use std::sync::Arc;
use tracing::debug;

use crate::rules::KeywordRuleSet;

/// Re-derives priority from trigger words, independently of the category.
#[derive(Debug, Clone)]
pub struct PriorityResolver {
    rules: Arc<KeywordRuleSet>,
}

impl PriorityResolver {
    pub fn new(rules: Arc<KeywordRuleSet>) -> Self {
        Self { rules }
    }

    /// First tier with any trigger in `text` wins; otherwise `primary`,
    /// or `Low` when there is no primary suggestion.
    pub fn resolve(&self, text: &str, primary: Option<Priority>) -> Priority {
        let text = text.to_lowercase();

        for tier in self.rules.priority_tiers() {
            if let Some(trigger) = tier.first_match(&text) {
                debug!(priority = %tier.priority, trigger, "Priority trigger matched");
                return tier.priority;
            }
        }

        primary.unwrap_or_default()
    }
}

impl Default for PriorityResolver {
    fn default() -> Self {
        Self::new(KeywordRuleSet::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_trigger_beats_primary() {
        let resolver = PriorityResolver::default();
        assert_eq!(
            resolver.resolve("This is URGENT", Some(Priority::Low)),
            Priority::High
        );
    }

    #[test]
    fn test_high_checked_before_medium() {
        let resolver = PriorityResolver::default();
        let text = "Please note the updated safety protocol for emergency evacuation.";
        assert_eq!(resolver.resolve(text, Some(Priority::Low)), Priority::High);
    }

    #[test]
    fn test_medium_trigger() {
        let resolver = PriorityResolver::default();
        assert_eq!(
            resolver.resolve("Friendly reminder about the canteen menu", Some(Priority::Low)),
            Priority::Medium
        );
    }

    #[test]
    fn test_medium_trigger_downgrades_primary_high() {
        let resolver = PriorityResolver::default();
        assert_eq!(
            resolver.resolve("Important: canteen menu", Some(Priority::High)),
            Priority::Medium
        );
    }

    #[test]
    fn test_multi_word_trigger() {
        let resolver = PriorityResolver::default();
        assert_eq!(
            resolver.resolve("Action required before Friday", None),
            Priority::High
        );
    }

    #[test]
    fn test_no_trigger_uses_primary() {
        let resolver = PriorityResolver::default();
        assert_eq!(
            resolver.resolve("Quarterly report on system performance.", Some(Priority::Medium)),
            Priority::Medium
        );
    }

    #[test]
    fn test_no_trigger_and_no_primary_is_low() {
        let resolver = PriorityResolver::default();
        assert_eq!(resolver.resolve("", None), Priority::Low);
        assert_eq!(resolver.resolve("canteen menu", None), Priority::Low);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = PriorityResolver::default();
        let text = "Deadline for submissions";
        assert_eq!(
            resolver.resolve(text, Some(Priority::Low)),
            resolver.resolve(text, Some(Priority::Low))
        );
    }
}

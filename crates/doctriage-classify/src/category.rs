//! Keyword override pass for the document category.

use doctriage_core::Category;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::rules::KeywordRuleSet;

/// Minimum number of distinct keyword hits before the keyword table
/// overrides the primary classifier.
pub const MIN_OVERRIDE_MATCHES: usize = 2;

/// Picks the final category from keyword evidence and the primary
/// classifier's suggestion.
#[derive(Debug, Clone)]
pub struct CategoryResolver {
    rules: Arc<KeywordRuleSet>,
}

impl CategoryResolver {
    pub fn new(rules: Arc<KeywordRuleSet>) -> Self {
        Self { rules }
    }

    /// Resolves the category for `text` and `file_name`.
    ///
    /// The best-scoring rule wins when it has at least
    /// [`MIN_OVERRIDE_MATCHES`] hits; otherwise `primary` is kept.
    pub fn resolve(&self, text: &str, file_name: &str, primary: Category) -> Category {
        let text = text.to_lowercase();
        let file_name = file_name.to_lowercase();

        let mut best: Option<(Category, usize)> = None;
        for rule in self.rules.category_rules() {
            let matches = rule.count_matches(&text, &file_name);
            trace!(category = %rule.category, matches, "Category keyword matches");
            // Strictly greater keeps the earliest rule on ties.
            if matches > best.map_or(0, |(_, m)| m) {
                best = Some((rule.category, matches));
            }
        }

        match best {
            Some((category, matches)) if matches >= MIN_OVERRIDE_MATCHES => {
                if category != primary {
                    debug!(
                        primary = %primary,
                        resolved = %category,
                        matches,
                        "Keyword evidence overrides primary category"
                    );
                }
                category
            }
            _ => primary,
        }
    }
}

impl Default for CategoryResolver {
    fn default() -> Self {
        Self::new(KeywordRuleSet::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::CategoryRule;

    #[test]
    fn test_two_hits_override_primary() {
        let resolver = CategoryResolver::default();
        let category = resolver.resolve(
            "Please process the invoice against this year's budget.",
            "",
            Category::Legal,
        );
        assert_eq!(category, Category::Finance);
    }

    #[test]
    fn test_single_hit_keeps_primary() {
        let resolver = CategoryResolver::default();
        let category =
            resolver.resolve("Quarterly report on system performance.", "", Category::Reports);
        assert_eq!(category, Category::Reports);
    }

    #[test]
    fn test_single_hit_with_fallback_primary_stays_other() {
        let resolver = CategoryResolver::default();
        let category =
            resolver.resolve("Quarterly report on system performance.", "", Category::Other);
        assert_eq!(category, Category::Other);
    }

    #[test]
    fn test_highest_count_wins() {
        let resolver = CategoryResolver::default();
        let category = resolver.resolve(
            "URGENT: please review the attached maintenance schedule and equipment repair invoice.",
            "",
            Category::Finance,
        );
        assert_eq!(category, Category::Engineering);
    }

    #[test]
    fn test_file_name_contributes() {
        let resolver = CategoryResolver::default();
        let category = resolver.resolve("see attached", "vendor_quotation.pdf", Category::Other);
        assert_eq!(category, Category::Procurement);
    }

    #[test]
    fn test_case_insensitive() {
        let resolver = CategoryResolver::default();
        let category = resolver.resolve("SAFETY HAZARD REPORTED", "", Category::Other);
        assert_eq!(category, Category::Safety);
    }

    #[test]
    fn test_tie_goes_to_earliest_rule() {
        let rules = KeywordRuleSet::empty()
            .with_category_rule(CategoryRule::new(Category::Legal, ["alpha", "beta"]))
            .with_category_rule(CategoryRule::new(Category::Finance, ["gamma", "delta"]));
        let resolver = CategoryResolver::new(Arc::new(rules));

        let category = resolver.resolve("alpha beta gamma delta", "", Category::Other);
        assert_eq!(category, Category::Legal);
    }

    #[test]
    fn test_empty_text_keeps_primary() {
        let resolver = CategoryResolver::default();
        assert_eq!(resolver.resolve("", "", Category::Other), Category::Other);
        assert_eq!(resolver.resolve("", "", Category::Internal), Category::Internal);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let resolver = CategoryResolver::default();
        let text = "Staff training and leave policy";
        let first = resolver.resolve(text, "memo.docx", Category::Other);
        let second = resolver.resolve(text, "memo.docx", Category::Other);
        assert_eq!(first, second);
    }

    #[test]
    fn test_substring_matching_is_preserved() {
        // "hr" is found inside "chrome", "leave" inside "cleaved".
        let resolver = CategoryResolver::default();
        let category = resolver.resolve("chrome cleaved", "", Category::Other);
        assert_eq!(category, Category::Hr);
    }
}

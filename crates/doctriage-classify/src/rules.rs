//! Static keyword tables for category and priority resolution.
//!
//! Keywords are stored lower-cased and matched as plain substrings of
//! lower-cased input. There is no word-boundary check, so `"hr"` also
//! hits inside longer words.

use doctriage_core::{Category, Priority};
use lazy_static::lazy_static;
use std::sync::Arc;

/// Keywords that vote for a single category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    pub category: Category,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(category: Category, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            category,
            keywords: normalize(keywords),
        }
    }

    /// Number of distinct keywords present in either haystack.
    ///
    /// Both haystacks must already be lower-cased.
    pub fn count_matches(&self, text: &str, file_name: &str) -> usize {
        self.keywords
            .iter()
            .filter(|kw| text.contains(kw.as_str()) || file_name.contains(kw.as_str()))
            .count()
    }
}

/// Trigger words that force a priority tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityTier {
    pub priority: Priority,
    pub keywords: Vec<String>,
}

impl PriorityTier {
    pub fn new<I, S>(priority: Priority, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            priority,
            keywords: normalize(keywords),
        }
    }

    /// Returns the first trigger found in `text` (already lower-cased).
    pub fn first_match(&self, text: &str) -> Option<&str> {
        self.keywords
            .iter()
            .map(String::as_str)
            .find(|kw| text.contains(kw))
    }
}

fn normalize<I, S>(keywords: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for kw in keywords {
        let kw = kw.as_ref().trim().to_lowercase();
        if !kw.is_empty() && !out.contains(&kw) {
            out.push(kw);
        }
    }
    out
}

/// Immutable keyword table shared by both resolvers.
///
/// Category rules are evaluated in table order; on equal match counts the
/// earlier rule wins. Priority tiers are evaluated in table order and the
/// first tier with any hit wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRuleSet {
    categories: Vec<CategoryRule>,
    tiers: Vec<PriorityTier>,
}

lazy_static! {
    static ref STANDARD_RULES: Arc<KeywordRuleSet> = Arc::new(KeywordRuleSet::builtin());
}

impl KeywordRuleSet {
    /// An empty table. Every resolution falls through to the primary classifier.
    pub fn empty() -> Self {
        Self {
            categories: Vec::new(),
            tiers: Vec::new(),
        }
    }

    /// Shared instance of the built-in tables, built once per process.
    pub fn standard() -> Arc<KeywordRuleSet> {
        Arc::clone(&STANDARD_RULES)
    }

    fn builtin() -> Self {
        Self::empty()
            .with_category_rule(CategoryRule::new(
                Category::Engineering,
                [
                    "maintenance",
                    "repair",
                    "technical",
                    "equipment",
                    "infrastructure",
                    "construction",
                    "mechanical",
                    "electrical",
                    "system",
                ],
            ))
            .with_category_rule(CategoryRule::new(
                Category::Finance,
                [
                    "budget",
                    "payment",
                    "invoice",
                    "expense",
                    "cost",
                    "revenue",
                    "financial",
                    "accounting",
                ],
            ))
            .with_category_rule(CategoryRule::new(
                Category::Procurement,
                [
                    "purchase",
                    "vendor",
                    "supplier",
                    "tender",
                    "quotation",
                    "contract award",
                    "rfp",
                    "procurement",
                ],
            ))
            .with_category_rule(CategoryRule::new(
                Category::Hr,
                [
                    "employee",
                    "staff",
                    "personnel",
                    "recruitment",
                    "training",
                    "leave",
                    "human resource",
                    "hr",
                ],
            ))
            .with_category_rule(CategoryRule::new(
                Category::Legal,
                [
                    "legal",
                    "contract",
                    "agreement",
                    "compliance",
                    "regulation",
                    "law",
                    "litigation",
                    "audit",
                ],
            ))
            .with_category_rule(CategoryRule::new(
                Category::Safety,
                [
                    "safety",
                    "security",
                    "emergency",
                    "incident",
                    "accident",
                    "hazard",
                    "risk",
                    "protocol",
                ],
            ))
            .with_category_rule(CategoryRule::new(
                Category::Regulatory,
                [
                    "regulatory",
                    "government",
                    "ministry",
                    "policy",
                    "circular",
                    "notification",
                    "directive",
                    "guideline",
                ],
            ))
            .with_priority_tier(PriorityTier::new(
                Priority::High,
                [
                    "urgent",
                    "immediate",
                    "emergency",
                    "critical",
                    "deadline",
                    "asap",
                    "action required",
                    "time sensitive",
                    "priority",
                    "escalate",
                ],
            ))
            .with_priority_tier(PriorityTier::new(
                Priority::Medium,
                [
                    "important",
                    "attention",
                    "review required",
                    "follow up",
                    "notice",
                    "update",
                    "reminder",
                    "please note",
                ],
            ))
    }

    /// Appends a category rule. `Other` is the fallback and never gets a rule.
    pub fn with_category_rule(mut self, rule: CategoryRule) -> Self {
        if rule.category != Category::Other {
            self.categories.push(rule);
        }
        self
    }

    /// Appends a priority tier; earlier tiers take precedence.
    pub fn with_priority_tier(mut self, tier: PriorityTier) -> Self {
        self.tiers.push(tier);
        self
    }

    pub fn category_rules(&self) -> &[CategoryRule] {
        &self.categories
    }

    pub fn priority_tiers(&self) -> &[PriorityTier] {
        &self.tiers
    }

    /// Per-category hit counts in table order, for the given raw inputs.
    pub fn category_matches(&self, text: &str, file_name: &str) -> Vec<(Category, usize)> {
        let text = text.to_lowercase();
        let file_name = file_name.to_lowercase();
        self.categories
            .iter()
            .map(|rule| (rule.category, rule.count_matches(&text, &file_name)))
            .collect()
    }
}

impl Default for KeywordRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Parses a path segment; anything that is not a UUID yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DocumentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Department category assigned to a document.
///
/// Declaration order is significant: keyword ties resolve to the
/// earliest variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Engineering,
    Finance,
    Procurement,
    #[serde(rename = "HR")]
    Hr,
    Legal,
    Safety,
    Regulatory,
    Internal,
    Reports,
    #[default]
    Other,
}

impl Category {
    pub const ALL: [Category; 10] = [
        Category::Engineering,
        Category::Finance,
        Category::Procurement,
        Category::Hr,
        Category::Legal,
        Category::Safety,
        Category::Regulatory,
        Category::Internal,
        Category::Reports,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Engineering => "Engineering",
            Self::Finance => "Finance",
            Self::Procurement => "Procurement",
            Self::Hr => "HR",
            Self::Legal => "Legal",
            Self::Safety => "Safety",
            Self::Regulatory => "Regulatory",
            Self::Internal => "Internal",
            Self::Reports => "Reports",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive parse that never fails; unknown labels become `Other`.
    pub fn parse_lenient(s: &str) -> Self {
        let needle = s.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(needle))
            .unwrap_or(Self::Other)
    }

    /// Department that owns documents of this category.
    pub fn department(&self) -> Option<&'static str> {
        match self {
            Self::Engineering => Some("Technical & Maintenance Department"),
            Self::Finance => Some("Finance Department"),
            Self::Procurement => Some("Procurement & Stores Department"),
            Self::Hr => Some("Human Resources & Operations"),
            Self::Legal => Some("Legal & Compliance Department"),
            Self::Safety => Some("Safety & Operations Department"),
            Self::Regulatory => Some("Regulatory Affairs Department"),
            Self::Internal => Some("Administration Department"),
            Self::Reports => Some("Management & Analytics Team"),
            Self::Other => None,
        }
    }

    pub fn routing_message(&self, filename: &str) -> String {
        match self.department() {
            Some(department) => format!(
                "New {} document \"{}\" uploaded - assigned to {}.",
                self.as_str(),
                filename,
                department
            ),
            None => format!(
                "New document \"{}\" uploaded - requires manual categorization.",
                filename
            ),
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency tier. Ordered `Low < Medium < High`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub enum Priority {
    #[default]
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Self::Low, Self::Medium, Self::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }

    /// Case-insensitive parse that never fails; unknown labels become `Low`.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Self::High,
            "medium" => Self::Medium,
            _ => Self::Low,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fully processed document as handed to storage and notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub filename: String,
    pub category: Category,
    pub priority: Priority,
    /// Classifier summary, never keyword-overridden.
    pub analysis: String,
    pub extracted_text: String,
    pub uploaded_at: DateTime<Utc>,
    pub size: u64,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Where the original upload lives in the blob store.
    pub blob_path: PathBuf,
    /// True when the primary classifier was unavailable and the fallback was used.
    #[serde(default)]
    pub degraded: bool,
}

impl DocumentRecord {
    pub fn view(&self) -> DocumentView {
        DocumentView {
            id: self.id,
            filename: self.filename.clone(),
            category: self.category,
            priority: self.priority,
            analysis: self.analysis.clone(),
            uploaded_at: self.uploaded_at,
            extracted_text: self.extracted_text.clone(),
            size: self.size,
            degraded: self.degraded,
        }
    }
}

/// Client-facing projection of a record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentView {
    pub id: DocumentId,
    pub filename: String,
    pub category: Category,
    pub priority: Priority,
    pub analysis: String,
    pub uploaded_at: DateTime<Utc>,
    pub extracted_text: String,
    pub size: u64,
    pub degraded: bool,
}

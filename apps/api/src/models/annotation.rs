use serde::{Deserialize, Serialize};

/// Severity tier of a contract risk. Only presentation orders these; the
/// locator and the highlight plan treat every tier the same.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
    #[default]
    Info,
}

impl RiskLevel {
    /// Lenient parse used at the LLM boundary. Unknown tiers are `None`
    /// so the caller can decide the default.
    pub fn parse_lenient(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "high" => Some(RiskLevel::High),
            "medium" => Some(RiskLevel::Medium),
            "info" | "informational" => Some(RiskLevel::Info),
            _ => None,
        }
    }
}

/// A single risk record pointing at an excerpt of the source document.
///
/// The excerpt is untrusted: it came from a model and may not appear
/// verbatim. Spans are never stored here. They are recomputed against
/// whichever document version is current (see `reconcile::locator`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub id: String,
    #[serde(default)]
    pub level: RiskLevel,
    #[serde(default)]
    pub title: String,
    pub excerpt: String,
    /// Text to splice over the excerpt. Empty for informational records.
    #[serde(default)]
    pub replacement: String,
    #[serde(default)]
    pub analysis: String,
}

impl Annotation {
    pub fn new(id: impl Into<String>, level: RiskLevel, excerpt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            level,
            title: String::new(),
            excerpt: excerpt.into(),
            replacement: String::new(),
            analysis: String::new(),
        }
    }

    pub fn with_replacement(mut self, replacement: impl Into<String>) -> Self {
        self.replacement = replacement.into();
        self
    }

    /// Informational records have nothing to apply.
    pub fn is_informational(&self) -> bool {
        self.replacement.is_empty()
    }
}

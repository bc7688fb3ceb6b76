//! Suggestion metadata shown under the search box.

use serde::{Deserialize, Serialize};

/// Best single spelling correction for an input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub source: String,
}

impl Correction {
    /// Build a correction, or `None` when the corrected form equals the input.
    pub fn new(
        original: impl Into<String>,
        corrected: impl Into<String>,
        source: impl Into<String>,
    ) -> Option<Self> {
        let original = original.into();
        let corrected = corrected.into();
        if corrected.trim().is_empty() || corrected == original {
            return None;
        }
        Some(Self {
            original,
            corrected,
            source: source.into(),
        })
    }
}

/// A frequently searched keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingKeyword {
    pub keyword: String,
    #[serde(default)]
    pub count: u64,
}

/// Everything the suggestion dropdown shows for one input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestionSet {
    pub query: String,
    pub autocomplete: Vec<String>,
    pub correction: Option<Correction>,
    pub trending: Vec<TrendingKeyword>,
    /// Free-text hint from the search backend ("did you mean ...")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl SuggestionSet {
    pub fn is_empty(&self) -> bool {
        self.autocomplete.is_empty() && self.correction.is_none() && self.trending.is_empty()
    }
}

/// Any selectable entry of a suggestion set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    Autocomplete(String),
    Correction(Correction),
    Trending(TrendingKeyword),
}

impl Candidate {
    /// The query text this candidate searches for.
    pub fn query(&self) -> &str {
        match self {
            Candidate::Autocomplete(s) => s,
            Candidate::Correction(c) => &c.corrected,
            Candidate::Trending(t) => &t.keyword,
        }
    }
}

//! Request and response shapes exchanged with the analysis backend.

use serde::{Deserialize, Deserializer, Serialize};

/// Treats an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Flagged words paired by index with their suggested replacements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RedlinedText {
    #[serde(default, deserialize_with = "null_as_default")]
    pub biased_words: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub neutral_alternatives: Vec<String>,
}

/// Analysis of a single article as returned by `/api/analyze-url` and `/api/analyze`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub credibility: Option<String>,
    #[serde(default)]
    pub bias_score: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub rewritten: Option<String>,
    #[serde(default)]
    pub original_text: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub redlined_text: Option<RedlinedText>,
}

/// An analyzed article taking part in a comparison.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparedArticle {
    #[serde(flatten)]
    pub analysis: AnalysisResult,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub similarity_score: Option<f64>,
}

/// Response of `/api/compare-news`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(default)]
    pub main_topic: Option<String>,
    #[serde(default)]
    pub comparison_date: Option<String>,
    #[serde(default)]
    pub original_article: Option<ComparedArticle>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub comparison_articles: Vec<ComparedArticle>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Response of `/api/source-check`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCheck {
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub credibility: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UrlRequest<'a> {
    pub url: &'a str,
}

#[derive(Debug, Serialize)]
pub struct TextRequest<'a> {
    pub text: &'a str,
}

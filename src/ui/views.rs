//! View structures built from backend responses.
//!
//! Every builder here is a pure function of its input: a render pass always
//! reconstructs the whole view, nothing is patched in place.

use chrono::NaiveDate;
use url::form_urlencoded;

use crate::api::{AnalysisResult, ComparedArticle, ComparisonResult, RedlinedText};

pub const TEXT_ANALYSIS_TITLE: &str = "Custom Text Analysis";
pub const TEXT_ANALYSIS_SOURCE: &str = "User-provided text";
pub const TEXT_ANALYSIS_CREDIBILITY: &str = "N/A";

const NO_REDLINE: &str = "No biased words detected or analysis failed.";
const NO_CARD_REDLINE: &str = "No significant biased language detected";

/// Bias severity bucket. Scores below 40 are low, below 70 medium, the rest high.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BiasTier {
    Low,
    Medium,
    High,
}

impl BiasTier {
    pub const MEDIUM_FLOOR: f64 = 40.0;
    pub const HIGH_FLOOR: f64 = 70.0;

    pub fn from_score(score: f64) -> Self {
        if score < Self::MEDIUM_FLOOR {
            BiasTier::Low
        } else if score < Self::HIGH_FLOOR {
            BiasTier::Medium
        } else {
            BiasTier::High
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BiasTier::Low => "low",
            BiasTier::Medium => "medium",
            BiasTier::High => "high",
        }
    }

    /// Class applied to the textual score.
    pub fn text_class(self) -> &'static str {
        match self {
            BiasTier::Low => "bias-low",
            BiasTier::Medium => "bias-medium",
            BiasTier::High => "bias-high",
        }
    }

    /// Class applied to the meter fill.
    pub fn meter_class(self) -> &'static str {
        match self {
            BiasTier::Low => "meter-low",
            BiasTier::Medium => "meter-medium",
            BiasTier::High => "meter-high",
        }
    }
}

/// Formats a score without a trailing `.0` for whole numbers.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Only `http` and `https` targets are rendered as links.
pub fn safe_link(url: Option<&str>) -> Option<String> {
    let parsed = url::Url::parse(url?.trim()).ok()?;
    match parsed.scheme() {
        "http" | "https" => Some(parsed.to_string()),
        _ => None,
    }
}

fn or_default(value: Option<&String>, default: &str) -> String {
    value
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

/// Score text, tier and meter geometry for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreView {
    pub score: Option<f64>,
    pub tier: Option<BiasTier>,
}

impl ScoreView {
    pub fn new(score: Option<f64>) -> Self {
        Self {
            score,
            tier: score.map(BiasTier::from_score),
        }
    }

    /// `35/100`, or `N/A` when no score was returned.
    pub fn text(&self) -> String {
        match self.score {
            Some(score) => format!("{}/100", format_number(score)),
            None => "N/A".to_string(),
        }
    }

    pub fn text_class(&self) -> &'static str {
        self.tier.map(BiasTier::text_class).unwrap_or("")
    }

    pub fn meter_class(&self) -> &'static str {
        self.tier.map(BiasTier::meter_class).unwrap_or("")
    }

    /// Meter width, absent when the meter stays unfilled.
    pub fn meter_width(&self) -> Option<String> {
        self.score.map(|score| format!("{}%", format_number(score)))
    }

    /// Article cards always draw the meter, empty when unscored.
    pub fn card_meter_width(&self) -> String {
        self.meter_width().unwrap_or_else(|| "0%".to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RedlineEntry {
    pub word: String,
    pub alternative: String,
}

/// Flagged words with their replacements. An empty list means nothing was flagged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RedlineView {
    pub entries: Vec<RedlineEntry>,
}

impl RedlineView {
    pub fn new(redline: Option<&RedlinedText>, placeholder: &str) -> Self {
        let Some(redline) = redline else {
            return Self::default();
        };
        let entries = redline
            .biased_words
            .iter()
            .enumerate()
            .map(|(i, word)| RedlineEntry {
                word: word.clone(),
                alternative: or_default(redline.neutral_alternatives.get(i), placeholder),
            })
            .collect();
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Credibility label and its CSS class.
#[derive(Debug, Clone, PartialEq)]
pub struct CredibilityView {
    pub label: String,
    pub class: String,
}

impl CredibilityView {
    pub fn new(credibility: Option<&String>) -> Self {
        let raw = credibility.map(String::as_str).unwrap_or("");
        Self {
            label: or_default(credibility, "Unknown"),
            class: format!("cred-{}", raw.to_lowercase()),
        }
    }
}

/// The single-article results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisView {
    pub title: Option<String>,
    pub source: String,
    pub credibility: CredibilityView,
    pub score: ScoreView,
    pub date: String,
    pub rewritten: String,
    pub redline: RedlineView,
    pub redline_empty_message: &'static str,
    pub original_text: String,
}

impl AnalysisView {
    pub fn new(result: &AnalysisResult) -> Self {
        Self {
            title: result.title.clone().filter(|t| !t.is_empty()),
            source: or_default(result.source.as_ref(), "Unknown"),
            credibility: CredibilityView::new(result.credibility.as_ref()),
            score: ScoreView::new(result.bias_score),
            date: or_default(result.date.as_ref(), "Unknown date"),
            rewritten: or_default(result.rewritten.as_ref(), "Could not generate neutral version"),
            redline: RedlineView::new(result.redlined_text.as_ref(), "No alternative suggested"),
            redline_empty_message: NO_REDLINE,
            original_text: or_default(result.original_text.as_ref(), "No original text available."),
        }
    }
}

/// Pasted text has no provenance; replace whatever the backend reported.
pub fn with_text_provenance(mut result: AnalysisResult, today: NaiveDate) -> AnalysisResult {
    result.title = Some(TEXT_ANALYSIS_TITLE.to_string());
    result.date = Some(today.format("%Y-%m-%d").to_string());
    result.source = Some(TEXT_ANALYSIS_SOURCE.to_string());
    result.credibility = Some(TEXT_ANALYSIS_CREDIBILITY.to_string());
    result
}

/// One article in the comparison panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleCard {
    pub source: String,
    pub timestamp: String,
    pub score: ScoreView,
    pub credibility: Option<CredibilityView>,
    pub similarity: Option<String>,
    pub original_text: String,
    pub rewritten: String,
    /// Only the original article shows its redline.
    pub redline: Option<RedlineView>,
    pub redline_empty_message: &'static str,
    pub link: Option<String>,
}

impl ArticleCard {
    pub fn original(article: &ComparedArticle) -> Self {
        let analysis = &article.analysis;
        Self {
            source: or_default(analysis.source.as_ref(), "Unknown Source"),
            timestamp: or_default(article.timestamp.as_ref(), "Unknown date"),
            score: ScoreView::new(analysis.bias_score),
            credibility: Some(CredibilityView::new(analysis.credibility.as_ref())),
            similarity: None,
            original_text: or_default(analysis.original_text.as_ref(), "No original text available."),
            rewritten: or_default(analysis.rewritten.as_ref(), "No rewritten version available."),
            redline: Some(RedlineView::new(analysis.redlined_text.as_ref(), "No alternative")),
            redline_empty_message: NO_CARD_REDLINE,
            link: None,
        }
    }

    pub fn compared(article: &ComparedArticle) -> Self {
        let analysis = &article.analysis;
        Self {
            source: or_default(analysis.source.as_ref(), "Unknown"),
            timestamp: or_default(article.timestamp.as_ref(), "Unknown time"),
            score: ScoreView::new(analysis.bias_score),
            credibility: None,
            similarity: article
                .similarity_score
                .filter(|s| *s != 0.0 && !s.is_nan())
                .map(|s| format!("{}% Match", format_number(s))),
            original_text: or_default(analysis.original_text.as_ref(), "No original text available."),
            rewritten: or_default(analysis.rewritten.as_ref(), "No rewritten version available."),
            redline: None,
            redline_empty_message: NO_CARD_REDLINE,
            link: safe_link(analysis.original_url.as_deref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchLink {
    pub engine: &'static str,
    pub icon: &'static str,
    pub href: String,
}

/// Manual comparison instructions shown when no comparison could be made.
#[derive(Debug, Clone, PartialEq)]
pub struct FallbackView {
    pub query: String,
    pub reason: Option<String>,
    pub links: Vec<SearchLink>,
}

impl FallbackView {
    pub fn new(query: &str, reason: Option<String>) -> Self {
        let encoded: String = form_urlencoded::byte_serialize(query.as_bytes()).collect();
        Self {
            query: query.to_string(),
            reason,
            links: vec![
                SearchLink {
                    engine: "Google News",
                    icon: "fab fa-google",
                    href: format!("https://news.google.com/search?q={}", encoded),
                },
                SearchLink {
                    engine: "Bing News",
                    icon: "fab fa-microsoft",
                    href: format!("https://www.bing.com/news/search?q={}", encoded),
                },
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonBody {
    Articles(Vec<ArticleCard>),
    ManualFallback(FallbackView),
}

/// The comparison results panel.
#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonView {
    pub main_topic: Option<String>,
    pub comparison_date: Option<String>,
    pub message: Option<String>,
    pub original: Option<ArticleCard>,
    pub body: ComparisonBody,
}

impl ComparisonView {
    pub fn new(result: &ComparisonResult) -> Self {
        let original = result.original_article.clone().unwrap_or_default();
        let body = if result.comparison_articles.is_empty() {
            let topic = result.main_topic.as_deref().unwrap_or("");
            ComparisonBody::ManualFallback(FallbackView::new(topic, None))
        } else {
            ComparisonBody::Articles(
                result
                    .comparison_articles
                    .iter()
                    .map(ArticleCard::compared)
                    .collect(),
            )
        };
        Self {
            main_topic: Some(or_default(result.main_topic.as_ref(), "Unknown topic")),
            comparison_date: Some(or_default(result.comparison_date.as_ref(), "Unknown date")),
            message: result.message.clone().filter(|m| !m.is_empty()),
            original: Some(ArticleCard::original(&original)),
            body,
        }
    }

    /// Used when the comparison request itself failed.
    pub fn fallback(query: &str, reason: impl Into<String>) -> Self {
        Self {
            main_topic: None,
            comparison_date: None,
            message: None,
            original: None,
            body: ComparisonBody::ManualFallback(FallbackView::new(query, Some(reason.into()))),
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self.body, ComparisonBody::ManualFallback(_))
    }
}

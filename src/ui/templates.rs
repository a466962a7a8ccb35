//! HTML rendering of the view-model.
//!
//! Returns fragments and pages as strings; all interpolated text is escaped
//! by the templates.

use askama::Template;

use super::state::{Context, UiState};
use super::tabs::TabView;
use super::views::{AnalysisView, ArticleCard, ComparisonBody, ComparisonView, FallbackView};

#[derive(Template)]
#[template(path = "partials/analysis.html")]
struct AnalysisTemplate<'a> {
    view: &'a AnalysisView,
}

#[derive(Template)]
#[template(path = "partials/article_card.html")]
struct ArticleCardTemplate<'a> {
    card: &'a ArticleCard,
    original: bool,
}

#[derive(Template)]
#[template(path = "partials/fallback.html")]
struct FallbackTemplate<'a> {
    fallback: &'a FallbackView,
}

#[derive(Template)]
#[template(path = "partials/comparison.html")]
struct ComparisonTemplate<'a> {
    view: &'a ComparisonView,
    original_html: String,
    body_html: String,
}

#[derive(Template)]
#[template(path = "page.html")]
struct PageTemplate<'a> {
    state: &'a UiState,
    tabs: Vec<TabView>,
    alerts: &'a [String],
    analysis_html: String,
    comparison_html: String,
    analyze_loading: bool,
    analyze_results: bool,
    compare_loading: bool,
    compare_results: bool,
}

impl PageTemplate<'_> {
    fn panel_class(&self, id: &str) -> &'static str {
        if self.state.tabs.is_panel_active(id) {
            "tab-content active"
        } else {
            "tab-content"
        }
    }
}

pub fn render_analysis(view: &AnalysisView) -> Result<String, askama::Error> {
    AnalysisTemplate { view }.render()
}

pub fn render_article_card(card: &ArticleCard, original: bool) -> Result<String, askama::Error> {
    ArticleCardTemplate { card, original }.render()
}

pub fn render_fallback(fallback: &FallbackView) -> Result<String, askama::Error> {
    FallbackTemplate { fallback }.render()
}

pub fn render_comparison(view: &ComparisonView) -> Result<String, askama::Error> {
    let original_html = match &view.original {
        Some(card) => render_article_card(card, true)?,
        None => String::new(),
    };
    let body_html = match &view.body {
        ComparisonBody::Articles(cards) => cards
            .iter()
            .map(|card| render_article_card(card, false))
            .collect::<Result<Vec<_>, _>>()?
            .join("\n"),
        ComparisonBody::ManualFallback(fallback) => render_fallback(fallback)?,
    };
    ComparisonTemplate {
        view,
        original_html,
        body_html,
    }
    .render()
}

/// Renders the complete page for the current state.
pub fn render_page(state: &UiState) -> Result<String, askama::Error> {
    let analysis_html = match &state.analysis {
        Some(view) => render_analysis(view)?,
        None => String::new(),
    };
    let comparison_html = match &state.comparison {
        Some(view) => render_comparison(view)?,
        None => String::new(),
    };
    PageTemplate {
        state,
        tabs: state.tabs.buttons(),
        alerts: state.alerts(),
        analysis_html,
        comparison_html,
        analyze_loading: state.is_loading(Context::Analyze),
        analyze_results: state.results_visible(Context::Analyze),
        compare_loading: state.is_loading(Context::Compare),
        compare_results: state.results_visible(Context::Compare),
    }
    .render()
}

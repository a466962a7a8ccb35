//! Runs user actions against the backend and applies the results to the view-model.

use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{error, info};

use crate::api::BiasApi;
use crate::ui::{
    with_text_provenance, AnalysisView, ComparisonView, Context, Ticket, UiState,
};
use crate::{TARGET_UI, TARGET_WEB_REQUEST};

/// Pasted text shorter than this is rejected before any request is made.
pub const MIN_TEXT_CHARS: usize = 50;

pub const MSG_MISSING_URL: &str = "Please enter a URL";
pub const MSG_SHORT_TEXT: &str = "Please enter at least 50 characters for analysis";
pub const MSG_MISSING_COMPARE_URL: &str = "Please enter a URL to compare";

/// What a dispatched action ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Results were rendered and revealed.
    Rendered,
    /// The manual comparison instructions were rendered.
    Fallback,
    /// The request failed and an alert was raised.
    Failed,
    /// Input validation failed; nothing was sent.
    Rejected,
    /// A newer response had already been applied; this one was dropped.
    Stale,
}

pub struct Dispatcher<A> {
    api: A,
    ui: Mutex<UiState>,
}

impl<A: BiasApi> Dispatcher<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            ui: Mutex::new(UiState::new()),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    fn lock(&self) -> MutexGuard<'_, UiState> {
        self.ui.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Runs `f` with exclusive access to the view-model.
    pub fn with_ui<R>(&self, f: impl FnOnce(&mut UiState) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn snapshot(&self) -> UiState {
        self.lock().clone()
    }

    fn reject(&self, message: &str) -> Outcome {
        info!(target: TARGET_UI, "Rejected input: {}", message);
        self.with_ui(|ui| ui.alert(message));
        Outcome::Rejected
    }

    /// Analyzes the article at `input`.
    pub async fn analyze_url(&self, input: &str) -> Outcome {
        let url = input.trim();
        if url.is_empty() {
            return self.reject(MSG_MISSING_URL);
        }

        let ticket = self.with_ui(|ui| ui.begin(Context::Analyze, true));
        info!(target: TARGET_WEB_REQUEST, "Analyzing URL {} (request #{})", url, ticket.seq);
        let result = self.api.analyze_url(url).await;

        self.with_ui(|ui| {
            let outcome = match result {
                Ok(data) => apply_analysis(ui, &ticket, AnalysisView::new(&data)),
                Err(err) => {
                    error!(target: TARGET_WEB_REQUEST, "Analysis error: {}", err);
                    apply_alert(ui, &ticket, format!("Error analyzing URL: {}", err))
                }
            };
            ui.finish(&ticket);
            outcome
        })
    }

    /// Analyzes pasted text. The rendered result is marked as user-provided.
    pub async fn analyze_text(&self, input: &str) -> Outcome {
        let text = input.trim();
        if text.chars().count() < MIN_TEXT_CHARS {
            return self.reject(MSG_SHORT_TEXT);
        }

        let ticket = self.with_ui(|ui| ui.begin(Context::Analyze, true));
        info!(
            target: TARGET_WEB_REQUEST,
            "Analyzing {} characters of text (request #{})",
            text.chars().count(),
            ticket.seq
        );
        let result = self.api.analyze_text(text).await;

        self.with_ui(|ui| {
            let outcome = match result {
                Ok(data) => {
                    let data = with_text_provenance(data, Utc::now().date_naive());
                    apply_analysis(ui, &ticket, AnalysisView::new(&data))
                }
                Err(err) => {
                    error!(target: TARGET_WEB_REQUEST, "Analysis error: {}", err);
                    apply_alert(ui, &ticket, format!("Error analyzing text: {}", err))
                }
            };
            ui.finish(&ticket);
            outcome
        })
    }

    /// Compares the article at `input` with other coverage. Every failure
    /// ends in the manual comparison instructions rather than an alert.
    pub async fn compare_articles(&self, input: &str) -> Outcome {
        let url = input.trim();
        if url.is_empty() {
            return self.reject(MSG_MISSING_COMPARE_URL);
        }

        let ticket = self.with_ui(|ui| ui.begin(Context::Compare, false));
        info!(target: TARGET_WEB_REQUEST, "Comparing coverage for {} (request #{})", url, ticket.seq);
        let result = self.api.compare_news(url).await;

        self.with_ui(|ui| {
            let view = match result {
                Ok(data) => ComparisonView::new(&data),
                Err(err) => {
                    error!(target: TARGET_WEB_REQUEST, "Comparison error: {}", err);
                    let message = err.to_string();
                    ComparisonView::fallback(&message, message.clone())
                }
            };
            let outcome = if !ui.settle(&ticket) {
                Outcome::Stale
            } else {
                let outcome = if view.is_fallback() {
                    Outcome::Fallback
                } else {
                    Outcome::Rendered
                };
                ui.comparison = Some(view);
                ui.show_results(Context::Compare);
                outcome
            };
            ui.finish(&ticket);
            outcome
        })
    }

    /// Switches tabs. Unknown keys are ignored.
    pub fn activate_tab(&self, key: &str) -> bool {
        self.with_ui(|ui| ui.tabs.activate(key))
    }
}

fn apply_analysis(ui: &mut UiState, ticket: &Ticket, view: AnalysisView) -> Outcome {
    if !ui.settle(ticket) {
        return Outcome::Stale;
    }
    ui.analysis = Some(view);
    ui.show_results(Context::Analyze);
    Outcome::Rendered
}

fn apply_alert(ui: &mut UiState, ticket: &Ticket, message: String) -> Outcome {
    if !ui.settle(ticket) {
        return Outcome::Stale;
    }
    ui.alert(message);
    Outcome::Failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{
        AnalysisResult, ApiError, ComparedArticle, ComparisonResult, SourceCheck,
    };
    use crate::ui::{ComparisonBody, TEXT_ANALYSIS_SOURCE, TEXT_ANALYSIS_TITLE};
    use async_trait::async_trait;
    use futures::poll;
    use std::collections::{HashMap, VecDeque};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::oneshot;

    /// Replays queued responses and counts calls.
    #[derive(Default)]
    struct StubApi {
        analyses: Mutex<VecDeque<Result<AnalysisResult, ApiError>>>,
        comparisons: Mutex<VecDeque<Result<ComparisonResult, ApiError>>>,
        calls: AtomicUsize,
        last_text: Mutex<Option<String>>,
    }

    impl StubApi {
        fn with_analysis(result: Result<AnalysisResult, ApiError>) -> Self {
            let api = Self::default();
            api.analyses.lock().unwrap().push_back(result);
            api
        }

        fn with_comparison(result: Result<ComparisonResult, ApiError>) -> Self {
            let api = Self::default();
            api.comparisons.lock().unwrap().push_back(result);
            api
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn next_analysis(&self) -> Result<AnalysisResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.analyses
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected analysis request")
        }
    }

    #[async_trait]
    impl BiasApi for StubApi {
        async fn analyze_url(&self, _url: &str) -> Result<AnalysisResult, ApiError> {
            self.next_analysis()
        }

        async fn analyze_text(&self, text: &str) -> Result<AnalysisResult, ApiError> {
            *self.last_text.lock().unwrap() = Some(text.to_string());
            self.next_analysis()
        }

        async fn compare_news(&self, _url: &str) -> Result<ComparisonResult, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.comparisons
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected comparison request")
        }

        async fn check_source(&self, _url: &str) -> Result<SourceCheck, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(SourceCheck::default())
        }
    }

    /// Holds each analysis response until the test releases it.
    #[derive(Default)]
    struct GatedApi {
        gates: Mutex<HashMap<String, oneshot::Receiver<Result<AnalysisResult, ApiError>>>>,
    }

    impl GatedApi {
        fn gate(&self, url: &str) -> oneshot::Sender<Result<AnalysisResult, ApiError>> {
            let (tx, rx) = oneshot::channel();
            self.gates.lock().unwrap().insert(url.to_string(), rx);
            tx
        }
    }

    #[async_trait]
    impl BiasApi for GatedApi {
        async fn analyze_url(&self, url: &str) -> Result<AnalysisResult, ApiError> {
            let rx = self.gates.lock().unwrap().remove(url).expect("no gate for url");
            rx.await.expect("gate dropped")
        }

        async fn analyze_text(&self, _text: &str) -> Result<AnalysisResult, ApiError> {
            unimplemented!()
        }

        async fn compare_news(&self, _url: &str) -> Result<ComparisonResult, ApiError> {
            unimplemented!()
        }

        async fn check_source(&self, _url: &str) -> Result<SourceCheck, ApiError> {
            unimplemented!()
        }
    }

    fn long_text() -> String {
        "The committee released its findings on Tuesday after a lengthy review.".to_string()
    }

    fn scored(source: &str, score: f64) -> AnalysisResult {
        AnalysisResult {
            source: Some(source.to_string()),
            credibility: Some("High".to_string()),
            bias_score: Some(score),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_analyze_url_renders_and_reveals_results() {
        let dispatcher = Dispatcher::new(StubApi::with_analysis(Ok(scored("reuters.com", 85.0))));
        let outcome = dispatcher.analyze_url("  https://www.reuters.com/world/story  ").await;
        assert_eq!(outcome, Outcome::Rendered);

        let ui = dispatcher.snapshot();
        let view = ui.analysis.as_ref().unwrap();
        assert_eq!(view.source, "reuters.com");
        assert_eq!(view.score.meter_width().as_deref(), Some("85%"));
        assert_eq!(view.score.meter_class(), "meter-high");
        assert!(ui.results_visible(Context::Analyze));
        assert!(!ui.is_loading(Context::Analyze));
        assert!(ui.alerts().is_empty());
    }

    #[tokio::test]
    async fn test_analyze_url_requires_input() {
        let dispatcher = Dispatcher::new(StubApi::default());
        assert_eq!(dispatcher.analyze_url("   ").await, Outcome::Rejected);
        assert_eq!(dispatcher.api().calls(), 0);

        let ui = dispatcher.snapshot();
        assert_eq!(ui.alerts().to_vec(), vec![MSG_MISSING_URL.to_string()]);
        assert!(!ui.is_loading(Context::Analyze));
    }

    #[tokio::test]
    async fn test_analyze_url_failures_alert_without_rendering() {
        let cases = [
            (ApiError::status(502), "Error analyzing URL: API error: 502"),
            (
                ApiError::Backend("Could not extract article text from URL".into()),
                "Error analyzing URL: Could not extract article text from URL",
            ),
        ];
        for (err, expected) in cases {
            let dispatcher = Dispatcher::new(StubApi::with_analysis(Err(err)));
            assert_eq!(dispatcher.analyze_url("https://example.com/a").await, Outcome::Failed);

            let ui = dispatcher.snapshot();
            assert!(ui.analysis.is_none());
            assert!(!ui.results_visible(Context::Analyze));
            assert!(!ui.is_loading(Context::Analyze));
            assert_eq!(ui.alerts().to_vec(), vec![expected.to_string()]);
        }
    }

    #[tokio::test]
    async fn test_analyze_hides_previous_results_on_failure() {
        let api = StubApi::default();
        api.analyses.lock().unwrap().push_back(Ok(scored("bbc.com", 20.0)));
        api.analyses.lock().unwrap().push_back(Err(ApiError::status(500)));
        let dispatcher = Dispatcher::new(api);

        assert_eq!(dispatcher.analyze_url("https://bbc.com/1").await, Outcome::Rendered);
        assert!(dispatcher.snapshot().results_visible(Context::Analyze));

        assert_eq!(dispatcher.analyze_url("https://bbc.com/2").await, Outcome::Failed);
        assert!(!dispatcher.snapshot().results_visible(Context::Analyze));
    }

    #[tokio::test]
    async fn test_short_text_never_reaches_the_network() {
        let dispatcher = Dispatcher::new(StubApi::default());
        assert_eq!(dispatcher.analyze_text("").await, Outcome::Rejected);
        assert_eq!(dispatcher.analyze_text("short").await, Outcome::Rejected);
        // 49 characters once trimmed.
        let padded = format!("   {}   ", "x".repeat(49));
        assert_eq!(dispatcher.analyze_text(&padded).await, Outcome::Rejected);
        assert_eq!(dispatcher.api().calls(), 0);
        assert_eq!(dispatcher.snapshot().alerts().len(), 3);
    }

    #[tokio::test]
    async fn test_text_length_counts_characters() {
        let text = "é".repeat(MIN_TEXT_CHARS);
        let dispatcher = Dispatcher::new(StubApi::with_analysis(Ok(AnalysisResult::default())));
        assert_eq!(dispatcher.analyze_text(&text).await, Outcome::Rendered);
        assert_eq!(dispatcher.api().last_text.lock().unwrap().as_deref(), Some(text.as_str()));
    }

    #[tokio::test]
    async fn test_analyze_text_overrides_provenance() {
        let backend = AnalysisResult {
            title: Some("Something else".into()),
            date: Some("2001-09-09".into()),
            source: Some("cnn.com".into()),
            credibility: Some("Low".into()),
            bias_score: Some(45.0),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(StubApi::with_analysis(Ok(backend)));
        let before = Utc::now().date_naive();
        assert_eq!(dispatcher.analyze_text(&long_text()).await, Outcome::Rendered);
        let after = Utc::now().date_naive();

        let ui = dispatcher.snapshot();
        let view = ui.analysis.as_ref().unwrap();
        assert_eq!(view.title.as_deref(), Some(TEXT_ANALYSIS_TITLE));
        assert_eq!(view.source, TEXT_ANALYSIS_SOURCE);
        assert_eq!(view.credibility.label, "N/A");
        let dates = [
            before.format("%Y-%m-%d").to_string(),
            after.format("%Y-%m-%d").to_string(),
        ];
        assert!(dates.contains(&view.date));
        assert_eq!(view.score.tier.map(|t| t.label()), Some("medium"));
    }

    #[tokio::test]
    async fn test_analyze_text_failure_alerts() {
        let dispatcher = Dispatcher::new(StubApi::with_analysis(Err(ApiError::status(400))));
        assert_eq!(dispatcher.analyze_text(&long_text()).await, Outcome::Failed);
        assert_eq!(
            dispatcher.snapshot().alerts().to_vec(),
            vec!["Error analyzing text: API error: 400".to_string()]
        );
    }

    #[tokio::test]
    async fn test_compare_renders_articles() {
        let result = ComparisonResult {
            main_topic: Some("Border talks resume".into()),
            comparison_date: Some("2025-05-10".into()),
            original_article: Some(ComparedArticle {
                analysis: scored("indianexpress.com", 30.0),
                timestamp: Some("2025-05-10T09:00:00".into()),
                similarity_score: None,
            }),
            comparison_articles: vec![ComparedArticle {
                analysis: scored("thehindu.com", 50.0),
                timestamp: None,
                similarity_score: Some(48.2),
            }],
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(StubApi::with_comparison(Ok(result)));
        assert_eq!(
            dispatcher.compare_articles("https://indianexpress.com/a").await,
            Outcome::Rendered
        );

        let ui = dispatcher.snapshot();
        let view = ui.comparison.as_ref().unwrap();
        assert_eq!(view.main_topic.as_deref(), Some("Border talks resume"));
        match &view.body {
            ComparisonBody::Articles(cards) => assert_eq!(cards.len(), 1),
            other => panic!("expected articles, got {:?}", other),
        }
        assert!(ui.results_visible(Context::Compare));
        assert!(!ui.is_loading(Context::Compare));
    }

    #[tokio::test]
    async fn test_compare_with_no_articles_falls_back() {
        let result = ComparisonResult {
            main_topic: Some("Monsoon forecast".into()),
            ..Default::default()
        };
        let dispatcher = Dispatcher::new(StubApi::with_comparison(Ok(result)));
        assert_eq!(
            dispatcher.compare_articles("https://ndtv.com/a").await,
            Outcome::Fallback
        );
        let ui = dispatcher.snapshot();
        let view = ui.comparison.as_ref().unwrap();
        assert!(view.is_fallback());
        assert!(view.original.is_some());
        assert!(ui.results_visible(Context::Compare));
    }

    #[tokio::test]
    async fn test_compare_failures_fall_back_without_alert() {
        let malformed = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let failures = [
            ApiError::status(500),
            ApiError::Backend("x".into()),
            ApiError::Decode(malformed),
        ];
        for err in failures {
            let message = err.to_string();
            let dispatcher = Dispatcher::new(StubApi::with_comparison(Err(err)));
            assert_eq!(
                dispatcher.compare_articles("https://example.com/a").await,
                Outcome::Fallback
            );
            assert_eq!(dispatcher.api().calls(), 1);

            let ui = dispatcher.snapshot();
            assert!(ui.alerts().is_empty());
            assert!(ui.results_visible(Context::Compare));
            assert!(!ui.is_loading(Context::Compare));
            match &ui.comparison.as_ref().unwrap().body {
                ComparisonBody::ManualFallback(fallback) => {
                    assert_eq!(fallback.reason.as_deref(), Some(message.as_str()));
                    assert_eq!(fallback.query, message);
                    assert_eq!(fallback.links.len(), 2);
                }
                other => panic!("expected fallback, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_failed_compare_searches_for_error_message() {
        let err = ApiError::Status {
            status: 400,
            message: "Could not extract article text from URL".into(),
        };
        let dispatcher = Dispatcher::new(StubApi::with_comparison(Err(err)));
        assert_eq!(
            dispatcher.compare_articles("https://example.com/a").await,
            Outcome::Fallback
        );

        let ui = dispatcher.snapshot();
        match &ui.comparison.as_ref().unwrap().body {
            ComparisonBody::ManualFallback(fallback) => {
                assert_eq!(
                    fallback.links[0].href,
                    "https://news.google.com/search?q=Could+not+extract+article+text+from+URL"
                );
                assert_eq!(
                    fallback.links[1].href,
                    "https://www.bing.com/news/search?q=Could+not+extract+article+text+from+URL"
                );
            }
            other => panic!("expected fallback, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_compare_requires_input() {
        let dispatcher = Dispatcher::new(StubApi::default());
        assert_eq!(dispatcher.compare_articles("").await, Outcome::Rejected);
        assert_eq!(dispatcher.api().calls(), 0);
        assert_eq!(
            dispatcher.snapshot().alerts().to_vec(),
            vec![MSG_MISSING_COMPARE_URL.to_string()]
        );
    }

    #[tokio::test]
    async fn test_late_response_does_not_overwrite_newer_one() {
        let api = GatedApi::default();
        let first_gate = api.gate("https://a.example/1");
        let second_gate = api.gate("https://b.example/2");
        let dispatcher = Dispatcher::new(api);

        let mut first = Box::pin(dispatcher.analyze_url("https://a.example/1"));
        let mut second = Box::pin(dispatcher.analyze_url("https://b.example/2"));
        assert!(poll!(first.as_mut()).is_pending());
        assert!(poll!(second.as_mut()).is_pending());
        assert!(dispatcher.snapshot().is_loading(Context::Analyze));

        second_gate.send(Ok(scored("second.example", 10.0))).unwrap();
        assert_eq!(second.await, Outcome::Rendered);
        assert!(!dispatcher.snapshot().is_loading(Context::Analyze));

        first_gate.send(Ok(scored("first.example", 90.0))).unwrap();
        assert_eq!(first.await, Outcome::Stale);

        let ui = dispatcher.snapshot();
        assert_eq!(ui.analysis.as_ref().unwrap().source, "second.example");
        assert!(ui.results_visible(Context::Analyze));
    }

    #[tokio::test]
    async fn test_older_response_renders_until_newer_arrives() {
        let api = GatedApi::default();
        let first_gate = api.gate("https://a.example/1");
        let second_gate = api.gate("https://b.example/2");
        let dispatcher = Dispatcher::new(api);

        let mut first = Box::pin(dispatcher.analyze_url("https://a.example/1"));
        let mut second = Box::pin(dispatcher.analyze_url("https://b.example/2"));
        assert!(poll!(first.as_mut()).is_pending());
        assert!(poll!(second.as_mut()).is_pending());

        first_gate.send(Ok(scored("first.example", 90.0))).unwrap();
        assert_eq!(first.await, Outcome::Rendered);
        // The newer request is still outstanding.
        assert!(dispatcher.snapshot().is_loading(Context::Analyze));

        second_gate.send(Err(ApiError::status(504))).unwrap();
        assert_eq!(second.await, Outcome::Failed);
        let ui = dispatcher.snapshot();
        assert!(!ui.is_loading(Context::Analyze));
        assert_eq!(ui.alerts().to_vec(), vec!["Error analyzing URL: API error: 504".to_string()]);
    }

    #[test]
    fn test_activate_tab() {
        let dispatcher = Dispatcher::new(StubApi::default());
        assert!(dispatcher.activate_tab("compare-tab"));
        assert!(!dispatcher.activate_tab("missing-tab"));
        assert_eq!(dispatcher.snapshot().tabs.active_key(), "compare-tab");
    }
}

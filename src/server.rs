//! Server-rendered web front-end. Each form post runs one dispatcher action
//! and answers with the rendered page.

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use crate::api::BiasApi;
use crate::dispatcher::Dispatcher;
use crate::ui::{render_page, TAB_ANALYZE_TEXT, TAB_COMPARE};

#[derive(Deserialize)]
pub struct UrlForm {
    #[serde(default)]
    pub url: String,
}

#[derive(Deserialize)]
pub struct TextForm {
    #[serde(default)]
    pub text: String,
}

/// Only the backend client is shared. Every request renders from a fresh
/// view-model, so one visitor never sees another's results or alerts.
pub struct AppState<A> {
    pub api: Arc<A>,
}

impl<A> Clone for AppState<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
        }
    }
}

impl<A: BiasApi> AppState<A> {
    fn dispatcher(&self) -> Dispatcher<Arc<A>> {
        Dispatcher::new(Arc::clone(&self.api))
    }
}

pub fn create_router<A>(api: Arc<A>) -> Router
where
    A: BiasApi + 'static,
{
    Router::new()
        .route("/", get(index::<A>))
        .route("/tab/{key}", get(switch_tab::<A>))
        .route("/analyze-url", post(analyze_url::<A>))
        .route("/analyze-text", post(analyze_text::<A>))
        .route("/compare", post(compare::<A>))
        .with_state(AppState { api })
}

/// Runs the front-end until the process is stopped.
pub async fn serve_loop<A>(api: Arc<A>, port: u16) -> Result<()>
where
    A: BiasApi + 'static,
{
    let addr = format!("0.0.0.0:{}", port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server running on http://{}", addr);

    axum::serve(listener, create_router(api)).await?;
    Ok(())
}

fn render<D: BiasApi>(dispatcher: &Dispatcher<D>) -> Response {
    match dispatcher.with_ui(|ui| render_page(ui)) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Failed to render page: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Html(format!("Template error: {}", e)),
            )
                .into_response()
        }
    }
}

/// GET / - Render the page.
async fn index<A: BiasApi>(State(state): State<AppState<A>>) -> Response {
    render(&state.dispatcher())
}

/// GET /tab/{key} - Activate a tab.
async fn switch_tab<A: BiasApi>(
    State(state): State<AppState<A>>,
    Path(key): Path<String>,
) -> Response {
    let dispatcher = state.dispatcher();
    dispatcher.activate_tab(&key);
    render(&dispatcher)
}

/// POST /analyze-url - Analyze an article by URL.
async fn analyze_url<A: BiasApi>(
    State(state): State<AppState<A>>,
    Form(form): Form<UrlForm>,
) -> Response {
    let dispatcher = state.dispatcher();
    let outcome = dispatcher.analyze_url(&form.url).await;
    info!("analyze-url finished: {:?}", outcome);
    render(&dispatcher)
}

/// POST /analyze-text - Analyze pasted text.
async fn analyze_text<A: BiasApi>(
    State(state): State<AppState<A>>,
    Form(form): Form<TextForm>,
) -> Response {
    let dispatcher = state.dispatcher();
    dispatcher.activate_tab(TAB_ANALYZE_TEXT);
    let outcome = dispatcher.analyze_text(&form.text).await;
    info!("analyze-text finished: {:?}", outcome);
    render(&dispatcher)
}

/// POST /compare - Compare coverage of an article.
async fn compare<A: BiasApi>(
    State(state): State<AppState<A>>,
    Form(form): Form<UrlForm>,
) -> Response {
    let dispatcher = state.dispatcher();
    dispatcher.activate_tab(TAB_COMPARE);
    let outcome = dispatcher.compare_articles(&form.url).await;
    info!("compare finished: {:?}", outcome);
    render(&dispatcher)
}

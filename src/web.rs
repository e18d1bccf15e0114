use crate::client::{KgClient, encode_component};
use crate::config::SearchConfig;
use crate::entity::SearchOutcome;
use crate::query::Query as SearchQuery;
use crate::render::ResultsView;
use crate::view::{ViewController, ViewState};
use askama::Html as HtmlEscaper;
use askama::{MarkupDisplay, Template};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use include_dir::{Dir, include_dir};
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::compression::CompressionLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, warn};

type SharedState = Arc<AppState>;

static ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const EXAMPLE_QUERIES: &[&str] = &[
    "Taylor Swift",
    "Albert Einstein",
    "Eiffel Tower",
    "Rust (programming language)",
    "Mount Everest",
];

#[derive(Clone)]
pub struct AppState {
    pub client: KgClient,
    pub base_url: String,
}

#[derive(Clone, Debug)]
pub struct WebConfig {
    pub addr: SocketAddr,
    pub base_url: String,
    pub search: SearchConfig,
}

impl WebConfig {
    pub fn new(search: SearchConfig) -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            base_url: "http://127.0.0.1:8080".to_string(),
            search,
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub async fn serve(config: WebConfig) -> Result<(), WebError> {
    let state = Arc::new(AppState {
        client: KgClient::new(config.search.clone()),
        base_url: config.base_url.clone(),
    });
    let router = build_router(state);
    info!(
        %config.addr,
        base = %config.base_url,
        endpoint = %config.search.endpoint,
        "Binding HTTP listener"
    );
    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("HTTP server exited");
    Ok(())
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = json!({ "error": self.message });
        (self.status, Json(payload)).into_response()
    }
}

fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(home))
        .route("/search", get(search_html))
        .route("/fragment/results", get(results_fragment))
        .route("/api/search", get(api_search))
        .route("/healthz", get(health))
        .route("/static/*path", get(static_asset))
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().include_headers(true))
                .on_response(DefaultOnResponse::new().include_headers(true)),
        )
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = signal::ctrl_c().await;
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        if let Ok(mut stream) = signal(SignalKind::terminate()) {
            let _ = stream.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[derive(Debug, Deserialize)]
struct SearchParams {
    q: Option<String>,
}

impl SearchParams {
    fn raw(&self) -> &str {
        self.q.as_deref().unwrap_or_default()
    }
}

async fn home(State(state): State<SharedState>) -> impl IntoResponse {
    Html(render_page(&state, "", &ViewState::Idle))
}

async fn search_html(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let view = run_search(&state, params.raw()).await;
    let value = view.query().unwrap_or(params.raw().trim());
    Html(render_page(&state, value, &view))
}

async fn results_fragment(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Response {
    let view = run_search(&state, params.raw()).await;
    if view == ViewState::Idle {
        return StatusCode::NO_CONTENT.into_response();
    }
    Html(render_results(&view)).into_response()
}

async fn api_search(
    State(state): State<SharedState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<ResultsView>, ApiError> {
    let query = SearchQuery::parse(params.raw())
        .ok_or_else(|| ApiError::bad_request("Query parameter `q` is required"))?;
    let outcome = state
        .client
        .search(&query)
        .await
        .map_err(|err| ApiError::bad_gateway(err.to_string()))?;
    let items = match outcome {
        SearchOutcome::Empty => Vec::new(),
        SearchOutcome::Found(items) => items,
    };
    Ok(Json(ResultsView::build(&query, &items)))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "service": "kgsearch-web" }))
}

async fn static_asset(Path(path): Path<String>) -> Response {
    match ASSETS.get_file(&path) {
        Some(file) => (
            [(header::CONTENT_TYPE, asset_mime(&path).to_string())],
            file.contents(),
        )
            .into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

fn asset_mime(path: &str) -> mime::Mime {
    match path.rsplit_once('.').map(|(_, ext)| ext) {
        Some("css") => mime::TEXT_CSS_UTF_8,
        Some("js") => mime::APPLICATION_JAVASCRIPT_UTF_8,
        Some("svg") => mime::IMAGE_SVG,
        _ => mime::APPLICATION_OCTET_STREAM,
    }
}

/// One independent pass through the view state machine.
async fn run_search(state: &AppState, raw: &str) -> ViewState {
    let mut view = ViewController::default();
    let Some(ticket) = view.submit(raw) else {
        return view.into_state();
    };
    let result = state.client.search(ticket.query()).await;
    view.resolve(ticket, result);
    view.into_state()
}

fn render_page(state: &AppState, query_value: &str, view: &ViewState) -> String {
    let (canonical_url, json_ld) = match view.query() {
        Some(query) => (
            search_url(&state.base_url, query),
            search_page_json_ld(view, &state.base_url),
        ),
        None => (state.base_url.clone(), website_json_ld(&state.base_url)),
    };
    let template = PageTemplate {
        query_value,
        results_html: render_results(view),
        filled: !matches!(view, ViewState::Idle),
        examples: EXAMPLE_QUERIES
            .iter()
            .map(|&label| ExampleLink {
                label,
                href: search_path(label),
            })
            .collect(),
        canonical_url,
        json_ld: script_safe(&json_ld),
    };
    template
        .render()
        .unwrap_or_else(|err| render_error_page(err.to_string()))
}

fn render_results(view: &ViewState) -> String {
    ResultsTemplate { state: view }
        .render()
        .unwrap_or_else(|err| {
            warn!(error = %err, "Failed to render results region");
            String::new()
        })
}

fn render_error_page(message: impl Into<String>) -> String {
    let message = MarkupDisplay::new_unsafe(message.into(), HtmlEscaper).to_string();
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>Knowledge Graph Explorer • Error</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
  </head>
  <body class="bg-slate-50 text-slate-900">
    <main class="min-h-screen flex flex-col items-center justify-start py-10 px-4">
      <div class="max-w-3xl w-full space-y-6">
        <h1 class="text-4xl font-extrabold tracking-tight">Something went wrong</h1>
        <p class="text-lg text-slate-600">{message}</p>
        <a href="/" class="inline-flex items-center rounded-md bg-slate-900 px-4 py-2 text-white font-semibold shadow hover:bg-slate-800 transition-colors">Back to search</a>
      </div>
    </main>
  </body>
</html>"#
    )
}

fn search_path(query: &str) -> String {
    format!("/search?q={}", encode_component(query))
}

fn search_url(base_url: &str, query: &str) -> String {
    format!("{}{}", base_url, search_path(query))
}

fn search_page_json_ld(view: &ViewState, base_url: &str) -> String {
    let query = view.query().unwrap_or_default();
    let items = match view {
        ViewState::Results(results) => results
            .results
            .iter()
            .take(20)
            .enumerate()
            .map(|(idx, card)| {
                let mut item = json!({
                    "@type": "ListItem",
                    "position": idx + 1,
                    "name": card.title,
                });
                if let Some(link) = card.links.first() {
                    item["url"] = json!(link.href);
                }
                item
            })
            .collect::<Vec<_>>(),
        _ => Vec::new(),
    };
    serde_json::to_string_pretty(&json!({
        "@context": "https://schema.org",
        "@type": "SearchResultsPage",
        "name": format!("Knowledge Graph results for {query}"),
        "url": search_url(base_url, query),
        "mainEntity": {
            "@type": "ItemList",
            "numberOfItems": items.len(),
            "itemListElement": items,
        }
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

fn website_json_ld(base_url: &str) -> String {
    serde_json::to_string_pretty(&json!({
        "@context": "https://schema.org",
        "@type": "WebSite",
        "url": base_url,
        "potentialAction": {
            "@type": "SearchAction",
            "target": format!("{}/search?q={{search_term_string}}", base_url),
            "query-input": "required name=search_term_string"
        }
    }))
    .unwrap_or_else(|_| "{}".to_string())
}

// JSON-LD sits inside a <script> element; keep user text from closing it.
fn script_safe(json: &str) -> String {
    json.replace("</", "<\\/")
}

struct ExampleLink {
    label: &'static str,
    href: String,
}

#[derive(Template)]
#[template(
    source = r#"<!DOCTYPE html>
<html lang="en">
  <head>
    <meta charset="utf-8" />
    <meta name="viewport" content="width=device-width, initial-scale=1" />
    <title>{% if query_value.len() > 0 %}{{ query_value }} • {% endif %}Knowledge Graph Explorer</title>
    <script src="https://cdn.jsdelivr.net/npm/@tailwindcss/browser@4"></script>
    <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/font-awesome/6.5.1/css/all.min.css">
    <link rel="stylesheet" href="/static/app.css">
    <link rel="canonical" href="{{ canonical_url }}">
    <script type="application/ld+json">
    {{ json_ld|safe }}
    </script>
  </head>
  <body class="min-h-screen bg-gradient-to-br from-indigo-50 via-white to-purple-50 text-gray-800">
    <main class="max-w-4xl mx-auto px-4 py-10">
      <header class="text-center mb-10">
        <h1 class="text-4xl font-extrabold tracking-tight mb-2">
          <i class="fas fa-project-diagram text-indigo-500 mr-2"></i>Knowledge Graph Explorer
        </h1>
        <p class="text-gray-600">Look up people, places, organizations and more in Google's Knowledge Graph.</p>
      </header>

      <form id="search-form" action="/search" method="get" class="glass rounded-2xl p-4 mb-4 flex gap-3 shadow-lg">
        <input id="query" name="q" type="text" value="{{ query_value }}" autofocus autocomplete="off"
               placeholder="Search for an entity..."
               class="flex-1 px-4 py-3 rounded-xl border border-gray-200 focus:outline-none focus:ring-2 focus:ring-indigo-400">
        <button type="submit" class="px-6 py-3 bg-indigo-500 text-white rounded-xl font-semibold hover:bg-indigo-600 transition-colors">
          <i class="fas fa-search mr-2"></i>Search
        </button>
      </form>

      <div class="flex flex-wrap justify-center gap-2 mb-10">
        <span class="text-sm text-gray-500 self-center">Try:</span>
        {% for example in examples %}
        <a href="{{ example.href }}" data-example="{{ example.label }}"
           class="px-3 py-1 rounded-full bg-white border border-indigo-200 text-sm text-indigo-700 hover:bg-indigo-50 transition-colors">{{ example.label }}</a>
        {% endfor %}
      </div>

      <div id="loading" class="hidden text-center py-20">
        <div class="spinner mx-auto mb-4"></div>
        <p class="text-gray-600">Searching the Knowledge Graph...</p>
      </div>

      <div id="results" data-filled="{{ filled }}">{{ results_html|safe }}</div>
    </main>
    <script src="/static/app.js"></script>
  </body>
</html>"#,
    ext = "html"
)]
struct PageTemplate<'a> {
    query_value: &'a str,
    results_html: String,
    filled: bool,
    examples: Vec<ExampleLink>,
    canonical_url: String,
    json_ld: String,
}

#[derive(Template)]
#[template(
    source = r#"{% match state %}
{% when ViewState::Idle %}
{% when ViewState::Loading with (query) %}
<div class="text-center py-20 fade-in" data-state="loading">
  <div class="spinner mx-auto mb-4"></div>
  <p class="text-gray-600">Searching for "{{ query }}"...</p>
</div>
{% when ViewState::Empty with (query) %}
<div class="text-center py-20 fade-in" data-state="empty">
  <i class="fas fa-search text-5xl mb-4 text-gray-400"></i>
  <h3 class="text-xl mb-2 text-gray-800">No results found for "{{ query }}"</h3>
  <p class="text-gray-600 mb-6">This means Google doesn't have information about this entity in their Knowledge Graph</p>
  <button type="button" onclick="document.getElementById('query').focus()" class="px-6 py-2 bg-indigo-500 text-white rounded-lg hover:bg-indigo-600 transition-colors">
    Try Another Search
  </button>
</div>
{% when ViewState::Failed with (message) %}
<div class="text-center py-20 fade-in" data-state="error">
  <i class="fas fa-exclamation-triangle text-5xl mb-4 text-red-500"></i>
  <h3 class="text-xl mb-2 text-gray-800">Something went wrong</h3>
  <p class="text-gray-600">{{ message }}</p>
  <button type="button" onclick="location.reload()" class="mt-4 px-6 py-2 bg-indigo-500 text-white rounded-lg hover:bg-indigo-600 transition-colors">
    Try Again
  </button>
</div>
{% when ViewState::Results with (results) %}
<div class="glass rounded-xl p-6 mb-8 text-center fade-in" data-state="results">
  <div class="flex items-center justify-center gap-2 text-gray-700">
    <i class="fas fa-database text-indigo-500"></i>
    <span class="font-semibold">{{ results.headline() }}</span>
  </div>
</div>
{% for card in results.results %}
<article class="glass rounded-2xl p-6 mb-6 shadow-lg hover:shadow-xl transition-all duration-300 fade-in stagger" style="--delay: {{ card.delay_ms }}ms">
  <div class="flex flex-col md:flex-row gap-6 mb-6">
    {% match card.image_url %}
    {% when Some with (image) %}
    <img src="{{ image }}" alt="{{ card.title }}"
         class="w-24 h-24 rounded-xl object-cover self-center md:self-start shadow-md hover:scale-105 transition-transform"
         onerror="this.style.display='none'">
    {% when None %}
    {% endmatch %}
    <div class="flex-1 text-center md:text-left">
      <h2 class="text-2xl font-bold text-gray-800 mb-2">{{ card.title }}</h2>
      {% match card.subtitle %}
      {% when Some with (subtitle) %}
      <p class="text-indigo-600 font-medium mb-3">{{ subtitle }}</p>
      {% when None %}
      <p class="text-gray-400 italic mb-3">No description available</p>
      {% endmatch %}
      <div class="flex flex-wrap justify-center md:justify-start gap-2 mb-3">
        <span class="text-sm text-gray-600 mr-2">Type:</span>
        {% for label in card.types %}
        <div class="has-tooltip relative">
          <span class="px-3 py-1 bg-indigo-100 text-indigo-800 rounded-full text-sm font-medium cursor-help">{{ label }}</span>
          <div class="tooltip">Schema.org classification</div>
        </div>
        {% endfor %}
      </div>
      <div class="has-tooltip relative inline-block">
        <span class="inline-flex items-center px-4 py-2 rounded-full bg-gradient-to-r from-green-500 to-emerald-600 text-white font-semibold text-sm cursor-help">
          <i class="fas fa-chart-line mr-2"></i>Confidence: {{ card.confidence }}
        </span>
        <div class="tooltip">Google's confidence score for this match</div>
      </div>
    </div>
  </div>
  {% match card.description %}
  {% when Some with (description) %}
  <div class="bg-gray-50 rounded-lg p-4 mb-6 border-l-4 border-indigo-400">
    <p class="text-gray-800 leading-relaxed">{{ description }}</p>
  </div>
  {% when None %}
  <div class="bg-gray-50 rounded-lg p-4 mb-6 border-l-4 border-gray-300">
    <p class="text-gray-700 italic">No detailed description available in Google's Knowledge Graph</p>
  </div>
  {% endmatch %}
  <div class="grid grid-cols-1 md:grid-cols-3 gap-4">
    {% for link in card.links %}
    <div class="has-tooltip relative" data-link="{{ link.kind.icon() }}">
      <a href="{{ link.href }}" target="_blank" rel="noopener" class="block group">
        <div class="p-0 rounded-xl shadow-md hover:shadow-lg group-hover:scale-105 transition-all duration-200">
          <div class="bg-gradient-to-br {{ link.kind.gradient() }} rounded-xl p-1">
            <div class="flex items-center gap-3 bg-white rounded-lg p-4">
              <div class="flex-shrink-0 w-10 h-10 flex items-center justify-center rounded-lg bg-white shadow-sm">
                <i class="fas fa-{{ link.kind.icon() }} text-{{ link.kind.color() }}-500 text-lg"></i>
              </div>
              <div class="min-w-0 flex-1">
                <h4 class="font-semibold text-gray-800 text-sm mb-1">{{ link.kind.title() }}</h4>
                <span class="text-xs text-gray-600 break-all group-hover:text-{{ link.kind.color() }}-600 transition-colors">
                  {{ link.label }} <i class="fas fa-external-link-alt ml-1 opacity-50"></i>
                </span>
              </div>
            </div>
          </div>
        </div>
      </a>
      <div class="tooltip">{{ link.kind.tooltip() }}</div>
    </div>
    {% endfor %}
  </div>
</article>
{% endfor %}
{% endmatch %}"#,
    ext = "html"
)]
struct ResultsTemplate<'a> {
    state: &'a ViewState,
}

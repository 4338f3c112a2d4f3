// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2026 SpyEdge contributors

//! Web dashboard for SpyEdge
//!
//! Server-rendered pages plus a JSON API over one shared [`AdStore`]. All
//! collaborator failures degrade at this boundary: handlers answer with empty
//! or `failed` states, never with a crash.

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::catalog::{Ad, CategoryCount, CategoryFilter, PlatformFilter, Region};
use crate::config::AppConfig;
use crate::export::{project_snapshot, snapshot_filename};
use crate::intel::IntelSource;
use crate::store::{AdStore, FetchStatus, Selection};
use crate::Result;

/// Shared application state
pub struct AppState {
    pub store: RwLock<AdStore>,
    pub intel: Arc<dyn IntelSource>,
    pub config: AppConfig,
}

/// Create the web application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Pages
        .route("/", get(index_page))
        // API endpoints
        .route("/api/state", get(api_state))
        .route("/api/ads", get(api_get_ads))
        .route("/api/categories", get(api_get_categories))
        .route("/api/search", post(api_search))
        .route("/api/filters", post(api_set_filters))
        .route("/api/ads/:id/analyze", post(api_analyze))
        .route("/api/selection", delete(api_clear_selection))
        .route("/api/export", get(api_export))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// === API types ===

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    query: String,
    region: Option<Region>,
}

#[derive(Serialize)]
struct SearchOutcome {
    committed: bool,
    status: FetchStatus,
    total: usize,
}

#[derive(Deserialize)]
struct FilterRequest {
    platform: Option<String>,
    category: Option<String>,
}

#[derive(Serialize)]
struct StateSnapshot {
    region: Region,
    query: String,
    search_status: FetchStatus,
    platform_filter: String,
    category_filter: String,
    total: usize,
    visible: Vec<Ad>,
    categories: Vec<CategoryCount>,
    selection: Selection,
}

fn snapshot(store: &AdStore) -> StateSnapshot {
    StateSnapshot {
        region: store.region(),
        query: store.query().to_string(),
        search_status: store.search_status(),
        platform_filter: store.platform_filter().label().to_string(),
        category_filter: store.category_filter().label().to_string(),
        total: store.ads().len(),
        visible: store.visible_ads().into_iter().cloned().collect(),
        categories: store.categories(),
        selection: store.selection().clone(),
    }
}

// === API Handlers ===

async fn api_state(State(state): State<Arc<AppState>>) -> Json<StateSnapshot> {
    let store = state.store.read().await;
    Json(snapshot(&store))
}

async fn api_get_ads(State(state): State<Arc<AppState>>) -> Json<Vec<Ad>> {
    let store = state.store.read().await;
    Json(store.visible_ads().into_iter().cloned().collect())
}

async fn api_get_categories(State(state): State<Arc<AppState>>) -> Json<Vec<CategoryCount>> {
    let store = state.store.read().await;
    Json(store.categories())
}

/// Run one mining cycle: issue a ticket, await the collaborator, commit.
/// A stale ticket (another search started meanwhile) commits nothing.
async fn api_search(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SearchRequest>,
) -> Json<SearchOutcome> {
    let (ticket, region) = {
        let mut store = state.store.write().await;
        let region = request.region.unwrap_or_else(|| store.region());
        (store.begin_search(&request.query, region), region)
    };

    let outcome = state.intel.mine_ads(&request.query, region).await;

    let mut store = state.store.write().await;
    let committed = store.commit_search(ticket, outcome);
    Json(SearchOutcome {
        committed,
        status: store.search_status(),
        total: store.ads().len(),
    })
}

async fn api_set_filters(
    State(state): State<Arc<AppState>>,
    Json(request): Json<FilterRequest>,
) -> Json<StateSnapshot> {
    let mut store = state.store.write().await;
    if let Some(platform) = request.platform {
        store.set_platform_filter(PlatformFilter::parse(&platform));
    }
    if let Some(category) = request.category {
        store.set_category_filter(CategoryFilter::parse(&category));
    }
    Json(snapshot(&store))
}

async fn api_analyze(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let ticket = {
        let mut store = state.store.write().await;
        store.select(&id)
    };
    let Some(ticket) = ticket else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let outcome = state.intel.analyze_ad(&ticket.ad).await;

    let mut store = state.store.write().await;
    let committed = store.commit_analysis(&ticket, outcome);
    Json(serde_json::json!({
        "committed": committed,
        "selection": store.selection(),
    }))
    .into_response()
}

async fn api_clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    let mut store = state.store.write().await;
    store.clear_selection();
    StatusCode::NO_CONTENT
}

async fn api_export(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let store = state.store.read().await;
    match store.ready_analysis() {
        Some((ad, analysis)) => {
            let disposition = format!(
                "attachment; filename=\"{}\"",
                snapshot_filename(&ad.title)
            );
            (
                [(header::CONTENT_DISPOSITION, disposition)],
                Json(project_snapshot(ad, analysis)),
            )
                .into_response()
        }
        None => StatusCode::CONFLICT.into_response(),
    }
}

// === Page Handlers ===

async fn index_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let store = state.store.read().await;
    Html(render_dashboard(&snapshot(&store), &state.config))
}

// === Template Rendering ===

const STYLE: &str = r#"
:root {
    --bg-primary: #070b14;
    --bg-secondary: #0a0f1d;
    --bg-card: #101830;
    --text-primary: #e2e8f0;
    --text-secondary: #64748b;
    --accent: #6366f1;
    --accent-hover: #818cf8;
    --hot: #f43f5e;
    --border: #1e293b;
}
* { box-sizing: border-box; margin: 0; padding: 0; }
body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    background: var(--bg-primary);
    color: var(--text-primary);
    line-height: 1.6;
}
nav {
    background: var(--bg-secondary);
    padding: 15px 25px;
    display: flex;
    align-items: center;
    gap: 25px;
    border-bottom: 1px solid var(--border);
}
nav .logo { font-size: 1.4em; font-weight: 800; font-style: italic; color: var(--accent); text-decoration: none; }
nav input {
    flex: 1; max-width: 480px;
    background: var(--bg-card); color: var(--text-primary);
    border: 1px solid var(--border); border-radius: 8px; padding: 9px 14px;
}
nav select, nav button, .pill {
    background: var(--bg-card); color: var(--text-primary);
    border: 1px solid var(--border); border-radius: 8px; padding: 8px 14px; cursor: pointer;
}
nav button.primary { background: var(--accent); border-color: var(--accent); font-weight: 700; }
nav button.primary:hover { background: var(--accent-hover); }
.pill.active { background: var(--accent); border-color: var(--accent); }
.layout { display: grid; grid-template-columns: 260px 1fr; gap: 20px; padding: 20px; max-width: 1500px; margin: 0 auto; }
.sidebar .card, .content .card { background: var(--bg-card); border: 1px solid var(--border); border-radius: 12px; padding: 16px; margin-bottom: 16px; }
.sidebar h2 { font-size: 0.75em; text-transform: uppercase; letter-spacing: 0.15em; color: var(--text-secondary); margin-bottom: 10px; }
.cat { display: flex; justify-content: space-between; padding: 7px 10px; border-radius: 8px; cursor: pointer; color: var(--text-secondary); }
.cat:hover { background: rgba(255,255,255,0.05); color: var(--text-primary); }
.cat.active { color: var(--accent); background: rgba(99,102,241,0.1); }
.cat .count { background: rgba(255,255,255,0.06); border-radius: 6px; padding: 0 8px; font-size: 0.8em; }
.grid { display: grid; grid-template-columns: repeat(auto-fill, minmax(240px, 1fr)); gap: 16px; }
.ad img { width: 100%; aspect-ratio: 4/3; object-fit: cover; border-radius: 8px; background: var(--bg-secondary); }
.ad h3 { font-size: 1em; margin: 8px 0 4px; }
.badge { display: inline-block; font-size: 0.7em; font-weight: 700; text-transform: uppercase; border-radius: 6px; padding: 2px 8px; background: rgba(255,255,255,0.08); margin-right: 6px; }
.badge.hot { background: var(--hot); color: white; }
.badge.winner { background: var(--accent); color: white; }
.metrics { color: var(--text-secondary); font-size: 0.85em; }
.actions { display: flex; gap: 8px; margin-top: 10px; }
.actions a, .actions button {
    flex: 1; text-align: center; text-decoration: none; font-size: 0.85em;
    background: var(--bg-secondary); color: var(--text-primary);
    border: 1px solid var(--border); border-radius: 8px; padding: 7px; cursor: pointer;
}
.actions button.primary { background: var(--accent); border-color: var(--accent); font-weight: 700; }
.panel h3 { margin-bottom: 8px; }
.panel .slot { background: var(--bg-secondary); border: 1px solid var(--border); border-radius: 8px; padding: 10px; margin: 8px 0; }
.panel .slot .name { font-size: 0.7em; font-weight: 700; text-transform: uppercase; color: var(--accent); }
.interest { display: inline-block; border: 1px solid var(--accent); color: var(--accent); border-radius: 8px; padding: 2px 10px; font-size: 0.8em; margin: 2px; }
.empty { color: var(--text-secondary); font-style: italic; padding: 30px; text-align: center; }
.status { font-size: 0.8em; color: var(--text-secondary); margin-bottom: 12px; }
.status.failed { color: var(--hot); }
footer { grid-column: 1 / -1; color: var(--text-secondary); font-size: 0.75em; padding: 10px 0; border-top: 1px solid var(--border); }
"#;

const SCRIPT: &str = r#"
async function postJson(url, body) {
    await fetch(url, {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify(body || {}),
    });
    location.reload();
}
function runSearch() {
    postJson('/api/search', {
        query: document.getElementById('q').value,
        region: document.getElementById('region').value,
    });
}
function setPlatform(value) { postJson('/api/filters', { platform: value }); }
function setCategory(value) { postJson('/api/filters', { category: value }); }
function analyzeAd(id) { postJson('/api/ads/' + encodeURIComponent(id) + '/analyze'); }
async function clearSelection() {
    await fetch('/api/selection', { method: 'DELETE' });
    location.reload();
}
document.addEventListener('keydown', function (e) {
    if (e.key === 'Enter' && document.activeElement && document.activeElement.id === 'q') {
        runSearch();
    }
});
"#;

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn base_template(snapshot: &StateSnapshot, content: &str) -> String {
    let nacional = if snapshot.region == Region::Nacional { "selected" } else { "" };
    let internacional = if snapshot.region == Region::Internacional { "selected" } else { "" };
    let platform_pill = |value: &str, label: &str| {
        let active = if snapshot.platform_filter == value { " active" } else { "" };
        format!(
            r#"<button class="pill{}" onclick="setPlatform('{}')">{}</button>"#,
            active, value, label
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>SpyEdge</title>
    <style>{style}</style>
</head>
<body>
    <nav>
        <a href="/" class="logo">SpyEdge</a>
        <input id="q" type="text" placeholder="Refinar busca por palavra-chave..." value="{query}">
        <select id="region">
            <option value="Nacional" {nacional}>Brasil / LATAM</option>
            <option value="Internacional" {internacional}>Internacional</option>
        </select>
        {all}{tiktok}{meta}{instagram}
        <button class="primary" onclick="runSearch()">Minerar Agora</button>
    </nav>
    <main class="layout">
        {content}
    </main>
    <script>{script}</script>
</body>
</html>"#,
        style = STYLE,
        query = escape_html(&snapshot.query),
        nacional = nacional,
        internacional = internacional,
        all = platform_pill("ALL", "ALL"),
        tiktok = platform_pill("TIKTOK", "TikTok"),
        meta = platform_pill("FACEBOOK", "Meta"),
        instagram = platform_pill("INSTAGRAM", "Instagram"),
        content = content,
        script = SCRIPT,
    )
}

fn render_sidebar(snapshot: &StateSnapshot) -> String {
    let all_active = if snapshot.category_filter == "ALL" { " active" } else { "" };
    let mut items = format!(
        r#"<div class="cat{}" onclick="setCategory('ALL')"><span>Ver Tudo</span><span class="count">{}</span></div>"#,
        all_active, snapshot.total
    );

    if snapshot.categories.is_empty() {
        items.push_str(r#"<div class="empty">Aguardando detecção...</div>"#);
    } else {
        for cat in &snapshot.categories {
            let active = if snapshot.category_filter == cat.name { " active" } else { "" };
            items.push_str(&format!(
                r#"<div class="cat{}" onclick="setCategory('{}')"><span>{}</span><span class="count">{}</span></div>"#,
                active,
                escape_html(&cat.name),
                escape_html(&cat.name),
                cat.count
            ));
        }
    }

    format!(
        r#"<aside class="sidebar">
            <div class="card">
                <h2>Categorias Encontradas</h2>
                {}
            </div>
        </aside>"#,
        items
    )
}

fn render_ad_card(ad: &Ad) -> String {
    let trend_class = match ad.trend_score.as_str() {
        "HOT" => "badge hot",
        _ => "badge",
    };
    let winner = if ad.is_winner {
        r#"<span class="badge winner">Winner</span>"#
    } else {
        ""
    };

    format!(
        r#"<div class="card ad">
            <img src="{thumb}" alt="" loading="lazy">
            <div>
                <span class="{trend_class}">{trend}</span>
                <span class="badge">{platform}</span>
                {winner}
            </div>
            <h3>{title}</h3>
            <p class="metrics">{category} · {days} dias ativo</p>
            <p class="metrics">{likes} likes · {comments} comentários · {clicks} cliques est.</p>
            <div class="actions">
                <a href="{source}" target="_blank" rel="noopener">Fonte</a>
                <button class="primary" onclick="analyzeAd('{id}')">Analisar</button>
            </div>
        </div>"#,
        thumb = escape_html(&ad.thumbnail),
        trend_class = trend_class,
        trend = ad.trend_score.as_str(),
        platform = escape_html(&ad.platform),
        winner = winner,
        title = escape_html(&ad.title),
        category = escape_html(&ad.category),
        days = ad.active_days,
        likes = ad.metrics.likes,
        comments = ad.metrics.comments,
        clicks = ad.metrics.estimated_clicks,
        source = escape_html(&ad.source_url),
        id = escape_html(&ad.id),
    )
}

fn render_selection_panel(selection: &Selection) -> String {
    match selection {
        Selection::Idle => String::new(),
        Selection::Loading { ad } => format!(
            r#"<div class="card panel">
                <h3>Inteligência de Produto — {}</h3>
                <p class="empty">Gerando engenharia reversa...</p>
            </div>"#,
            escape_html(&ad.title)
        ),
        Selection::Failed { ad } => format!(
            r#"<div class="card panel">
                <h3>Inteligência de Produto — {}</h3>
                <p class="empty">Nenhuma análise disponível.</p>
                <div class="actions"><button onclick="clearSelection()">Fechar</button></div>
            </div>"#,
            escape_html(&ad.title)
        ),
        Selection::Ready { ad, analysis } => {
            let copies: String = analysis
                .improved_copies
                .iter()
                .map(|(slot, text)| {
                    format!(
                        r#"<div class="slot"><span class="name">{}</span><p>{}</p></div>"#,
                        escape_html(&slot.replace('_', " ")),
                        escape_html(text)
                    )
                })
                .collect();
            let interests: String = analysis
                .targeting
                .interests
                .iter()
                .map(|i| format!(r#"<span class="interest">{}</span>"#, escape_html(i)))
                .collect();

            format!(
                r#"<div class="card panel">
                    <h3>Inteligência de Produto — {title}</h3>
                    <p>{analysis}</p>
                    <h3>Novos Criativos Sugeridos</h3>
                    {copies}
                    <h3>Público Alvo Estimado</h3>
                    <div>{interests}</div>
                    <div class="actions">
                        <a href="/api/export">Baixar Projeto de Escala</a>
                        <button onclick="clearSelection()">Fechar</button>
                    </div>
                </div>"#,
                title = escape_html(&ad.title),
                analysis = escape_html(&analysis.analysis_text),
                copies = copies,
                interests = interests,
            )
        }
    }
}

fn render_dashboard(snapshot: &StateSnapshot, config: &AppConfig) -> String {
    let status = match snapshot.search_status {
        FetchStatus::Idle => r#"<p class="status">Pronto para minerar.</p>"#.to_string(),
        FetchStatus::Loading => r#"<p class="status">Minerando...</p>"#.to_string(),
        FetchStatus::Ready => format!(
            r#"<p class="status">{} anúncios minerados em {}.</p>"#,
            snapshot.total,
            snapshot.region.as_str()
        ),
        FetchStatus::Failed => {
            r#"<p class="status failed">A mineração falhou; nenhum resultado disponível.</p>"#
                .to_string()
        }
    };

    let grid = if snapshot.visible.is_empty() {
        r#"<div class="empty">Nenhum dado encontrado para os filtros atuais.</div>"#.to_string()
    } else {
        let cards: String = snapshot.visible.iter().map(render_ad_card).collect();
        format!(r#"<div class="grid">{}</div>"#, cards)
    };

    let content = format!(
        r#"{sidebar}
        <section class="content">
            {panel}
            {status}
            {grid}
        </section>"#,
        sidebar = render_sidebar(snapshot),
        panel = render_selection_panel(&snapshot.selection),
        status = status,
        grid = grid,
    );

    let footer = format!(
        r#"<footer>Colaborador: {} · {}</footer>"#,
        escape_html(&config.collaborator.model),
        escape_html(&config.collaborator.api_url),
    );

    base_template(snapshot, &format!("{}{}", content, footer))
}

/// Start the web server
pub async fn start_server(config: AppConfig, intel: Arc<dyn IntelSource>) -> Result<()> {
    let state = Arc::new(AppState {
        store: RwLock::new(AdStore::new(Region::Nacional)),
        intel,
        config: config.clone(),
    });

    let addr = format!("{}:{}", config.web.host, config.web.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("Dashboard available at http://{}", addr);

    let router = create_router(state);
    axum::serve(listener, router)
        .await
        .map_err(|e| crate::SpyEdgeError::Config(format!("Server error: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AdMetrics, Analysis, TrendScore};
    use crate::SpyEdgeError;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    struct StubIntel {
        ads: Vec<Ad>,
        analysis: Option<Analysis>,
        fail_mining: bool,
    }

    #[async_trait]
    impl IntelSource for StubIntel {
        async fn mine_ads(&self, _query: &str, _region: Region) -> crate::Result<Vec<Ad>> {
            if self.fail_mining {
                return Err(SpyEdgeError::CollaboratorUnavailable("down".to_string()));
            }
            Ok(self.ads.clone())
        }

        async fn analyze_ad(&self, _ad: &Ad) -> crate::Result<Analysis> {
            self.analysis
                .clone()
                .ok_or_else(|| SpyEdgeError::CollaboratorUnavailable("down".to_string()))
        }
    }

    fn sample_ad(id: &str) -> Ad {
        Ad {
            id: id.to_string(),
            platform: "TikTok Ads".to_string(),
            title: "Viral Gadget Pro".to_string(),
            description: String::new(),
            category: "GADGETS".to_string(),
            trend_score: TrendScore::Hot,
            active_days: 9,
            source_url: "https://example.com".to_string(),
            thumbnail: "https://example.com/t.jpg".to_string(),
            metrics: AdMetrics::default(),
            region: Region::Nacional,
            is_winner: true,
            product_urls: Vec::new(),
        }
    }

    fn sample_analysis() -> Analysis {
        Analysis {
            analysis_text: "Dobre o CTR com prova social.".to_string(),
            ..Analysis::default()
        }
    }

    fn test_router(stub: StubIntel) -> Router {
        let state = Arc::new(AppState {
            store: RwLock::new(AdStore::new(Region::Nacional)),
            intel: Arc::new(stub),
            config: AppConfig::default(),
        });
        create_router(state)
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        serde_json::from_slice(&bytes).expect("json")
    }

    #[tokio::test]
    async fn dashboard_page_renders() {
        let router = test_router(StubIntel { ads: vec![], analysis: Some(sample_analysis()), fail_mining: false });
        let response = router
            .oneshot(Request::builder().uri("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn search_commits_mined_ads() {
        let router = test_router(StubIntel {
            ads: vec![sample_ad("ad-1")],
            analysis: Some(sample_analysis()),
            fail_mining: false,
        });

        let response = router
            .clone()
            .oneshot(post_json("/api/search", r#"{"query":"gadgets"}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["committed"], true);
        assert_eq!(outcome["status"], "ready");
        assert_eq!(outcome["total"], 1);
    }

    #[tokio::test]
    async fn failed_mining_degrades_to_empty_failed_state() {
        let router = test_router(StubIntel { ads: vec![], analysis: None, fail_mining: true });

        let response = router
            .oneshot(post_json("/api/search", r#"{"query":""}"#))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["status"], "failed");
        assert_eq!(outcome["total"], 0);
    }

    #[tokio::test]
    async fn analyze_unknown_ad_is_not_found() {
        let router = test_router(StubIntel { ads: vec![], analysis: Some(sample_analysis()), fail_mining: false });
        let response = router
            .oneshot(post_json("/api/ads/missing/analyze", "{}"))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn export_without_ready_analysis_conflicts() {
        let router = test_router(StubIntel { ads: vec![], analysis: Some(sample_analysis()), fail_mining: false });
        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/export")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn search_analyze_export_flow() {
        let router = test_router(StubIntel {
            ads: vec![sample_ad("ad-1")],
            analysis: Some(sample_analysis()),
            fail_mining: false,
        });

        let response = router
            .clone()
            .oneshot(post_json("/api/search", r#"{"query":"","region":"Nacional"}"#))
            .await
            .expect("search response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(post_json("/api/ads/ad-1/analyze", "{}"))
            .await
            .expect("analyze response");
        assert_eq!(response.status(), StatusCode::OK);
        let outcome = body_json(response).await;
        assert_eq!(outcome["committed"], true);
        assert_eq!(outcome["selection"]["state"], "ready");

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/export")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("export response");
        assert_eq!(response.status(), StatusCode::OK);
        let disposition = response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .expect("disposition")
            .to_str()
            .expect("ascii");
        assert!(disposition.contains("SpyEdge_Viral_Gadget_Pro.json"));
        let body = body_json(response).await;
        assert_eq!(body["produto"], "Viral Gadget Pro");
        assert_eq!(body["analise"]["analysis"], "Dobre o CTR com prova social.");
    }

    #[tokio::test]
    async fn filters_narrow_visible_ads() {
        let mut facebook = sample_ad("ad-2");
        facebook.platform = "Facebook Ads".to_string();
        facebook.category = "PET".to_string();
        let router = test_router(StubIntel {
            ads: vec![sample_ad("ad-1"), facebook],
            analysis: Some(sample_analysis()),
            fail_mining: false,
        });

        router
            .clone()
            .oneshot(post_json("/api/search", r#"{"query":""}"#))
            .await
            .expect("search response");

        let response = router
            .clone()
            .oneshot(post_json("/api/filters", r#"{"platform":"TIKTOK"}"#))
            .await
            .expect("filter response");
        let state = body_json(response).await;
        assert_eq!(state["visible"].as_array().expect("array").len(), 1);
        assert_eq!(state["visible"][0]["id"], "ad-1");
        assert_eq!(state["total"], 2);
    }
}

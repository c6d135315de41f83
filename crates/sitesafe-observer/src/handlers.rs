//! REST API endpoint handlers for the Observer server.
//!
//! All handlers read from the in-memory [`SiteSnapshot`] via the shared
//! [`AppState`]. While an edit is in progress the snapshot carries the
//! draft geometry, so the dashboard shows what the user is editing.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/` | Minimal HTML status page |
//! | `GET` | `/api/site` | Full site snapshot |
//! | `GET` | `/api/assets` | List assets (optionally by section) |
//! | `GET` | `/api/assets/{id}` | Get single asset |
//! | `GET` | `/api/zones` | Danger zones |
//! | `GET` | `/api/risk` | Per-section risk |
//!
//! [`SiteSnapshot`]: sitesafe_types::SiteSnapshot

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse};
use sitesafe_core::risk::workers_in_danger;
use sitesafe_types::{AssetId, Status};

use crate::error::ObserverError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query parameter structs
// ---------------------------------------------------------------------------

/// Query parameters for the `GET /api/assets` endpoint.
#[derive(Debug, serde::Deserialize)]
pub struct AssetsQuery {
    /// Only return assets of this section.
    pub section: Option<String>,
}

// ---------------------------------------------------------------------------
// GET / -- minimal HTML status page
// ---------------------------------------------------------------------------

/// Serve a minimal HTML page showing site status and API links.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let snapshot = state.snapshot.read().await;
    let tick = snapshot.tick;
    let asset_count = snapshot.assets.len();
    let zone_count = snapshot.zones.len();
    let section_count = snapshot.sections.len();
    let in_danger = snapshot
        .assets
        .iter()
        .filter(|a| a.status == Status::Danger)
        .count();
    let mode = if snapshot.editing_sections {
        "EDITING SECTIONS"
    } else if snapshot.editing_zones {
        "EDITING ZONES"
    } else {
        "MONITORING"
    };

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Site Safety Observer</title>
    <style>
        body {{
            background: #0d1117;
            color: #c9d1d9;
            font-family: 'Cascadia Code', 'Fira Code', 'Consolas', monospace;
            padding: 2rem;
            max-width: 800px;
            margin: 0 auto;
        }}
        h1 {{ color: #f0883e; margin-bottom: 0.25rem; }}
        .subtitle {{ color: #8b949e; margin-top: 0; }}
        .metric {{
            display: inline-block;
            background: #161b22;
            border: 1px solid #30363d;
            border-radius: 6px;
            padding: 1rem 1.5rem;
            margin: 0.5rem 0.5rem 0.5rem 0;
            min-width: 120px;
        }}
        .metric .label {{ color: #8b949e; font-size: 0.85rem; }}
        .metric .value {{ color: #f0883e; font-size: 1.5rem; font-weight: bold; }}
        .danger {{ color: #f85149; }}
        a {{ color: #58a6ff; text-decoration: none; }}
        a:hover {{ text-decoration: underline; }}
        ul {{ list-style: none; padding: 0; }}
        li {{ padding: 0.3rem 0; }}
        .status {{ color: #3fb950; font-weight: bold; }}
        hr {{ border: none; border-top: 1px solid #30363d; margin: 1.5rem 0; }}
    </style>
</head>
<body>
    <h1>Site Safety Observer</h1>
    <p class="subtitle">Construction asset tracking and danger-zone monitoring</p>

    <p>Mode: <span class="status">{mode}</span></p>

    <div>
        <div class="metric">
            <div class="label">Tick</div>
            <div class="value">{tick}</div>
        </div>
        <div class="metric">
            <div class="label">Assets</div>
            <div class="value">{asset_count}</div>
        </div>
        <div class="metric">
            <div class="label">Sections</div>
            <div class="value">{section_count}</div>
        </div>
        <div class="metric">
            <div class="label">Danger Zones</div>
            <div class="value">{zone_count}</div>
        </div>
        <div class="metric">
            <div class="label">Workers in Danger</div>
            <div class="value danger">{in_danger}</div>
        </div>
    </div>

    <hr>

    <h2>API Endpoints</h2>
    <ul>
        <li>GET <a href="/api/site">/api/site</a> -- Full site snapshot</li>
        <li>GET <a href="/api/assets">/api/assets</a> -- List assets (?section=NAME)</li>
        <li>GET /api/assets/{{id}} -- Single asset</li>
        <li>GET <a href="/api/zones">/api/zones</a> -- Danger zones</li>
        <li>GET <a href="/api/risk">/api/risk</a> -- Per-section risk</li>
        <li>POST /api/commands -- Queue a site command</li>
        <li>GET <a href="/api/operator/status">/api/operator/status</a> -- Scheduler status</li>
    </ul>

    <h2>WebSocket</h2>
    <ul>
        <li><code>ws://host:port/ws/ticks</code> -- Live tick summary stream</li>
    </ul>
</body>
</html>"#
    ))
}

// ---------------------------------------------------------------------------
// GET /api/site -- full snapshot
// ---------------------------------------------------------------------------

/// Return everything the dashboard draws: assets, zones, sections, area,
/// risk and the active edit mode.
pub async fn get_site(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;
    Ok(Json(serde_json::to_value(&*snapshot)?))
}

// ---------------------------------------------------------------------------
// GET /api/assets -- list assets
// ---------------------------------------------------------------------------

/// List assets, optionally restricted to one section.
///
/// # Query Parameters
///
/// - `section`: section name (default: all sections)
pub async fn list_assets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AssetsQuery>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;

    let assets: Vec<_> = snapshot
        .assets
        .iter()
        .filter(|a| params.section.as_ref().is_none_or(|s| a.section == *s))
        .collect();

    Ok(Json(serde_json::json!({
        "count": assets.len(),
        "assets": assets,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/assets/{id} -- single asset
// ---------------------------------------------------------------------------

/// Return a single asset by its numeric identifier.
pub async fn get_asset(
    State(state): State<Arc<AppState>>,
    Path(id_str): Path<String>,
) -> Result<impl IntoResponse, ObserverError> {
    let id = parse_asset_id(&id_str)?;
    let snapshot = state.snapshot.read().await;

    let asset = snapshot
        .assets
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| ObserverError::NotFound(format!("asset {id}")))?;

    Ok(Json(serde_json::to_value(asset)?))
}

// ---------------------------------------------------------------------------
// GET /api/zones -- danger zones
// ---------------------------------------------------------------------------

/// List danger zones. During zone editing these are the draft polygons.
pub async fn list_zones(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;

    Ok(Json(serde_json::json!({
        "count": snapshot.zones.len(),
        "editing": snapshot.editing_zones,
        "zones": snapshot.zones,
    })))
}

// ---------------------------------------------------------------------------
// GET /api/risk -- per-section risk
// ---------------------------------------------------------------------------

/// Return the share of workers in danger per section, plus site totals.
pub async fn get_risk(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, ObserverError> {
    let snapshot = state.snapshot.read().await;

    let workers = snapshot
        .risk
        .iter()
        .fold(0_u32, |acc, r| acc.saturating_add(r.workers));
    let workers_in_danger = workers_in_danger(&snapshot.risk);

    Ok(Json(serde_json::json!({
        "tick": snapshot.tick,
        "workers": workers,
        "workers_in_danger": workers_in_danger,
        "sections": snapshot.risk,
    })))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_asset_id(s: &str) -> Result<AssetId, ObserverError> {
    s.parse::<u32>()
        .map(AssetId::new)
        .map_err(|e| ObserverError::InvalidQuery(format!("invalid asset id {s}: {e}")))
}

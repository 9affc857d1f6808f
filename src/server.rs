// Serving mode: JSON data endpoint plus the bundled preview page.

use crate::aggregator::{Aggregator, Snapshot};
use crate::error::Error;
use crate::output::json::entries_to_json;
use crate::sort::SortField;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::{Router, routing::get};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

const PREVIEW_PAGE: &str = include_str!("../assets/index.html");

#[derive(Debug, Default, Deserialize)]
pub struct DataQuery {
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub refresh: Option<String>,
}

pub fn app(aggregator: Arc<Aggregator>) -> Router {
    Router::new()
        .route("/", get(preview_handler)) // GET /
        .route("/data", get(data_handler)) // GET /data?sort=&refresh=
        .with_state(aggregator)
}

pub async fn serve(aggregator: Arc<Aggregator>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Serving status on http://{}", addr);
    axum::serve(listener, app(aggregator)).await?;
    Ok(())
}

async fn preview_handler() -> Html<&'static str> {
    Html(PREVIEW_PAGE)
}

/// GET /data: current snapshot as HTML-escaped JSON, optionally re-fetched
/// (`refresh=true`) and/or re-sorted (`sort=<field>`) first.
async fn data_handler(
    State(aggregator): State<Arc<Aggregator>>,
    Query(query): Query<DataQuery>,
) -> Response {
    let sort = query
        .sort
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(SortField::parse_lossy);

    let snapshot = if query.refresh.as_deref() == Some("true") {
        match aggregator.refresh(sort).await {
            Ok(snapshot) => snapshot,
            Err(Error::NoEndpoints) => {
                log::warn!("Refresh resolved no endpoints, keeping previous snapshot");
                current_sorted(&aggregator, sort).await
            }
            Err(e) => {
                log::error!("Refresh failed: {}", e);
                current_sorted(&aggregator, sort).await
            }
        }
    } else {
        current_sorted(&aggregator, sort).await
    };

    match entries_to_json(&snapshot.entries) {
        Ok(body) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(e) => {
            log::error!("Failed to serialize snapshot: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn current_sorted(aggregator: &Aggregator, sort: Option<SortField>) -> Arc<Snapshot> {
    match sort {
        Some(field) => aggregator.resort(field).await,
        None => aggregator.current().await,
    }
}

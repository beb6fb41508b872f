use axum::extract::State;
use axum::{routing::get, Json, Router};
use djumblelog_db::repositories::EntryRepo;
use djumblelog_events::SignalKind;
use serde::Serialize;

use crate::state::AppState;

/// Health check response payload.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the journal table cannot be read.
    pub status: &'static str,
    pub version: &'static str,
    pub journal: JournalHealth,
}

/// What the journal is wired to and how much it holds.
#[derive(Serialize)]
pub struct JournalHealth {
    /// Registered content types.
    pub content_types: usize,
    /// Types whose creation logs an entry.
    pub tracked_create: Vec<String>,
    /// Types whose deletion removes their entries.
    pub tracked_delete: Vec<String>,
    /// Total entries, `null` when the count query failed.
    pub entries: Option<i64>,
}

/// GET /health -- journal wiring and entry count.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let entries = match EntryRepo::count(&state.pool, None).await {
        Ok(count) => Some(count),
        Err(e) => {
            tracing::warn!(error = %e, "Health check could not count entries");
            None
        }
    };

    let tracked = |kind| {
        state
            .signals
            .senders(kind)
            .iter()
            .map(|ct| ct.identifier())
            .collect::<Vec<_>>()
    };

    Json(HealthResponse {
        status: if entries.is_some() { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        journal: JournalHealth {
            content_types: state.registry().content_types().len(),
            tracked_create: tracked(SignalKind::PostSave),
            tracked_delete: tracked(SignalKind::PreDelete),
            entries,
        },
    })
}

/// Mount health check routes (intended for root-level, NOT under `/api/v1`).
pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

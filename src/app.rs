use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Deserialize;
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tower_http::services::ServeDir;

use crate::callbacks::{Region, RegionUpdate, SelectionBus, SelectionChanged};
use crate::config::DashboardConfig;
use crate::layout::DashboardLayout;
use crate::survey::SurveyTable;

/// Shared, read-only state of a running dashboard
pub struct AppState {
    survey: SurveyTable,
    layout: DashboardLayout,
    bus: SelectionBus,
    debug: bool,
}

impl AppState {
    /// State for a filtered survey with the default chart and word-cloud handlers
    pub fn new(survey: SurveyTable, debug: bool) -> Self {
        let layout = DashboardLayout::from_table(&survey);
        AppState {
            survey,
            layout,
            bus: SelectionBus::default(),
            debug,
        }
    }
}

pub type SharedState = Arc<AppState>;

#[derive(Debug, Default, Deserialize)]
struct UpdateQuery {
    column: Option<String>,
}

impl From<UpdateQuery> for SelectionChanged {
    fn from(query: UpdateQuery) -> Self {
        SelectionChanged {
            column: query.column,
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    /// Internal failure; the detail is only exposed in debug mode
    fn internal(detail: impl Into<String>, debug: bool) -> Self {
        let detail = detail.into();
        log::error!("Request failed: {}", detail);
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: if debug {
                detail
            } else {
                "Internal server error".to_string()
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let payload = serde_json::json!({ "status": "error", "message": self.message });
        (self.status, Json(payload)).into_response()
    }
}

/// Builds the dashboard router
///
/// # Arguments
/// * `state` - The shared dashboard state
/// * `assets_dir` - Directory served under `/assets`
pub fn build_router(state: SharedState, assets_dir: impl AsRef<FsPath>) -> Router {
    Router::new()
        .route("/", get(serve_page))
        .route("/api/layout", get(get_layout))
        .route("/api/update", get(update_all))
        .route("/api/update/:region", get(update_region))
        .nest_service("/assets", ServeDir::new(assets_dir.as_ref()))
        .with_state(state)
}

/// Serves the dashboard until Ctrl-C or SIGTERM
///
/// # Arguments
/// * `config` - Bind address, assets directory and debug flag
/// * `survey` - The filtered survey
pub async fn run(
    config: &DashboardConfig,
    survey: SurveyTable,
) -> Result<(), Box<dyn std::error::Error>> {
    let state = Arc::new(AppState::new(survey, config.debug));
    let app = build_router(state, &config.assets_dir);

    let listener = TcpListener::bind(config.bind_addr).await?;
    log::info!("Dashboard running on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Dashboard stopped");

    Ok(())
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

async fn serve_page(State(state): State<SharedState>) -> Result<Html<String>, ApiError> {
    state
        .layout
        .render_html()
        .map(Html)
        .map_err(|e| ApiError::internal(e.to_string(), state.debug))
}

async fn get_layout(State(state): State<SharedState>) -> Json<DashboardLayout> {
    Json(state.layout.clone())
}

async fn update_all(
    State(state): State<SharedState>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<Vec<RegionUpdate>>, ApiError> {
    let event = SelectionChanged::from(query);
    log::info!("Selection changed: {:?}", event.column);

    let debug = state.debug;
    let updates = tokio::task::spawn_blocking(move || {
        state
            .bus
            .publish(&state.survey, &event)
            .map_err(|e| e.to_string())
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string(), debug))?
    .map_err(|e| ApiError::internal(e, debug))?;

    Ok(Json(updates))
}

async fn update_region(
    State(state): State<SharedState>,
    Path(region): Path<String>,
    Query(query): Query<UpdateQuery>,
) -> Result<Json<RegionUpdate>, ApiError> {
    let region = match region.as_str() {
        "chart" => Region::Chart,
        "wordcloud" => Region::WordCloud,
        other => return Err(ApiError::not_found(format!("Unknown region: {}", other))),
    };
    let event = SelectionChanged::from(query);
    log::info!("Selection changed: {:?} ({:?} only)", event.column, region);

    let debug = state.debug;
    let update = tokio::task::spawn_blocking(move || {
        state
            .bus
            .publish_to(region, &state.survey, &event)
            .map(|result| result.map_err(|e| e.to_string()))
    })
    .await
    .map_err(|e| ApiError::internal(e.to_string(), debug))?;

    match update {
        Some(Ok(update)) => Ok(Json(update)),
        Some(Err(e)) => Err(ApiError::internal(e, debug)),
        None => Err(ApiError::not_found(format!("No handler for {:?}", region))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callbacks::{RegionHandler, WordCloudPanel};
    use axum::{body, body::Body, http::Request};
    use std::error::Error;
    use tower::ServiceExt;

    struct Failing;

    impl RegionHandler for Failing {
        fn region(&self) -> Region {
            Region::Chart
        }

        fn handle(
            &self,
            _survey: &SurveyTable,
            _event: &SelectionChanged,
        ) -> Result<RegionUpdate, Box<dyn Error>> {
            Err("font backend unavailable".into())
        }
    }

    fn failing_router(debug: bool) -> Router {
        let mut bus = SelectionBus::new();
        bus.subscribe(Box::new(Failing));
        let state = Arc::new(AppState {
            survey: SurveyTable::empty(),
            layout: DashboardLayout::from_table(&SurveyTable::empty()),
            bus,
            debug,
        });
        build_router(state, "assets")
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn unknown_region_is_not_found() {
        let state = Arc::new(AppState::new(SurveyTable::empty(), false));
        let (status, body) = get_json(build_router(state, "assets"), "/api/update/table").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["status"], "error");
    }

    #[tokio::test]
    async fn wordcloud_region_alone() {
        let state = Arc::new(AppState::new(SurveyTable::empty(), false));
        let (status, body) =
            get_json(build_router(state, "assets"), "/api/update/wordcloud?column=Curso").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["region"], "wordcloud");
        assert_eq!(
            body["content"],
            serde_json::to_value(WordCloudPanel::Empty).unwrap()
        );
    }

    #[tokio::test]
    async fn failures_hide_detail_unless_debug() {
        let (status, body) = get_json(failing_router(false), "/api/update?column=Curso").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "Internal server error");

        let (status, body) = get_json(failing_router(true), "/api/update?column=Curso").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["message"], "font backend unavailable");
    }
}

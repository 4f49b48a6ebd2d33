use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{NaiveDate, Utc};
use serde::Serialize;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use adstats_core::domain::analytics::{DiagnosticCount, HistoryEntry, RankedItem, StatsReport};
use adstats_core::query::{self, DiagnosticMetric, InvalidArgument, Model};
use adstats_core::time::reporting;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = adstats_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let pool: Option<PgPool> = match settings.require_database_url() {
        Ok(db_url) => match adstats_core::storage::connect(db_url).await {
            Ok(pool) => Some(pool),
            Err(e) => {
                sentry_anyhow::capture_anyhow(&e);
                tracing::error!(error = %e, "db connect failed; starting API in degraded mode");
                None
            }
        },
        Err(e) => {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(error = %e, "DATABASE_URL missing; starting API in degraded mode");
            None
        }
    };

    let state = AppState { pool };

    let app = Router::new()
        .route("/", get(root))
        .route("/healthz", get(healthz))
        .route(
            "/recommendations/:advertiser_id/:model",
            get(get_recommendations),
        )
        .route("/stats", get(get_stats))
        .route("/history/:advertiser_id", get(get_history))
        .route("/diagnostics/:metric", get(get_diagnostic_counts))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3000);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    tracing::info!(%addr, "api listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "service": "adstats_api", "status": "ok" }))
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Debug, Clone)]
struct AppState {
    pool: Option<PgPool>,
}

// Every failure crosses the boundary as a JSON payload with an `error`
// field, never as a bare status or an unhandled fault.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn invalid(err: InvalidArgument) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: err.to_string(),
        }
    }

    fn unavailable() -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: "database unavailable".to_string(),
        }
    }

    fn backend(err: anyhow::Error) -> Self {
        sentry_anyhow::capture_anyhow(&err);
        tracing::error!(error = %err, "query failed");
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: format!("{err:#}"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize)]
struct RecommendationsResponse {
    advertiser_id: String,
    date: NaiveDate,
    model: &'static str,
    items: Vec<RankedItem>,
}

#[derive(Debug, Serialize)]
struct HistoryResponse {
    advertiser_id: String,
    history: Vec<HistoryEntry>,
}

#[derive(Debug, Serialize)]
struct DiagnosticResponse {
    metric: &'static str,
    counts: Vec<DiagnosticCount>,
}

async fn get_recommendations(
    State(state): State<AppState>,
    Path((advertiser_id, model)): Path<(String, String)>,
) -> Result<Json<RecommendationsResponse>, ApiError> {
    // Selector validation happens before touching the pool, so a bad model
    // answers 400 even while the database is down.
    let model = Model::parse(&model).map_err(ApiError::invalid)?;
    let pool = state.pool.as_ref().ok_or_else(ApiError::unavailable)?;

    let day = reporting::current_day(Utc::now());
    let items = query::recommendations::fetch(pool, &advertiser_id, model, day)
        .await
        .map_err(ApiError::backend)?;

    Ok(Json(RecommendationsResponse {
        advertiser_id,
        date: day,
        model: model.as_str(),
        items,
    }))
}

async fn get_stats(State(state): State<AppState>) -> Result<Json<StatsReport>, ApiError> {
    let pool = state.pool.as_ref().ok_or_else(ApiError::unavailable)?;

    // Per-metric failures are carried inside the report, so this handler
    // only fails when the service itself is degraded.
    let report = query::stats::fetch(pool).await;
    Ok(Json(report))
}

async fn get_history(
    State(state): State<AppState>,
    Path(advertiser_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let pool = state.pool.as_ref().ok_or_else(ApiError::unavailable)?;

    let day = reporting::current_day(Utc::now());
    let history = query::history::fetch(pool, &advertiser_id, day)
        .await
        .map_err(ApiError::backend)?;

    Ok(Json(HistoryResponse {
        advertiser_id,
        history,
    }))
}

async fn get_diagnostic_counts(
    State(state): State<AppState>,
    Path(metric): Path<String>,
) -> Result<Json<DiagnosticResponse>, ApiError> {
    let metric = DiagnosticMetric::parse(&metric).map_err(ApiError::invalid)?;
    let pool = state.pool.as_ref().ok_or_else(ApiError::unavailable)?;

    let day = reporting::current_day(Utc::now());
    let counts = query::diagnostics::fetch(pool, metric, day)
        .await
        .map_err(ApiError::backend)?;

    Ok(Json(DiagnosticResponse {
        metric: metric.as_str(),
        counts,
    }))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &adstats_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_model_maps_to_400_with_error_body() {
        let err = ApiError::invalid(Model::parse("nope").unwrap_err());
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        let body = serde_json::to_value(ErrorBody {
            error: err.message,
        })
        .unwrap();
        assert!(body["error"].as_str().unwrap().starts_with("invalid model:"));
    }

    #[test]
    fn degraded_mode_maps_to_503() {
        let err = ApiError::unavailable();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[test]
    fn recommendations_envelope_echoes_request_context() {
        let resp = RecommendationsResponse {
            advertiser_id: "A1".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 8, 23).unwrap(),
            model: Model::TopCtr.as_str(),
            items: vec![],
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["advertiser_id"], "A1");
        assert_eq!(v["date"], "2026-08-23");
        assert_eq!(v["model"], "top_ctr");
        assert_eq!(v["items"], serde_json::json!([]));
    }

    #[test]
    fn empty_history_serializes_as_empty_list() {
        let resp = HistoryResponse {
            advertiser_id: "A1".to_string(),
            history: vec![],
        };
        let v = serde_json::to_value(&resp).unwrap();
        assert_eq!(v["history"], serde_json::json!([]));
    }
}

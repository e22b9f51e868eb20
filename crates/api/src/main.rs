use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use profit_quality_core::analyzer::DEFAULT_CFO_EBITDA_THRESHOLD;
use profit_quality_core::ingest::fallback::FallbackProvider;
use profit_quality_core::report::{self, AnalysisRequest, ProfitQualityReport, DEFAULT_YEARS};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = profit_quality_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .with(sentry_tracing::layer())
        .init();

    let provider = profit_quality_core::build_provider(&settings, false)?;
    let state = AppState {
        provider: Arc::new(provider),
        default_risk_free_rate: settings.risk_free_rate_pct,
    };

    let app = router(state);

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

fn router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route(
            "/companies/:company_id/profit-quality",
            get(get_profit_quality),
        )
        .route(
            "/companies/:company_id/profit-quality/report",
            get(get_profit_quality_report),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}

#[derive(Clone)]
struct AppState {
    provider: Arc<FallbackProvider>,
    default_risk_free_rate: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct AnalysisQuery {
    years: Option<usize>,
    risk_free_rate: Option<f64>,
    cfo_ebitda_threshold: Option<f64>,
}

impl AnalysisQuery {
    fn into_request(
        self,
        company_id: String,
        default_risk_free_rate: Option<f64>,
    ) -> Result<AnalysisRequest, StatusCode> {
        let request = AnalysisRequest {
            company_id,
            years: self.years.unwrap_or(DEFAULT_YEARS),
            risk_free_rate: self.risk_free_rate.or(default_risk_free_rate),
            cfo_ebitda_threshold: self
                .cfo_ebitda_threshold
                .unwrap_or(DEFAULT_CFO_EBITDA_THRESHOLD),
        };

        request.validate().map_err(|e| {
            tracing::debug!(error = %e, "rejected analysis request");
            StatusCode::BAD_REQUEST
        })?;
        Ok(request)
    }
}

async fn run_analysis(
    state: &AppState,
    company_id: String,
    query: AnalysisQuery,
) -> Result<ProfitQualityReport, StatusCode> {
    let request = query.into_request(company_id, state.default_risk_free_rate)?;

    report::analyze_company(&state.provider, &request)
        .await
        .map_err(|e| {
            sentry_anyhow::capture_anyhow(&e);
            tracing::error!(company_id = %request.company_id, error = %e, "analysis failed");
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

async fn get_profit_quality(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<ProfitQualityReport>, StatusCode> {
    let report = run_analysis(&state, company_id, query).await?;
    Ok(Json(report))
}

async fn get_profit_quality_report(
    State(state): State<AppState>,
    Path(company_id): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let report = run_analysis(&state, company_id, query).await?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        report.render_text(),
    ))
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

fn init_sentry(settings: &profit_quality_core::config::Settings) -> Option<sentry::ClientInitGuard> {
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

    fn offline_state() -> AppState {
        AppState {
            provider: Arc::new(FallbackProvider::synthetic_only()),
            default_risk_free_rate: None,
        }
    }

    #[test]
    fn query_defaults_fill_the_request() {
        let req = AnalysisQuery::default()
            .into_request("AAPL".to_string(), Some(6.0))
            .unwrap();
        assert_eq!(req.years, 10);
        assert_eq!(req.risk_free_rate, Some(6.0));
        assert_eq!(req.cfo_ebitda_threshold, 0.7);
    }

    #[test]
    fn query_rejects_out_of_range_values() {
        let query = AnalysisQuery {
            years: Some(0),
            ..Default::default()
        };
        assert_eq!(
            query.into_request("AAPL".to_string(), None).unwrap_err(),
            StatusCode::BAD_REQUEST
        );

        let query = AnalysisQuery {
            risk_free_rate: Some(-1.0),
            ..Default::default()
        };
        assert_eq!(
            query.into_request("AAPL".to_string(), None).unwrap_err(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn json_endpoint_serves_synthetic_analysis() {
        let query = AnalysisQuery {
            years: Some(10),
            risk_free_rate: Some(4.5),
            cfo_ebitda_threshold: None,
        };
        let Json(report) = get_profit_quality(
            State(offline_state()),
            Path("TCS.NS".to_string()),
            Query(query),
        )
        .await
        .unwrap();

        assert_eq!(report.company_id, "TCS.NS");
        assert_eq!(report.data_source, "synthetic");
        assert_eq!(report.analysis.pat_vs_cfo.value, 0.978);
        assert_eq!(report.analysis.fcf_flag(), "No");
    }
}

use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Cursor;
use std::sync::Arc;
use tuition_ledger::error::AppError;
use tuition_ledger::finance::allocation::RecapLine;
use tuition_ledger::finance::domain::lenient_date;
use tuition_ledger::finance::{
    finance_router, AllocationEngine, DossierService, FeeItem, FeeScheduleSource, LedgerRecap,
    PaymentHistorySource, PaymentLedgerImporter,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LedgerCsvRecapRequest {
    #[serde(default)]
    pub(crate) schedule: Vec<FeeItem>,
    pub(crate) ledger_csv: String,
    #[serde(default, deserialize_with = "lenient_date")]
    pub(crate) today: Option<NaiveDate>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct LedgerCsvRecapResponse {
    pub(crate) today: NaiveDate,
    pub(crate) imported_payments: usize,
    pub(crate) recap: LedgerRecap,
    pub(crate) lines: Vec<RecapLine>,
}

pub(crate) fn with_finance_routes<F, P>(service: Arc<DossierService<F, P>>) -> axum::Router
where
    F: FeeScheduleSource + 'static,
    P: PaymentHistorySource + 'static,
{
    finance_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route(
            "/api/v1/finance/recap/csv",
            axum::routing::post(ledger_csv_recap_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Recap built from a cashier's CSV export instead of JSON payment records.
pub(crate) async fn ledger_csv_recap_endpoint(
    Json(payload): Json<LedgerCsvRecapRequest>,
) -> Result<Json<LedgerCsvRecapResponse>, AppError> {
    let LedgerCsvRecapRequest {
        schedule,
        ledger_csv,
        today,
    } = payload;

    let payments = PaymentLedgerImporter::from_reader(Cursor::new(ledger_csv.into_bytes()))?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let recap = AllocationEngine::new().allocate(&schedule, &payments);
    let lines = recap.lines(today);

    Ok(Json(LedgerCsvRecapResponse {
        today,
        imported_payments: payments.len(),
        recap,
        lines,
    }))
}

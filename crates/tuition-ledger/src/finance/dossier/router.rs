use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::service::DossierService;
use super::sources::{FeeScheduleSource, PaymentHistorySource};
use crate::finance::allocation::{LedgerRecap, RecapLine};
use crate::finance::domain::{
    lenient_amount, lenient_count, lenient_rate, parse_date, Amount, FeeItem, Payment, StudentId,
};
use crate::finance::risk::{RiskBand, RiskEngine, RiskInputs, RiskSettings};

/// Router builder exposing the recap, risk and dossier endpoints.
pub fn finance_router<F, P>(service: Arc<DossierService<F, P>>) -> Router
where
    F: FeeScheduleSource + 'static,
    P: PaymentHistorySource + 'static,
{
    Router::new()
        .route("/api/v1/finance/recap", post(recap_handler::<F, P>))
        .route("/api/v1/finance/risk", post(risk_handler::<F, P>))
        .route(
            "/api/v1/finance/students/:student_id/dossier",
            get(dossier_handler::<F, P>),
        )
        .with_state(service)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapRequest {
    #[serde(default)]
    pub schedule: Vec<FeeItem>,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub today: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecapResponse {
    pub today: NaiveDate,
    pub recap: LedgerRecap,
    pub lines: Vec<RecapLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskRequest {
    #[serde(default, deserialize_with = "lenient_count")]
    pub days_late: u32,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub outstanding: Amount,
    #[serde(default, deserialize_with = "lenient_rate")]
    pub payment_rate: f64,
    #[serde(default, deserialize_with = "lenient_count")]
    pub extended_due_dates_count: u32,
    /// Per-request override of the configured risk bands.
    #[serde(default)]
    pub bands: Option<Vec<RiskBand>>,
}

#[derive(Debug, Deserialize)]
pub struct DossierQuery {
    #[serde(default)]
    pub today: Option<String>,
}

pub(crate) async fn recap_handler<F, P>(
    State(service): State<Arc<DossierService<F, P>>>,
    Json(request): Json<RecapRequest>,
) -> Response
where
    F: FeeScheduleSource + 'static,
    P: PaymentHistorySource + 'static,
{
    let today = match reference_date(request.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };

    let recap = service
        .allocation()
        .allocate(&request.schedule, &request.payments);
    let lines = recap.lines(today);

    (
        StatusCode::OK,
        Json(RecapResponse {
            today,
            recap,
            lines,
        }),
    )
        .into_response()
}

pub(crate) async fn risk_handler<F, P>(
    State(service): State<Arc<DossierService<F, P>>>,
    Json(request): Json<RiskRequest>,
) -> Response
where
    F: FeeScheduleSource + 'static,
    P: PaymentHistorySource + 'static,
{
    let inputs = RiskInputs::new(
        request.days_late,
        request.outstanding,
        request.payment_rate,
        request.extended_due_dates_count,
    );

    let profile = match request.bands {
        Some(bands) if !bands.is_empty() => match RiskSettings::from_bands(bands) {
            Ok(settings) => RiskEngine::new(settings.classifier()).assess(&inputs),
            Err(error) => {
                let payload = json!({ "error": error.to_string() });
                return (StatusCode::UNPROCESSABLE_ENTITY, Json(payload)).into_response();
            }
        },
        _ => service.risk().assess(&inputs),
    };

    (StatusCode::OK, Json(profile)).into_response()
}

pub(crate) async fn dossier_handler<F, P>(
    State(service): State<Arc<DossierService<F, P>>>,
    Path(student_id): Path<String>,
    Query(query): Query<DossierQuery>,
) -> Response
where
    F: FeeScheduleSource + 'static,
    P: PaymentHistorySource + 'static,
{
    let today = match reference_date(query.today.as_deref()) {
        Ok(today) => today,
        Err(response) => return response,
    };

    let dossier = service.dossier(&StudentId(student_id), today);
    (StatusCode::OK, Json(dossier)).into_response()
}

fn reference_date(raw: Option<&str>) -> Result<NaiveDate, Response> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        Some(value) => parse_date(value).map_err(|error| {
            let payload = json!({ "error": error });
            (StatusCode::BAD_REQUEST, Json(payload)).into_response()
        }),
        None => Ok(Local::now().date_naive()),
    }
}

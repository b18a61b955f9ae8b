use crate::cli::ServeArgs;
use crate::infra::{load_classifier, seeded_sources, AppState};
use crate::routes::with_finance_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tuition_ledger::config::AppConfig;
use tuition_ledger::error::AppError;
use tuition_ledger::finance::DossierService;
use tuition_ledger::telemetry;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let classifier = load_classifier(config.finance.risk_settings.as_deref())?;
    let (fees, payments) = seeded_sources();
    let dossier_service = Arc::new(DossierService::new(
        Arc::new(fees),
        Arc::new(payments),
        classifier,
    ));

    let app = with_finance_routes(dossier_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        custom_bands = config.finance.risk_settings.is_some(),
        "tuition ledger service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}

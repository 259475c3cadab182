use crate::cli::ServeArgs;
use crate::infra::{build_store, AppState};
use crate::routes::with_admission_routes;
use admission_radar::admissions::{
    AdminAllowList, CatalogAdminService, CatalogStore, CatalogSubscription, EligibilityService,
};
use admission_radar::config::AppConfig;
use admission_radar::error::AppError;
use admission_radar::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

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

    let store = Arc::new(build_store(&config.catalog)?);
    tokio::spawn(log_snapshots(store.subscribe()));

    let admins = AdminAllowList::new(&config.catalog.admin_emails);
    if admins.is_empty() {
        warn!("APP_ADMIN_EMAILS is empty; catalog administration is disabled");
    }

    let eligibility = Arc::new(EligibilityService::new(store.clone()));
    let admin = Arc::new(CatalogAdminService::new(store, admins));

    let app = with_admission_routes(eligibility, admin)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "admission radar ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn log_snapshots(mut subscription: CatalogSubscription) {
    while let Some(snapshot) = subscription.changed().await {
        info!(
            revision = snapshot.revision(),
            institutions = snapshot.len(),
            "catalog snapshot published"
        );
    }
}

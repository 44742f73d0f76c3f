use crate::cli::ServeArgs;
use crate::infra::{AppState, InMemoryHostelRepository, InMemoryResidentRepository};
use crate::routes::with_operational_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hostel_ops::config::AppConfig;
use hostel_ops::error::AppError;
use hostel_ops::inventory::{ExpirySweeper, InventoryService};
use hostel_ops::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(secs) = args.sweep_interval_secs.take() {
        config.sweeper.interval = Duration::from_secs(secs);
    }
    if args.no_sweeper {
        config.sweeper.enabled = false;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();

    let hostels = Arc::new(InMemoryHostelRepository::default());
    let residents = Arc::new(InMemoryResidentRepository::default());
    let service = Arc::new(InventoryService::new(hostels, residents, config.allocation));

    let sweeper = Arc::new(ExpirySweeper::new(service.clone()));
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        sweeper: sweeper.totals(),
    };

    let app = with_operational_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    if config.sweeper.enabled {
        info!(
            interval_secs = config.sweeper.interval.as_secs(),
            "starting expiry sweeper"
        );
        sweeper.spawn(config.sweeper.interval);
    } else {
        info!("expiry sweeper disabled");
    }

    readiness_flag.store(true, Ordering::Release);
    info!(?config.environment, %addr, "hostel inventory service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

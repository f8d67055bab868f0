use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use hireboard::board::reminders::ReminderScheduler;
use hireboard::board::Board;
use hireboard::config::AppConfig;
use hireboard::error::AppError;
use hireboard::notify::mailer_for;
use hireboard::store::InMemoryRecordStore;
use hireboard::telemetry;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::with_board_routes;

const REMINDER_SWEEP_PERIOD: Duration = Duration::from_secs(60 * 60);

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

    let store = Arc::new(InMemoryRecordStore::new());
    let mailer = mailer_for(config.mail.mode);
    let board = Board::new(store, mailer);

    let scheduler = ReminderScheduler::start(board.reminders.clone(), REMINDER_SWEEP_PERIOD);

    let app = with_board_routes(board)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board service ready");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.stop().await;
    info!("reminder scheduler stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(%err, "unable to listen for shutdown signal");
        return;
    }
    info!("shutdown signal received");
}

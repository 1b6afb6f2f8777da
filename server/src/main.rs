// server/src/main.rs

use actix_web::{web, App, HttpServer};
use dept_store::config::{AppConfig, LogFormat};
use dept_store::web::configure_app_routes;
use dept_store::{build_state, db};
use std::io;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

fn init_tracing(format: LogFormat) {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_span_events(FmtSpan::CLOSE);
  match format {
    LogFormat::Json => builder.json().init(),
    LogFormat::Pretty => builder.init(),
  }
}

fn startup_error(stage: &str, e: impl std::fmt::Display) -> io::Error {
  tracing::error!(error = %e, stage, "Startup failed.");
  io::Error::new(io::ErrorKind::Other, format!("{}: {}", stage, e))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
  let config = AppConfig::from_env().map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e.to_string()))?;
  init_tracing(config.log_format);
  tracing::info!("Starting department store server...");

  let db_pool = db::connect(config.database_url(), config.database_max_connections)
    .await
    .map_err(|e| startup_error("database connection", e))?;
  tracing::info!("Connected to the database.");

  if config.run_migrations {
    db::run_migrations(&db_pool).await.map_err(|e| startup_error("migrations", e))?;
    tracing::info!("Database migrations applied.");
  }

  let bind_address = config.bind_address();
  let app_state = build_state(&config, db_pool).map_err(|e| startup_error("pipeline registration", e))?;
  tracing::info!(%bind_address, "Pipelines registered, binding server.");

  HttpServer::new(move || {
    App::new()
      .app_data(web::Data::new(app_state.clone()))
      .wrap(TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&bind_address)?
  .run()
  .await
}

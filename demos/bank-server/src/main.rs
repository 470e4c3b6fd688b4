use axum::{Router, routing::get};
use bankapp_problem::config::{ConfigService, ResponderConfig};
use bankapp_problem::interceptor::{InterceptorLayer, LoggingInterceptor};
use bankapp_problem::ProblemExceptionFilter;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

mod modules;

use modules::account::{self, AccountService};
use modules::employee::{self, EmployeeService};

#[derive(Clone)]
pub struct AppState {
    pub accounts: Arc<AccountService>,
    pub employees: Arc<EmployeeService>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    tracing::info!("Starting bank server...");

    let config = ConfigService::new();
    let responder = ResponderConfig::from_config(&config);
    tracing::debug!("Responder config: {:?}", responder);

    let state = AppState {
        accounts: Arc::new(AccountService::default()),
        employees: Arc::new(EmployeeService::default()),
    };

    let router = Router::new()
        .route("/health", get(|| async { "ok" }))
        .nest("/accounts", account::router())
        .nest("/employees", employee::router())
        .layer(InterceptorLayer::with_filter(
            vec![Box::new(LoggingInterceptor)],
            ProblemExceptionFilter::new(responder),
        ))
        .with_state(state);

    let host = config.get("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
    let port = config.get("PORT").unwrap_or_else(|| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server running on http://{}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Initiating graceful shutdown...");
}

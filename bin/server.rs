// Analytics Audit - Web Server
// Serves GET /run-audit backed by the configured replay fixture

use analytics_audit::server::{router, AppState};
use analytics_audit::AuditConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,analytics_audit=info")),
        )
        .init();

    let config = AuditConfig::load().unwrap_or_else(|e| {
        eprintln!("❌ Configuration error: {:#}", e);
        std::process::exit(1);
    });

    let addr = config.bind_address.clone();
    let state = AppState::from_config(config).unwrap_or_else(|e| {
        eprintln!("❌ Could not load data source: {:#}", e);
        eprintln!("   Set AUDIT_FIXTURE to a recorded property fixture.");
        std::process::exit(1);
    });

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("❌ Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    tracing::info!(%addr, "audit server listening");
    println!("\n🚀 Server running on http://{}", addr);
    println!("   API: http://{}/run-audit?property_id=<id>", addr);
    println!("\n   Press Ctrl+C to stop\n");

    if let Err(e) = axum::serve(listener, router(state)).await {
        eprintln!("❌ Server error: {}", e);
        std::process::exit(1);
    }
}

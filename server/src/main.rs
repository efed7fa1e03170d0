use arena_server::config::RelayConfig;
use arena_server::session::{run_session, SessionCommand};
use arena_server::ws::{ws_handler, AppState};
use axum::routing::get;
use axum::Router;
use tokio::sync::mpsc;
use tower_http::cors::CorsLayer;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = RelayConfig::from_env();

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid relay configuration: {}", e);
        std::process::exit(1);
    }

    let listen_addr = config.listen_addr.clone();
    let (session_tx, session_rx) = mpsc::channel::<SessionCommand>(config.command_queue);
    let app_state = AppState::new(session_tx, config.max_connections);

    // Spawn session task
    tokio::spawn(async move {
        run_session(session_rx, config).await;
    });

    let app = Router::new()
        .route("/ws", get(ws_handler))
        .layer(CorsLayer::permissive())
        .with_state(app_state);

    tracing::info!("Starting arena relay on {}", listen_addr);
    println!("Arena relay listening on {}", listen_addr);

    let listener = match tokio::net::TcpListener::bind(&listen_addr).await {
        Ok(listener) => listener,
        Err(e) => {
            eprintln!("Failed to bind {}: {}", listen_addr, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("Server error: {}", e);
        std::process::exit(1);
    }
}

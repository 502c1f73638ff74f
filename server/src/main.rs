use aimtrainer_server::build_router;
use aimtrainer_server::config::ServerConfig;
use aimtrainer_server::state::AppState;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let config = ServerConfig::from_env();

    // Validate configuration before starting
    if let Err(e) = config.validate() {
        eprintln!("Invalid server configuration: {}", e);
        std::process::exit(1);
    }

    let app = build_router(AppState::from_config(&config), &config.allowed_origins);

    tracing::info!(
        "Starting aim trainer server on {} (leaderboard: {:?}, {} entries/mode)",
        config.listen_addr,
        config.backend,
        config.max_entries_per_mode
    );
    println!("Aim trainer server listening on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

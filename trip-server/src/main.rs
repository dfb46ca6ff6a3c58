use tracing::info;
use tracing_subscriber::EnvFilter;

use trip_server::config::ServerConfig;
use trip_server::gtfs::TransitFeed;
use trip_server::parking::ParkingInventory;
use trip_server::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("trip_server=info,tower_http=info")),
        )
        .init();

    let config = ServerConfig::from_env();

    // Load the schedule and the parking inventory (fail fast if unusable)
    let feed = TransitFeed::load(&config.data_dir).expect("Failed to load transit feed");
    info!(
        stops = feed.stops().len(),
        source = ?feed.source(),
        "transit feed loaded"
    );

    let parking =
        ParkingInventory::load(&config.parking_path()).expect("Failed to load parking inventory");
    info!(locations = parking.len(), "parking inventory loaded");

    // The routing engine itself is brought up on the first request
    let state = AppState::new(
        config.engine_settings(),
        config.data_dir.clone(),
        feed,
        parking,
        config.planner_config(),
        config.output_dir.clone(),
    )
    .with_cache_config(config.cache_config());

    let app = create_router(state);

    info!(addr = %config.bind_addr, "trip planner listening");
    info!("  GET  /                - Welcome");
    info!("  GET  /health          - Health check");
    info!("  POST /process         - Plan a trip");
    info!("  GET  /summaries/:id   - Download a trip summary");

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(listener, app).await.expect("Server error");
}

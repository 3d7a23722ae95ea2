use actix_web::{web, App, HttpServer};
use log::info;

use chess_match_server::models::AppState;
use chess_match_server::routes::configure_routes;
use chess_match_server::ServerConfig;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::from_env()?;
    let (host, port) = config.bind_addr();
    info!("Starting chess match server at http://{}:{}", host, port);
    info!(
        "Turn duration {} ms, strict clock {}, disconnect policy {:?}",
        config.turn_duration_ms, config.strict_clock, config.disconnect_policy
    );

    // Create shared application state
    let app_state = web::Data::new(AppState::new(config));

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes)
    })
    .bind((host, port))?
    .run()
    .await
}

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod access;
mod config;
mod controllers;
mod db;
mod errors;
mod media;
mod models;

use config::Config;
use db::Database;
use media::MediaStore;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub media: Arc<MediaStore>,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env();
    let port = config.port;

    log::info!("Echonote v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Public URL (self_url): {}", config::self_url());

    log::info!("Initializing database at {}", config.database_url);
    let db = Database::new(&config.database_url).expect("Failed to initialize database");
    let db = Arc::new(db);

    let media_dir = config::media_dir();
    log::info!("Media directory: {:?}", media_dir);
    let media = MediaStore::new(media_dir).expect("Failed to initialize media store");
    let media = Arc::new(media);

    match &config.transcriber_url {
        Some(url) => log::info!("Transcription service: {}", url),
        None => log::info!("Transcription service: not configured"),
    }

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allow_any_header()
            .max_age(3600);

        App::new()
            .app_data(web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                media: Arc::clone(&media),
            }))
            .wrap(Logger::default())
            .wrap(cors)
            .configure(controllers::health::config_routes)
            .configure(controllers::auth::config)
            .configure(controllers::notes::config)
            .configure(controllers::sharing::config)
            .configure(controllers::media::config)
            .configure(controllers::transcribe::config)
    })
    .bind(("0.0.0.0", port))?
    .run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    // Spawn Ctrl+C handler
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for Ctrl+C");
        log::info!("Received Ctrl+C, shutting down...");

        let server_stop = server_handle.stop(true);
        if tokio::time::timeout(std::time::Duration::from_secs(5), server_stop)
            .await
            .is_err()
        {
            log::warn!("Timeout waiting for HTTP server to stop, forcing exit...");
        }

        log::info!("Shutdown complete");
    });

    server.await
}

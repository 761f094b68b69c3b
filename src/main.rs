use crate::config::Config;
use crate::services::{CatalogClient, HeadlessOutput};
use actix_rt::signal::unix;
use actix_web::web::Data;
use actix_web::{web, App, HttpServer};
use card_player::MusicCard;
use futures_lite::FutureExt;
use music_library::MusicLibrary;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

mod config;
mod http;
mod services;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[actix_rt::main]
async fn main() -> std::io::Result<()> {
    let mut terminate = unix::signal(unix::SignalKind::terminate())?;
    let mut interrupt = unix::signal(unix::SignalKind::interrupt())?;

    dotenv::dotenv().ok();
    env_logger::init();

    let config = Arc::from(Config::from_env());

    info!(version = VERSION, "Starting application...");

    let music_library = MusicLibrary::new(config.music_directory.clone());
    let catalog_client = CatalogClient::create(&config.listing_url());
    let audio_output = HeadlessOutput::create(
        &config.public_url,
        Duration::from_millis(config.time_update_interval_ms),
    );

    let (music_card, card_handle) = MusicCard::new(
        Rc::new(catalog_client),
        Box::new(audio_output),
        &config.track_base_path,
    );

    let shutdown_timeout = config.shutdown_timeout;
    let bind_address = config.bind_address.clone();
    let track_route = config.track_route();

    let server = HttpServer::new({
        let card_handle = card_handle.clone();
        move || {
            App::new()
                .app_data(Data::new(music_library.clone()))
                .app_data(Data::new(card_handle.clone()))
                .service(web::resource("/api/music").route(web::get().to(http::list_music)))
                .service(web::resource(track_route.as_str()).route(web::get().to(http::serve_track)))
                .service(web::resource("/api/card").route(web::get().to(http::get_card)))
                .service(
                    web::resource("/api/card/toggle").route(web::post().to(http::toggle_card)),
                )
        }
    })
    .shutdown_timeout(shutdown_timeout)
    .bind(bind_address)?
    .run();

    let server_handle = server.handle();

    actix_rt::spawn({
        async move {
            if let Err(error) = server.await {
                error!(?error, "Error on http server");
            }
        }
    });

    let card_task = actix_rt::spawn(music_card.run());

    info!("Application started");

    interrupt.recv().or(terminate.recv()).await;

    info!("Received shutdown signal. Shutting down gracefully...");

    card_handle.unmount();
    if let Err(error) = card_task.await {
        error!(?error, "Music card task failed");
    }

    server_handle.stop(true).await;

    Ok(())
}

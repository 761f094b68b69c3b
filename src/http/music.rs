use actix_web::web::{Data, Path};
use actix_web::{HttpResponse, Responder};
use music_library::MusicLibrary;
use serde::Serialize;
use tracing::debug;

#[derive(Serialize)]
struct MusicListing {
    files: Vec<String>,
}

pub(crate) async fn list_music(library: Data<MusicLibrary>) -> impl Responder {
    let files = library.list_tracks_or_empty().await;

    HttpResponse::Ok().json(MusicListing { files })
}

pub(crate) async fn serve_track(library: Data<MusicLibrary>, name: Path<String>) -> impl Responder {
    let path = match library.resolve(&name) {
        Some(path) => path,
        None => {
            debug!(name = %name, "Rejected track name");
            return HttpResponse::NotFound().finish();
        }
    };

    match tokio::fs::read(&path).await {
        Ok(bytes) => {
            let mime = mime_guess::from_path(&path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.to_string())
                .body(bytes)
        }
        Err(error) => {
            debug!(?error, ?path, "Unable to read track");
            HttpResponse::NotFound().finish()
        }
    }
}

use actix_web::web::Data;
use actix_web::{HttpResponse, Responder};
use card_player::CardHandle;
use tracing::warn;

pub(crate) async fn get_card(card: Data<CardHandle>) -> impl Responder {
    HttpResponse::Ok().json(card.view())
}

pub(crate) async fn toggle_card(card: Data<CardHandle>) -> impl Responder {
    if card.toggle() {
        HttpResponse::Accepted().finish()
    } else {
        warn!("Toggle requested while the music card is not mounted");
        HttpResponse::ServiceUnavailable().finish()
    }
}

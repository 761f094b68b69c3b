mod card;
mod music;

pub(crate) use card::{get_card, toggle_card};
pub(crate) use music::{list_music, serve_track};

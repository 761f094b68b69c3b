use crate::SessionState;
use percent_encoding::percent_decode_str;
use serde::Serialize;

pub const LOADING_LABEL: &str = "Loading music...";
pub const EMPTY_LABEL: &str = "No music found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleIcon {
    Play,
    Pause,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleView {
    pub disabled: bool,
    pub pressed: bool,
    pub aria_label: &'static str,
    pub icon: ToggleIcon,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub label: String,
    pub progress_percent: u32,
    pub toggle: ToggleView,
}

impl CardView {
    pub fn project(state: &SessionState) -> Self {
        let label = if state.is_loading() {
            LOADING_LABEL.to_string()
        } else {
            match state.current_track() {
                Some(track) => display_name(track),
                None => EMPTY_LABEL.to_string(),
            }
        };

        let playing = state.is_playing();

        Self {
            label,
            progress_percent: progress_percent(state.progress()),
            toggle: ToggleView {
                disabled: !state.can_toggle(),
                pressed: playing,
                aria_label: if playing { "Pause music" } else { "Play music" },
                icon: if playing {
                    ToggleIcon::Pause
                } else {
                    ToggleIcon::Play
                },
            },
        }
    }

    pub fn progress_width(&self) -> String {
        format!("{}%", self.progress_percent)
    }
}

pub fn progress_percent(progress: f64) -> u32 {
    if progress.is_nan() {
        return 0;
    }

    (progress.clamp(0.0, 1.0) * 100.0).round() as u32
}

// Names that do not decode are shown raw.
pub fn display_name(track: &str) -> String {
    match decode_uri_component(track) {
        Some(decoded) => strip_extension(&decoded).to_string(),
        None => strip_extension(track).to_string(),
    }
}

fn decode_uri_component(raw: &str) -> Option<String> {
    // Stray `%` without two hex digits is malformed, not literal.
    let bytes = raw.as_bytes();
    let mut from = 0;
    while let Some(offset) = raw[from..].find('%') {
        let at = from + offset;
        let escape = bytes.get(at + 1..at + 3)?;
        if !escape.iter().all(u8::is_ascii_hexdigit) {
            return None;
        }
        from = at + 3;
    }

    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(|decoded| decoded.into_owned())
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) if dot + 1 < name.len() && !name[dot + 1..].contains('/') => &name[..dot],
        _ => name,
    }
}

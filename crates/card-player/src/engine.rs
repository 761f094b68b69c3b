use crate::TrackId;
use futures_lite::future::{self, BoxedLocal};
use futures_lite::FutureExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::rc::Rc;
use tracing::{debug, info};

// Same set as encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, thiserror::Error)]
pub enum AudioOutputError {
    #[error("No source is attached to the audio output")]
    NoSource,
    #[error("Playback is not allowed: {0}")]
    NotAllowed(String),
    #[error("Playback was interrupted before it started")]
    Aborted,
    #[error("Unable to load audio source: {0}")]
    Load(Box<dyn std::error::Error>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputChannel {
    Ended,
    TimeUpdate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputEvent {
    Ended,
    TimeUpdate {
        current_time: f64,
        duration: Option<f64>,
    },
}

pub type OutputHandler = Box<dyn FnMut(OutputEvent)>;

pub type PlayFuture = BoxedLocal<Result<(), AudioOutputError>>;

pub trait AudioOutput {
    fn set_source(&mut self, locator: &str);
    fn clear_source(&mut self);
    fn seek_to_start(&mut self);
    // Requests playback. The future settles once the output is actually
    // playing and must not borrow the output.
    fn play(&mut self) -> PlayFuture;
    fn pause(&mut self);
    // Single handler per channel, replacing any previous one.
    fn subscribe(&mut self, channel: OutputChannel, handler: OutputHandler);
    fn unsubscribe(&mut self, channel: OutputChannel);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EngineEvent {
    TrackEnded,
    PositionUpdate(f64),
}

pub type EngineListener = Rc<dyn Fn(EngineEvent)>;

pub struct EngineBinding {
    output: Box<dyn AudioOutput>,
    base_path: String,
    bound: Option<TrackId>,
    released: bool,
}

impl EngineBinding {
    pub fn attach(
        mut output: Box<dyn AudioOutput>,
        base_path: &str,
        listener: EngineListener,
    ) -> Self {
        let on_ended = Rc::clone(&listener);
        output.subscribe(
            OutputChannel::Ended,
            Box::new(move |event| {
                if matches!(event, OutputEvent::Ended) {
                    on_ended(EngineEvent::TrackEnded);
                }
            }),
        );

        let on_time_update = listener;
        output.subscribe(
            OutputChannel::TimeUpdate,
            Box::new(move |event| {
                if let OutputEvent::TimeUpdate {
                    current_time,
                    duration,
                } = event
                {
                    on_time_update(EngineEvent::PositionUpdate(progress_fraction(
                        current_time,
                        duration,
                    )));
                }
            }),
        );

        Self {
            output,
            base_path: base_path.to_string(),
            bound: None,
            released: false,
        }
    }

    pub fn bound_track(&self) -> Option<&TrackId> {
        self.bound.as_ref()
    }

    // No-op returning false when the track is already bound.
    pub fn bind(&mut self, track: &TrackId) -> bool {
        if self.bound.as_ref() == Some(track) {
            return false;
        }

        let locator = track_locator(&self.base_path, track);

        debug!(%track, %locator, "Binding track to audio output");

        self.output.set_source(&locator);
        self.output.seek_to_start();
        self.bound = Some(track.clone());

        true
    }

    pub fn unbind(&mut self) {
        self.output.pause();
        self.output.clear_source();

        if let Some(track) = self.bound.take() {
            debug!(%track, "Audio output has been unbound");
        }
    }

    pub fn rewind(&mut self) {
        self.output.seek_to_start();
    }

    pub fn pause(&mut self) {
        self.output.pause();
    }

    // Pausing takes effect at once, a start settles through the future.
    pub fn set_desired_playing(&mut self, playing: bool) -> PlayFuture {
        if !playing {
            self.output.pause();
            return future::ready(Ok(())).boxed_local();
        }

        if self.bound.is_none() {
            return future::ready(Err(AudioOutputError::NoSource)).boxed_local();
        }

        self.output.play()
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;

        self.output.pause();
        self.output.clear_source();
        self.output.unsubscribe(OutputChannel::Ended);
        self.output.unsubscribe(OutputChannel::TimeUpdate);
        self.bound = None;

        info!("Audio output has been released");
    }
}

impl Drop for EngineBinding {
    fn drop(&mut self) {
        self.release();
    }
}

pub fn track_locator(base_path: &str, track: &TrackId) -> String {
    format!(
        "{}/{}",
        base_path.trim_end_matches('/'),
        utf8_percent_encode(track, URI_COMPONENT)
    )
}

pub fn progress_fraction(current_time: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(duration) if duration.is_finite() && duration > 0.0 => {
            let fraction = current_time / duration;
            if fraction.is_nan() {
                0.0
            } else {
                fraction.clamp(0.0, 1.0)
            }
        }
        _ => 0.0,
    }
}

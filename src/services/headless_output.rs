use card_player::{
    AudioOutput, AudioOutputError, OutputChannel, OutputEvent, OutputHandler, PlayFuture,
};
use futures_lite::{future, FutureExt};
use lofty::prelude::AudioFile;
use lofty::probe::Probe;
use reqwest::Client;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Cursor;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, thiserror::Error)]
pub(crate) enum HeadlessOutputError {
    #[error(transparent)]
    ReqwestError(#[from] reqwest::Error),
    #[error(transparent)]
    IoError(#[from] std::io::Error),
    #[error(transparent)]
    LoftyError(#[from] lofty::error::LoftyError),
    #[error("Track duration is unknown")]
    UnknownDuration,
}

#[derive(Default)]
struct Playhead {
    source: Option<String>,
    duration: Option<f64>,
    position: f64,
    playing: bool,
    generation: u64,
    handlers: HashMap<OutputChannel, OutputHandler>,
}

impl Playhead {
    fn stop_clock(&mut self) {
        self.playing = false;
        self.generation += 1;
    }

    fn emit(&mut self, channel: OutputChannel, event: OutputEvent) {
        if let Some(handler) = self.handlers.get_mut(&channel) {
            handler(event);
        }
    }
}

// Tracks are downloaded and probed for their duration, then "played" against
// the wall clock.
pub(crate) struct HeadlessOutput {
    client: Client,
    origin: String,
    tick: Duration,
    playhead: Rc<RefCell<Playhead>>,
}

impl HeadlessOutput {
    pub(crate) fn create(origin: &str, tick: Duration) -> Self {
        let client = Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .expect("Failed to create HTTP Client");

        Self {
            client,
            origin: origin.trim_end_matches('/').to_string(),
            tick,
            playhead: Rc::new(RefCell::new(Playhead::default())),
        }
    }

    fn resolve(&self, locator: &str) -> String {
        if locator.starts_with("http://") || locator.starts_with("https://") {
            locator.to_string()
        } else {
            format!("{}{}", self.origin, locator)
        }
    }
}

async fn probe_duration(client: &Client, url: &str) -> Result<f64, HeadlessOutputError> {
    debug!(%url, "Downloading track to probe its duration");

    let bytes = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;

    let tagged_file = Probe::new(Cursor::new(bytes.to_vec()))
        .guess_file_type()?
        .read()?;

    playable_duration(tagged_file.properties().duration())
}

// Lofty reports a zero length when it cannot tell.
fn playable_duration(duration: Duration) -> Result<f64, HeadlessOutputError> {
    if duration.is_zero() {
        return Err(HeadlessOutputError::UnknownDuration);
    }

    Ok(duration.as_secs_f64())
}

async fn start_playback(
    client: Client,
    url: String,
    duration: Option<f64>,
    playhead: Rc<RefCell<Playhead>>,
    generation: u64,
    tick: Duration,
) -> Result<(), AudioOutputError> {
    let duration = match duration {
        Some(duration) => duration,
        None => {
            let duration = probe_duration(&client, &url)
                .await
                .map_err(|error| AudioOutputError::Load(Box::new(error)))?;

            info!(%url, duration, "Track is ready to play");

            duration
        }
    };

    let generation = {
        let mut state = playhead.borrow_mut();
        // Paused or re-sourced while loading.
        if state.generation != generation {
            return Err(AudioOutputError::Aborted);
        }

        state.duration = Some(duration);
        if state.position >= duration {
            state.position = 0.0;
        }
        state.playing = true;
        state.generation += 1;
        state.generation
    };

    actix_rt::spawn(run_clock(playhead, generation, tick));

    Ok(())
}

async fn run_clock(playhead: Rc<RefCell<Playhead>>, generation: u64, tick: Duration) {
    let mut interval = actix_rt::time::interval(tick);
    interval.tick().await;

    loop {
        interval.tick().await;

        let mut state = playhead.borrow_mut();
        if state.generation != generation || !state.playing {
            break;
        }

        let duration = state.duration.unwrap_or_default();
        state.position = (state.position + tick.as_secs_f64()).min(duration);
        let current_time = state.position;

        state.emit(
            OutputChannel::TimeUpdate,
            OutputEvent::TimeUpdate {
                current_time,
                duration: Some(duration),
            },
        );

        if current_time >= duration {
            state.stop_clock();
            state.emit(OutputChannel::Ended, OutputEvent::Ended);
            break;
        }
    }
}

impl AudioOutput for HeadlessOutput {
    fn set_source(&mut self, locator: &str) {
        let mut playhead = self.playhead.borrow_mut();
        playhead.stop_clock();
        playhead.source = Some(locator.to_string());
        playhead.duration = None;
        playhead.position = 0.0;
    }

    fn clear_source(&mut self) {
        let mut playhead = self.playhead.borrow_mut();
        playhead.stop_clock();
        playhead.source = None;
        playhead.duration = None;
        playhead.position = 0.0;
    }

    fn seek_to_start(&mut self) {
        self.playhead.borrow_mut().position = 0.0;
    }

    fn play(&mut self) -> PlayFuture {
        let (source, duration, generation) = {
            let playhead = self.playhead.borrow();
            if playhead.playing {
                return future::ready(Ok(())).boxed_local();
            }
            (playhead.source.clone(), playhead.duration, playhead.generation)
        };
        let source = match source {
            Some(source) => source,
            None => return future::ready(Err(AudioOutputError::NoSource)).boxed_local(),
        };

        let url = self.resolve(&source);

        start_playback(
            self.client.clone(),
            url,
            duration,
            Rc::clone(&self.playhead),
            generation,
            self.tick,
        )
        .boxed_local()
    }

    fn pause(&mut self) {
        self.playhead.borrow_mut().stop_clock();
    }

    fn subscribe(&mut self, channel: OutputChannel, handler: OutputHandler) {
        self.playhead.borrow_mut().handlers.insert(channel, handler);
    }

    fn unsubscribe(&mut self, channel: OutputChannel) {
        self.playhead.borrow_mut().handlers.remove(&channel);
    }
}

use crate::{
    AudioOutput, AudioOutputError, CatalogSource, CatalogSourceError, OutputChannel, OutputEvent,
    OutputHandler, PlayFuture, TrackId,
};
use async_trait::async_trait;
use futures_lite::future;
use futures_lite::FutureExt;
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{Error, ErrorKind};
use std::rc::Rc;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OutputCall {
    SetSource(String),
    ClearSource,
    SeekToStart,
    Play,
    Pause,
    Subscribe(OutputChannel),
    Unsubscribe(OutputChannel),
}

#[derive(Default)]
struct Recording {
    calls: Vec<OutputCall>,
    handlers: HashMap<OutputChannel, OutputHandler>,
    play_outcome: PlayOutcome,
}

#[derive(Clone, Copy, Default)]
enum PlayOutcome {
    #[default]
    Start,
    Reject,
    Stall,
}

#[derive(Clone, Default)]
pub(crate) struct RecordingOutput(Rc<RefCell<Recording>>);

impl RecordingOutput {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn with_outcome(play_outcome: PlayOutcome) -> Self {
        let output = Self::default();
        output.0.borrow_mut().play_outcome = play_outcome;
        output
    }

    pub(crate) fn rejecting() -> Self {
        Self::with_outcome(PlayOutcome::Reject)
    }

    // Start requests never settle.
    pub(crate) fn stalling() -> Self {
        Self::with_outcome(PlayOutcome::Stall)
    }

    pub(crate) fn calls(&self) -> Vec<OutputCall> {
        self.0.borrow().calls.clone()
    }

    pub(crate) fn count(&self, call: &OutputCall) -> usize {
        self.0.borrow().calls.iter().filter(|c| *c == call).count()
    }

    pub(crate) fn is_subscribed(&self, channel: OutputChannel) -> bool {
        self.0.borrow().handlers.contains_key(&channel)
    }

    pub(crate) fn emit_ended(&self) {
        self.emit(OutputChannel::Ended, OutputEvent::Ended);
    }

    pub(crate) fn emit_time_update(&self, current_time: f64, duration: Option<f64>) {
        self.emit(
            OutputChannel::TimeUpdate,
            OutputEvent::TimeUpdate {
                current_time,
                duration,
            },
        );
    }

    fn emit(&self, channel: OutputChannel, event: OutputEvent) {
        let mut recording = self.0.borrow_mut();
        if let Some(handler) = recording.handlers.get_mut(&channel) {
            handler(event);
        }
    }

    fn record(&self, call: OutputCall) {
        self.0.borrow_mut().calls.push(call);
    }
}

impl AudioOutput for RecordingOutput {
    fn set_source(&mut self, locator: &str) {
        self.record(OutputCall::SetSource(locator.to_string()));
    }

    fn clear_source(&mut self) {
        self.record(OutputCall::ClearSource);
    }

    fn seek_to_start(&mut self) {
        self.record(OutputCall::SeekToStart);
    }

    fn play(&mut self) -> PlayFuture {
        self.record(OutputCall::Play);

        match self.0.borrow().play_outcome {
            PlayOutcome::Start => future::ready(Ok(())).boxed_local(),
            PlayOutcome::Reject => future::ready(Err(AudioOutputError::NotAllowed(
                "autoplay is blocked".into(),
            )))
            .boxed_local(),
            PlayOutcome::Stall => future::pending().boxed_local(),
        }
    }

    fn pause(&mut self) {
        self.record(OutputCall::Pause);
    }

    fn subscribe(&mut self, channel: OutputChannel, handler: OutputHandler) {
        self.record(OutputCall::Subscribe(channel));
        self.0.borrow_mut().handlers.insert(channel, handler);
    }

    fn unsubscribe(&mut self, channel: OutputChannel) {
        self.record(OutputCall::Unsubscribe(channel));
        self.0.borrow_mut().handlers.remove(&channel);
    }
}

pub(crate) struct CatalogSourceMock {
    tracks: Option<Vec<&'static str>>,
    delay: Duration,
}

impl CatalogSourceMock {
    pub(crate) fn with_tracks(tracks: Vec<&'static str>) -> Self {
        Self {
            tracks: Some(tracks),
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn failing() -> Self {
        Self {
            tracks: None,
            delay: Duration::ZERO,
        }
    }

    pub(crate) fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

#[async_trait(?Send)]
impl CatalogSource for CatalogSourceMock {
    async fn list_tracks(&self) -> Result<Vec<TrackId>, CatalogSourceError> {
        if !self.delay.is_zero() {
            actix_rt::time::sleep(self.delay).await;
        }

        match &self.tracks {
            Some(tracks) => Ok(tracks.iter().map(|name| TrackId::from(*name)).collect()),
            None => Err(CatalogSourceError::new(Error::from(
                ErrorKind::ConnectionRefused,
            ))),
        }
    }
}

pub(crate) async fn eventually(condition: impl Fn() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        actix_rt::time::sleep(Duration::from_millis(5)).await;
    }

    panic!("Condition was not met in time");
}

use crate::{EngineEvent, TrackId};

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    CatalogLoaded(Vec<TrackId>),
    Toggle,
    TrackEnded,
    PositionUpdate(f64),
    PlaybackStarted(StartAttempt),
    PlaybackRejected(StartAttempt),
}

// Identifies one start request; outcomes of superseded attempts are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartAttempt(pub(crate) u64);

impl From<EngineEvent> for Trigger {
    fn from(event: EngineEvent) -> Self {
        match event {
            EngineEvent::TrackEnded => Trigger::TrackEnded,
            EngineEvent::PositionUpdate(fraction) => Trigger::PositionUpdate(fraction),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Loading,
    Empty,
    Ready { playing: bool },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconcile {
    Skip,
    Derive,
    DeriveAfterEnd,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceDirective {
    Keep,
    Bind(TrackId),
    Rewind,
    Unbind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub source: SourceDirective,
    pub playing: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub(crate) catalog: Vec<TrackId>,
    pub(crate) current_index: usize,
    pub(crate) intent: bool,
    pub(crate) is_playing: bool,
    pub(crate) progress: f64,
    pub(crate) loading: bool,
    pub(crate) last_loaded_track: Option<TrackId>,
    pub(crate) pending_start: Option<StartAttempt>,
    pub(crate) attempts: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            catalog: vec![],
            current_index: 0,
            intent: false,
            is_playing: false,
            progress: 0.0,
            loading: true,
            last_loaded_track: None,
            pending_start: None,
            attempts: 0,
        }
    }
}

impl SessionState {
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_track(&self) -> Option<&TrackId> {
        self.catalog.get(self.current_index)
    }

    pub fn intent(&self) -> bool {
        self.intent
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_loaded_track(&self) -> Option<&TrackId> {
        self.last_loaded_track.as_ref()
    }

    pub fn pending_start(&self) -> Option<StartAttempt> {
        self.pending_start
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Loading
        } else if self.catalog.is_empty() {
            Phase::Empty
        } else {
            Phase::Ready {
                playing: self.is_playing,
            }
        }
    }

    pub fn can_toggle(&self) -> bool {
        !self.loading && !self.catalog.is_empty()
    }

    pub fn apply(&mut self, trigger: Trigger) -> Reconcile {
        match trigger {
            Trigger::CatalogLoaded(tracks) => self.on_catalog_loaded(tracks),
            Trigger::Toggle => self.on_toggle(),
            Trigger::TrackEnded => self.on_track_ended(),
            Trigger::PositionUpdate(fraction) => self.on_position_update(fraction),
            Trigger::PlaybackStarted(attempt) => self.on_playback_started(attempt),
            Trigger::PlaybackRejected(attempt) => self.on_playback_rejected(attempt),
        }
    }

    fn on_catalog_loaded(&mut self, tracks: Vec<TrackId>) -> Reconcile {
        self.loading = false;
        self.catalog = tracks;

        Reconcile::Derive
    }

    fn on_toggle(&mut self) -> Reconcile {
        if !self.can_toggle() {
            return Reconcile::Skip;
        }

        self.intent = !self.intent;
        if !self.intent {
            self.is_playing = false;
        }

        Reconcile::Derive
    }

    fn on_track_ended(&mut self) -> Reconcile {
        if self.catalog.is_empty() {
            self.intent = false;
            self.is_playing = false;
            self.progress = 0.0;
            self.pending_start = None;
            return Reconcile::Skip;
        }

        self.current_index = (self.current_index + 1) % self.catalog.len();

        Reconcile::DeriveAfterEnd
    }

    fn on_position_update(&mut self, fraction: f64) -> Reconcile {
        self.progress = if fraction.is_nan() {
            0.0
        } else {
            fraction.clamp(0.0, 1.0)
        };

        Reconcile::Skip
    }

    fn take_pending_start(&mut self, attempt: StartAttempt) -> bool {
        if self.pending_start != Some(attempt) {
            return false;
        }

        self.pending_start = None;
        true
    }

    fn on_playback_started(&mut self, attempt: StartAttempt) -> Reconcile {
        if self.take_pending_start(attempt) {
            self.is_playing = self.intent;
        }

        Reconcile::Skip
    }

    fn on_playback_rejected(&mut self, attempt: StartAttempt) -> Reconcile {
        if !self.take_pending_start(attempt) {
            return Reconcile::Skip;
        }

        self.intent = false;
        self.is_playing = false;

        Reconcile::Derive
    }

    // A directive that plays opens a new start attempt.
    pub fn reconcile(&mut self, reason: Reconcile) -> Option<Directive> {
        if reason == Reconcile::Skip {
            return None;
        }

        if self.catalog.is_empty() {
            self.current_index = 0;
            self.intent = false;
            self.is_playing = false;
            self.progress = 0.0;
            self.last_loaded_track = None;
            self.pending_start = None;

            return Some(Directive {
                source: SourceDirective::Unbind,
                playing: false,
            });
        }

        if self.current_index >= self.catalog.len() {
            self.current_index = 0;
        }

        let track = self.catalog[self.current_index].clone();
        let source = if self.last_loaded_track.as_ref() != Some(&track) {
            self.progress = 0.0;
            self.last_loaded_track = Some(track.clone());
            SourceDirective::Bind(track)
        } else if reason == Reconcile::DeriveAfterEnd {
            // Single track catalog wrapped onto itself.
            self.progress = 0.0;
            SourceDirective::Rewind
        } else {
            SourceDirective::Keep
        };

        if self.intent {
            self.attempts += 1;
            self.pending_start = Some(StartAttempt(self.attempts));
        } else {
            self.is_playing = false;
            self.pending_start = None;
        }

        Some(Directive {
            source,
            playing: self.intent,
        })
    }
}

use crate::{
    fetch_catalog, AudioOutput, CardView, CatalogSource, Directive, EngineBinding, EngineEvent,
    EngineListener, SessionState, SourceDirective, Trigger,
};
use actix_rt::task::JoinHandle;
use std::cell::Cell;
use std::rc::Rc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, trace, warn};

#[derive(Debug)]
pub enum CardMessage {
    Trigger(Trigger),
    Unmount,
}

#[derive(Clone)]
pub struct CardHandle {
    sender: mpsc::UnboundedSender<CardMessage>,
    view: watch::Receiver<CardView>,
}

impl CardHandle {
    pub fn toggle(&self) -> bool {
        self.sender
            .send(CardMessage::Trigger(Trigger::Toggle))
            .is_ok()
    }

    pub fn view(&self) -> CardView {
        self.view.borrow().clone()
    }

    pub fn unmount(&self) {
        let _ = self.sender.send(CardMessage::Unmount);
    }
}

pub struct MusicCard {
    state: SessionState,
    binding: EngineBinding,
    source: Rc<dyn CatalogSource>,
    sender: mpsc::UnboundedSender<CardMessage>,
    inbox: mpsc::UnboundedReceiver<CardMessage>,
    view: watch::Sender<CardView>,
    mounted: Rc<Cell<bool>>,
    start_task: Option<JoinHandle<()>>,
}

impl MusicCard {
    pub fn new(
        source: Rc<dyn CatalogSource>,
        output: Box<dyn AudioOutput>,
        track_base_path: &str,
    ) -> (Self, CardHandle) {
        let (sender, inbox) = mpsc::unbounded_channel();
        let state = SessionState::default();
        let (view, view_receiver) = watch::channel(CardView::project(&state));

        let listener: EngineListener = {
            let sender = sender.clone();
            Rc::new(move |event: EngineEvent| {
                let _ = sender.send(CardMessage::Trigger(event.into()));
            })
        };
        let binding = EngineBinding::attach(output, track_base_path, listener);

        let handle = CardHandle {
            sender: sender.clone(),
            view: view_receiver,
        };

        let card = Self {
            state,
            binding,
            source,
            sender,
            inbox,
            view,
            mounted: Rc::new(Cell::new(false)),
            start_task: None,
        };

        (card, handle)
    }

    pub async fn run(mut self) {
        self.mounted.set(true);
        self.spawn_catalog_load();

        info!("Music card mounted");

        while let Some(message) = self.inbox.recv().await {
            match message {
                CardMessage::Trigger(trigger) => self.dispatch(trigger),
                CardMessage::Unmount => break,
            }
        }

        self.teardown();
    }

    fn spawn_catalog_load(&self) {
        let source = Rc::clone(&self.source);
        let sender = self.sender.clone();
        let mounted = Rc::clone(&self.mounted);

        actix_rt::spawn(async move {
            let tracks = fetch_catalog(source.as_ref()).await;

            if !mounted.get() {
                debug!("Card has been unmounted before the catalog arrived");
                return;
            }

            let _ = sender.send(CardMessage::Trigger(Trigger::CatalogLoaded(tracks)));
        });
    }

    fn dispatch(&mut self, trigger: Trigger) {
        match &trigger {
            Trigger::PositionUpdate(fraction) => trace!(fraction, "Position update"),
            other => debug!(trigger = ?other, "Applying trigger"),
        }

        let reason = self.state.apply(trigger);
        if let Some(directive) = self.state.reconcile(reason) {
            self.drive(directive);
        }

        self.publish();
    }

    fn drive(&mut self, directive: Directive) {
        match directive.source {
            SourceDirective::Bind(track) => {
                self.binding.bind(&track);
            }
            SourceDirective::Rewind => self.binding.rewind(),
            SourceDirective::Unbind => self.binding.unbind(),
            SourceDirective::Keep => (),
        }

        self.cancel_start();

        let play = self.binding.set_desired_playing(directive.playing);
        let attempt = match self.state.pending_start() {
            Some(attempt) if directive.playing => attempt,
            _ => return,
        };

        let sender = self.sender.clone();
        self.start_task = Some(actix_rt::spawn(async move {
            let trigger = match play.await {
                Ok(()) => Trigger::PlaybackStarted(attempt),
                Err(error) => {
                    warn!(?error, "Unable to start playback");
                    Trigger::PlaybackRejected(attempt)
                }
            };

            let _ = sender.send(CardMessage::Trigger(trigger));
        }));
    }

    fn cancel_start(&mut self) {
        if let Some(task) = self.start_task.take() {
            task.abort();
        }
    }

    fn publish(&self) {
        self.view.send_replace(CardView::project(&self.state));
    }

    fn teardown(&mut self) {
        self.mounted.set(false);
        self.cancel_start();
        self.inbox.close();
        self.binding.release();

        info!("Music card unmounted");
    }
}

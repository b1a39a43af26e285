use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use pdbkit::engine::progress::{Progress, ProgressCallback};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::warn;

const SPINNER_TICK_MS: u64 = 80;

#[derive(Debug)]
pub enum UiEvent {
    Progress(Progress),
    Log(String),
}

pub struct UiManager {
    mp: Arc<MultiProgress>,
    state: BarState,
    event_receiver: mpsc::Receiver<UiEvent>,
    shutdown_receiver: watch::Receiver<bool>,
    _sentinel_bar: ProgressBar,
}

#[derive(Default)]
struct BarState {
    active_bar: Option<ProgressBar>,
    base_message: String,
    indeterminate: bool,
}

impl UiManager {
    pub fn new() -> (Self, mpsc::Sender<UiEvent>, watch::Sender<bool>) {
        let (event_sender, event_receiver) = mpsc::channel(1024);
        let (shutdown_sender, shutdown_receiver) = watch::channel(false);
        let mp = Arc::new(MultiProgress::new());
        mp.set_draw_target(ProgressDrawTarget::stderr_with_hz(12));
        let _sentinel_bar = mp.add(ProgressBar::hidden());
        let manager = Self {
            mp,
            state: BarState::default(),
            event_receiver,
            shutdown_receiver,
            _sentinel_bar,
        };

        (manager, event_sender, shutdown_sender)
    }

    pub async fn run(mut self) {
        loop {
            tokio::select! {
                Some(event) = self.event_receiver.recv() => {
                    self.handle_event(event);
                }
                result = self.shutdown_receiver.changed() => {
                    if result.is_err() || *self.shutdown_receiver.borrow() {
                        break;
                    }
                }
            }
        }
        while let Ok(event) = self.event_receiver.try_recv() {
            self.handle_event(event);
        }
        if let Some(bar) = self.state.active_bar.take() {
            bar.finish_and_clear();
        }
        self._sentinel_bar.finish_and_clear();
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Log(msg) => {
                self.mp.println(msg).ok();
            }
            UiEvent::Progress(progress) => self.handle_progress(progress),
        }
    }

    fn handle_progress(&mut self, progress: Progress) {
        match progress {
            Progress::Started { source } => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                let pb = self.mp.add(ProgressBar::new(100));
                pb.set_style(Self::bar_style());
                pb.set_message(format!("Loading {source}"));

                self.state.active_bar = Some(pb);
                self.state.base_message = format!("Loaded {source}");
                self.state.indeterminate = false;
            }
            Progress::Advanced { percent, .. } => {
                let Some(bar) = self.state.active_bar.as_ref() else {
                    return;
                };
                match percent {
                    Some(value) => bar.set_position(u64::from(value)),
                    None if !self.state.indeterminate => {
                        bar.set_style(Self::spinner_style());
                        bar.enable_steady_tick(Duration::from_millis(SPINNER_TICK_MS));
                        self.state.indeterminate = true;
                    }
                    None => {}
                }
            }
            Progress::Completed => {
                if let Some(bar) = self.state.active_bar.take() {
                    bar.finish_and_clear();
                }

                if !self.state.base_message.is_empty() {
                    let final_message = format!("✓ {}", self.state.base_message);
                    self.mp.println(final_message).ok();
                }

                self.state.base_message.clear();
                self.state.indeterminate = false;
            }
            Progress::Message(msg) => {
                self.mp.println(format!("  {}", msg)).ok();
            }
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
    }

    fn bar_style() -> ProgressStyle {
        ProgressStyle::with_template("{msg:<45} [{bar:40.cyan/blue}] {pos:>3}% ({elapsed})")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("━╸ ")
    }
}

#[derive(Clone)]
pub struct CliProgressHandler {
    sender: mpsc::Sender<UiEvent>,
}

impl CliProgressHandler {
    pub fn new(sender: mpsc::Sender<UiEvent>) -> Self {
        Self { sender }
    }

    pub fn get_callback(&self) -> ProgressCallback<'static> {
        let sender = self.sender.clone();
        Box::new(move |progress: Progress| {
            if let Err(e) = sender.try_send(UiEvent::Progress(progress)) {
                warn!("Failed to send progress update to UI channel: {}", e);
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn setup_manager() -> UiManager {
        let (manager, _sender, _shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        manager
    }

    fn started(source: &str) -> UiEvent {
        UiEvent::Progress(Progress::Started {
            source: source.into(),
        })
    }

    fn advanced(percent: Option<u8>) -> UiEvent {
        UiEvent::Progress(Progress::Advanced {
            percent,
            message: "Loading 1abc.pdb".into(),
        })
    }

    #[test]
    fn started_creates_percentage_bar() {
        let mut manager = setup_manager();
        assert!(manager.state.active_bar.is_none());

        manager.handle_event(started("1abc.pdb"));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Loading 1abc.pdb");
        assert_eq!(bar.length(), Some(100));
        assert_eq!(manager.state.base_message, "Loaded 1abc.pdb");
    }

    #[test]
    fn started_replaces_existing_bar() {
        let mut manager = setup_manager();
        manager.handle_event(started("first.pdb"));
        manager.handle_event(started("second.pdb"));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.message(), "Loading second.pdb");
    }

    #[test]
    fn advanced_moves_bar_to_reported_percent() {
        let mut manager = setup_manager();
        manager.handle_event(started("1abc.pdb"));
        manager.handle_event(advanced(Some(10)));
        manager.handle_event(advanced(Some(42)));

        let bar = manager.state.active_bar.as_ref().unwrap();
        assert_eq!(bar.position(), 42);
        assert!(!manager.state.indeterminate);
    }

    #[test]
    fn unknown_percent_switches_to_spinner() {
        let mut manager = setup_manager();
        manager.handle_event(started("stream"));
        manager.handle_event(advanced(None));
        manager.handle_event(advanced(None));

        assert!(manager.state.indeterminate);
        assert_eq!(manager.state.active_bar.as_ref().unwrap().position(), 0);
    }

    #[test]
    fn advanced_without_bar_is_ignored() {
        let mut manager = setup_manager();
        manager.handle_event(advanced(Some(50)));
        assert!(manager.state.active_bar.is_none());
    }

    #[test]
    fn completed_clears_active_bar() {
        let mut manager = setup_manager();
        manager.handle_event(started("1abc.pdb"));
        manager.handle_event(UiEvent::Progress(Progress::Completed));

        assert!(manager.state.active_bar.is_none());
        assert!(manager.state.base_message.is_empty());
    }

    #[test]
    fn log_and_message_events_are_printed() {
        let mut manager = setup_manager();
        manager.handle_event(UiEvent::Log("Test log message".to_string()));
        manager.handle_event(UiEvent::Progress(Progress::Message(
            "Applying 4 crystallographic operators".to_string(),
        )));
    }

    #[tokio::test]
    async fn cli_progress_handler_sends_progress_event() {
        let (sender, mut receiver) = mpsc::channel(1);
        let handler = CliProgressHandler::new(sender);
        let callback = handler.get_callback();

        callback(Progress::Started {
            source: "file:/tmp/1abc.pdb".into(),
        });

        let event = receiver.recv().await.unwrap();
        let UiEvent::Progress(Progress::Started { source }) = event else {
            panic!("Incorrect event type received");
        };
        assert_eq!(source, "file:/tmp/1abc.pdb");
    }

    #[tokio::test]
    async fn run_exits_on_shutdown_signal() {
        let (manager, sender, shutdown) = UiManager::new();
        manager.mp.set_draw_target(ProgressDrawTarget::hidden());
        let handle = tokio::spawn(manager.run());

        sender.send(UiEvent::Log("before shutdown".into())).await.unwrap();
        shutdown.send(true).unwrap();
        handle.await.unwrap();
    }
}

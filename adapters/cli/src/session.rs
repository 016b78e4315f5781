//! Interactive session: one world, one presentation, one message at a time.

use std::{
    mem,
    sync::{
        mpsc::{Receiver, RecvTimeoutError, Sender},
        Arc,
    },
    thread,
    time::{Duration, Instant},
};

use number_rush_core::{Command, Event, GamePhase, PowerUp, SaveCode, SaveSnapshot};
use number_rush_presentation::{present, Modal, Presentation};
use number_rush_system_persistence::{
    fetch_remote, push_remote, unix_millis, KeyValueStore, PersistenceError, PersistenceGateway,
    RemoteLoad, RemoteSave, RemoteStore,
};
use number_rush_world::{apply, query, World};
use tracing::{debug, info, warn};

use crate::input::{parse_input, Input, USAGE};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Remote handle shared with worker threads.
pub(crate) type SharedRemote = Arc<dyn RemoteStore + Send + Sync>;

/// Everything the main loop reacts to.
#[derive(Debug)]
pub(crate) enum Message {
    /// A line read from stdin.
    Line(String),
    /// Stdin was closed.
    Eof,
    /// A remote save finished on a worker thread.
    Saved {
        code: SaveCode,
        snapshot: SaveSnapshot,
        result: Result<(), PersistenceError>,
    },
    /// A remote load finished on a worker thread.
    Loaded {
        code: SaveCode,
        result: Result<Option<SaveSnapshot>, PersistenceError>,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

pub(crate) struct Session<P, L> {
    world: World,
    gateway: PersistenceGateway<L, SharedRemote>,
    presentation: P,
    modal: Modal,
    outbox: Sender<Message>,
    sync_pending: bool,
    deadline: Option<Instant>,
    events: Vec<Event>,
}

impl<P, L> Session<P, L>
where
    P: Presentation,
    L: KeyValueStore,
{
    pub(crate) fn new(
        world: World,
        gateway: PersistenceGateway<L, SharedRemote>,
        presentation: P,
        outbox: Sender<Message>,
    ) -> Self {
        Self {
            world,
            gateway,
            presentation,
            modal: Modal::new(),
            outbox,
            sync_pending: false,
            deadline: None,
            events: Vec::new(),
        }
    }

    /// Greets the player and restores the automatic snapshot.
    pub(crate) fn boot(&mut self) {
        let banner = query::welcome_banner(&self.world);
        self.presentation.notify(banner);
        self.presentation.notify(USAGE);

        let snapshot = self.gateway.load_local().unwrap_or_default();
        debug!(level = snapshot.level.get(), gold = snapshot.gold.get(), "booting session");
        self.dispatch(Command::RestoreProgress { snapshot });
    }

    /// Processes messages until the player quits or stdin closes.
    pub(crate) fn run(mut self, inbox: &Receiver<Message>) {
        loop {
            let message = match self.deadline {
                Some(deadline) => {
                    match inbox.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
                        Ok(message) => message,
                        Err(RecvTimeoutError::Timeout) => {
                            self.tick();
                            continue;
                        }
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                None => match inbox.recv() {
                    Ok(message) => message,
                    Err(_) => break,
                },
            };

            if self.handle(message) == Flow::Quit {
                break;
            }
        }
        info!(
            level = query::level(&self.world).get(),
            gold = query::gold(&self.world).get(),
            "session ended"
        );
    }

    fn handle(&mut self, message: Message) -> Flow {
        match message {
            Message::Line(line) => return self.handle_line(&line),
            Message::Eof => return Flow::Quit,
            Message::Saved {
                code,
                snapshot,
                result,
            } => self.finish_save(&code, &snapshot, result),
            Message::Loaded { code, result } => self.finish_load(&code, result),
        }
        Flow::Continue
    }

    fn handle_line(&mut self, line: &str) -> Flow {
        let input = match parse_input(line) {
            Ok(Some(input)) => input,
            Ok(None) => return Flow::Continue,
            Err(error) => {
                self.presentation.notify(&format!("{error}. {USAGE}"));
                return Flow::Continue;
            }
        };

        match input {
            Input::Click(value) => self.dispatch(Command::ClickCell { value }),
            Input::Hint => self.dispatch(Command::UsePowerUp {
                kind: PowerUp::Hint,
            }),
            Input::Time => self.dispatch(Command::UsePowerUp {
                kind: PowerUp::ExtendTime,
            }),
            Input::Confirm => match self.modal.take_action() {
                Some(command) => {
                    self.presentation.hide_modal();
                    self.dispatch(command);
                }
                None => self.presentation.notify("Nothing to confirm."),
            },
            Input::Reset => match query::phase(&self.world) {
                GamePhase::GameOver | GamePhase::GameWon => self.dispatch(Command::ResetGame),
                GamePhase::LevelInProgress | GamePhase::LevelComplete => self
                    .presentation
                    .notify("Reset is only available once the run is over."),
            },
            Input::Save(code) => self.start_save(code),
            Input::Load(code) => self.start_load(code),
            Input::Status => {
                let status = status_line(&self.world);
                self.presentation.notify(&status);
            }
            Input::Help => self.presentation.notify(USAGE),
            Input::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    fn tick(&mut self) {
        self.deadline = self.deadline.map(|deadline| deadline + TICK_INTERVAL);
        self.dispatch(Command::Tick);
    }

    fn dispatch(&mut self, command: Command) {
        let mut events = mem::take(&mut self.events);
        apply(&mut self.world, command, &mut events);
        present(&events, &mut self.presentation, &mut self.modal);

        for event in &events {
            match event {
                Event::TimerStarted { .. } => {
                    self.deadline = Some(Instant::now() + TICK_INTERVAL);
                }
                Event::TimerStopped { .. } | Event::TimerExpired => self.deadline = None,
                Event::PersistRequested => self.persist_local(),
                _ => {}
            }
        }

        events.clear();
        self.events = events;
    }

    fn persist_local(&mut self) {
        let snapshot = query::snapshot(&self.world);
        if let Err(error) = self.gateway.save_local(&snapshot) {
            warn!(%error, "failed to store progress locally");
        }
    }

    fn start_save(&mut self, code: SaveCode) {
        if !self.claim_sync() {
            return;
        }
        let snapshot = query::snapshot(&self.world);
        let remote = Arc::clone(self.gateway.remote());
        let outbox = self.outbox.clone();
        self.presentation
            .notify(&format!("Saving progress under '{code}'..."));

        let _ = thread::spawn(move || {
            let result = push_remote(&remote, &code, &snapshot, unix_millis());
            let _ = outbox.send(Message::Saved {
                code,
                snapshot,
                result,
            });
        });
    }

    fn start_load(&mut self, code: SaveCode) {
        if !self.claim_sync() {
            return;
        }
        let remote = Arc::clone(self.gateway.remote());
        let outbox = self.outbox.clone();
        self.presentation
            .notify(&format!("Loading progress for '{code}'..."));

        let _ = thread::spawn(move || {
            let result = fetch_remote(&remote, &code);
            let _ = outbox.send(Message::Loaded { code, result });
        });
    }

    fn claim_sync(&mut self) -> bool {
        if self.sync_pending {
            self.presentation.notify("Sync already in progress.");
            return false;
        }
        self.sync_pending = true;
        true
    }

    fn finish_save(
        &mut self,
        code: &SaveCode,
        snapshot: &SaveSnapshot,
        result: Result<(), PersistenceError>,
    ) {
        self.sync_pending = false;
        match self.gateway.resolve_save(code, snapshot, result) {
            Ok(RemoteSave::Remote) => self
                .presentation
                .notify(&format!("Progress saved under '{code}'.")),
            Ok(RemoteSave::LocalFallback { cause }) => self.presentation.notify(&format!(
                "Could not reach shared storage ({cause}). Saved '{code}' on this device instead."
            )),
            Err(error) => self
                .presentation
                .notify(&format!("Saving '{code}' failed: {error}")),
        }
    }

    fn finish_load(
        &mut self,
        code: &SaveCode,
        result: Result<Option<SaveSnapshot>, PersistenceError>,
    ) {
        self.sync_pending = false;
        match self.gateway.resolve_load(code, result) {
            RemoteLoad::Remote(snapshot) => {
                self.presentation.notify(&format!(
                    "Loaded '{code}': level {}, {} gold.",
                    snapshot.level, snapshot.gold
                ));
                self.dispatch(Command::RestoreProgress { snapshot });
            }
            RemoteLoad::LocalFallback { snapshot, cause } => {
                self.presentation.notify(&format!(
                    "Could not reach shared storage ({cause}). Loaded the copy of '{code}' kept on this device."
                ));
                self.dispatch(Command::RestoreProgress { snapshot });
            }
            RemoteLoad::NotFound => self
                .presentation
                .notify(&format!("No save found for code '{code}'.")),
            RemoteLoad::Corrupt(cause) => self.presentation.notify(&format!(
                "The save stored under '{code}' is unreadable ({cause})."
            )),
            RemoteLoad::Unavailable(cause) => self.presentation.notify(&format!(
                "Could not load '{code}': {cause}"
            )),
        }
    }

    #[cfg(test)]
    fn world(&self) -> &World {
        &self.world
    }
}

fn status_line(world: &World) -> String {
    format!(
        "Level {} | Gold {} (best {}) | Next {} | Time {}s | {}/{} found",
        query::level(world),
        query::gold(world),
        query::high_score(world),
        query::next_target(world),
        query::remaining_seconds(world),
        query::cursor(world),
        query::target_sequence(world).len(),
    )
}

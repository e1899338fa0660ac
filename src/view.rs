//! The users view: state machine plus the one-shot fetch task.
//!
//! `mount` spawns a worker that calls the [`UserSource`] once and posts the
//! result back as a [`Message`]. The owning (UI) thread applies it with
//! [`UsersView::pump`] or [`UsersView::wait`].

use crate::diagnostics::Diagnostics;
use crate::fetch::{FetchError, UserSource};
use crate::users::{self, User};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState {
    /// Not mounted yet
    Idle,
    Loading,
    /// Sorted most recent first
    Loaded { users: Vec<User> },
    /// Renders like an empty `Loaded`; the reason is only logged
    Failed { reason: String },
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Idle | ViewState::Loading)
    }

    /// Users to display once loading has finished
    pub fn users(&self) -> Option<&[User]> {
        match self {
            ViewState::Loaded { users } => Some(users.as_slice()),
            ViewState::Failed { .. } => Some(&[][..]),
            ViewState::Idle | ViewState::Loading => None,
        }
    }
}

#[derive(Debug)]
pub enum Message {
    Fetched {
        result: Result<Vec<User>, FetchError>,
        elapsed: Duration,
    },
}

pub struct UsersView {
    source: Arc<dyn UserSource>,
    source_name: String,
    state: ViewState,
    tx: Sender<Message>,
    rx: Receiver<Message>,
    mounted: bool,
    diagnostics: Diagnostics,
}

impl UsersView {
    pub fn new(source: Arc<dyn UserSource>, source_name: &str, diagnostics: Diagnostics) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            source,
            source_name: source_name.to_string(),
            state: ViewState::Idle,
            tx,
            rx,
            mounted: false,
            diagnostics,
        }
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Start the fetch. Only the first call has any effect.
    pub fn mount(&mut self) {
        if self.mounted {
            tracing::debug!("users view already mounted");
            return;
        }
        self.mounted = true;
        self.state = ViewState::Loading;
        self.diagnostics.fetch_started(&self.source_name);

        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();
        thread::spawn(move || {
            let started = Instant::now();
            let result = source.fetch_users();
            let msg = Message::Fetched {
                result,
                elapsed: started.elapsed(),
            };
            if tx.send(msg).is_err() {
                // View dropped before the fetch settled
                tracing::debug!("users view gone, discarding fetch result");
            }
        });
    }

    /// Apply every queued message without blocking. Returns true if the
    /// state changed.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(msg) = self.rx.try_recv() {
            self.update(msg);
            changed = true;
        }
        changed
    }

    /// Block until the fetch has settled
    pub fn wait(&mut self) {
        while self.state.is_loading() && self.mounted {
            // The view holds a sender itself, so recv only returns Err if
            // that invariant is broken.
            match self.rx.recv() {
                Ok(msg) => self.update(msg),
                Err(_) => break,
            }
        }
    }

    pub fn update(&mut self, msg: Message) {
        match msg {
            Message::Fetched { result, elapsed } => {
                if !matches!(self.state, ViewState::Loading) {
                    tracing::debug!("ignoring fetch result outside of loading state");
                    return;
                }
                let ms = elapsed.as_millis() as u64;
                self.state = match result {
                    Ok(mut list) => {
                        users::sort_by_created_desc(&mut list);
                        self.diagnostics.fetch_ok(list.len(), ms);
                        ViewState::Loaded { users: list }
                    }
                    Err(e) => {
                        let reason = e.to_string();
                        self.diagnostics.fetch_failed(&reason, ms);
                        ViewState::Failed { reason }
                    }
                };
            }
        }
    }
}

//! Process-wide table of live sessions keyed by their join code
//!
//! The registry owns code generation and enforces the pairing rules:
//! - Codes are 4-digit numerals, unique among live sessions
//! - A session accepts exactly one joiner after its creator
//! - The simulation loop for a session is started exactly once, by the join
//!
//! All table access goes through a single lock that is only held for the
//! lookup/insert/delete itself, never across network I/O or a tick.

use crate::config::{SessionConfig, EVENT_QUEUE_CAPACITY};
use crate::error::SessionError;
use crate::session::{PlayerLink, Session, SessionEvent};
use crate::simulation;
use log::{debug, info};
use rand::Rng;
use shared::ServerMessage;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;

/// Number of distinct 4-digit codes
const CODE_SPACE: usize = 10_000;

/// State a created session holds until its second player arrives
struct PendingSession {
    creator: PlayerLink,
    events: mpsc::Receiver<SessionEvent>,
}

/// Registry bookkeeping for one live session
struct Entry {
    created_at: Instant,
    events: mpsc::Sender<SessionEvent>,
    /// Taken by the join that starts the session
    pending: Option<PendingSession>,
}

impl Entry {
    /// A session counts as started once its joiner has taken the pending state
    fn is_started(&self) -> bool {
        self.pending.is_none()
    }
}

/// Result of a successful create
#[derive(Debug)]
pub struct Created {
    pub code: String,
    /// Queue for the creator's paddle updates
    pub events: mpsc::Sender<SessionEvent>,
}

/// Result of a successful join
#[derive(Debug)]
pub struct Joined {
    /// Queue for the joiner's paddle updates
    pub events: mpsc::Sender<SessionEvent>,
}

/// Cloneable handle to the shared session table
#[derive(Clone)]
pub struct Registry {
    sessions: Arc<Mutex<HashMap<String, Entry>>>,
    running_loops: Arc<AtomicUsize>,
    config: SessionConfig,
}

impl Registry {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            running_loops: Arc::new(AtomicUsize::new(0)),
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Registers a new waiting session for `creator` and returns its code
    ///
    /// The create acknowledgment is queued on the creator's link before the
    /// code becomes visible to joiners, so it always precedes the first
    /// broadcast.
    pub async fn create(&self, creator: PlayerLink) -> Result<Created, SessionError> {
        let mut sessions = self.sessions.lock().await;

        if sessions.len() >= CODE_SPACE {
            return Err(SessionError::CodesExhausted);
        }

        let code = {
            let mut rng = rand::thread_rng();
            loop {
                let candidate = format!("{:04}", rng.gen_range(0..CODE_SPACE));
                if !sessions.contains_key(&candidate) {
                    break candidate;
                }
            }
        };

        if let Err(e) = creator.deliver(ServerMessage::created(&code)) {
            debug!("Session {}: create acknowledgment not queued: {}", code, e);
        }

        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
        sessions.insert(
            code.clone(),
            Entry {
                created_at: Instant::now(),
                events: events_tx.clone(),
                pending: Some(PendingSession {
                    creator,
                    events: events_rx,
                }),
            },
        );

        info!("Session {} created ({} live)", code, sessions.len());

        Ok(Created {
            code,
            events: events_tx,
        })
    }

    /// Attaches `joiner` as the second player and starts the session's loop
    pub async fn join(&self, code: &str, joiner: PlayerLink) -> Result<Joined, SessionError> {
        let mut sessions = self.sessions.lock().await;

        let entry = sessions.get_mut(code).ok_or(SessionError::CodeNotFound)?;
        let pending = entry.pending.take().ok_or(SessionError::SessionFull)?;
        let events = entry.events.clone();

        let session = Session::new(code.to_string(), pending.creator, joiner, pending.events);
        simulation::spawn(session, self.clone());

        info!("Session {} started", code);

        Ok(Joined { events })
    }

    /// Deletes a session; returns false if the code was not live
    pub async fn remove(&self, code: &str) -> bool {
        let mut sessions = self.sessions.lock().await;
        sessions.remove(code).is_some()
    }

    /// Evicts every session still waiting for a second player after `timeout`
    ///
    /// Started sessions are left alone; their lifetime belongs to the
    /// simulation loop.
    pub async fn reap_idle(&self, timeout: Duration) -> Vec<String> {
        let mut sessions = self.sessions.lock().await;

        let expired: Vec<String> = sessions
            .iter()
            .filter(|(_, entry)| !entry.is_started() && entry.created_at.elapsed() > timeout)
            .map(|(code, _)| code.clone())
            .collect();

        for code in &expired {
            sessions.remove(code);
        }

        expired
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }

    pub async fn contains(&self, code: &str) -> bool {
        self.sessions.lock().await.contains_key(code)
    }

    /// Whether the session has been joined; None if the code is not live
    pub async fn is_started(&self, code: &str) -> Option<bool> {
        self.sessions
            .lock()
            .await
            .get(code)
            .map(Entry::is_started)
    }

    /// Number of simulation loops currently running
    pub fn running_loops(&self) -> usize {
        self.running_loops.load(Ordering::SeqCst)
    }

    pub(crate) fn loop_started(&self) {
        self.running_loops.fetch_add(1, Ordering::SeqCst);
    }

    pub(crate) fn loop_finished(&self) {
        self.running_loops.fetch_sub(1, Ordering::SeqCst);
    }
}

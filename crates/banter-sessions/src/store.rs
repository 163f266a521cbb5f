//! Owned map of per-channel sessions.
//!
//! One `Mutex<Session>` per channel — there is no global lock. The mutexes
//! guard short synchronous critical sections only; nothing holds them across
//! an await point. The busy flag is the single field contended by concurrent
//! handlers: `try_begin` performs its compare-and-set under the channel lock,
//! so exactly one of two racing handlers wins.

use std::sync::{Arc, Mutex};

use dashmap::DashMap;
use tracing::warn;

use crate::session::Session;

pub struct SessionStore {
    sessions: DashMap<u64, Mutex<Session>>,
}

impl SessionStore {
    /// Create one session per configured channel, seeded with the system
    /// prompt. Sessions live until process shutdown.
    pub fn new(channels: &[u64], system_prompt: &str) -> Self {
        let sessions = DashMap::new();
        for &channel in channels {
            sessions.insert(channel, Mutex::new(Session::new(system_prompt)));
        }
        Self { sessions }
    }

    pub fn contains(&self, channel: u64) -> bool {
        self.sessions.contains_key(&channel)
    }

    /// Run `f` under the channel's session lock. Returns `None` for an
    /// unknown channel.
    pub fn with<R>(&self, channel: u64, f: impl FnOnce(&mut Session) -> R) -> Option<R> {
        let entry = self.sessions.get(&channel)?;
        let mut session = match entry.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                warn!(channel, "session mutex poisoned, recovering");
                poisoned.into_inner()
            }
        };
        Some(f(&mut session))
    }

    /// Atomically flip the channel's busy flag false→true.
    ///
    /// Returns `None` when the channel is unknown or already busy. The
    /// returned guard clears the flag on drop, which is the guaranteed
    /// release path for every turn outcome.
    pub fn try_begin(store: &Arc<SessionStore>, channel: u64) -> Option<BusyGuard> {
        let acquired = store.with(channel, |session| {
            if session.busy {
                false
            } else {
                session.busy = true;
                true
            }
        })?;

        acquired.then(|| BusyGuard {
            store: Arc::clone(store),
            channel,
        })
    }

    pub fn is_busy(&self, channel: u64) -> bool {
        self.with(channel, |session| session.busy).unwrap_or(false)
    }

    /// Clear the channel's history back to `[system]`.
    pub fn reset(&self, channel: u64) {
        self.with(channel, Session::reset);
    }
}

/// Holds a channel's busy flag; dropping it releases the flag.
pub struct BusyGuard {
    store: Arc<SessionStore>,
    channel: u64,
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.store.with(self.channel, |session| session.busy = false);
    }
}

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use super::error::ClientError;

/// Bearer tokens issued by `POST /api/token/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

/// Broadcast whenever the session changes so views can react to a logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Anonymous,
    Active,
    Refreshed,
    LoggedOut,
}

#[derive(Debug)]
pub struct Session {
    tokens: RwLock<Option<SessionTokens>>,
    events: watch::Sender<SessionEvent>,
}

impl Session {
    pub fn new(tokens: Option<SessionTokens>) -> Self {
        let initial = if tokens.is_some() {
            SessionEvent::Active
        } else {
            SessionEvent::Anonymous
        };
        let (events, _) = watch::channel(initial);
        Self {
            tokens: RwLock::new(tokens),
            events,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn tokens(&self) -> Option<SessionTokens> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.tokens().map(|tokens| tokens.access)
    }

    pub fn refresh_token(&self) -> Option<String> {
        self.tokens().and_then(|tokens| tokens.refresh)
    }

    pub fn store(&self, tokens: SessionTokens) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = Some(tokens);
        self.events.send_replace(SessionEvent::Active);
    }

    /// Swaps in a refreshed access token, keeping the old refresh token
    /// unless the backend rotated it.
    pub fn refreshed(&self, access: String, refresh: Option<String>) {
        {
            let mut guard = self.tokens.write().unwrap_or_else(PoisonError::into_inner);
            let refresh = refresh.or_else(|| guard.as_ref().and_then(|t| t.refresh.clone()));
            *guard = Some(SessionTokens { access, refresh });
        }
        self.events.send_replace(SessionEvent::Refreshed);
    }

    pub fn logout(&self) {
        *self.tokens.write().unwrap_or_else(PoisonError::into_inner) = None;
        self.events.send_replace(SessionEvent::LoggedOut);
    }
}

/// Keys of mutating requests currently on the wire.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    keys: Arc<Mutex<HashSet<String>>>,
}

impl InFlightRegistry {
    /// Claims `key`, refusing while an earlier claim is still alive.
    pub fn begin(&self, key: impl Into<String>) -> Result<InFlightTicket, ClientError> {
        let key = key.into();
        let mut guard = self.keys.lock().unwrap_or_else(PoisonError::into_inner);
        if !guard.insert(key.clone()) {
            return Err(ClientError::DuplicateRequest(key));
        }
        Ok(InFlightTicket {
            keys: Arc::clone(&self.keys),
            key,
        })
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(key)
    }
}

/// Releases its key when dropped, whether the request succeeded or not.
#[derive(Debug)]
pub struct InFlightTicket {
    keys: Arc<Mutex<HashSet<String>>>,
    key: String,
}

impl Drop for InFlightTicket {
    fn drop(&mut self) {
        self.keys
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

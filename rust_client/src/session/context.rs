//! The session provider shared by every view-model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::storage::SessionStorage;
use crate::backend::{ApiError, ApiResult};
use crate::models::Session;

/// Storage key of the signed-in user record.
pub const SESSION_KEY: &str = "farm_user";
/// Storage key of the interface language.
pub const LANGUAGE_KEY: &str = "language";

/// Interface language.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Uz,
    En,
}

impl Language {
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Uz => "uz",
            Language::En => "en",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "uz" => Ok(Language::Uz),
            "en" => Ok(Language::En),
            other => Err(format!("Unsupported language: {}", other)),
        }
    }
}

/// What observers are told.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    SignedIn(Session),
    SignedOut,
    /// The persisted record was changed by someone else; carries the new value.
    External(Option<Session>),
    LanguageChanged(Language),
}

/// Handle returned by [`SessionContext::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

#[derive(Default)]
struct CachedState {
    /// Raw stored text, to detect outside changes exactly.
    raw_session: Option<String>,
    session: Option<Session>,
    raw_language: Option<String>,
    language: Language,
}

/// Single source of truth for "who is signed in".
///
/// Writes go to storage first, then the cached copy, then observers are
/// called synchronously outside any lock. Nothing here talks to the server;
/// the record is trusted as stored.
pub struct SessionContext {
    storage: Arc<dyn SessionStorage>,
    state: RwLock<CachedState>,
    observers: RwLock<Vec<(SubscriptionId, Observer)>>,
    next_subscription: AtomicU64,
}

/// A record that does not decode is treated as no session.
fn decode_session(raw: Option<&str>) -> Option<Session> {
    let raw = raw?;
    match serde_json::from_str::<Session>(raw) {
        Ok(session) => Some(session),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring corrupt stored session");
            None
        }
    }
}

fn decode_language(raw: Option<&str>) -> Language {
    raw.and_then(|s| s.parse().ok()).unwrap_or_default()
}

impl SessionContext {
    /// Create the provider and load whatever is already stored.
    ///
    /// A storage read failure is logged and starts signed out.
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        let context = Self {
            storage,
            state: RwLock::new(CachedState::default()),
            observers: RwLock::new(Vec::new()),
            next_subscription: AtomicU64::new(1),
        };
        if let Err(e) = context.reload() {
            tracing::warn!(error = %e, "Could not read stored session");
        }
        context
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CachedState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CachedState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Re-read both keys; returns the events the change amounts to.
    fn reload(&self) -> ApiResult<Vec<SessionEvent>> {
        let raw_session = self.storage.get(SESSION_KEY)?;
        let raw_language = self.storage.get(LANGUAGE_KEY)?;

        let mut events = Vec::new();
        let mut state = self.write_state();
        if state.raw_session != raw_session {
            state.session = decode_session(raw_session.as_deref());
            state.raw_session = raw_session;
            events.push(SessionEvent::External(state.session.clone()));
        }
        if state.raw_language != raw_language {
            let language = decode_language(raw_language.as_deref());
            state.raw_language = raw_language;
            if language != state.language {
                state.language = language;
                events.push(SessionEvent::LanguageChanged(language));
            }
        }
        Ok(events)
    }

    /// Current session, if any.
    pub fn get_session(&self) -> Option<Session> {
        self.read_state().session.clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.read_state().session.is_some()
    }

    /// Current session, or a validation error naming the action.
    pub fn require_session(&self, action: &str) -> ApiResult<Session> {
        self.get_session()
            .ok_or_else(|| ApiError::validation(format!("Please log in to {}", action)))
    }

    /// Persist a session and notify observers.
    pub fn set_session(&self, session: Session) -> ApiResult<()> {
        let raw = serde_json::to_string(&session)
            .map_err(|e| ApiError::storage(format!("Failed to encode session: {}", e)))?;
        self.storage.set(SESSION_KEY, &raw)?;
        {
            let mut state = self.write_state();
            state.raw_session = Some(raw);
            state.session = Some(session.clone());
        }
        tracing::info!(user_id = %session.id, role = %session.role, "Signed in");
        self.notify(&SessionEvent::SignedIn(session));
        Ok(())
    }

    /// Forget the session and notify observers.
    pub fn clear_session(&self) -> ApiResult<()> {
        self.storage.remove(SESSION_KEY)?;
        {
            let mut state = self.write_state();
            state.raw_session = None;
            state.session = None;
        }
        tracing::info!("Signed out");
        self.notify(&SessionEvent::SignedOut);
        Ok(())
    }

    pub fn language(&self) -> Language {
        self.read_state().language
    }

    pub fn set_language(&self, language: Language) -> ApiResult<()> {
        self.storage.set(LANGUAGE_KEY, language.as_str())?;
        let changed = {
            let mut state = self.write_state();
            state.raw_language = Some(language.as_str().to_string());
            let changed = state.language != language;
            state.language = language;
            changed
        };
        if changed {
            self.notify(&SessionEvent::LanguageChanged(language));
        }
        Ok(())
    }

    /// Pick up changes another process made to the shared storage.
    ///
    /// # Returns
    /// * `Ok(true)` - Something changed and observers were notified
    /// * `Ok(false)` - Storage matches the cached copy
    /// * `Err(ApiError::Storage)` - Storage could not be read
    pub fn sync_external(&self) -> ApiResult<bool> {
        let events = self.reload()?;
        for event in &events {
            tracing::debug!(?event, "Session changed outside this process");
            self.notify(event);
        }
        Ok(!events.is_empty())
    }

    /// Register an observer; it is called for every event until unsubscribed.
    pub fn subscribe<F>(&self, observer: F) -> SubscriptionId
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        self.observers
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .push((id, Arc::new(observer)));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write().unwrap_or_else(|e| e.into_inner());
        let before = observers.len();
        observers.retain(|(existing, _)| *existing != id);
        observers.len() != before
    }

    fn notify(&self, event: &SessionEvent) {
        // Snapshot so observers may subscribe or unsubscribe re-entrantly.
        let observers: Vec<Observer> = self
            .observers
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Role, UserId};
    use crate::session::storage::MemoryStorage;
    use std::sync::Mutex;

    fn farmer() -> Session {
        Session {
            id: UserId(3),
            full_name: "Dilnoza Karimova".to_string(),
            role: Role::Farmer,
            region: "Fergana".to_string(),
            email: Some("dilnoza@example.uz".to_string()),
            phone_number: None,
        }
    }

    #[test]
    fn test_set_and_clear_notify_in_order() {
        let context = SessionContext::new(Arc::new(MemoryStorage::new()));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        context.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        context.set_session(farmer()).unwrap();
        assert_eq!(context.get_session(), Some(farmer()));
        context.clear_session().unwrap();
        assert_eq!(context.get_session(), None);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![SessionEvent::SignedIn(farmer()), SessionEvent::SignedOut]
        );
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let context = SessionContext::new(Arc::new(MemoryStorage::new()));
        let count = Arc::new(AtomicU64::new(0));
        let counter = Arc::clone(&count);
        let id = context.subscribe(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        context.set_session(farmer()).unwrap();
        assert!(context.unsubscribe(id));
        assert!(!context.unsubscribe(id));
        context.clear_session().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_corrupt_record_reads_as_signed_out() {
        let storage = MemoryStorage::new();
        storage.set(SESSION_KEY, "{not json").unwrap();
        let context = SessionContext::new(Arc::new(storage));
        assert_eq!(context.get_session(), None);
        assert!(context.require_session("save").is_err());
    }

    #[test]
    fn test_sync_external_detects_other_writer() {
        let storage = MemoryStorage::new();
        let ours = SessionContext::new(Arc::new(storage.clone()));
        let theirs = SessionContext::new(Arc::new(storage));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        ours.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        theirs.set_session(farmer()).unwrap();
        assert_eq!(ours.get_session(), None);
        assert!(ours.sync_external().unwrap());
        assert_eq!(ours.get_session(), Some(farmer()));
        assert!(!ours.sync_external().unwrap());

        theirs.set_language(Language::En).unwrap();
        assert!(ours.sync_external().unwrap());
        assert_eq!(ours.language(), Language::En);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SessionEvent::External(Some(farmer())),
                SessionEvent::LanguageChanged(Language::En),
            ]
        );
    }

    #[test]
    fn test_language_defaults_to_uzbek() {
        let storage = MemoryStorage::new();
        storage.set(LANGUAGE_KEY, "fr").unwrap();
        let context = SessionContext::new(Arc::new(storage));
        assert_eq!(context.language(), Language::Uz);
    }
}

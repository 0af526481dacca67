//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use farmmind_lite::backend::{AccountBackend, FullBackend, LocalBackend};
use farmmind_lite::models::{CropId, RegisterRequest, Role, Session};
use farmmind_lite::session::{MemoryStorage, SessionContext};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Crop ids of the default catalogue.
pub const CARROT: CropId = CropId(1);
pub const COTTON: CropId = CropId(2);
pub const TOMATO: CropId = CropId(7);
pub const WHEAT: CropId = CropId(8);

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the variables on unwind and serializes access to the process
/// environment across tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect::<Vec<_>>();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// A local backend plus a session context over memory storage.
pub struct Harness {
    pub local: LocalBackend,
    pub backend: Arc<dyn FullBackend>,
    pub storage: MemoryStorage,
    pub session: Arc<SessionContext>,
}

impl Harness {
    pub fn new() -> Self {
        let local = LocalBackend::new();
        let storage = MemoryStorage::new();
        Self {
            backend: Arc::new(local.clone()),
            session: Arc::new(SessionContext::new(Arc::new(storage.clone()))),
            local,
            storage,
        }
    }

    /// Register a user on the backend and sign them in.
    pub async fn sign_in(&self, name: &str, role: Role) -> Session {
        let user = register(&self.local, name, role).await;
        self.session.set_session(user.clone()).unwrap();
        user
    }
}

pub fn registration(name: &str, role: Role) -> RegisterRequest {
    let slug = name.to_lowercase().replace(' ', ".");
    RegisterRequest {
        full_name: name.to_string(),
        email: format!("{}@example.uz", slug),
        phone_number: format!("+998-{}", slug),
        region: "Fergana".to_string(),
        role,
        password: "paxta2024".to_string(),
    }
}

pub async fn register(backend: &LocalBackend, name: &str, role: Role) -> Session {
    backend
        .register(&registration(name, role))
        .await
        .expect("registration should succeed")
        .user
}

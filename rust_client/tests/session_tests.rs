//! Session persistence across processes sharing a storage directory.

use std::sync::{Arc, Mutex};

use farmmind_lite::models::{Role, Session, UserId};
use farmmind_lite::session::{
    FileStorage, Language, SessionContext, SessionEvent, SessionStorage, LANGUAGE_KEY, SESSION_KEY,
};

fn buyer() -> Session {
    Session {
        id: UserId(12),
        full_name: "Jasur Rakhimov".to_string(),
        role: Role::Buyer,
        region: "Samarkand".to_string(),
        email: Some("jasur@example.uz".to_string()),
        phone_number: Some("+998-90-000-1212".to_string()),
    }
}

fn context_over(dir: &std::path::Path) -> SessionContext {
    SessionContext::new(Arc::new(FileStorage::new(dir)))
}

#[test]
fn test_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    {
        let first = context_over(dir.path());
        first.set_session(buyer()).unwrap();
        first.set_language(Language::En).unwrap();
    }

    let second = context_over(dir.path());
    assert_eq!(second.get_session(), Some(buyer()));
    assert_eq!(second.language(), Language::En);
}

#[test]
fn test_storage_directory_is_created_on_first_write() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("profile").join("farmmind");
    let storage = FileStorage::new(&nested);
    assert_eq!(storage.get(SESSION_KEY).unwrap(), None);

    storage.set(LANGUAGE_KEY, "uz").unwrap();
    assert!(nested.join(LANGUAGE_KEY).exists());
    storage.remove(LANGUAGE_KEY).unwrap();
    storage.remove(LANGUAGE_KEY).unwrap();
    assert_eq!(storage.get(LANGUAGE_KEY).unwrap(), None);
}

#[test]
fn test_external_sign_out_reaches_observers() {
    let dir = tempfile::tempdir().unwrap();
    let ours = context_over(dir.path());
    ours.set_session(buyer()).unwrap();
    let theirs = context_over(dir.path());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    ours.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    assert!(!ours.sync_external().unwrap());

    theirs.clear_session().unwrap();
    assert!(ours.sync_external().unwrap());
    assert_eq!(ours.get_session(), None);
    assert!(!ours.sync_external().unwrap());

    assert_eq!(*seen.lock().unwrap(), vec![SessionEvent::External(None)]);
}

#[test]
fn test_external_sign_in_and_language_change() {
    let dir = tempfile::tempdir().unwrap();
    let ours = context_over(dir.path());
    let theirs = context_over(dir.path());

    theirs.set_session(buyer()).unwrap();
    theirs.set_language(Language::En).unwrap();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let id = ours.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

    assert!(ours.sync_external().unwrap());
    assert_eq!(
        *seen.lock().unwrap(),
        vec![
            SessionEvent::External(Some(buyer())),
            SessionEvent::LanguageChanged(Language::En),
        ]
    );

    assert!(ours.unsubscribe(id));
    theirs.clear_session().unwrap();
    assert!(ours.sync_external().unwrap());
    assert_eq!(seen.lock().unwrap().len(), 2);
}

#[test]
fn test_corrupt_record_reads_as_signed_out() {
    let dir = tempfile::tempdir().unwrap();
    let storage = FileStorage::new(dir.path());
    storage.set(SESSION_KEY, "{not json").unwrap();
    storage.set(LANGUAGE_KEY, "klingon").unwrap();

    let context = context_over(dir.path());
    assert_eq!(context.get_session(), None);
    assert_eq!(context.language(), Language::Uz);
    assert_eq!(
        context
            .require_session("save a schedule")
            .unwrap_err()
            .user_message(),
        "Please log in to save a schedule"
    );
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account linking tests: validation, verification, rejection and the
//! fully-linked transition.

use cpdash::error::AppError;
use cpdash::models::{Platform, SyncEvent};
use cpdash::store::KeyValueStore;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::TryRecvError;

mod common;
use common::{sync_with, FakeBackend, SIGNED_IN};

#[tokio::test]
async fn test_blank_handle_fails_without_network() {
    let backend = Arc::new(FakeBackend::default());
    let (sync, _store) = sync_with(backend.clone(), SIGNED_IN);

    let err = sync
        .link_platform(Platform::Codeforces, "   ", "u1")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_missing_user_id_fails_without_network() {
    let backend = Arc::new(FakeBackend::default());
    let (sync, _store) = sync_with(backend.clone(), SIGNED_IN);

    let err = sync
        .link_platform(Platform::Codeforces, "tourist", "")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(backend.calls().is_empty());
}

#[tokio::test]
async fn test_unknown_handle_is_profile_not_found() {
    let backend = Arc::new(FakeBackend::default());
    let (sync, store) = sync_with(backend.clone(), SIGNED_IN);

    let err = sync
        .link_platform(Platform::Codeforces, "nobody", "u1")
        .await
        .unwrap_err();

    match err {
        AppError::ProfileNotFound {
            platform, handle, ..
        } => {
            assert_eq!(platform, Platform::Codeforces);
            assert_eq!(handle, "nobody");
        }
        other => panic!("expected ProfileNotFound, got {:?}", other),
    }
    assert_eq!(store.get("codeforces_handle").unwrap(), None);
    assert!(
        !backend.calls().iter().any(|c| c.starts_with("link")),
        "link write must not happen after failed verification"
    );
}

#[tokio::test]
async fn test_rejected_link_leaves_cache_unchanged() {
    let backend = Arc::new(FakeBackend::default());
    backend.reject_links("Handle already linked to another account");
    let (sync, store) = sync_with(backend, SIGNED_IN);
    let before = store.keys().unwrap();

    let err = sync
        .link_platform(Platform::Codeforces, "tourist", "u1")
        .await
        .unwrap_err();

    match &err {
        AppError::LinkRejected { platform, message } => {
            assert_eq!(*platform, Platform::Codeforces);
            assert_eq!(message, "Handle already linked to another account");
        }
        other => panic!("expected LinkRejected, got {:?}", other),
    }
    assert_eq!(err.user_message(), "Handle already linked to another account");
    assert_eq!(store.keys().unwrap(), before);
}

#[tokio::test]
async fn test_successful_link_is_cached_trimmed() {
    let backend = Arc::new(FakeBackend::default());
    let (sync, store) = sync_with(backend.clone(), SIGNED_IN);

    let outcome = sync
        .link_platform(Platform::Codeforces, "  tourist ", "u1")
        .await
        .unwrap();

    assert_eq!(outcome.link.handle, "tourist");
    assert!(outcome.link.linked);
    assert!(!outcome.became_fully_linked);
    assert_eq!(store.get("codeforces_handle").unwrap().as_deref(), Some("tourist"));
    assert_eq!(store.get("codeforces_linked").unwrap().as_deref(), Some("true"));
    assert_eq!(
        backend.calls(),
        vec![
            "verify codeforces tourist".to_string(),
            "link codeforces u1 tourist".to_string()
        ]
    );
}

#[tokio::test]
async fn test_second_platform_fires_one_transition() {
    let backend = Arc::new(FakeBackend::default());
    let mut seeded = SIGNED_IN.to_vec();
    seeded.extend([("codeforces_handle", "tourist"), ("codeforces_linked", "true")]);
    let (sync, store) = sync_with(backend, &seeded);
    let mut events = sync.subscribe();

    let outcome = sync
        .link_platform(Platform::Codechef, "gennady", "u1")
        .await
        .unwrap();

    assert!(outcome.became_fully_linked);
    assert!(sync.is_fully_linked());
    assert_eq!(store.get("codechef_linked").unwrap().as_deref(), Some("true"));
    assert_eq!(store.get("codeforces_linked").unwrap().as_deref(), Some("true"));
    assert_eq!(events.try_recv().unwrap(), SyncEvent::FullyLinked);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_relink_is_idempotent_without_new_event() {
    let backend = Arc::new(FakeBackend::default());
    let (sync, store) = sync_with(backend.clone(), SIGNED_IN);
    let mut events = sync.subscribe();

    sync.link_platform(Platform::Codeforces, "tourist", "u1").await.unwrap();
    sync.link_platform(Platform::Codechef, "gennady", "u1").await.unwrap();
    let keys_after_first = store.keys().unwrap();

    let again = sync
        .link_platform(Platform::Codechef, "gennady", "u1")
        .await
        .unwrap();

    assert!(!again.became_fully_linked);
    assert_eq!(store.keys().unwrap(), keys_after_first);
    assert_eq!(events.try_recv().unwrap(), SyncEvent::FullyLinked);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
    assert_eq!(
        backend.calls().iter().filter(|c| c.starts_with("verify codechef")).count(),
        2
    );
}

#[tokio::test]
async fn test_unlink_clears_only_that_platform() {
    let backend = Arc::new(FakeBackend::default());
    let mut seeded = SIGNED_IN.to_vec();
    seeded.extend([
        ("codeforces_handle", "tourist"),
        ("codeforces_linked", "true"),
        ("codechef_handle", "gennady"),
        ("codechef_linked", "true"),
    ]);
    let (sync, store) = sync_with(backend, &seeded);
    let mut events = sync.subscribe();

    sync.unlink_platform(Platform::Codechef).await.unwrap();

    assert!(!sync.is_fully_linked());
    assert_eq!(store.get("codechef_handle").unwrap(), None);
    assert_eq!(store.get("codeforces_handle").unwrap().as_deref(), Some("tourist"));
    assert_eq!(events.try_recv().unwrap(), SyncEvent::Unlinked(Platform::Codechef));
}

#[tokio::test]
async fn test_concurrent_links_apply_in_call_order() {
    let backend = Arc::new(FakeBackend::default());
    backend
        .known_handles
        .lock()
        .unwrap()
        .extend([
            (Platform::Codeforces, "slow".to_string()),
            (Platform::Codeforces, "fast".to_string()),
        ]);
    backend
        .verify_delay
        .lock()
        .unwrap()
        .insert("slow".to_string(), Duration::from_millis(200));
    let (sync, store) = sync_with(backend, SIGNED_IN);

    let first = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.link_platform(Platform::Codeforces, "slow", "u1").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    let second = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.link_platform(Platform::Codeforces, "fast", "u1").await })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // The later call waited for the earlier one, so its handle is what remains.
    assert_eq!(store.get("codeforces_handle").unwrap().as_deref(), Some("fast"));
}

#[tokio::test]
async fn test_logout_during_link_leaves_no_link() {
    let backend = Arc::new(FakeBackend::default());
    backend.delay_verify("tourist", Duration::from_millis(200));
    let (sync, store) = sync_with(backend.clone(), SIGNED_IN);

    let pending = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.link_platform(Platform::Codeforces, "tourist", "u1").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    sync.clear_session().unwrap();

    let err = pending.await.unwrap().unwrap_err();

    assert!(matches!(err, AppError::Unauthorized));
    assert!(store.keys().unwrap().is_empty(), "no link may outlive its session");
    assert!(!sync.is_fully_linked());
}

#[tokio::test]
async fn test_login_during_link_keeps_new_user_clean() {
    let backend = Arc::new(FakeBackend::default());
    backend.delay_verify("tourist", Duration::from_millis(200));
    *backend.account.lock().unwrap() = Some(cpdash::models::profile::AccountRecord {
        id: "u2".to_string(),
        username: "bob".to_string(),
        email: "bob@example.com".to_string(),
    });
    let (sync, _store) = sync_with(backend, SIGNED_IN);
    let mut events = sync.subscribe();

    let pending = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.link_platform(Platform::Codeforces, "tourist", "u1").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    sync.login("bob@example.com", "hunter22").await.unwrap();

    assert!(matches!(pending.await.unwrap(), Err(AppError::Unauthorized)));
    assert_eq!(sync.require_session().unwrap().user_id, "u2");
    assert_eq!(sync.cache().link(Platform::Codeforces).unwrap(), None);
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));
}

#[tokio::test]
async fn test_link_for_other_user_is_not_cached() {
    let backend = Arc::new(FakeBackend::default());
    let (sync, store) = sync_with(backend, SIGNED_IN);

    let err = sync
        .link_platform(Platform::Codeforces, "tourist", "someone-else")
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(store.get("codeforces_handle").unwrap(), None);
}

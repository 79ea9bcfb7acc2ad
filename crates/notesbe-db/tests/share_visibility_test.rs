//! Sharing and visibility against PostgreSQL.
//!
//! Exercises the access resolver over the Pg repositories: a receiver can
//! list, fetch and search a shared note but never change it.

use notesbe_db::test_fixtures::TestDatabase;
use notesbe_db::{Error, NoteRepository, ShareRepository};

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_shared_note_is_readable_but_not_writable() {
    let test_db = TestDatabase::new().await;
    let (alice, _) = test_db.user("alice").await;
    let (bob, _) = test_db.user("bob").await;
    let access = test_db.db.access_resolver();

    let n1 = access.create(alice, "Grocery list: milk").await.unwrap();
    let n2 = access.create(bob, "Bob's diary").await.unwrap();

    let grant = access.share(n1.id, alice, bob).await.unwrap();
    assert_eq!(grant.sender_id, alice);
    assert_eq!(grant.receiver_id, bob);

    // Owned notes first, then shared ones
    let visible: Vec<_> = access
        .list_visible(bob)
        .await
        .unwrap()
        .into_iter()
        .map(|n| n.id)
        .collect();
    assert_eq!(visible, vec![n2.id, n1.id]);

    let fetched = access.fetch_for_read(n1.id, bob).await.unwrap();
    assert_eq!(fetched.body, "Grocery list: milk");

    let err = access.update(n1.id, bob, "hijacked").await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));
    let err = access.delete(n1.id, bob).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));

    // Receiver's failed writes left the note untouched
    let still = test_db.db.notes.fetch_owned(n1.id, alice).await.unwrap();
    assert_eq!(still.body, "Grocery list: milk");

    // Alice does not see Bob's note
    let err = access.fetch_for_read(n2.id, alice).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotFound(_)));

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_duplicate_share_is_rejected() {
    let test_db = TestDatabase::new().await;
    let (alice, _) = test_db.user("alice").await;
    let (bob, _) = test_db.user("bob").await;
    let note = test_db.db.notes.insert(alice, "meeting notes").await.unwrap();

    test_db.db.shares.grant(note.id, alice, bob).await.unwrap();
    let err = test_db.db.shares.grant(note.id, alice, bob).await.unwrap_err();
    assert!(matches!(err, Error::AlreadyShared { .. }));

    let ids = test_db.db.shares.list_shared_note_ids(bob).await.unwrap();
    assert_eq!(ids.len(), 1);

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_share_rejections() {
    let test_db = TestDatabase::new().await;
    let (alice, _) = test_db.user("alice").await;
    let (bob, _) = test_db.user("bob").await;
    let note = test_db.db.notes.insert(alice, "draft").await.unwrap();
    let shares = &test_db.db.shares;

    let err = shares.grant(note.id, alice, alice).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)));

    let err = shares.grant(note.id, alice, i64::MAX).await.unwrap_err();
    assert!(matches!(err, Error::ReceiverNotFound(_)));

    // Only the owner may share
    let err = shares.grant(note.id, bob, alice).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotOwned { .. }));

    let err = shares.grant(i64::MAX, alice, bob).await.unwrap_err();
    assert!(matches!(err, Error::NoteNotOwned { .. }));

    assert!(!shares.is_shared_with(note.id, bob).await.unwrap());

    test_db.cleanup().await;
}

#[tokio::test]
#[ignore] // Requires DATABASE_URL with migrated database
async fn test_deleting_note_removes_its_grants() {
    let test_db = TestDatabase::new().await;
    let (alice, _) = test_db.user("alice").await;
    let (bob, _) = test_db.user("bob").await;
    let access = test_db.db.access_resolver();

    let note = access.create(alice, "temporary").await.unwrap();
    access.share(note.id, alice, bob).await.unwrap();
    access.delete(note.id, alice).await.unwrap();

    assert!(access.list_visible(bob).await.unwrap().is_empty());
    assert!(!test_db
        .db
        .shares
        .is_shared_with(note.id, bob)
        .await
        .unwrap());

    test_db.cleanup().await;
}

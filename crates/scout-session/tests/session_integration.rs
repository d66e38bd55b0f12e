#![allow(clippy::unwrap_used, clippy::expect_used)]

use scout_core::{Message, SourceRef, SourceType};
use scout_session::{FileSessionStore, Session, SessionStore, DEFAULT_TITLE};
use std::sync::Arc;
use uuid::Uuid;

/// Helper: create a FileSessionStore in a temp directory.
async fn temp_store() -> (FileSessionStore, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileSessionStore::new(tmp.path().join("sessions"))
        .await
        .unwrap();
    (store, tmp)
}

fn answer(text: &str) -> Message {
    Message::assistant(text).with_sources(vec![SourceRef {
        title: "CoinGecko".into(),
        url: "https://www.coingecko.com".into(),
        snippet: "Prices".into(),
        source: SourceType::Crypto,
    }])
}

#[tokio::test]
async fn test_save_and_get_session() {
    let (store, _tmp) = temp_store().await;
    let session = Session::new();
    let id = session.id;

    store.save(&session).await.unwrap();

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.id, id);
    assert_eq!(loaded.title, DEFAULT_TITLE);
    assert!(loaded.messages.is_empty());
}

#[tokio::test]
async fn test_get_nonexistent_returns_none() {
    let (store, _tmp) = temp_store().await;
    assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_save_existing_refreshes_updated_at() {
    let (store, _tmp) = temp_store().await;
    let session = Session::new();
    store.save(&session).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store.save(&session).await.unwrap();

    let loaded = store.get(session.id).await.unwrap().unwrap();
    assert!(loaded.updated_at > session.updated_at);
    assert_eq!(loaded.created_at, session.created_at);
}

#[tokio::test]
async fn test_get_all_sorted_by_most_recent() {
    let (store, _tmp) = temp_store().await;
    let older = Session::new();
    let newer = Session::new();
    store.save(&older).await.unwrap();
    store.save(&newer).await.unwrap();

    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    store
        .append_exchange(older.id, Message::user("bump"), answer("ok"))
        .await
        .unwrap();

    let all = store.get_all().await.unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].id, older.id);
    assert_eq!(all[1].id, newer.id);
}

#[tokio::test]
async fn test_get_all_skips_corrupt_files() {
    let (store, _tmp) = temp_store().await;
    store.save(&Session::new()).await.unwrap();
    let corrupt = store.dir().join(format!("{}.json", Uuid::new_v4()));
    tokio::fs::write(corrupt, "{oops").await.unwrap();
    tokio::fs::write(store.dir().join("notes.txt"), "ignored")
        .await
        .unwrap();

    assert_eq!(store.get_all().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_append_exchange_creates_and_titles_session() {
    let (store, _tmp) = temp_store().await;
    let id = Uuid::new_v4();

    let session = store
        .append_exchange(
            id,
            Message::user("Compare Bitcoin and Ethereum"),
            answer("BTC vs ETH"),
        )
        .await
        .unwrap();
    assert_eq!(session.id, id);
    assert_eq!(session.title, "Compare Bitcoin and Ethereum");

    store
        .append_exchange(id, Message::user("And Solana?"), answer("SOL"))
        .await
        .unwrap();
    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.messages.len(), 4);
    assert_eq!(loaded.messages[1].sources.len(), 1);
    assert_eq!(loaded.title, "Compare Bitcoin and Ethereum");
}

#[tokio::test]
async fn test_concurrent_appends_are_not_lost() {
    let (store, _tmp) = temp_store().await;
    let store = Arc::new(store);
    let id = Uuid::new_v4();

    let tasks: Vec<_> = (0..10)
        .map(|i| {
            let store = store.clone();
            tokio::spawn(async move {
                store
                    .append_exchange(id, Message::user(format!("q{i}")), answer("a"))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.messages.len(), 20);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_reads_during_writes_see_whole_sessions() {
    let (store, _tmp) = temp_store().await;
    let store = Arc::new(store);
    let id = Uuid::new_v4();

    // A large document makes each rewrite take long enough to overlap reads.
    let bulky = "x".repeat(200 * 1024);
    store
        .append_exchange(id, Message::user("seed"), answer(&bulky))
        .await
        .unwrap();

    let writer = {
        let store = store.clone();
        tokio::spawn(async move {
            for i in 0..100 {
                store
                    .append_exchange(id, Message::user(format!("q{i}")), answer("a"))
                    .await
                    .unwrap();
            }
        })
    };

    let mut reads = 0;
    while !writer.is_finished() || reads < 100 {
        let loaded = store.get(id).await.unwrap();
        assert!(loaded.is_some(), "session vanished mid-write");
        let listed = store.get_all().await.unwrap();
        assert_eq!(listed.len(), 1);
        reads += 1;
    }
    writer.await.unwrap();

    let loaded = store.get(id).await.unwrap().unwrap();
    assert_eq!(loaded.messages.len(), 202);

    let names: Vec<_> = std::fs::read_dir(store.dir())
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    assert_eq!(names, vec![format!("{id}.json")]);
}

#[tokio::test]
async fn test_tags_and_search() {
    let (store, _tmp) = temp_store().await;
    let a = store
        .append_exchange(
            Uuid::new_v4(),
            Message::user("Ethereum rollups"),
            answer("L2"),
        )
        .await
        .unwrap();
    let b = store
        .append_exchange(
            Uuid::new_v4(),
            Message::user("Bitcoin halving"),
            answer("Supply"),
        )
        .await
        .unwrap();

    store.add_tag(a.id, "l2".into()).await.unwrap();
    store.add_tag(a.id, "l2".into()).await.unwrap();
    store.add_tag(b.id, "pow".into()).await.unwrap();

    let tagged = store.get(a.id).await.unwrap().unwrap();
    assert_eq!(tagged.tags, vec!["l2"]);

    let hits = store.search(Some("ROLLUPS"), None).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, a.id);

    let by_tag = store.search(None, Some("pow")).await.unwrap();
    assert_eq!(by_tag.len(), 1);
    assert_eq!(by_tag[0].id, b.id);

    assert!(store.search(Some("halving"), Some("l2")).await.unwrap().is_empty());

    store.remove_tag(a.id, "l2".into()).await.unwrap();
    assert!(store.get(a.id).await.unwrap().unwrap().tags.is_empty());

    assert!(store.add_tag(Uuid::new_v4(), "x".into()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_bookmarks() {
    let (store, _tmp) = temp_store().await;
    let session = store
        .append_exchange(
            Uuid::new_v4(),
            Message::user("What is DeFi?"),
            answer("Finance"),
        )
        .await
        .unwrap();
    let answer_id = session.messages[1].id;

    store.toggle_bookmark(session.id, answer_id).await.unwrap();
    let marked = store.bookmarked_messages().await.unwrap();
    assert_eq!(marked.len(), 1);
    assert_eq!(marked[0].session_id, session.id);
    assert_eq!(marked[0].session_title, "What is DeFi?");
    assert_eq!(marked[0].message.content, "Finance");

    store.toggle_bookmark(session.id, answer_id).await.unwrap();
    assert!(store.bookmarked_messages().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_delete_and_delete_all() {
    let (store, _tmp) = temp_store().await;
    let s1 = Session::new();
    let s2 = Session::new();
    store.save(&s1).await.unwrap();
    store.save(&s2).await.unwrap();

    store.delete(s1.id).await.unwrap();
    assert!(store.get(s1.id).await.unwrap().is_none());
    store.delete(Uuid::new_v4()).await.unwrap();

    store.delete_all().await.unwrap();
    assert!(store.get_all().await.unwrap().is_empty());
}

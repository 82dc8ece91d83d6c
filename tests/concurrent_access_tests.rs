// Concurrent access tests
//
// Independent commands sharing one connection, each with its own cursor.
// Run with: cargo test --test concurrent_access_tests

use doctab::engine::memory::{ScriptedResponse, StaticQueryEngine};
use doctab::{CellValue, Connection};
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Barrier;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_cursors_on_one_connection() {
    let rows: Vec<_> = (0..100).map(|i| json!({"id": i, "data": format!("data_{}", i)})).collect();
    let engine = StaticQueryEngine::new().with_response("SELECT * FROM items", ScriptedResponse::rows(rows));
    let conn = Connection::new(Arc::new(engine));

    let num_tasks = 10;
    let barrier = Arc::new(Barrier::new(num_tasks));
    let mut handles = vec![];

    for task_id in 0..num_tasks {
        let conn = conn.clone();
        let barrier = Arc::clone(&barrier);

        handles.push(tokio::spawn(async move {
            let mut cursor = conn
                .create_command("SELECT * FROM items")
                .execute_reader()
                .await
                .unwrap();
            barrier.wait().await;

            let mut expected = 0;
            while cursor.read().await.unwrap() {
                assert_eq!(
                    cursor.value(0).unwrap(),
                    CellValue::Integer(expected),
                    "Task {} read rows out of order",
                    task_id
                );
                expected += 1;
                tokio::task::yield_now().await;
            }
            expected
        }));
    }

    for handle in handles {
        assert_eq!(handle.await.unwrap(), 100);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_mixed_modes() {
    let engine = Arc::new(
        StaticQueryEngine::new()
            .with_response("SELECT RAW COUNT(*) FROM items", ScriptedResponse::rows(vec![json!(3)]))
            .with_response("UPSERT INTO items", ScriptedResponse::mutations(1)),
    );
    let conn = Connection::new(engine.clone());

    let mut handles = vec![];
    for i in 0..20 {
        let conn = conn.clone();
        handles.push(tokio::spawn(async move {
            if i % 2 == 0 {
                let count = conn
                    .execute_scalar("SELECT RAW COUNT(*) FROM items", &())
                    .await
                    .unwrap();
                assert_eq!(count, Some(CellValue::Integer(3)));
            } else {
                let mutated = conn.execute("UPSERT INTO items", &()).await.unwrap();
                assert_eq!(mutated, 1);
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert_eq!(engine.submissions().unwrap().len(), 20);
}

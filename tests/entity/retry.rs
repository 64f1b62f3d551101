//! Transport retries through RetryingStore

use std::sync::Arc;

use crate::common::*;

type Flaky = Arc<FlakyStore<Arc<InMemoryTableStore>>>;

async fn flaky_table(max_retries: usize) -> (Flaky, EntityTable) {
    init_tracing();
    let flaky: Flaky = Arc::new(FlakyStore::new(Arc::new(InMemoryTableStore::new())));
    let config = EntityStoreConfig::from_toml_str(&format!(
        "table_name = \"items\"\n[retry]\nmax_retries = {}\nbase_delay_ms = 1\nmax_delay_ms = 4\n",
        max_retries
    ))
    .unwrap();
    let table = EntityTable::from_config(flaky.clone(), &config, item_schema()).unwrap();
    table.ensure_table().await.unwrap();
    (flaky, table)
}

#[tokio::test]
async fn throttled_create_is_retried() {
    let (flaky, table) = flaky_table(3).await;
    let calls_before = flaky.calls();

    flaky.fail_next(2, StoreError::transport(429, "throttled"));
    table.create(item("a", "b", random_array(5))).await.unwrap();
    assert_eq!(flaky.calls() - calls_before, 3);

    assert!(table.load(&item_keys("a", "b")).await.is_ok());
}

#[tokio::test]
async fn retries_are_bounded() {
    let (flaky, table) = flaky_table(2).await;
    let calls_before = flaky.calls();

    flaky.fail_next(10, StoreError::transport(503, "unavailable"));
    let err = table.load(&item_keys("a", "b")).await.unwrap_err();
    assert!(err.is_retryable());
    assert_eq!(flaky.calls() - calls_before, 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (flaky, table) = flaky_table(5).await;
    let calls_before = flaky.calls();

    flaky.fail_next(1, StoreError::transport(400, "bad request"));
    let err = table
        .create(item("a", "b", random_array(1)))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Transport { retryable: false, .. }));
    assert_eq!(flaky.calls() - calls_before, 1);
}

#[tokio::test]
async fn conflicts_pass_through_retries_untouched() {
    let (flaky, table) = flaky_table(5).await;
    table.create(item("a", "b", random_array(1))).await.unwrap();

    let mut first = table.load(&item_keys("a", "b")).await.unwrap();
    let mut second = table.load(&item_keys("a", "b")).await.unwrap();
    first.set("data", random_array(2)).unwrap();
    table.save(&mut first).await.unwrap();

    let calls_before = flaky.calls();
    second.set("data", random_array(3)).unwrap();
    assert!(table.save(&mut second).await.unwrap_err().is_conflict());
    assert_eq!(flaky.calls() - calls_before, 1);
}

#[tokio::test]
async fn create_whose_response_was_lost_succeeds() {
    let (flaky, table) = flaky_table(3).await;
    let array = random_array(5000);

    flaky.lose_next_response(StoreError::transport(0, "connection reset"));
    let created = table.create(item("a", "b", array.clone())).await.unwrap();

    let loaded = table.load(&item_keys("a", "b")).await.unwrap();
    assert_eq!(loaded.etag(), created.etag());
    assert_eq!(loaded.slug_id_array("data").unwrap(), &array);
}

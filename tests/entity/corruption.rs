//! Corrupt rows are detected on load, never silently repaired

use crate::common::*;

enum Tamper {
    Remove(String),
    Set(String, Cell),
}

/// Create an item with `n` ids, damage its row, and return the load error
async fn corrupted(n: usize, tamper: Tamper) -> Error {
    let (store, table) = item_table().await;
    let entity = table.create(item("a", "b", random_array(n))).await.unwrap();

    let tester = RowCorruptionTester::new(&store, TABLE);
    match tamper {
        Tamper::Remove(column) => {
            assert!(tester.remove_column(entity.key(), &column).await.unwrap().is_some());
        }
        Tamper::Set(column, cell) => {
            tester.set_column(entity.key(), &column, cell).await.unwrap();
        }
    }

    table.load(&item_keys("a", "b")).await.unwrap_err()
}

#[tokio::test]
async fn missing_chunk_column() {
    let err = corrupted(8192, Tamper::Remove(chunk_column(1, "data"))).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn missing_chunk_count_column() {
    let err = corrupted(10, Tamper::Remove(chunk_count_column("data"))).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn count_larger_than_chunks() {
    let err = corrupted(10, Tamper::Set(chunk_count_column("data"), Cell::Int32(3))).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn count_smaller_than_chunks() {
    let err = corrupted(8192, Tamper::Set(chunk_count_column("data"), Cell::Int32(1))).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn huge_count() {
    let err = corrupted(
        8192,
        Tamper::Set(chunk_count_column("data"), Cell::Int32(i32::MAX)),
    )
    .await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn negative_count() {
    let err = corrupted(1, Tamper::Set(chunk_count_column("data"), Cell::Int32(-1))).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn chunk_of_wrong_type() {
    let err = corrupted(
        3,
        Tamper::Set(chunk_column(0, "data"), Cell::String("x".to_string())),
    )
    .await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn payload_not_a_multiple_of_16() {
    let err = corrupted(3, Tamper::Set(chunk_column(0, "data"), Cell::Binary(vec![0; 47]))).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn missing_scalar_column() {
    let err = corrupted(3, Tamper::Remove("name".to_string())).await;
    assert!(matches!(err, Error::DataCorruption(_)));
}

#[tokio::test]
async fn corruption_is_not_retryable() {
    let err = corrupted(8192, Tamper::Remove(chunk_column(0, "data"))).await;
    assert!(!err.is_retryable());
    assert!(!err.is_conflict());
}

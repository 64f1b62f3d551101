//! Multi-chunk fan-out and reassembly

use crate::common::*;

async fn round_trip(n: usize, expected_chunks: i32) {
    let (store, table) = item_table().await;
    let array = random_array(n);
    let name = format!("len-{}", n);

    let created = table
        .create(item("big", &name, array.clone()))
        .await
        .unwrap();
    let row = raw_row(&store, &created).await;
    assert_eq!(chunk_count(&row, "data"), expected_chunks);
    for i in 0..expected_chunks as usize {
        match row.get(&chunk_column(i, "data")) {
            Some(Cell::Binary(bytes)) => assert!(bytes.len() <= 65536),
            other => panic!("chunk {} missing or wrong type: {:?}", i, other),
        }
    }
    assert!(!row.contains_key(&chunk_column(expected_chunks as usize, "data")));

    let loaded = table.load(&item_keys("big", &name)).await.unwrap();
    assert_eq!(loaded.slug_id_array("data").unwrap(), &array);
}

#[tokio::test]
async fn exactly_one_full_chunk() {
    round_trip(4096, 1).await;
}

#[tokio::test]
async fn two_chunks() {
    round_trip(8192, 2).await;
}

#[tokio::test]
async fn four_chunks() {
    round_trip(16384, 4).await;
}

#[tokio::test]
async fn one_id_past_the_boundary() {
    round_trip(4097, 2).await;
}

#[tokio::test]
async fn empty_array_has_no_chunks() {
    round_trip(0, 0).await;
}

#[tokio::test]
async fn small_chunk_size_spreads_across_columns() {
    let (store, table) = item_table().await;
    let table = EntityTable::new(store.clone(), TABLE, table.schema().clone())
        .with_max_chunk_size(100)
        .unwrap();
    let array = random_array(20);

    let created = table.create(item("a", "b", array.clone())).await.unwrap();
    let row = raw_row(&store, &created).await;
    // 320 bytes in 100 byte chunks
    assert_eq!(chunk_count(&row, "data"), 4);
    match row.get(&chunk_column(3, "data")) {
        Some(Cell::Binary(bytes)) => assert_eq!(bytes.len(), 20),
        other => panic!("unexpected last chunk: {:?}", other),
    }

    let loaded = table.load(&item_keys("a", "b")).await.unwrap();
    assert_eq!(loaded.slug_id_array("data").unwrap(), &array);
}

#[tokio::test]
async fn shrinking_array_drops_stale_chunks() {
    let (store, table) = item_table().await;
    let mut entity = table
        .create(item("a", "b", random_array(16384)))
        .await
        .unwrap();

    let kept = random_array(10);
    entity.set("data", kept.clone()).unwrap();
    table.save(&mut entity).await.unwrap();

    let row = raw_row(&store, &entity).await;
    assert_eq!(chunk_count(&row, "data"), 1);
    for i in 1..4 {
        assert!(!row.contains_key(&chunk_column(i, "data")));
    }
    let loaded = table.load(&item_keys("a", "b")).await.unwrap();
    assert_eq!(loaded.slug_id_array("data").unwrap(), &kept);
}

#[tokio::test]
async fn growing_array_in_place() {
    let (store, table) = item_table().await;
    let mut entity = table.create(item("a", "b", random_array(4000))).await.unwrap();

    let data = entity.slug_id_array_mut("data").unwrap();
    for _ in 0..200 {
        data.push(SlugId::v4());
    }
    let expected = data.clone();
    table.save(&mut entity).await.unwrap();

    let row = raw_row(&store, &entity).await;
    assert_eq!(chunk_count(&row, "data"), 2);
    let loaded = table.load(&item_keys("a", "b")).await.unwrap();
    assert_eq!(loaded.slug_id_array("data").unwrap(), &expected);
}

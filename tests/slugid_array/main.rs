//! SlugIdArray behaviour through the public API
//!
//! In-memory container operations plus the chunked serialization used by
//! the entity engine.

#[path = "../common/mod.rs"]
mod common;

use common::*;
use entitystore::chunk::Chunk;
use proptest::prelude::*;

const N: usize = 1000;

#[test]
fn push_then_to_array_preserves_order() {
    let mut array = SlugIdArray::new();
    let first = SlugId::v4();
    let second = SlugId::v4();
    array.push(first);
    array.push(second);

    let text = array.to_array();
    assert_eq!(text, vec![first.to_string(), second.to_string()]);
}

#[test]
fn to_array_with_1k_ids() {
    let ids: Vec<SlugId> = (0..N).map(|_| SlugId::v4()).collect();
    let array: SlugIdArray = ids.iter().copied().collect();

    let text = array.to_array();
    assert_eq!(text.len(), N);
    for (id, encoded) in ids.iter().zip(&text) {
        assert_eq!(&id.to_string(), encoded);
        assert_eq!(encoded.len(), 22);
    }
}

#[test]
fn push_str_parses_canonical_text() {
    let mut array = SlugIdArray::new();
    array.push_str("gE8_yN_LT9eaK39KHC0-Xw").unwrap();
    assert_eq!(array.to_array(), vec!["gE8_yN_LT9eaK39KHC0-Xw".to_string()]);

    assert!(matches!(
        array.push_str("not a slug"),
        Err(Error::InvalidIdentifier(_))
    ));
    assert_eq!(array.len(), 1);
}

#[test]
fn index_of_with_1k_ids() {
    let ids: Vec<SlugId> = (0..N).map(|_| SlugId::v4()).collect();
    let array: SlugIdArray = ids.iter().copied().collect();

    for (i, id) in ids.iter().enumerate() {
        assert_eq!(array.index_of(id), Some(i));
    }
    for _ in 0..N {
        assert_eq!(array.index_of(&SlugId::v4()), None);
    }
}

#[test]
fn remove_with_1k_ids() {
    let ids: Vec<SlugId> = (0..N).map(|_| SlugId::v4()).collect();
    let mut array: SlugIdArray = ids.iter().copied().collect();

    for id in &ids {
        assert!(array.remove(id), "expected {} to be present", id);
    }
    for id in &ids {
        assert_eq!(array.index_of(id), None);
    }
    assert!(array.is_empty());
    assert!(!array.remove(&ids[0]));
}

#[test]
fn remove_takes_first_of_duplicates() {
    let a = SlugId::v4();
    let b = SlugId::v4();
    let mut array: SlugIdArray = [a, b, a].into_iter().collect();

    assert!(array.remove(&a));
    assert_eq!(array.iter().collect::<Vec<_>>(), vec![b, a]);
    assert_eq!(array.index_of(&a), Some(1));
}

#[test]
fn clone_is_independent() {
    let mut array = random_array(200);
    let mut copy = array.clone();
    assert_eq!(array, copy);

    let id = SlugId::v4();
    array.push(id);
    let id2 = SlugId::v4();
    copy.push(id2);

    assert!(array.contains(&id));
    assert!(!array.contains(&id2));
    assert!(!copy.contains(&id));
    assert!(copy.contains(&id2));
    assert_ne!(array, copy);
}

#[test]
fn equals_with_1k_ids() {
    let ids: Vec<SlugId> = (0..N).map(|_| SlugId::v4()).collect();
    let a: SlugIdArray = ids.iter().copied().collect();
    let mut b = SlugIdArray::new();
    for id in &ids {
        b.push(*id);
    }
    assert_eq!(a, b);

    b.push(SlugId::v4());
    assert_ne!(a, b);
}

#[test]
fn serialized_layout_is_raw_concatenation() {
    let array = random_array(3);
    let chunks = array.serialize(65536).unwrap();
    assert_eq!(chunks.len(), 1);

    let expected: Vec<u8> = array.iter().flat_map(|id| *id.as_bytes()).collect();
    assert_eq!(chunks[0].data(), expected.as_slice());
}

#[test]
fn serialize_chunk_counts() {
    for (n, chunks) in [(0, 0), (1, 1), (4096, 1), (4097, 2), (8192, 2), (16384, 4)] {
        let array = random_array(n);
        let serialized = array.serialize(65536).unwrap();
        assert_eq!(serialized.len(), chunks, "{} ids", n);
        assert!(serialized.iter().all(|c| c.len() <= 65536));
        assert_eq!(
            SlugIdArray::deserialize(serialized.len(), &serialized).unwrap(),
            array
        );
    }
}

#[test]
fn deserialize_rejects_inconsistent_chunks() {
    let array = random_array(8192);
    let chunks = array.serialize(65536).unwrap();

    assert!(matches!(
        SlugIdArray::deserialize(3, &chunks),
        Err(Error::DataCorruption(_))
    ));
    assert!(matches!(
        SlugIdArray::deserialize(2, &chunks[..1]),
        Err(Error::DataCorruption(_))
    ));

    let ragged = vec![Chunk::new(0, vec![0; 20])];
    assert!(matches!(
        SlugIdArray::deserialize(1, &ragged),
        Err(Error::DataCorruption(_))
    ));
}

proptest! {
    #[test]
    fn chunked_round_trip(n in 0usize..600, max_chunk_size in 1usize..=2048) {
        let array = random_array(n);
        let chunks = array.serialize(max_chunk_size).unwrap();
        prop_assert_eq!(chunks.len(), (n * 16).div_ceil(max_chunk_size));
        prop_assert_eq!(SlugIdArray::deserialize(chunks.len(), &chunks).unwrap(), array);
    }
}

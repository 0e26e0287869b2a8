//! Vector store behaviour shared by the in-memory and local backends, plus
//! persistence of the local backend.

use std::collections::HashMap;
use std::fs;

use proptest::prelude::*;
use scholar_rag::document::{Chunk, SOURCE_KEY};
use scholar_rag::error::RagError;
use scholar_rag::inmemory::InMemoryVectorStore;
use scholar_rag::local::LocalVectorStore;
use scholar_rag::vectorstore::VectorStore;

/// Generate a non-zero L2-normalized embedding of the given dimension.
fn arb_normalized_embedding(dim: usize) -> impl Strategy<Value = Vec<f32>> {
    proptest::collection::vec(-1.0f32..1.0f32, dim).prop_filter_map(
        "non-zero embedding",
        |mut v| {
            let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
            if norm < 1e-8 {
                return None;
            }
            for val in &mut v {
                *val /= norm;
            }
            Some(v)
        },
    )
}

fn chunk(text: &str) -> Chunk {
    let mut metadata = HashMap::new();
    metadata.insert(SOURCE_KEY.to_string(), format!("{text}.txt"));
    Chunk { content: text.to_string(), metadata }
}

/// **Query ordering**
/// *For any* stored vectors and query, results come back ordered by
/// ascending cosine distance, and there are `min(n_results, stored)` of them.
mod prop_query_ordering {
    use super::*;

    const DIM: usize = 16;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn results_ordered_ascending_and_bounded(
            entries in proptest::collection::vec(("[a-z ]{5,30}", arb_normalized_embedding(DIM)), 1..20),
            query in arb_normalized_embedding(DIM),
            n_results in 1usize..25,
        ) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            let results = rt.block_on(async {
                let store = InMemoryVectorStore::new();
                store.create_collection("test").await.unwrap();

                let chunks: Vec<Chunk> = entries.iter().map(|(text, _)| chunk(text)).collect();
                let embeddings: Vec<Vec<f32>> = entries.iter().map(|(_, e)| e.clone()).collect();
                store.add("test", &chunks, &embeddings).await.unwrap();
                store.query("test", &query, n_results).await.unwrap()
            });

            prop_assert_eq!(results.len(), n_results.min(entries.len()));
            for window in results.windows(2) {
                prop_assert!(
                    window[0].distance <= window[1].distance,
                    "results not in ascending order: {} > {}",
                    window[0].distance,
                    window[1].distance,
                );
            }
            for result in &results {
                prop_assert!((-1e-5..=2.0 + 1e-5).contains(&result.distance));
            }
        }
    }
}

async fn added_item_is_its_own_nearest(store: &dyn VectorStore) {
    store.create_collection("papers").await.unwrap();
    let ids = store.add("papers", &[chunk("paris")], &[vec![0.3, 0.4, 0.5]]).await.unwrap();

    let hits = store.query("papers", &[0.3, 0.4, 0.5], 5).await.unwrap();

    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, ids[0]);
    assert_eq!(hits[0].text, "paris");
    assert_eq!(hits[0].metadata[SOURCE_KEY], "paris.txt");
    assert!(hits[0].distance.abs() < 1e-6);
    assert!((hits[0].similarity() - 1.0).abs() < 1e-6);
}

async fn create_is_idempotent(store: &dyn VectorStore) {
    let first = store.create_collection("papers").await.unwrap();
    store.add("papers", &[chunk("a")], &[vec![1.0, 0.0]]).await.unwrap();
    let second = store.create_collection("papers").await.unwrap();

    assert_eq!(first, second);
    store.add(&second.name, &[chunk("b")], &[vec![0.0, 1.0]]).await.unwrap();
    assert_eq!(store.count("papers").await.unwrap(), 2);
    assert_eq!(store.query(&first.name, &[0.0, 1.0], 1).await.unwrap()[0].text, "b");
}

async fn unknown_collection_is_not_found(store: &dyn VectorStore) {
    assert!(matches!(
        store.query("missing", &[1.0], 1).await,
        Err(RagError::CollectionNotFound(name)) if name == "missing"
    ));
    assert!(matches!(
        store.add("missing", &[chunk("a")], &[vec![1.0]]).await,
        Err(RagError::CollectionNotFound(_))
    ));
    assert!(matches!(store.count("missing").await, Err(RagError::CollectionNotFound(_))));
}

async fn ids_are_monotonic_across_adds(store: &dyn VectorStore) {
    store.create_collection("papers").await.unwrap();
    let first = store
        .add("papers", &[chunk("a"), chunk("b")], &[vec![1.0, 0.0], vec![0.0, 1.0]])
        .await
        .unwrap();
    let second = store.add("papers", &[chunk("c")], &[vec![1.0, 1.0]]).await.unwrap();

    assert_eq!(first, vec!["0", "1"]);
    assert_eq!(second, vec!["2"]);
}

async fn rejected_add_leaves_collection_untouched(store: &dyn VectorStore) {
    store.create_collection("papers").await.unwrap();
    store.add("papers", &[chunk("a")], &[vec![1.0, 0.0]]).await.unwrap();

    let err = store.add("papers", &[chunk("b"), chunk("c")], &[vec![1.0, 0.0]]).await.unwrap_err();
    assert!(matches!(err, RagError::LengthMismatch { chunks: 2, embeddings: 1 }));
    let err = store.add("papers", &[chunk("b")], &[vec![1.0, 0.0, 0.0]]).await.unwrap_err();
    assert!(matches!(err, RagError::DimensionMismatch { expected: 2, actual: 3 }));

    assert_eq!(store.count("papers").await.unwrap(), 1);
}

async fn delete_then_query_is_not_found(store: &dyn VectorStore) {
    store.create_collection("papers").await.unwrap();
    store.delete_collection("papers").await.unwrap();
    store.delete_collection("papers").await.unwrap();
    assert!(matches!(store.count("papers").await, Err(RagError::CollectionNotFound(_))));
}

macro_rules! store_contract_tests {
    ($module:ident, $make:expr) => {
        mod $module {
            use super::*;

            #[tokio::test]
            async fn added_item_is_nearest() {
                let (_guard, store) = $make;
                added_item_is_its_own_nearest(&store).await;
            }

            #[tokio::test]
            async fn create_twice() {
                let (_guard, store) = $make;
                create_is_idempotent(&store).await;
            }

            #[tokio::test]
            async fn missing_collection() {
                let (_guard, store) = $make;
                unknown_collection_is_not_found(&store).await;
            }

            #[tokio::test]
            async fn monotonic_ids() {
                let (_guard, store) = $make;
                ids_are_monotonic_across_adds(&store).await;
            }

            #[tokio::test]
            async fn rejected_add() {
                let (_guard, store) = $make;
                rejected_add_leaves_collection_untouched(&store).await;
            }

            #[tokio::test]
            async fn delete() {
                let (_guard, store) = $make;
                delete_then_query_is_not_found(&store).await;
            }
        }
    };
}

store_contract_tests!(in_memory, ((), InMemoryVectorStore::new()));
store_contract_tests!(local, {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalVectorStore::open(dir.path()).unwrap();
    (dir, store)
});

#[tokio::test]
async fn local_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = LocalVectorStore::open(dir.path()).unwrap();
        store.create_collection("research_papers").await.unwrap();
        store
            .add("research_papers", &[chunk("paris"), chunk("tokyo")], &[vec![1.0, 0.0], vec![0.0, 1.0]])
            .await
            .unwrap();
    }

    let reopened = LocalVectorStore::open(dir.path()).unwrap();
    assert_eq!(reopened.count("research_papers").await.unwrap(), 2);
    let hits = reopened.query("research_papers", &[0.0, 1.0], 1).await.unwrap();
    assert_eq!(hits[0].text, "tokyo");
    assert_eq!(hits[0].metadata[SOURCE_KEY], "tokyo.txt");

    // The id counter is persisted with the collection.
    let ids = reopened.add("research_papers", &[chunk("rome")], &[vec![1.0, 1.0]]).await.unwrap();
    assert_eq!(ids, vec!["2"]);

    // Creating it again resolves to the stored data.
    reopened.create_collection("research_papers").await.unwrap();
    assert_eq!(reopened.count("research_papers").await.unwrap(), 3);
}

#[tokio::test]
async fn local_store_rejects_corrupt_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("papers.collection"), b"{\"not\":\"a snapshot\"}").unwrap();

    let store = LocalVectorStore::open(dir.path()).unwrap();
    let err = store.query("papers", &[1.0], 1).await.unwrap_err();

    assert!(matches!(err, RagError::VectorStoreError { .. }));
}

#[tokio::test]
async fn failed_write_adds_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalVectorStore::open(dir.path()).unwrap();
    store.create_collection("papers").await.unwrap();
    store.add("papers", &[chunk("a")], &[vec![1.0, 0.0]]).await.unwrap();

    // Occupy the snapshot path with a directory so the rename fails.
    let snapshot = dir.path().join("papers.collection");
    fs::remove_file(&snapshot).unwrap();
    fs::create_dir(&snapshot).unwrap();

    let err = store.add("papers", &[chunk("b")], &[vec![0.0, 1.0]]).await.unwrap_err();

    assert!(matches!(err, RagError::StoreWriteFailure { ref collection, .. } if collection == "papers"));
    assert_eq!(store.count("papers").await.unwrap(), 1);
    assert!(!dir.path().join("papers.collection.tmp").exists());
}

#[tokio::test]
async fn invalid_collection_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalVectorStore::open(dir.path()).unwrap();

    for name in ["", "..", "../escape", "a b"] {
        assert!(matches!(
            store.create_collection(name).await,
            Err(RagError::InvalidCollectionName(_))
        ));
    }
}

use lossy_core::{
    select_stopwords, ArtifactFormat, ArtifactStore, IndexError, InvertedIndex, MatchMode, QueryEngine, QueryNormalizer, Stage,
};
use tempfile::tempdir;

fn sample() -> InvertedIndex {
    vec![
        ("zweig".to_string(), vec![20518]),
        ("abolition".to_string(), vec![209, 274, 318, 893]),
        ("lifo".to_string(), vec![588, 2221, 6084]),
        ("hollow".to_string(), vec![]),
    ]
    .into_iter()
    .collect()
}

#[test]
fn json_round_trip_is_exact() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let path = store.save_index(Stage::CaseFolded, &sample()).unwrap();
    let loaded = store.load_index(Stage::CaseFolded).unwrap();
    assert_eq!(loaded, sample());

    // re-serializing yields the same bytes
    let first = std::fs::read(&path).unwrap();
    store.save_index(Stage::CaseFolded, &loaded).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), first);
}

#[test]
fn json_keys_are_sorted() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let path = store.save_index(Stage::Naive, &sample()).unwrap();
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.starts_with(r#"{"abolition":[209,274,318,893],"hollow":[],"lifo""#));
}

#[test]
fn bincode_round_trip_is_exact() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path()).with_format(ArtifactFormat::Bincode);
    let path = store.save_index(Stage::Stemmed, &sample()).unwrap();
    assert_eq!(path.extension().and_then(|e| e.to_str()), Some("bin"));
    assert_eq!(store.load_index(Stage::Stemmed).unwrap(), sample());
}

#[test]
fn stopwords_persist_one_per_line() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let list = select_stopwords(&sample(), 2);
    let path = store.save_stopwords(&list).unwrap();
    assert_eq!(std::fs::read_to_string(path).unwrap(), "abolition\nlifo\n");
    assert_eq!(store.load_stopwords().unwrap(), list);
}

#[test]
fn missing_stopwords_are_reported() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("nowhere"));
    assert!(matches!(store.load_stopwords(), Err(IndexError::MissingArtifact { .. })));
}

#[test]
fn query_batches_round_trip() {
    let dir = tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let batch = QueryEngine::new(sample()).run_batch(
        ["zweig", "lifo", "absent"],
        MatchMode::Exact,
        &QueryNormalizer::identity(),
    );
    store.save_query_batch("sample", &batch).unwrap();
    let loaded = store.load_query_batch("sample").unwrap();
    assert_eq!(loaded, batch);
    assert_eq!(loaded.get("zweig"), Some(&[20518][..]));
}

//! Missing and damaged artifacts surface as distinct error kinds.

use crate::common::{KeywordEmbedder, TestCorpus, wardrobe};
use lookbook::io::ExitCode;
use lookbook::{ErrorKind, IndexArtifact, RetrievalError, Retriever, build_index};
use std::fs;
use std::sync::Arc;

fn built_wardrobe() -> TestCorpus {
    let corpus = wardrobe();
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &["txt".to_string()],
    )
    .unwrap();
    corpus
}

fn search_error(corpus: &TestCorpus) -> RetrievalError {
    Retriever::new(corpus.index_dir(), Arc::new(KeywordEmbedder::new()))
        .search("red dress", 2)
        .unwrap_err()
}

#[test]
fn test_search_before_build_is_not_found() {
    let corpus = wardrobe();
    let err = search_error(&corpus);

    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ExitCode::from_error(&err), ExitCode::NotFound);
}

#[test]
fn test_missing_documents_part_is_not_found() {
    let corpus = built_wardrobe();
    fs::remove_file(corpus.index_dir().join("documents.json")).unwrap();

    let err = search_error(&corpus);
    assert_eq!(err.kind(), ErrorKind::NotFound);
    assert!(err.to_string().contains("documents.json"));
}

#[test]
fn test_record_count_mismatch_is_corruption_not_not_found() {
    let corpus = TestCorpus::with_documents(&[
        ("1.txt", "red dress"),
        ("2.txt", "blue jeans"),
        ("3.txt", "black blazer"),
        ("4.txt", "crimson gown"),
        ("5.txt", "navy coat"),
    ]);
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &["txt".to_string()],
    )
    .unwrap();

    // Drop the metadata so the vector and text counts are the only witnesses
    fs::remove_file(corpus.index_dir().join("metadata.json")).unwrap();
    fs::write(
        corpus.index_dir().join("documents.json"),
        r#"["red dress","blue jeans","black blazer","crimson gown"]"#,
    )
    .unwrap();

    let err = search_error(&corpus);
    assert_eq!(err.kind(), ErrorKind::Corruption);
    assert_ne!(err.kind(), ErrorKind::NotFound);
    assert_eq!(ExitCode::from_error(&err), ExitCode::IndexCorrupted);
}

#[test]
fn test_same_count_texts_from_another_build_are_corruption() {
    let corpus = built_wardrobe();

    // Three texts, like the build, but not the ones the vectors came from
    fs::write(
        corpus.index_dir().join("documents.json"),
        r#"["navy coat","crimson gown","ebony jacket"]"#,
    )
    .unwrap();

    let err = search_error(&corpus);
    assert_eq!(err.kind(), ErrorKind::Corruption);
    assert_eq!(ExitCode::from_error(&err), ExitCode::IndexCorrupted);
}

#[test]
fn test_damaged_vector_file_is_corruption() {
    let corpus = built_wardrobe();
    let index_file = corpus.index_dir().join("index.vec");

    let mut bytes = fs::read(&index_file).unwrap();
    bytes[0] = b'X';
    fs::write(&index_file, &bytes).unwrap();
    assert_eq!(search_error(&corpus).kind(), ErrorKind::Corruption);

    bytes[0] = b'L';
    bytes.truncate(bytes.len() - 2);
    fs::write(&index_file, &bytes).unwrap();
    assert_eq!(search_error(&corpus).kind(), ErrorKind::Corruption);
}

#[test]
fn test_newer_format_version_is_corruption() {
    let corpus = built_wardrobe();
    let index_file = corpus.index_dir().join("index.vec");

    let mut bytes = fs::read(&index_file).unwrap();
    bytes[4..8].copy_from_slice(&2u32.to_le_bytes());
    fs::write(&index_file, &bytes).unwrap();

    let err = IndexArtifact::load(&corpus.index_dir()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Corruption);
    assert!(
        err.recovery_suggestions()
            .iter()
            .any(|s| s.contains("rebuild"))
    );
}

#[test]
fn test_failed_rebuild_keeps_previous_index() {
    let corpus = built_wardrobe();
    corpus.add_document("04.txt", "fine");
    fs::write(corpus.corpus_dir().join("05.txt"), [0xff, 0xfe, 0xfd]).unwrap();

    let err = build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &["txt".to_string()],
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Build);
    assert!(matches!(&err, RetrievalError::Decode { path } if path.ends_with("05.txt")));

    let results = Retriever::new(corpus.index_dir(), Arc::new(KeywordEmbedder::new()))
        .search("crimson gown", 1)
        .unwrap();
    assert_eq!(results, vec!["red dress"]);
}

#[test]
fn test_dimension_mismatch_between_model_and_index() {
    let corpus = built_wardrobe();
    let err = Retriever::new(
        corpus.index_dir(),
        Arc::new(KeywordEmbedder::with_dimension(10)),
    )
    .search("red", 1)
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::DimensionMismatch);
    assert_eq!(ExitCode::from_error(&err), ExitCode::DimensionMismatch);
}

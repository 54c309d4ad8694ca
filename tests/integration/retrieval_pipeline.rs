//! End-to-end build, persist, load and search with a deterministic embedder.

use crate::common::{KeywordEmbedder, TestCorpus, wardrobe};
use lookbook::vector::EmbeddingGenerator;
use lookbook::{IndexArtifact, IndexBuilder, Retriever, build_index};
use std::sync::Arc;

fn txt() -> Vec<String> {
    vec!["txt".to_string()]
}

fn retriever_for(corpus: &TestCorpus) -> Retriever {
    Retriever::new(corpus.index_dir(), Arc::new(KeywordEmbedder::new()))
}

#[test]
fn test_crimson_gown_finds_red_dress() {
    let corpus = wardrobe();
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &txt(),
    )
    .unwrap();

    let retriever = retriever_for(&corpus);
    assert_eq!(retriever.search("crimson gown", 1).unwrap(), vec!["red dress"]);
    assert_eq!(retriever.search("navy denim", 1).unwrap(), vec!["blue jeans"]);
    assert_eq!(retriever.search("charcoal coat", 1).unwrap(), vec!["black blazer"]);
}

#[test]
fn test_persisted_index_answers_like_in_memory_index() {
    let corpus = TestCorpus::with_documents(&[
        ("a.txt", "red dress"),
        ("b.txt", "scarlet frock with a navy coat"),
        ("c.txt", "indigo denim"),
        ("d.txt", "charcoal blazer"),
        ("e.txt", "crimson gown"),
        ("f.txt", "plain white shirt"),
    ]);
    let embedder = KeywordEmbedder::new();

    let (built, _) = IndexBuilder::new(&embedder)
        .build(&corpus.corpus_dir())
        .unwrap();
    built.persist(&corpus.index_dir()).unwrap();
    let loaded = IndexArtifact::load(&corpus.index_dir()).unwrap();

    for query in ["red", "denim jacket", "", "white", "ebony gown"] {
        let q = embedder.generate_embeddings(&[query]).unwrap().remove(0);
        for k in 1..=7 {
            assert_eq!(
                built.index().query(&q, k).unwrap(),
                loaded.index().query(&q, k).unwrap(),
                "query {query:?} with k={k}"
            );
        }
    }
}

#[test]
fn test_k_at_least_n_returns_everything_in_order() {
    let corpus = wardrobe();
    let embedder = KeywordEmbedder::new();
    build_index(&corpus.corpus_dir(), &corpus.index_dir(), &embedder, &txt()).unwrap();

    let artifact = IndexArtifact::load(&corpus.index_dir()).unwrap();
    let q = embedder.generate_embeddings(&["red jacket"]).unwrap().remove(0);

    for k in [3, 4, 100] {
        let neighbors = artifact.index().query(&q, k).unwrap();
        assert_eq!(neighbors.len(), 3);
        assert!(neighbors.windows(2).all(|w| w[0].distance <= w[1].distance));
    }

    let results = retriever_for(&corpus).search("red jacket", 100).unwrap();
    assert_eq!(results.len(), 3);
}

#[test]
fn test_smaller_k_is_prefix_of_larger_k() {
    let corpus = TestCorpus::with_documents(&[
        ("1.txt", "red dress"),
        ("2.txt", "crimson gown"),
        ("3.txt", "blue jeans"),
        ("4.txt", "navy blazer"),
        ("5.txt", "black coat"),
    ]);
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &txt(),
    )
    .unwrap();

    let retriever = retriever_for(&corpus);
    let mut previous = Vec::new();
    for k in 1..=5 {
        let results = retriever.search("scarlet jacket", k).unwrap();
        assert_eq!(results.len(), k);
        assert_eq!(&results[..k - 1], previous.as_slice());
        previous = results;
    }
}

#[test]
fn test_empty_corpus_returns_empty_results() {
    let corpus = TestCorpus::new();
    let stats = build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &txt(),
    )
    .unwrap();
    assert_eq!(stats.documents_indexed, 0);

    let retriever = retriever_for(&corpus);
    for k in [1, 2, 10] {
        assert!(retriever.search("red dress", k).unwrap().is_empty());
    }
}

#[test]
fn test_empty_query_on_non_empty_index() {
    let corpus = wardrobe();
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &txt(),
    )
    .unwrap();

    let results = retriever_for(&corpus).search("", 2).unwrap();
    assert_eq!(results.len(), 2);
}

#[test]
fn test_positions_follow_file_names() {
    let corpus = TestCorpus::with_documents(&[
        ("zeta.txt", "blue jeans"),
        ("alpha.txt", "red dress"),
        ("notes.md", "ignored"),
    ]);
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::new(),
        &txt(),
    )
    .unwrap();

    let artifact = IndexArtifact::load(&corpus.index_dir()).unwrap();
    assert_eq!(artifact.documents(), &["red dress", "blue jeans"]);
}

#[test]
fn test_info_reports_build() {
    let corpus = wardrobe();
    build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        &KeywordEmbedder::with_dimension(12),
        &txt(),
    )
    .unwrap();

    let info = lookbook::index_info(&corpus.index_dir()).unwrap();
    assert_eq!(info.document_count, 3);
    assert_eq!(info.dimension, 12);
    assert_eq!(info.model_name.as_deref(), Some("KeywordEmbedder"));
    assert_eq!(info.path, corpus.index_dir());
    assert!(corpus.root().join("vector_index").join("metadata.json").is_file());
}

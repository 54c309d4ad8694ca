//! Retrieval quality with the real sentence-embedding model.

use crate::common::wardrobe;
use lookbook::vector::{FastEmbedGenerator, ModelOptions};
use lookbook::{Retriever, build_index};

/// Get a unique cache directory for each test to avoid conflicts
fn get_test_cache_dir(test_name: &str) -> std::path::PathBuf {
    std::env::temp_dir().join(format!(
        "lookbook_test_fastembed_{}_{}",
        test_name,
        std::process::id()
    ))
}

#[test]
#[ignore = "Downloads 86MB model - run with --ignored for semantic tests"]
fn test_crimson_gown_with_real_model() {
    let options = ModelOptions {
        cache_dir: get_test_cache_dir("crimson_gown"),
        show_download_progress: false,
    };
    let embedder = FastEmbedGenerator::shared("AllMiniLML6V2", &options).unwrap();

    let corpus = wardrobe();
    let stats = build_index(
        &corpus.corpus_dir(),
        &corpus.index_dir(),
        embedder.as_ref(),
        &["txt".to_string()],
    )
    .unwrap();
    assert_eq!(stats.dimension, 384);

    let retriever = Retriever::new(corpus.index_dir(), embedder);
    assert_eq!(retriever.search("crimson gown", 1).unwrap(), vec!["red dress"]);
    assert_eq!(retriever.search("denim trousers", 1).unwrap(), vec!["blue jeans"]);
    assert_eq!(retriever.search("", 2).unwrap().len(), 2);
}

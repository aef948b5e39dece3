//! End-to-end behaviour of `RagService::answer` with mock collaborators.

use application::rag_service::RagService;
use domain::error::{ErrorKind, RagError};
use domain::models::EmbeddingVector;
use domain::prompt::build_prompt;
use tests::{item, item_without_text, MockEmbedder, MockGenerator, MockIndex};

const MAX_TOP_K: usize = 10;

fn service(
    embedder: &MockEmbedder,
    index: &MockIndex,
    generator: &MockGenerator,
) -> RagService<MockEmbedder, MockIndex, MockGenerator> {
    RagService::new(embedder.clone(), index.clone(), generator.clone(), MAX_TOP_K)
}

#[tokio::test]
async fn answers_with_contexts_in_retrieval_order() {
    let embedder = MockEmbedder::returning(vec![0.1, 0.2, 0.3]);
    let index = MockIndex::with_texts(&["x", "y", "z"]);
    let generator = MockGenerator::returning("42");

    let result = service(&embedder, &index, &generator)
        .answer("q", 5)
        .await
        .unwrap();

    assert_eq!(result.contexts, ["x", "y", "z"]);
    assert_eq!(result.answer, "42");
    assert_eq!(
        index.requests(),
        [(EmbeddingVector::new(vec![0.1, 0.2, 0.3]), 5)]
    );
    let expected_prompt = build_prompt("q", &result.contexts);
    assert_eq!(generator.prompts(), [expected_prompt.into_string()]);
}

#[tokio::test]
async fn query_is_embedded_as_typed() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::with_texts(&["ctx"]);
    let generator = MockGenerator::returning("ok");

    service(&embedder, &index, &generator)
        .answer("  padded question ", 1)
        .await
        .unwrap();

    assert_eq!(embedder.seen(), ["  padded question "]);
    assert!(generator.prompts()[0].contains("User question:\n  padded question \n"));
}

#[tokio::test]
async fn whitespace_query_is_rejected_before_any_call() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::with_texts(&["ctx"]);
    let generator = MockGenerator::returning("ok");

    for blank in ["", "  ", "\n\t "] {
        let err = service(&embedder, &index, &generator)
            .answer(blank, 5)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }

    assert_eq!(embedder.calls(), 0);
    assert_eq!(index.calls(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn top_k_bounds_are_inclusive() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let generator = MockGenerator::returning("ok");

    let one = MockIndex::with_texts(&["a"]);
    let rag = service(&embedder, &one, &generator);
    for k in [0, 11] {
        let err = rag.answer("q", k).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput, "k={k}");
    }
    assert_eq!(embedder.calls(), 0);
    assert_eq!(rag.answer("q", 1).await.unwrap().contexts.len(), 1);

    let ten = MockIndex::with_texts(&["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]);
    let rag = service(&embedder, &ten, &generator);
    assert_eq!(rag.answer("q", 10).await.unwrap().contexts.len(), 10);
}

#[tokio::test]
async fn overfull_store_response_is_a_retrieval_failure() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::with_texts(&["a", "b", "c", "d", "e"]);
    let generator = MockGenerator::returning("never");

    let err = service(&embedder, &index, &generator)
        .answer("q", 2)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Retrieval);
    assert!(err.to_string().contains("5 matches for top_k=2"), "{err}");
    assert_eq!(index.calls(), 1);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn contexts_never_exceed_top_k() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::with_texts(&["a", "b", "c", "d"]);
    let generator = MockGenerator::returning("ok");
    let rag = service(&embedder, &index, &generator);

    let mut answered = 0;
    for k in 1..=MAX_TOP_K {
        match rag.answer("q", k).await {
            Ok(result) => {
                assert!(result.contexts.len() <= k, "k={k}");
                answered += 1;
            }
            Err(err) => {
                assert_eq!(err.kind(), ErrorKind::Retrieval, "k={k}");
                assert!(k < 4, "k={k}");
            }
        }
    }
    assert_eq!(answered, MAX_TOP_K - 3);
    assert_eq!(generator.calls(), answered);
}

#[tokio::test]
async fn missing_text_metadata_stops_before_generation() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::returning(vec![
        item("first", "one"),
        item_without_text("second"),
        item("third", "three"),
    ]);
    let generator = MockGenerator::returning("never");

    let err = service(&embedder, &index, &generator)
        .answer("q", 5)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Retrieval);
    assert!(err.to_string().contains("second"));
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn empty_retrieval_still_generates_with_empty_context() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::returning(Vec::new());
    let generator = MockGenerator::returning("I don't know");

    let result = service(&embedder, &index, &generator)
        .answer("q", 3)
        .await
        .unwrap();

    assert!(result.contexts.is_empty());
    assert_eq!(result.answer, "I don't know");
    assert!(generator.prompts()[0].contains("Context:\n\n\nAnswer:"));
}

#[tokio::test]
async fn first_failure_aborts_remaining_steps() {
    let embedder = MockEmbedder::failing(RagError::retrieval("embedding quota exceeded"));
    let index = MockIndex::with_texts(&["a"]);
    let generator = MockGenerator::returning("never");

    let err = service(&embedder, &index, &generator)
        .answer("q", 3)
        .await
        .unwrap_err();

    assert_eq!(err, RagError::Retrieval("embedding quota exceeded".into()));
    assert_eq!(index.calls(), 0);
    assert_eq!(generator.calls(), 0);
}

#[tokio::test]
async fn errors_keep_their_kind() {
    let cases = [
        RagError::missing_setting("GENIE_API_KEY"),
        RagError::generation("content blocked"),
        RagError::unexpected("odd payload"),
    ];
    for expected in cases {
        let embedder = MockEmbedder::returning(vec![1.0]);
        let index = MockIndex::with_texts(&["a"]);
        let generator = MockGenerator::failing(expected.clone());

        let err = service(&embedder, &index, &generator)
            .answer("q", 1)
            .await
            .unwrap_err();
        assert_eq!(err, expected);
        assert_eq!(generator.calls(), 1);
    }
}

#[tokio::test]
async fn concurrent_invocations_are_independent() {
    let embedder = MockEmbedder::returning(vec![1.0]);
    let index = MockIndex::with_texts(&["a", "b", "c"]);
    let generator = MockGenerator::returning("ok");
    let rag = std::sync::Arc::new(service(&embedder, &index, &generator));

    let handles: Vec<_> = (3..=5)
        .map(|k| {
            let rag = rag.clone();
            tokio::spawn(async move { rag.answer("q", k).await })
        })
        .collect();

    for handle in handles {
        let result = handle.await.unwrap().unwrap();
        assert_eq!(result.contexts, ["a", "b", "c"]);
    }
    let mut requested: Vec<usize> = index.requests().into_iter().map(|(_, k)| k).collect();
    requested.sort_unstable();
    assert_eq!(requested, [3, 4, 5]);
    assert_eq!(generator.calls(), 3);
}

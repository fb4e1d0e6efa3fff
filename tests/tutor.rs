//! Orchestrator behaviour against in-memory providers.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tutor::rag::{FlatIndex, KnowledgeBase, NO_CONTENT_SENTINEL, RETRIEVAL_ERROR_SENTINEL, RagError};
use tutor::{
    DomainPolicy, Embedding, EmbeddingModel, IDENTITY_REPLY, LanguageModel, OUT_OF_SCOPE_REPLY,
    Reply, Tutor, TutorError,
};

/// Unit vectors along four axes: lists, loops, pancakes, everything else.
struct AxisEmbedding {
    dimension: usize,
    failing: bool,
    calls: AtomicUsize,
}

impl AxisEmbedding {
    fn new() -> Self {
        Self {
            dimension: 4,
            failing: false,
            calls: AtomicUsize::new(0),
        }
    }

    fn failing() -> Self {
        Self {
            failing: true,
            ..Self::new()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EmbeddingModel for AxisEmbedding {
    fn dim(&self) -> usize {
        self.dimension
    }

    fn model_id(&self) -> &str {
        "axis"
    }

    fn is_normalized(&self) -> bool {
        true
    }

    async fn embed(&self, texts: &[&str]) -> tutor::Result<Vec<Embedding>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            anyhow::bail!("embedding service unreachable");
        }
        Ok(texts
            .iter()
            .map(|text| {
                let text = text.to_lowercase();
                let mut v = vec![0.0; self.dimension];
                if text.contains("list") {
                    v[0] = 1.0;
                } else if text.contains("loop") {
                    v[1] = 1.0;
                } else if text.contains("pancake") {
                    v[2] = 1.0;
                } else {
                    v[3] = 1.0;
                }
                v
            })
            .collect())
    }
}

/// Echoes a canned reply and remembers every prompt.
struct ScriptedModel {
    reply: Option<&'static str>,
    calls: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    fn replying(reply: &'static str) -> Self {
        Self {
            reply: Some(reply),
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    fn broken() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_prompt(&self) -> String {
        self.prompts.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

impl LanguageModel for ScriptedModel {
    fn model_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> tutor::Result {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.to_owned());
        self.reply
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("quota exceeded"))
    }
}

fn knowledge() -> Arc<KnowledgeBase> {
    let index = FlatIndex::build(4, vec![vec![1.0, 0.0, 0.0, 0.0], vec![0.0, 1.0, 0.0, 0.0]])
        .unwrap();
    let chunks = vec![
        tutor::rag::Chunk::new("A list is an ordered, mutable collection.", 12),
        tutor::rag::Chunk::new("A while loop repeats until its condition is false.", 20),
    ];
    Arc::new(KnowledgeBase::new(index, chunks, "axis").unwrap())
}

fn tutor_with(
    embedder: &Arc<AxisEmbedding>,
    model: &Arc<ScriptedModel>,
    policy: DomainPolicy,
) -> Tutor<AxisEmbedding, ScriptedModel> {
    Tutor::builder(embedder.clone(), knowledge(), model.clone())
        .policy(policy)
        .build()
        .unwrap()
}

#[tokio::test]
async fn identity_question_skips_everything() {
    let embedder = Arc::new(AxisEmbedding::new());
    let model = Arc::new(ScriptedModel::replying("unused"));
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Reject);

    assert_eq!(tutor.answer("Who are you?").await, IDENTITY_REPLY);
    assert_eq!(embedder.calls(), 0);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn grounded_answer_is_trimmed_and_cites_pages() {
    let embedder = Arc::new(AxisEmbedding::new());
    let model = Arc::new(ScriptedModel::replying("\n  Lists keep their order.  \n"));
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Advisory);

    let reply = tutor.respond("What is a list?").await;
    let Reply::Answer { text, context } = reply else {
        panic!("expected a generated answer");
    };
    assert_eq!(text, "Lists keep their order.");
    assert_eq!(context, "[Page 12]\nA list is an ordered, mutable collection.");

    let prompt = model.last_prompt();
    assert!(prompt.contains("[Page 12]"));
    assert!(prompt.contains("What is a list?"));
}

#[tokio::test]
async fn unmatched_question_is_answered_without_context() {
    let embedder = Arc::new(AxisEmbedding::new());
    let model = Arc::new(ScriptedModel::replying("General answer."));
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Advisory);

    assert_eq!(tutor.answer("Explain recursion").await, "General answer.");
    assert!(model.last_prompt().contains(NO_CONTENT_SENTINEL));
    assert!(model.last_prompt().contains("Explain recursion"));
}

#[tokio::test]
async fn generation_failure_becomes_message() {
    let embedder = Arc::new(AxisEmbedding::new());
    let model = Arc::new(ScriptedModel::broken());
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Advisory);

    let reply = tutor.respond("What is a list?").await;
    assert!(matches!(reply, Reply::Failed(TutorError::Generation(_))));
    assert_eq!(reply.into_text(), "⚠️ An error occurred: quota exceeded");
}

#[tokio::test]
async fn retrieval_failure_still_generates() {
    let embedder = Arc::new(AxisEmbedding::failing());
    let model = Arc::new(ScriptedModel::replying("Best effort."));
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Advisory);

    assert_eq!(tutor.answer("What is a list?").await, "Best effort.");
    assert!(model.last_prompt().contains(RETRIEVAL_ERROR_SENTINEL));
}

#[tokio::test]
async fn reject_policy_turns_away_out_of_domain_questions() {
    let embedder = Arc::new(AxisEmbedding::new());
    let model = Arc::new(ScriptedModel::replying("Pancakes!"));

    let strict = tutor_with(&embedder, &model, DomainPolicy::Reject);
    assert_eq!(strict.answer("best pancake recipe").await, OUT_OF_SCOPE_REPLY);
    assert_eq!(model.calls(), 0);

    let lenient = tutor_with(&embedder, &model, DomainPolicy::Advisory);
    assert_eq!(lenient.answer("best pancake recipe").await, "Pancakes!");
    assert_eq!(model.calls(), 1);
}

#[tokio::test]
async fn reject_policy_accepts_keyword_questions() {
    let embedder = Arc::new(AxisEmbedding::new());
    let model = Arc::new(ScriptedModel::replying("Use a while loop."));
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Reject);

    assert_eq!(
        tutor.answer("How does a while loop stop?").await,
        "Use a while loop."
    );
}

#[tokio::test]
async fn gate_failure_under_reject_is_treated_as_in_domain() {
    let embedder = Arc::new(AxisEmbedding::failing());
    let model = Arc::new(ScriptedModel::replying("Answered anyway."));
    let tutor = tutor_with(&embedder, &model, DomainPolicy::Reject);

    assert_eq!(tutor.answer("best pancake recipe").await, "Answered anyway.");
}

#[test]
fn mismatched_embedder_fails_to_build() {
    struct Wide;
    impl EmbeddingModel for Wide {
        fn dim(&self) -> usize {
            8
        }
        fn model_id(&self) -> &str {
            "axis"
        }
        async fn embed(&self, _texts: &[&str]) -> tutor::Result<Vec<Embedding>> {
            Ok(Vec::new())
        }
    }

    let err = Tutor::builder(
        Arc::new(Wide),
        knowledge(),
        Arc::new(ScriptedModel::replying("")),
    )
    .build()
    .unwrap_err();
    assert!(matches!(
        err,
        TutorError::Retrieval(RagError::DimensionMismatch {
            expected: 4,
            actual: 8
        })
    ));
}

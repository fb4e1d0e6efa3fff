//! The question-answering orchestrator.

use std::sync::Arc;

use tutor_core::{EmbeddingModel, LanguageModel};
use tutor_rag::{KnowledgeBase, PromptComposer, RagConfig, RelevanceGate, Retriever};

use crate::error::TutorError;

/// Fixed reply to questions about the tutor itself.
pub const IDENTITY_REPLY: &str = "I am your AI tutor, designed to help you navigate and understand \
your textbook syllabus by intelligently reading through your PDF and providing clear, concise \
explanations tailored to your questions.";

/// Fixed reply to questions rejected by [`DomainPolicy::Reject`].
pub const OUT_OF_SCOPE_REPLY: &str = "That question seems to be outside the scope of your \
textbook. Try asking about a topic it covers, and I will walk you through it.";

const IDENTITY_TRIGGERS: [&str; 3] = ["who are you", "what are you", "yourself"];

/// What the tutor does with questions the relevance gate considers out of domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DomainPolicy {
    /// Answer every question; the gate is not consulted.
    #[default]
    Advisory,
    /// Refuse out-of-domain questions with [`OUT_OF_SCOPE_REPLY`].
    Reject,
}

/// Outcome of one question.
#[derive(Debug)]
pub enum Reply {
    /// The question asked about the tutor itself.
    Identity,
    /// The question was rejected by the domain policy.
    OutOfScope,
    /// A generated answer.
    Answer {
        /// The model's reply, trimmed.
        text: String,
        /// The context the prompt was built from.
        context: String,
    },
    /// Answering failed.
    Failed(TutorError),
}

impl Reply {
    /// The text shown to the student.
    #[must_use]
    pub fn into_text(self) -> String {
        match self {
            Self::Identity => IDENTITY_REPLY.to_string(),
            Self::OutOfScope => OUT_OF_SCOPE_REPLY.to_string(),
            Self::Answer { text, .. } => text,
            Self::Failed(err) => format!("⚠️ An error occurred: {err}"),
        }
    }

    /// Returns `true` for [`Reply::Failed`].
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Answers textbook questions: identity check, domain policy, retrieval, prompt, generation.
///
/// No error escapes [`Tutor::answer`]; failures become a readable message.
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tutor::{DomainPolicy, Tutor};
/// use tutor::rag::ArtifactStore;
///
/// # async fn serve<E, L>(embedder: E, model: L) -> Result<(), tutor::TutorError>
/// # where E: tutor::EmbeddingModel, L: tutor::LanguageModel {
/// let embedder = Arc::new(embedder);
/// let knowledge = ArtifactStore::new("output/textbook_index.rkyv", "output/text_chunks.json")
///     .load(embedder.as_ref())?;
///
/// let tutor = Tutor::builder(embedder, Arc::new(knowledge), Arc::new(model))
///     .policy(DomainPolicy::Reject)
///     .build()?;
/// println!("{}", tutor.answer("What is a tuple?").await);
/// # Ok(())
/// # }
/// ```
pub struct Tutor<E, L> {
    retriever: Retriever<E>,
    gate: RelevanceGate<E>,
    composer: PromptComposer,
    model: Arc<L>,
    policy: DomainPolicy,
}

impl<E, L> std::fmt::Debug for Tutor<E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tutor")
            .field("retriever", &self.retriever)
            .field("gate", &self.gate)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingModel, L: LanguageModel> Tutor<E, L> {
    /// Starts building a tutor over a loaded knowledge base.
    #[must_use]
    pub fn builder(
        embedder: Arc<E>,
        knowledge: Arc<KnowledgeBase>,
        model: Arc<L>,
    ) -> TutorBuilder<E, L> {
        TutorBuilder {
            embedder,
            knowledge,
            model,
            config: RagConfig::default(),
            policy: DomainPolicy::default(),
            keywords: None,
        }
    }

    /// The active domain policy.
    #[must_use]
    pub const fn policy(&self) -> DomainPolicy {
        self.policy
    }

    /// The relevance gate.
    #[must_use]
    pub const fn gate(&self) -> &RelevanceGate<E> {
        &self.gate
    }

    /// The retriever.
    #[must_use]
    pub const fn retriever(&self) -> &Retriever<E> {
        &self.retriever
    }

    /// Answers `question`, always with a displayable string.
    pub async fn answer(&self, question: &str) -> String {
        self.respond(question).await.into_text()
    }

    /// Answers `question`, keeping the outcome distinguishable.
    pub async fn respond(&self, question: &str) -> Reply {
        if is_identity_question(question) {
            tracing::debug!("identity question");
            return Reply::Identity;
        }

        if self.policy == DomainPolicy::Reject {
            match self.gate.is_in_domain(question).await {
                Ok(true) => {}
                Ok(false) => {
                    tracing::info!(question, "rejected out-of-domain question");
                    return Reply::OutOfScope;
                }
                Err(err) => {
                    tracing::warn!(error = %err, "relevance gate failed, answering anyway");
                }
            }
        }

        let context = self.retriever.retrieve(question).await;
        let prompt = self.composer.compose(question, &context);

        match self.model.complete(&prompt).await {
            Ok(text) => {
                tracing::debug!(
                    model = self.model.model_name(),
                    chars = text.len(),
                    "generated answer"
                );
                Reply::Answer {
                    text: text.trim().to_string(),
                    context,
                }
            }
            Err(err) => {
                tracing::error!(error = %err, model = self.model.model_name(), "generation failed");
                Reply::Failed(TutorError::Generation(err))
            }
        }
    }
}

fn is_identity_question(question: &str) -> bool {
    let lowered = question.to_lowercase();
    IDENTITY_TRIGGERS
        .iter()
        .any(|trigger| lowered.contains(trigger))
}

/// Builder for [`Tutor`].
pub struct TutorBuilder<E, L> {
    embedder: Arc<E>,
    knowledge: Arc<KnowledgeBase>,
    model: Arc<L>,
    config: RagConfig,
    policy: DomainPolicy,
    keywords: Option<Vec<String>>,
}

impl<E, L> std::fmt::Debug for TutorBuilder<E, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TutorBuilder")
            .field("config", &self.config)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl<E: EmbeddingModel, L: LanguageModel> TutorBuilder<E, L> {
    /// Uses the retrieval and gate settings of `config`.
    #[must_use]
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the number of chunks retrieved per question.
    #[must_use]
    pub const fn top_k(mut self, top_k: usize) -> Self {
        self.config.top_k = top_k;
        self
    }

    /// Sets the minimum similarity for retrieved chunks.
    #[must_use]
    pub const fn min_similarity(mut self, min_similarity: f32) -> Self {
        self.config.min_similarity = min_similarity;
        self
    }

    /// Sets the domain policy.
    #[must_use]
    pub const fn policy(mut self, policy: DomainPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the relevance gate vocabulary.
    #[must_use]
    pub fn keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = Some(keywords.into_iter().map(Into::into).collect());
        self
    }

    /// Builds the tutor.
    ///
    /// # Errors
    /// [`TutorError::Retrieval`] if the embedder does not match the knowledge base.
    pub fn build(self) -> Result<Tutor<E, L>, TutorError> {
        let retriever =
            Retriever::from_config(self.embedder.clone(), self.knowledge, &self.config)?;
        let mut gate = RelevanceGate::from_config(self.embedder, &self.config);
        if let Some(keywords) = self.keywords {
            gate = gate.with_keywords(keywords);
        }
        tracing::info!(
            chunks = retriever.knowledge().len(),
            policy = ?self.policy,
            "tutor ready"
        );
        Ok(Tutor {
            retriever,
            gate,
            composer: PromptComposer::new(),
            model: self.model,
            policy: self.policy,
        })
    }
}

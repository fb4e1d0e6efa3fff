//! The generative side of the pipeline is an opaque completion service: it receives one
//! fully-formed prompt and answers with text. Chat history, tools and streaming are not part
//! of the contract.

use alloc::string::String;
use core::future::Future;

/// A text-completion service invoked with a fully-formed prompt.
///
/// ```rust
/// use tutor_core::LanguageModel;
///
/// struct Echo;
///
/// impl LanguageModel for Echo {
///     fn model_name(&self) -> &str {
///         "echo"
///     }
///
///     async fn complete(&self, prompt: &str) -> tutor_core::Result {
///         Ok(prompt.to_owned())
///     }
/// }
/// ```
pub trait LanguageModel: Send + Sync {
    /// Name of the model that serves completions.
    fn model_name(&self) -> &str;

    /// Generates a completion for `prompt`.
    fn complete(&self, prompt: &str) -> impl Future<Output = crate::Result<String>> + Send;
}

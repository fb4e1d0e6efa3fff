//! Command-line front end for the textbook tutor.
//!
//! The `tutor` binary ingests a PDF into a knowledge base and answers questions against it.
//!
//! # Usage
//!
//! ```bash
//! # Build the knowledge base with the local ONNX embedder
//! cargo run -p tutor-cli -- ingest --pdf-path data/Python_Programming.pdf
//!
//! # Ask one question (needs GEMINI_API_KEY)
//! cargo run -p tutor-cli -- ask "How do I slice a string?"
//!
//! # Interactive session that refuses off-topic questions
//! cargo run -p tutor-cli -- chat --reject-out-of-domain
//! ```

pub mod provider;

pub use provider::{Embedder, EmbedderKind};

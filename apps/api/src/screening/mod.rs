// Candidate screening: form steps 1–7, then LLM-generated technical questions.
// All LLM calls go through the CompletionBackend trait, never a concrete client.

pub mod anonymizer;
pub mod evaluator;
pub mod form;
pub mod handlers;
pub mod machine;
pub mod prompts;
pub mod questions;
pub mod recorder;
pub mod view;

use thiserror::Error;

use crate::llm_client::LlmError;

#[derive(Debug, Error)]
pub enum ScreeningError {
    #[error("{0}")]
    Validation(String),

    #[error("Submitted step {submitted} does not match the current step {current}")]
    WrongStep { current: u8, submitted: u8 },

    #[error("{0}")]
    InvalidAction(String),

    #[error("Session halted: {0}")]
    Halted(String),

    #[error("Question generation failed: {0}")]
    Generation(#[from] LlmError),

    #[error("Question generation returned no usable questions")]
    NoQuestions,
}

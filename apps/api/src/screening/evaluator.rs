//! Answer Evaluator: alignment classification plus numeric scoring, two LLM calls per answer.
//!
//! Both LLM outputs are free text and treated as unreliable:
//! - alignment is a tolerant marker match with an `Unparseable` variant that fails open
//! - the score is the first numeric token, or `None` when nothing usable is found

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::llm_client::CompletionBackend;
use crate::screening::prompts::{
    alignment_prompt, scoring_prompt, ALIGNED_MARKER, PARTIALLY_ALIGNED_MARKER,
};

pub const MIN_SCORE: f64 = 0.0;
pub const MAX_SCORE: f64 = 10.0;

static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("numeric pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentCategory {
    Aligned,
    PartiallyAligned,
    Misaligned,
    /// The backend failed or returned nothing. Treated like `Aligned` so an outage never blocks.
    Unparseable,
}

impl AlignmentCategory {
    /// Whether the candidate moves on to the next question without an override.
    pub fn advances(self) -> bool {
        !matches!(self, AlignmentCategory::Misaligned)
    }
}

/// Transient result of evaluating one answer. Only `score` and the branch taken survive.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationResult {
    pub alignment_category: AlignmentCategory,
    pub feedback_text: String,
    pub score: Option<f64>,
}

/// Classifies alignment feedback by case-insensitive marker match.
pub fn classify_alignment(feedback: &str) -> AlignmentCategory {
    if feedback.trim().is_empty() {
        return AlignmentCategory::Unparseable;
    }
    let lower = feedback.to_lowercase();
    if lower.contains(ALIGNED_MARKER) {
        AlignmentCategory::Aligned
    } else if lower.contains(PARTIALLY_ALIGNED_MARKER) {
        AlignmentCategory::PartiallyAligned
    } else {
        AlignmentCategory::Misaligned
    }
}

/// Extracts the first integer or decimal token as the score.
///
/// Returns `None` when there is no numeric token or it falls outside 0–10.
/// `None` means "could not evaluate" and is never coerced to zero.
pub fn parse_score(text: &str) -> Option<f64> {
    let token = NUMERIC_TOKEN.find(text)?;
    token
        .as_str()
        .parse::<f64>()
        .ok()
        .filter(|s| (MIN_SCORE..=MAX_SCORE).contains(s))
}

/// Runs the alignment check then the scoring call for one answer.
/// Never fails: backend errors become `Unparseable` alignment or a `None` score.
pub async fn evaluate_answer(
    question: &str,
    answer: &str,
    llm: &dyn CompletionBackend,
) -> EvaluationResult {
    let (alignment_category, feedback_text) =
        match llm.invoke(&alignment_prompt(question, answer)).await {
            Ok(feedback) => {
                let feedback = feedback.trim().to_string();
                (classify_alignment(&feedback), feedback)
            }
            Err(e) => {
                warn!("Alignment check failed, continuing without feedback: {e}");
                (AlignmentCategory::Unparseable, String::new())
            }
        };

    let score = match llm.invoke(&scoring_prompt(question, answer)).await {
        Ok(text) => {
            let score = parse_score(&text);
            if score.is_none() {
                warn!("Scoring response had no usable score: {:?}", text.trim());
            }
            score
        }
        Err(e) => {
            warn!("Scoring call failed, recording no score: {e}");
            None
        }
    };

    debug!("Answer evaluated: alignment={alignment_category:?}, score={score:?}");

    EvaluationResult {
        alignment_category,
        feedback_text,
        score,
    }
}

//! Technical question generation from the candidate's profile.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{info, warn};

use crate::llm_client::CompletionBackend;
use crate::models::candidate::CandidateProfile;
use crate::screening::prompts::question_generation_prompt;
use crate::screening::ScreeningError;

/// Questions kept per session.
pub const QUESTIONS_PER_SESSION: usize = 3;

// "1. ...", "2) ...", "- ...", "* ...", "• ...", "Q1: ...", "Question 2. ..."
static LIST_ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:\*\*)?(?:\d+[.)]|[-*•]|q(?:uestion)?\s*\d+\s*[:.)])(?:\*\*)?\s+(.+)$")
        .expect("list item pattern is valid")
});

/// Splits a completion into questions.
///
/// Blank lines are dropped. When any line is a list item, only list items are kept
/// (with markers stripped) so preambles like "Here are three questions:" are ignored.
/// At most [`QUESTIONS_PER_SESSION`] questions are returned.
pub fn parse_questions(text: &str) -> Vec<String> {
    let lines: Vec<&str> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let items: Vec<String> = lines
        .iter()
        .filter_map(|l| LIST_ITEM.captures(l))
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|q| !q.is_empty())
        .collect();

    let questions = if items.is_empty() {
        lines.into_iter().map(str::to_string).collect()
    } else {
        items
    };

    questions.into_iter().take(QUESTIONS_PER_SESSION).collect()
}

/// Calls the backend once and parses the questions.
/// Any backend failure, or a completion with no usable line, is an error. No partial set is used.
pub async fn generate_questions(
    profile: &CandidateProfile,
    llm: &dyn CompletionBackend,
) -> Result<Vec<String>, ScreeningError> {
    let prompt = question_generation_prompt(
        profile.experience_years.unwrap_or_default(),
        profile.position.as_deref().unwrap_or_default(),
        profile.tech_stack.as_deref().unwrap_or_default(),
    );

    let completion = llm.invoke(&prompt).await.map_err(|e| {
        warn!("Question generation call failed: {e}");
        ScreeningError::Generation(e)
    })?;

    let questions = parse_questions(&completion);
    if questions.is_empty() {
        warn!("Question generation returned no usable lines");
        return Err(ScreeningError::NoQuestions);
    }

    info!("Generated {} screening questions", questions.len());
    Ok(questions)
}

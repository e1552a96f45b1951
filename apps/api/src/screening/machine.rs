//! Screening state machine: forward-only transitions over a `ScreeningSession`.
//!
//! Every function here is one discrete candidate action. Rendering lives in `view`
//! and never calls into this module except through `ensure_questions`.

use serde::Serialize;
use tracing::{info, warn};

use crate::llm_client::CompletionBackend;
use crate::models::session::{FormStep, PendingAnswer, ScreeningSession};
use crate::screening::evaluator::{evaluate_answer, AlignmentCategory};
use crate::screening::form::{apply_field, FieldValue};
use crate::screening::prompts::{
    ALIGNED_MESSAGE, GENERATION_FAILED, OVERRIDE_PROMPT, PARTIALLY_ALIGNED_MESSAGE,
    UNPARSEABLE_MESSAGE,
};
use crate::screening::questions::generate_questions;
use crate::screening::ScreeningError;

/// What the candidate sees after submitting an answer.
#[derive(Debug, Clone, Serialize)]
pub struct AnswerOutcome {
    pub alignment: AlignmentCategory,
    pub feedback: String,
    pub message: String,
    pub advanced: bool,
}

fn ensure_active(session: &ScreeningSession) -> Result<(), ScreeningError> {
    match &session.halted {
        Some(reason) => Err(ScreeningError::Halted(reason.clone())),
        None => Ok(()),
    }
}

fn advance_step(session: &mut ScreeningSession) {
    if let Some(next) = session.step.next() {
        session.step = next;
        info!("Session {} advanced to step {}", session.id, next.number());
    }
}

/// Submits the value for the current form step (1–7) and advances on success.
///
/// `submitted_step` is the step the client rendered; a stale form is rejected
/// rather than applied to whatever step is current.
pub fn submit_field(
    session: &mut ScreeningSession,
    submitted_step: Option<u8>,
    value: &FieldValue,
) -> Result<String, ScreeningError> {
    ensure_active(session)?;

    if let Some(submitted) = submitted_step {
        if submitted != session.step.number() {
            return Err(ScreeningError::WrongStep {
                current: session.step.number(),
                submitted,
            });
        }
    }

    let acknowledgement = apply_field(&mut session.candidate, session.step, value)?;
    advance_step(session);
    session.touch();
    Ok(acknowledgement)
}

/// Skips the optional phone step, leaving `phone_hash` unset.
pub fn skip_phone(session: &mut ScreeningSession) -> Result<String, ScreeningError> {
    ensure_active(session)?;

    if session.step != FormStep::Phone {
        return Err(ScreeningError::InvalidAction(format!(
            "Only the {} step can be skipped",
            FormStep::Phone.label()
        )));
    }

    session.candidate.phone_hash = None;
    advance_step(session);
    session.touch();
    Ok("No problem, we'll skip the phone number. Moving on!".to_string())
}

/// Generates the session's questions the first time the questions phase is reached.
///
/// Memoized: once questions exist this never calls the backend again. A generation
/// failure halts the session and no partial question set is kept.
pub async fn ensure_questions(
    session: &mut ScreeningSession,
    llm: &dyn CompletionBackend,
) -> Result<(), ScreeningError> {
    ensure_active(session)?;

    if session.step != FormStep::Questions || !session.questions.is_empty() {
        return Ok(());
    }

    match generate_questions(&session.candidate, llm).await {
        Ok(questions) => {
            session.questions = questions;
            session.touch();
            Ok(())
        }
        Err(e) => {
            warn!("Session {} halted: {e}", session.id);
            session.halted = Some(GENERATION_FAILED.to_string());
            session.touch();
            Err(e)
        }
    }
}

/// Evaluates an answer to the current question.
///
/// Aligned, partially aligned and unparseable answers are recorded and the index advances.
/// A misaligned answer is held with its score until `override_answer` or a resubmission.
pub async fn submit_answer(
    session: &mut ScreeningSession,
    answer: &str,
    llm: &dyn CompletionBackend,
) -> Result<AnswerOutcome, ScreeningError> {
    ensure_active(session)?;

    if session.step != FormStep::Questions {
        return Err(ScreeningError::InvalidAction(format!(
            "Answers are accepted once the profile is complete (current step: {})",
            session.step.label()
        )));
    }

    let question = session
        .current_question()
        .ok_or_else(|| {
            ScreeningError::InvalidAction("There is no open question to answer".to_string())
        })?
        .to_string();

    let answer = answer.trim();
    if answer.is_empty() {
        return Err(ScreeningError::Validation("Answer cannot be empty".to_string()));
    }

    let result = evaluate_answer(&question, answer, llm).await;
    let advanced = result.alignment_category.advances();

    let message = match result.alignment_category {
        AlignmentCategory::Aligned => ALIGNED_MESSAGE.to_string(),
        AlignmentCategory::PartiallyAligned => PARTIALLY_ALIGNED_MESSAGE.to_string(),
        AlignmentCategory::Unparseable => UNPARSEABLE_MESSAGE.to_string(),
        AlignmentCategory::Misaligned => format!(
            "Your answer may not be fully aligned: {}",
            result.feedback_text
        ),
    };

    if advanced {
        record_answer(session, answer.to_string(), result.score);
    } else {
        // A resubmission replaces the held answer; nothing is appended yet.
        session.pending_answer = Some(PendingAnswer {
            answer: answer.to_string(),
            score: result.score,
        });
        session.pending_error = Some(OVERRIDE_PROMPT.to_string());
        info!(
            "Session {} answer to question {} is misaligned; awaiting override",
            session.id,
            session.current_question_index + 1
        );
    }
    session.touch();

    Ok(AnswerOutcome {
        alignment: result.alignment_category,
        feedback: result.feedback_text,
        message,
        advanced,
    })
}

/// "Continue Anyway": records the held misaligned answer and its score, then advances.
pub fn override_answer(session: &mut ScreeningSession) -> Result<(), ScreeningError> {
    ensure_active(session)?;

    let pending = session.pending_answer.take().ok_or_else(|| {
        ScreeningError::InvalidAction("There is no answer awaiting override".to_string())
    })?;

    record_answer(session, pending.answer, pending.score);
    info!(
        "Session {} overrode alignment check, now at question {}",
        session.id,
        session.current_question_index + 1
    );
    session.touch();
    Ok(())
}

// Keeps responses, scores and the index in lockstep.
fn record_answer(session: &mut ScreeningSession, answer: String, score: Option<f64>) {
    session.responses.push(answer);
    session.scores.push(score);
    session.current_question_index += 1;
    session.pending_answer = None;
    session.pending_error = None;
}

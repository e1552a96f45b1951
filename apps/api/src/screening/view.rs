//! Read-only rendering of a session for the client. Pure: never mutates or calls out.

use serde::Serialize;
use uuid::Uuid;

use crate::models::report::{ReportWrite, ScreeningReport};
use crate::models::session::{FormStep, ScreeningSession};
use crate::screening::form::step_prompt;
use crate::screening::prompts::CLOSING;

#[derive(Debug, Serialize)]
pub struct StepIndicator {
    pub number: u8,
    pub label: &'static str,
    pub current: bool,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    /// 1-based.
    pub number: usize,
    pub total: usize,
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct CompletionView {
    pub message: &'static str,
    pub average_score: f64,
    pub report: ScreeningReport,
    pub report_write: Option<ReportWrite>,
    pub closing: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub step: FormStep,
    pub step_label: &'static str,
    /// Fraction of steps completed, `(step - 1) / 8`.
    pub progress: f32,
    pub steps: Vec<StepIndicator>,
    pub prompt: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub question: Option<QuestionView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub halted: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion: Option<CompletionView>,
}

pub fn render(session: &ScreeningSession) -> SessionView {
    let steps = FormStep::ALL
        .iter()
        .map(|s| StepIndicator {
            number: s.number(),
            label: s.label(),
            current: *s == session.step,
        })
        .collect();

    let question = session.current_question().map(|text| QuestionView {
        number: session.current_question_index + 1,
        total: session.questions.len(),
        text: text.to_string(),
    });

    let completion = session.report.as_ref().map(|report| CompletionView {
        message: "Thank you for completing the questionnaire!",
        average_score: report.average_score,
        report: report.clone(),
        report_write: session.report_write.clone(),
        closing: CLOSING,
    });

    SessionView {
        session_id: session.id,
        step: session.step,
        step_label: session.step.label(),
        progress: f32::from(session.step.number() - 1) / FormStep::ALL.len() as f32,
        steps,
        prompt: step_prompt(session.step),
        question,
        pending_error: session.pending_error.clone(),
        halted: session.halted.clone(),
        completion,
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::candidate::CandidateProfile;
use crate::models::report::{ReportWrite, ScreeningReport};

/// The eight screening steps, in order. Serialized as the 1-based step number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FormStep {
    FullName = 1,
    Email = 2,
    Phone = 3,
    Experience = 4,
    Position = 5,
    Location = 6,
    TechStack = 7,
    Questions = 8,
}

impl FormStep {
    pub const ALL: [FormStep; 8] = [
        FormStep::FullName,
        FormStep::Email,
        FormStep::Phone,
        FormStep::Experience,
        FormStep::Position,
        FormStep::Location,
        FormStep::TechStack,
        FormStep::Questions,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// The following step, or `None` from the terminal questions phase.
    pub fn next(self) -> Option<FormStep> {
        FormStep::try_from(self.number() + 1).ok()
    }

    pub fn label(self) -> &'static str {
        match self {
            FormStep::FullName => "Full Name",
            FormStep::Email => "Email Address",
            FormStep::Phone => "Phone Number",
            FormStep::Experience => "Years of Experience",
            FormStep::Position => "Desired Position(s)",
            FormStep::Location => "Current Location",
            FormStep::TechStack => "Tech Stack",
            FormStep::Questions => "Questions",
        }
    }
}

impl TryFrom<u8> for FormStep {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        FormStep::ALL
            .get(usize::from(value).wrapping_sub(1))
            .copied()
            .ok_or_else(|| format!("step must be between 1 and 8, got {value}"))
    }
}

impl From<FormStep> for u8 {
    fn from(step: FormStep) -> u8 {
        step.number()
    }
}

/// A misaligned answer held until the candidate overrides or resubmits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingAnswer {
    pub answer: String,
    pub score: Option<f64>,
}

/// All state for one candidate's run through the screening flow.
///
/// Invariant: `responses.len() == scores.len() == current_question_index`.
/// A misaligned answer lives in `pending_answer` until it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningSession {
    pub id: Uuid,
    pub step: FormStep,
    pub candidate: CandidateProfile,
    pub questions: Vec<String>,
    pub responses: Vec<String>,
    pub scores: Vec<Option<f64>>,
    pub current_question_index: usize,
    pub pending_error: Option<String>,
    pub pending_answer: Option<PendingAnswer>,
    /// Set when question generation failed. The session accepts no further transitions.
    pub halted: Option<String>,
    pub report: Option<ScreeningReport>,
    pub report_write: Option<ReportWrite>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScreeningSession {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            step: FormStep::FullName,
            candidate: CandidateProfile::default(),
            questions: Vec::new(),
            responses: Vec::new(),
            scores: Vec::new(),
            current_question_index: 0,
            pending_error: None,
            pending_answer: None,
            halted: None,
            report: None,
            report_write: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Discards all progress, keeping the session id.
    pub fn reset(&mut self) {
        let id = self.id;
        *self = Self::new();
        self.id = id;
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Whether every generated question has been answered.
    pub fn is_complete(&self) -> bool {
        self.step == FormStep::Questions
            && !self.questions.is_empty()
            && self.current_question_index >= self.questions.len()
    }

    pub fn current_question(&self) -> Option<&str> {
        if self.step != FormStep::Questions {
            return None;
        }
        self.questions
            .get(self.current_question_index)
            .map(String::as_str)
    }
}

impl Default for ScreeningSession {
    fn default() -> Self {
        Self::new()
    }
}

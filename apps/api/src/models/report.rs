use chrono::{DateTime, Utc};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

/// One answered question as it appears in the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
    pub answer: String,
    /// `None` means the answer could not be evaluated. It is not a zero score.
    pub score: Option<f64>,
}

/// Final screening artifact. Built once when the last question is answered, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningReport {
    /// Anonymized name digest used as the persisted record key.
    pub candidate_key: String,
    pub questions: Vec<QuestionRecord>,
    pub average_score: f64,
    pub completed_at: DateTime<Utc>,
}

impl ScreeningReport {
    /// The persisted record shape: `Q1..Qn` followed by `average_score`.
    pub fn record(&self) -> ReportRecord<'_> {
        ReportRecord(self)
    }
}

/// Serializes as `{"Q1": {question, answer, score}, ..., "average_score": n}`,
/// keeping question order in the output.
pub struct ReportRecord<'a>(&'a ScreeningReport);

impl Serialize for ReportRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let report = self.0;
        let mut map = serializer.serialize_map(Some(report.questions.len() + 1))?;
        for (i, entry) in report.questions.iter().enumerate() {
            map.serialize_entry(&format!("Q{}", i + 1), entry)?;
        }
        map.serialize_entry("average_score", &report.average_score)?;
        map.end()
    }
}

/// Outcome of the single persistence attempt for a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportWrite {
    Saved { location: String },
    Failed { message: String },
}

//! Session Recorder: builds and persists the final report once every question is answered.

use chrono::Utc;
use tracing::{info, warn};

use crate::models::report::{QuestionRecord, ReportWrite, ScreeningReport};
use crate::models::session::ScreeningSession;
use crate::storage::reports::ReportStore;

/// Record key used when the candidate's name digest is missing.
pub const UNKNOWN_CANDIDATE: &str = "unknown_candidate";

/// Mean of the non-null scores; 0.0 when there are none.
pub fn average_score(scores: &[Option<f64>]) -> f64 {
    let valid: Vec<f64> = scores.iter().flatten().copied().collect();
    if valid.is_empty() {
        0.0
    } else {
        valid.iter().sum::<f64>() / valid.len() as f64
    }
}

pub fn build_report(session: &ScreeningSession) -> ScreeningReport {
    let questions = session
        .questions
        .iter()
        .enumerate()
        .map(|(i, question)| QuestionRecord {
            question: question.clone(),
            answer: session.responses.get(i).cloned().unwrap_or_default(),
            score: session.scores.get(i).copied().flatten(),
        })
        .collect();

    ScreeningReport {
        candidate_key: session
            .candidate
            .name_hash
            .clone()
            .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string()),
        questions,
        average_score: average_score(&session.scores),
        completed_at: Utc::now(),
    }
}

/// Builds the report and makes the single write attempt, if the session is complete and
/// has not been finalized yet. Returns `true` when this call finalized the session.
///
/// A failed write is stored as `ReportWrite::Failed`; the in-memory report is kept either way.
pub async fn finalize(session: &mut ScreeningSession, store: &dyn ReportStore) -> bool {
    if session.report.is_some() || !session.is_complete() {
        return false;
    }

    let report = build_report(session);
    info!(
        "Screening complete for session {}: {} questions, average score {:.2}",
        session.id,
        report.questions.len(),
        report.average_score
    );

    let outcome = match store.write_record(&report.candidate_key, &report).await {
        Ok(location) => {
            info!("Screening report saved to {location}");
            ReportWrite::Saved { location }
        }
        Err(e) => {
            warn!("Failed to save screening report for session {}: {e}", session.id);
            ReportWrite::Failed {
                message: format!("Failed to save the report: {e}"),
            }
        }
    };

    session.report = Some(report);
    session.report_write = Some(outcome);
    true
}

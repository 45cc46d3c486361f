use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct SubmitTaskRequest {
    /// Free text or a URL pointing at the delivered work.
    pub task: String,
}

#[derive(Deserialize, utoipa::ToSchema)]
pub struct DeclareWinnerRequest {
    pub submission_id: i32,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct SubmissionResponse {
    pub id: i32,
    pub contest_id: i32,
    pub participant_name: String,
    pub participant_email: String,
    pub participant_photo: Option<String>,
    pub task: String,
    pub submitted_at: DateTime<Utc>,
    /// True once this submission has been declared the contest's winner.
    pub won: bool,
}

impl SubmissionResponse {
    pub fn from_model(m: crate::entity::submission::Model, winner_submission_id: Option<i32>) -> Self {
        Self {
            won: winner_submission_id == Some(m.id),
            id: m.id,
            contest_id: m.contest_id,
            participant_name: m.participant_name,
            participant_email: m.participant_email,
            participant_photo: m.participant_photo,
            task: m.task,
            submitted_at: m.submitted_at,
        }
    }
}

pub fn validate_submit_task(req: &SubmitTaskRequest) -> Result<(), AppError> {
    let task = req.task.trim();
    if task.is_empty() || task.len() > 100_000 {
        return Err(AppError::Validation(
            "Task must be non-empty and at most 100KB".into(),
        ));
    }
    Ok(())
}

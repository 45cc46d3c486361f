use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::domain::ContestStatus;
use crate::entity::{contest, registration, submission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::contest::ContestResponse;
use crate::models::submission::*;
use crate::state::AppState;

use super::contest::{find_contest, find_contest_for_update, participant_count};

#[utoipa::path(
    get,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "listContestSubmissions",
    summary = "List submissions for a contest",
    description = "Returns every submission for the contest, oldest first. Available to the contest's creator (`submission:view`) and to users with `contest:moderate`. An empty list is a normal 200 response.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "List of submissions", body = Vec<SubmissionResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(contest_id))]
pub async fn list_contest_submissions(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
) -> Result<Json<Vec<SubmissionResponse>>, AppError> {
    let contest_model = find_contest(&state.db, contest_id).await?;

    if !auth_user.has_permission("contest:moderate") {
        auth_user.require_permission("submission:view")?;
        if contest_model.creator_id != auth_user.user_id {
            return Err(AppError::PermissionDenied);
        }
    }

    let rows = submission::Entity::find()
        .filter(submission::Column::ContestId.eq(contest_id))
        .order_by_asc(submission::Column::SubmittedAt)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .map(|s| SubmissionResponse::from_model(s, contest_model.winner_submission_id))
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/{id}/submissions",
    tag = "Submissions",
    operation_id = "submitTask",
    summary = "Submit a task for a contest",
    description = "Submits the caller's work for a contest they have paid into. Requires `submission:submit` permission, a `Confirmed` contest, a registration, and a deadline that has not passed. A participant may submit at most once per contest; a duplicate returns 409.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = SubmitTaskRequest,
    responses(
        (status = 201, description = "Task submitted", body = SubmissionResponse),
        (status = 400, description = "Validation error or deadline passed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not registered for this contest (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already submitted or contest not open (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(contest_id, user_id = auth_user.user_id))]
pub async fn submit_task(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
    AppJson(payload): AppJson<SubmitTaskRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("submission:submit")?;
    validate_submit_task(&payload)?;

    let contest_model = find_contest(&state.db, contest_id).await?;

    if !contest_model.status.allows_participation() {
        return Err(AppError::Conflict(format!(
            "Contest is not open for submissions in status {}",
            contest_model.status
        )));
    }
    if chrono::Utc::now() >= contest_model.deadline {
        return Err(AppError::Validation("Contest deadline has passed".into()));
    }

    let is_registered = registration::Entity::find_by_id((contest_id, auth_user.user_id))
        .one(&state.db)
        .await?
        .is_some();
    if !is_registered {
        return Err(AppError::PermissionDenied);
    }

    // Snapshot the participant's identity so winner declaration and listings
    // survive later profile changes.
    let participant = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let new_submission = submission::ActiveModel {
        contest_id: Set(contest_id),
        user_id: Set(participant.id),
        participant_name: Set(participant.name),
        participant_email: Set(participant.email),
        participant_photo: Set(participant.photo_url),
        task: Set(payload.task.trim().to_string()),
        submitted_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match new_submission.insert(&state.db).await {
        Ok(model) => Ok((
            StatusCode::CREATED,
            Json(SubmissionResponse::from_model(
                model,
                contest_model.winner_submission_id,
            )),
        )),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("Already submitted for this contest".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    post,
    path = "/{id}/winner",
    tag = "Submissions",
    operation_id = "declareWinner",
    summary = "Declare a submission as the contest winner",
    description = "Irreversibly marks one submission as the contest's winner: the winner identity is copied from the submission's participant snapshot, the declaration is timestamped, and the contest moves `Confirmed -> Completed`. Requires `winner:declare` permission and contest ownership. Once a winner exists every further declaration for the contest fails with 409, including the loser of a concurrent race.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = DeclareWinnerRequest,
    responses(
        (status = 200, description = "Winner declared, contest completed", body = ContestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest or submission not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Winner already declared or contest not confirmed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(contest_id, submission_id = payload.submission_id))]
pub async fn declare_winner(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(contest_id): Path<i32>,
    AppJson(payload): AppJson<DeclareWinnerRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    auth_user.require_permission("winner:declare")?;

    let txn = state.db.begin().await?;

    // The row lock serializes concurrent declarations: whoever loses the race
    // re-reads the contest as Completed and fails the transition below.
    let existing = find_contest_for_update(&txn, contest_id).await?;

    if existing.creator_id != auth_user.user_id {
        return Err(AppError::PermissionDenied);
    }
    if existing.winner_submission_id.is_some() {
        return Err(AppError::Conflict("Winner already declared".into()));
    }

    let next = existing.status.transition(ContestStatus::Completed)?;

    let winning = submission::Entity::find_by_id(payload.submission_id)
        .filter(submission::Column::ContestId.eq(contest_id))
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Submission not found".into()))?;

    let mut active: contest::ActiveModel = existing.into();
    active.status = Set(next);
    active.winner_submission_id = Set(Some(winning.id));
    active.winner_name = Set(Some(winning.participant_name));
    active.winner_email = Set(Some(winning.participant_email));
    active.winner_photo = Set(winning.participant_photo);
    active.winner_declared_at = Set(Some(chrono::Utc::now()));
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        contest_id,
        submission_id = payload.submission_id,
        "Winner declared, contest completed"
    );

    let count = participant_count(&state.db, contest_id).await?;
    Ok(Json(ContestResponse::from_model(model, count)))
}

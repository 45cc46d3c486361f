use axum::Json;
use axum::extract::State;
use sea_orm::sea_query::{Alias, Query as SeaQuery};
use sea_orm::*;
use tracing::instrument;

use crate::domain::{ContestStatus, UserRole};
use crate::entity::payment_session::{self, PaymentStatus};
use crate::entity::{contest, registration, submission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::models::stats::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/admin",
    tag = "Stats",
    operation_id = "adminStats",
    summary = "Platform-wide statistics",
    description = "User, contest, submission, and payment totals for the admin dashboard. Requires `stats:admin` permission.",
    responses(
        (status = 200, description = "Platform statistics", body = AdminStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn admin_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<AdminStatsResponse>, AppError> {
    auth_user.require_permission("stats:admin")?;

    let db = &state.db;

    let total_users = user::Entity::find().count(db).await?;
    let total_creators = user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::ContestCreator))
        .count(db)
        .await?;
    let total_participants = user::Entity::find()
        .filter(user::Column::Role.eq(UserRole::Participant))
        .count(db)
        .await?;

    let by_status = contest_counts_by_status(db, None).await?;
    let total_submissions = submission::Entity::find().count(db).await?;

    let payment_volume: i64 = payment_session::Entity::find()
        .filter(payment_session::Column::Status.eq(PaymentStatus::Completed))
        .select_only()
        .column_as(
            payment_session::Column::Amount.sum().cast_as(Alias::new("BIGINT")),
            "volume",
        )
        .into_tuple::<Option<i64>>()
        .one(db)
        .await?
        .flatten()
        .unwrap_or(0);

    Ok(Json(AdminStatsResponse {
        total_users,
        total_creators,
        total_participants,
        pending_contests: by_status.pending,
        confirmed_contests: by_status.confirmed,
        rejected_contests: by_status.rejected,
        completed_contests: by_status.completed,
        total_submissions,
        payment_volume,
    }))
}

#[utoipa::path(
    get,
    path = "/creator",
    tag = "Stats",
    operation_id = "creatorStats",
    summary = "Statistics over the caller's contests",
    description = "Contest, submission, and winner totals scoped to contests the caller created. Requires `stats:creator` permission.",
    responses(
        (status = 200, description = "Creator statistics", body = CreatorStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn creator_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<CreatorStatsResponse>, AppError> {
    auth_user.require_permission("stats:creator")?;

    let db = &state.db;

    let by_status = contest_counts_by_status(db, Some(auth_user.user_id)).await?;
    let total_contests =
        by_status.pending + by_status.confirmed + by_status.rejected + by_status.completed;

    let total_submissions = submission::Entity::find()
        .filter(
            submission::Column::ContestId.in_subquery(
                SeaQuery::select()
                    .column(contest::Column::Id)
                    .from(contest::Entity)
                    .and_where(contest::Column::CreatorId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        )
        .count(db)
        .await?;

    Ok(Json(CreatorStatsResponse {
        total_contests,
        pending_contests: by_status.pending,
        confirmed_contests: by_status.confirmed,
        rejected_contests: by_status.rejected,
        completed_contests: by_status.completed,
        total_submissions,
        // A winner exists iff the contest completed.
        winners_declared: by_status.completed,
    }))
}

#[utoipa::path(
    get,
    path = "/me",
    tag = "Stats",
    operation_id = "participantStats",
    summary = "The caller's participation statistics",
    description = "Participation and win counts plus the won/participated percentage split. Requires `stats:participant` permission.",
    responses(
        (status = 200, description = "Participant statistics", body = ParticipantStatsResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn participant_stats(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<ParticipantStatsResponse>, AppError> {
    auth_user.require_permission("stats:participant")?;

    let db = &state.db;

    let participation_count = registration::Entity::find()
        .filter(registration::Column::UserId.eq(auth_user.user_id))
        .count(db)
        .await?;

    let win_count = contest::Entity::find()
        .filter(
            contest::Column::WinnerSubmissionId.in_subquery(
                SeaQuery::select()
                    .column(submission::Column::Id)
                    .from(submission::Entity)
                    .and_where(submission::Column::UserId.eq(auth_user.user_id))
                    .to_owned(),
            ),
        )
        .count(db)
        .await?;

    let (win_rate_percent, participated_percent) = win_percentages(participation_count, win_count);

    Ok(Json(ParticipantStatsResponse {
        participation_count,
        win_count,
        win_rate_percent,
        participated_percent,
    }))
}

struct StatusCounts {
    pending: u64,
    confirmed: u64,
    rejected: u64,
    completed: u64,
}

async fn contest_counts_by_status(
    db: &DatabaseConnection,
    creator_id: Option<i32>,
) -> Result<StatusCounts, AppError> {
    let mut counts = StatusCounts {
        pending: 0,
        confirmed: 0,
        rejected: 0,
        completed: 0,
    };

    for &status in ContestStatus::ALL {
        let mut select = contest::Entity::find().filter(contest::Column::Status.eq(status));
        if let Some(creator_id) = creator_id {
            select = select.filter(contest::Column::CreatorId.eq(creator_id));
        }
        let count = select.count(db).await?;
        match status {
            ContestStatus::Pending => counts.pending = count,
            ContestStatus::Confirmed => counts.confirmed = count,
            ContestStatus::Rejected => counts.rejected = count,
            ContestStatus::Completed => counts.completed = count,
        }
    }

    Ok(counts)
}

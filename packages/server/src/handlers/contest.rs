use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr};
use sea_orm::*;
use tracing::instrument;

use crate::domain::ContestStatus;
use crate::entity::{contest, payment_session, registration, submission, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::contest::*;
use crate::models::shared::{Pagination, escape_like};
use crate::state::AppState;

#[utoipa::path(
    post,
    path = "/",
    tag = "Contests",
    operation_id = "createContest",
    summary = "Create a new contest",
    description = "Creates a new contest in `Pending` status, owned by the caller. Requires `contest:create` permission. The creator identity snapshot is taken at creation and never changes.",
    request_body = CreateContestRequest,
    responses(
        (status = 201, description = "Contest created", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(name = %payload.name))]
pub async fn create_contest(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateContestRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("contest:create")?;
    validate_create_contest(&payload)?;

    // Snapshot the creator's current profile photo alongside the claims.
    let creator = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let now = chrono::Utc::now();
    let new_contest = contest::ActiveModel {
        name: Set(payload.name.trim().to_string()),
        description: Set(payload.description),
        category: Set(payload.category.trim().to_string()),
        image_url: Set(payload.image_url),
        entry_fee: Set(payload.entry_fee),
        prize_money: Set(payload.prize_money),
        capacity: Set(payload.capacity),
        deadline: Set(payload.deadline),
        status: Set(ContestStatus::Pending),
        creator_id: Set(creator.id),
        creator_name: Set(creator.name),
        creator_email: Set(creator.email),
        creator_photo: Set(creator.photo_url),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };

    let model = new_contest.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(ContestResponse::from_model(model, 0)),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Contests",
    operation_id = "listContests",
    summary = "List contests with pagination, search, and category filter",
    description = "Returns a paginated list of contests. Anonymous callers and regular users only see `Confirmed` and `Completed` contests; users with `contest:moderate` see every status. Supports sorting by `created_at`, `updated_at`, `deadline`, `prize_money`, or `name`.",
    params(ContestListQuery),
    responses(
        (status = 200, description = "List of contests", body = ContestListResponse),
        (status = 401, description = "Invalid token supplied (TOKEN_INVALID)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_contests(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Query(query): Query<ContestListQuery>,
) -> Result<Json<ContestListResponse>, AppError> {
    let is_moderator = auth_user
        .as_ref()
        .is_some_and(|u| u.has_permission("contest:moderate"));

    let mut select = contest::Entity::find();

    if !is_moderator {
        select = select.filter(
            contest::Column::Status
                .is_in([ContestStatus::Confirmed, ContestStatus::Completed]),
        );
    }

    if let Some(ref category) = query.category {
        let category = category.trim();
        if !category.is_empty() {
            select = select.filter(contest::Column::Category.eq(category));
        }
    }

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            select = select.filter(
                Expr::expr(Func::lower(Expr::col(contest::Column::Name)))
                    .like(LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\')),
            );
        }
    }

    paginate_contests(&state.db, select, &query).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/mine",
    tag = "Contests",
    operation_id = "listMyContests",
    summary = "List contests created by the caller",
    description = "The creator's inventory: every contest they created, at any status. Requires `contest:create` permission.",
    params(ContestListQuery),
    responses(
        (status = 200, description = "List of contests", body = ContestListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_my_contests(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ContestListQuery>,
) -> Result<Json<ContestListResponse>, AppError> {
    auth_user.require_permission("contest:create")?;

    let select =
        contest::Entity::find().filter(contest::Column::CreatorId.eq(auth_user.user_id));

    paginate_contests(&state.db, select, &query).await.map(Json)
}

#[utoipa::path(
    get,
    path = "/joined",
    tag = "Contests",
    operation_id = "listJoinedContests",
    summary = "List contests the caller has paid into",
    description = "Each entry carries the caller's registration and submission state for that contest, so a client can tell \"submit task\" apart from \"already submitted\" and mark wins. Requires `contest:join` permission.",
    responses(
        (status = 200, description = "Joined contests", body = Vec<JoinedContestResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn list_joined_contests(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<JoinedContestResponse>>, AppError> {
    auth_user.require_permission("contest:join")?;

    let rows = registration::Entity::find()
        .filter(registration::Column::UserId.eq(auth_user.user_id))
        .find_also_related(contest::Entity)
        .order_by_desc(registration::Column::PaidAt)
        .all(&state.db)
        .await?;

    let my_submissions: Vec<submission::Model> = submission::Entity::find()
        .filter(submission::Column::UserId.eq(auth_user.user_id))
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(reg, contest)| {
            let contest = contest?;
            let submission_id = my_submissions
                .iter()
                .find(|s| s.contest_id == contest.id)
                .map(|s| s.id);
            let won = submission_id.is_some() && contest.winner_submission_id == submission_id;
            Some(JoinedContestResponse {
                contest_id: contest.id,
                name: contest.name,
                category: contest.category,
                image_url: contest.image_url,
                prize_money: contest.prize_money,
                deadline: contest.deadline,
                status: contest.status,
                paid_at: reg.paid_at,
                amount_paid: reg.amount_paid,
                submission_id,
                won,
            })
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Contests",
    operation_id = "getContest",
    summary = "Get a contest by ID",
    description = "Returns the full details of a contest, including participant count and the winner once declared. `Pending` and `Rejected` contests are only visible to their creator and to users with `contest:moderate`; everyone else gets 404 (not 403) to prevent enumeration.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 200, description = "Contest details", body = ContestResponse),
        (status = 401, description = "Invalid token supplied (TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn get_contest(
    auth_user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<ContestResponse>, AppError> {
    let model = find_contest(&state.db, id).await?;
    check_contest_visibility(auth_user.as_ref(), &model)?;

    let count = participant_count(&state.db, id).await?;
    Ok(Json(ContestResponse::from_model(model, count)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Contests",
    operation_id = "updateContest",
    summary = "Update a pending contest",
    description = "Partially updates a contest using PATCH semantics. Only the contest's creator may edit, and only while the contest is still `Pending`; once moderated the contest is immutable to its creator. An empty payload returns the current resource unchanged.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = UpdateContestRequest,
    responses(
        (status = 200, description = "Contest updated", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Contest is no longer pending (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id))]
pub async fn update_contest(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateContestRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    auth_user.require_permission("contest:create")?;
    validate_update_contest(&payload)?;

    if payload == UpdateContestRequest::default() {
        let existing = find_contest(&state.db, id).await?;
        require_creator_ownership(&auth_user, &existing)?;
        let count = participant_count(&state.db, id).await?;
        return Ok(Json(ContestResponse::from_model(existing, count)));
    }

    let txn = state.db.begin().await?;
    let existing = find_contest_for_update(&txn, id).await?;
    require_creator_ownership(&auth_user, &existing)?;

    if !existing.status.allows_creator_changes() {
        return Err(AppError::Conflict(format!(
            "Contest can no longer be edited in status {}",
            existing.status
        )));
    }

    let mut active: contest::ActiveModel = existing.into();

    if let Some(ref name) = payload.name {
        active.name = Set(name.trim().to_string());
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }
    if let Some(ref category) = payload.category {
        active.category = Set(category.trim().to_string());
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(entry_fee) = payload.entry_fee {
        active.entry_fee = Set(entry_fee);
    }
    if let Some(prize_money) = payload.prize_money {
        active.prize_money = Set(prize_money);
    }
    if let Some(capacity) = payload.capacity {
        active.capacity = Set(capacity);
    }
    if let Some(deadline) = payload.deadline {
        active.deadline = Set(deadline);
    }
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(ContestResponse::from_model(model, 0)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Contests",
    operation_id = "deleteContest",
    summary = "Delete a contest",
    description = "Permanently deletes a contest and cascade-deletes its registrations, submissions, and payment sessions. The creator may delete their own contest only while it is `Pending`; users with `contest:delete` (admins) may delete at any status.",
    params(("id" = i32, Path, description = "Contest ID")),
    responses(
        (status = 204, description = "Contest deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Creator delete on a non-pending contest (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn delete_contest(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;
    let existing = find_contest_for_update(&txn, id).await?;

    if !auth_user.has_permission("contest:delete") {
        // Creator path: own contest, still pending.
        auth_user.require_permission("contest:create")?;
        require_creator_ownership(&auth_user, &existing)?;
        if !existing.status.allows_creator_changes() {
            return Err(AppError::Conflict(format!(
                "Contest can no longer be deleted in status {}",
                existing.status
            )));
        }
    }

    submission::Entity::delete_many()
        .filter(submission::Column::ContestId.eq(id))
        .exec(&txn)
        .await?;
    registration::Entity::delete_many()
        .filter(registration::Column::ContestId.eq(id))
        .exec(&txn)
        .await?;
    payment_session::Entity::delete_many()
        .filter(payment_session::Column::ContestId.eq(id))
        .exec(&txn)
        .await?;
    contest::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    patch,
    path = "/{id}/status",
    tag = "Contests",
    operation_id = "updateContestStatus",
    summary = "Confirm or reject a pending contest",
    description = "Admin moderation verdict. Requires `contest:moderate` permission. Only `Pending` contests can be moderated; the only accepted targets are `Confirmed` and `Rejected` (`Completed` is reachable exclusively through winner declaration). An illegal transition returns 409.",
    params(("id" = i32, Path, description = "Contest ID")),
    request_body = UpdateContestStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = ContestResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Illegal status transition (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, target = %payload.status))]
pub async fn update_contest_status(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateContestStatusRequest>,
) -> Result<Json<ContestResponse>, AppError> {
    auth_user.require_permission("contest:moderate")?;

    if !matches!(
        payload.status,
        ContestStatus::Confirmed | ContestStatus::Rejected
    ) {
        return Err(AppError::Validation(
            "status must be Confirmed or Rejected".into(),
        ));
    }

    let txn = state.db.begin().await?;
    let existing = find_contest_for_update(&txn, id).await?;

    let next = existing.status.transition(payload.status)?;

    let mut active: contest::ActiveModel = existing.into();
    active.status = Set(next);
    active.updated_at = Set(chrono::Utc::now());

    let model = active.update(&txn).await?;
    txn.commit().await?;

    let count = participant_count(&state.db, id).await?;
    Ok(Json(ContestResponse::from_model(model, count)))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Visibility rule shared by detail lookups: moderated-in contests are public,
/// everything else exists only for its creator and moderators.
fn check_contest_visibility(
    auth_user: Option<&AuthUser>,
    contest: &contest::Model,
) -> Result<(), AppError> {
    if matches!(
        contest.status,
        ContestStatus::Confirmed | ContestStatus::Completed
    ) {
        return Ok(());
    }
    if let Some(user) = auth_user {
        if user.has_permission("contest:moderate") || user.user_id == contest.creator_id {
            return Ok(());
        }
    }
    Err(AppError::NotFound("Contest not found".into()))
}

fn require_creator_ownership(
    auth_user: &AuthUser,
    contest: &contest::Model,
) -> Result<(), AppError> {
    if contest.creator_id == auth_user.user_id {
        Ok(())
    } else {
        Err(AppError::PermissionDenied)
    }
}

pub(crate) async fn find_contest<C: ConnectionTrait>(
    db: &C,
    id: i32,
) -> Result<contest::Model, AppError> {
    contest::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Contest not found".into()))
}

pub(crate) async fn find_contest_for_update(
    txn: &DatabaseTransaction,
    id: i32,
) -> Result<contest::Model, AppError> {
    use sea_orm::sea_query::LockType;
    contest::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Contest not found".into()))
}

pub(crate) async fn participant_count<C: ConnectionTrait>(
    db: &C,
    contest_id: i32,
) -> Result<u64, AppError> {
    Ok(registration::Entity::find()
        .filter(registration::Column::ContestId.eq(contest_id))
        .count(db)
        .await?)
}

async fn paginate_contests<C: ConnectionTrait>(
    db: &C,
    select: Select<contest::Entity>,
    query: &ContestListQuery,
) -> Result<ContestListResponse, AppError> {
    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let sort_by = query.sort_by.as_deref().unwrap_or("created_at");
    let sort_order = if query.sort_order.as_deref() == Some("asc") {
        Order::Asc
    } else {
        Order::Desc
    };
    let sort_column = match sort_by {
        "created_at" => contest::Column::CreatedAt,
        "updated_at" => contest::Column::UpdatedAt,
        "deadline" => contest::Column::Deadline,
        "prize_money" => contest::Column::PrizeMoney,
        "name" => contest::Column::Name,
        _ => {
            return Err(AppError::Validation(
                "sort_by must be one of: created_at, updated_at, deadline, prize_money, name"
                    .into(),
            ));
        }
    };

    let total = select.clone().count(db).await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by(sort_column, sort_order)
        .select_only()
        .column(contest::Column::Id)
        .column(contest::Column::Name)
        .column(contest::Column::Category)
        .column(contest::Column::ImageUrl)
        .column(contest::Column::EntryFee)
        .column(contest::Column::PrizeMoney)
        .column(contest::Column::Capacity)
        .column(contest::Column::Deadline)
        .column(contest::Column::Status)
        .column(contest::Column::CreatorName)
        .column(contest::Column::CreatedAt)
        .column(contest::Column::UpdatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .into_model::<ContestListItem>()
        .all(db)
        .await?;

    Ok(ContestListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    })
}

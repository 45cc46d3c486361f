use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, LikeExpr, LockType};
use sea_orm::*;
use tracing::instrument;

use crate::domain::UserRole;
use crate::entity::{creator_request, user};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::shared::{Pagination, escape_like};
use crate::models::user::*;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Users",
    operation_id = "listUsers",
    summary = "List users with pagination and search",
    description = "Admin user management listing. Requires `user:manage` permission. Search matches name or email, case-insensitively.",
    params(UserListQuery),
    responses(
        (status = 200, description = "List of users", body = UserListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query))]
pub async fn list_users(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<UserListQuery>,
) -> Result<Json<UserListResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let page = Ord::max(query.page.unwrap_or(1), 1);
    let per_page = query.per_page.unwrap_or(20).clamp(1, 100);

    let mut select = user::Entity::find();

    if let Some(ref search) = query.search {
        let term = escape_like(search.trim());
        if !term.is_empty() {
            let pattern = LikeExpr::new(format!("%{}%", term.to_lowercase())).escape('\\');
            select = select.filter(
                Condition::any()
                    .add(
                        Expr::expr(Func::lower(Expr::col(user::Column::Name)))
                            .like(pattern.clone()),
                    )
                    .add(Expr::expr(Func::lower(Expr::col(user::Column::Email))).like(pattern)),
            );
        }
    }

    let total = select.clone().count(&state.db).await?;
    let total_pages = total.div_ceil(per_page);

    let data = select
        .order_by_asc(user::Column::CreatedAt)
        .offset(Some((page - 1) * per_page))
        .limit(Some(per_page))
        .all(&state.db)
        .await?
        .into_iter()
        .map(UserResponse::from)
        .collect();

    Ok(Json(UserListResponse {
        data,
        pagination: Pagination {
            page,
            per_page,
            total,
            total_pages,
        },
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}/role",
    tag = "Users",
    operation_id = "updateUserRole",
    summary = "Change a user's role",
    description = "Admin role assignment. Requires `user:manage` permission. Any pending creator request of the target user is consumed by the change, whatever the new role.",
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateRoleRequest,
    responses(
        (status = 200, description = "Role updated", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "User not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, role = %payload.role))]
pub async fn update_user_role(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("user:manage")?;

    let txn = state.db.begin().await?;

    let target = user::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: user::ActiveModel = target.into();
    active.role = Set(payload.role);
    let model = active.update(&txn).await?;

    creator_request::Entity::delete_many()
        .filter(creator_request::Column::UserId.eq(id))
        .exec(&txn)
        .await?;

    txn.commit().await?;

    Ok(Json(UserResponse::from(model)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Creator Requests",
    operation_id = "createCreatorRequest",
    summary = "Request an upgrade to contest creator",
    description = "Files the caller's request to become a contest creator, to be resolved by an admin. Requires `creator-request:create` permission. At most one pending request per user; a duplicate returns 409.",
    responses(
        (status = 201, description = "Request filed", body = CreatorRequestResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 409, description = "Request already pending (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(user_id = auth_user.user_id))]
pub async fn create_creator_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("creator-request:create")?;

    let requester = user::Entity::find_by_id(auth_user.user_id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let new_request = creator_request::ActiveModel {
        user_id: Set(auth_user.user_id),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    match new_request.insert(&state.db).await {
        Ok(model) => Ok((
            StatusCode::CREATED,
            Json(CreatorRequestResponse {
                id: model.id,
                user_id: model.user_id,
                name: requester.name,
                email: requester.email,
                photo_url: requester.photo_url,
                requested_at: model.created_at,
            }),
        )),
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => Err(
            AppError::Conflict("A creator request is already pending".into()),
        ),
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Creator Requests",
    operation_id = "listCreatorRequests",
    summary = "List pending creator requests",
    description = "Returns all pending creator-upgrade requests with requester identities, oldest first. Requires `creator-request:manage` permission.",
    responses(
        (status = 200, description = "Pending requests", body = Vec<CreatorRequestResponse>),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user))]
pub async fn list_creator_requests(
    auth_user: AuthUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<CreatorRequestResponse>>, AppError> {
    auth_user.require_permission("creator-request:manage")?;

    let rows = creator_request::Entity::find()
        .find_also_related(user::Entity)
        .order_by_asc(creator_request::Column::CreatedAt)
        .all(&state.db)
        .await?;

    let items = rows
        .into_iter()
        .filter_map(|(req, requester)| {
            let requester = requester?;
            Some(CreatorRequestResponse {
                id: req.id,
                user_id: req.user_id,
                name: requester.name,
                email: requester.email,
                photo_url: requester.photo_url,
                requested_at: req.created_at,
            })
        })
        .collect();

    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/{id}/approve",
    tag = "Creator Requests",
    operation_id = "approveCreatorRequest",
    summary = "Approve a creator request",
    description = "Flips the requester's role to `contest_creator` and consumes the request, in one transaction. Requires `creator-request:manage` permission.",
    params(("id" = i32, Path, description = "Creator request ID")),
    responses(
        (status = 200, description = "Request approved, role updated", body = UserResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn approve_creator_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<UserResponse>, AppError> {
    auth_user.require_permission("creator-request:manage")?;

    let txn = state.db.begin().await?;

    let request = creator_request::Entity::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator request not found".into()))?;

    let target = user::Entity::find_by_id(request.user_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let mut active: user::ActiveModel = target.into();
    active.role = Set(UserRole::ContestCreator);
    let model = active.update(&txn).await?;

    let request: creator_request::ActiveModel = request.into();
    request.delete(&txn).await?;

    txn.commit().await?;

    Ok(Json(UserResponse::from(model)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Creator Requests",
    operation_id = "dismissCreatorRequest",
    summary = "Dismiss a creator request",
    description = "Removes a pending request without changing the requester's role. Requires `creator-request:manage` permission.",
    params(("id" = i32, Path, description = "Creator request ID")),
    responses(
        (status = 204, description = "Request dismissed"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Request not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id))]
pub async fn dismiss_creator_request(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("creator-request:manage")?;

    let request = creator_request::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Creator request not found".into()))?;

    let active: creator_request::ActiveModel = request.into();
    active.delete(&state.db).await?;

    Ok(StatusCode::NO_CONTENT)
}

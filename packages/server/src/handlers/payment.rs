use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::Duration;
use sea_orm::sea_query::LockType;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;

use crate::entity::payment_session::{self, PaymentStatus};
use crate::entity::registration;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::payment::*;
use crate::state::AppState;

use super::contest::{find_contest, find_contest_for_update, participant_count};

#[utoipa::path(
    post,
    path = "/checkout",
    tag = "Payments",
    operation_id = "createCheckoutSession",
    summary = "Create a checkout session for a contest entry fee",
    description = "Opens a checkout session for the caller to pay a contest's entry fee. Requires `contest:join` permission and a `Confirmed` contest that is before its deadline, not full, and not already joined by the caller. The entry fee is captured into the session at creation.",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Checkout session created", body = CheckoutResponse),
        (status = 400, description = "Deadline passed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Contest not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already joined, full, or not open (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(contest_id = payload.contest_id, user_id = auth_user.user_id))]
pub async fn create_checkout_session(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CheckoutRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("contest:join")?;

    let contest_model = find_contest(&state.db, payload.contest_id).await?;
    check_joinable(&state.db, &contest_model, auth_user.user_id).await?;

    let new_session = payment_session::ActiveModel {
        id: Set(Uuid::new_v4()),
        contest_id: Set(contest_model.id),
        user_id: Set(auth_user.user_id),
        amount: Set(contest_model.entry_fee),
        status: Set(PaymentStatus::Pending),
        created_at: Set(chrono::Utc::now()),
        completed_at: Set(None),
    };

    let model = new_session.insert(&state.db).await?;

    Ok((StatusCode::CREATED, Json(CheckoutResponse::from(model))))
}

#[utoipa::path(
    post,
    path = "/{session_id}/complete",
    tag = "Payments",
    operation_id = "completePayment",
    summary = "Record a successful payment and register the payer",
    description = "Marks a pending checkout session as completed and enrolls the payer as a contest participant, atomically. All join preconditions are re-validated under a row lock, so a contest that filled up or closed since checkout rejects the completion. A session can only be completed once.",
    params(("session_id" = Uuid, Path, description = "Checkout session ID")),
    responses(
        (status = 201, description = "Payment recorded, registration created", body = RegistrationResponse),
        (status = 400, description = "Session expired or deadline passed (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Session not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Already completed, already joined, or contest closed (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(session_id = %session_id, user_id = auth_user.user_id))]
pub async fn complete_payment(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_permission("contest:join")?;

    let txn = state.db.begin().await?;

    let session = payment_session::Entity::find_by_id(session_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?
        // 404 for other users' sessions to prevent enumeration.
        .filter(|s| s.user_id == auth_user.user_id)
        .ok_or_else(|| AppError::NotFound("Checkout session not found".into()))?;

    if session.status == PaymentStatus::Completed {
        return Err(AppError::Conflict("Payment already recorded".into()));
    }

    let ttl = state.config.payment.session_ttl_minutes;
    if ttl > 0 && chrono::Utc::now() > session.created_at + Duration::minutes(ttl as i64) {
        return Err(AppError::Validation("Checkout session has expired".into()));
    }

    let contest_model = find_contest_for_update(&txn, session.contest_id).await?;
    check_joinable(&txn, &contest_model, auth_user.user_id).await?;

    let now = chrono::Utc::now();
    let new_registration = registration::ActiveModel {
        contest_id: Set(session.contest_id),
        user_id: Set(session.user_id),
        amount_paid: Set(session.amount),
        paid_at: Set(now),
    };

    let reg = match new_registration.insert(&txn).await {
        Ok(model) => model,
        Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
            return Err(AppError::Conflict("Already joined this contest".into()));
        }
        Err(e) => return Err(e.into()),
    };

    let mut active: payment_session::ActiveModel = session.into();
    active.status = Set(PaymentStatus::Completed);
    active.completed_at = Set(Some(now));
    active.update(&txn).await?;

    txn.commit().await?;

    tracing::info!(
        contest_id = reg.contest_id,
        user_id = reg.user_id,
        amount = reg.amount_paid,
        "Payment recorded, participant registered"
    );

    Ok((StatusCode::CREATED, Json(RegistrationResponse::from(reg))))
}

/// Join preconditions, checked at checkout and re-checked at completion.
async fn check_joinable<C: ConnectionTrait>(
    db: &C,
    contest: &crate::entity::contest::Model,
    user_id: i32,
) -> Result<(), AppError> {
    if !contest.status.allows_participation() {
        return Err(AppError::Conflict(format!(
            "Contest is not open for registration in status {}",
            contest.status
        )));
    }
    if chrono::Utc::now() >= contest.deadline {
        return Err(AppError::Validation("Contest deadline has passed".into()));
    }

    let already_joined = registration::Entity::find_by_id((contest.id, user_id))
        .one(db)
        .await?
        .is_some();
    if already_joined {
        return Err(AppError::Conflict("Already joined this contest".into()));
    }

    let count = participant_count(db, contest.id).await?;
    if count >= contest.capacity as u64 {
        return Err(AppError::Conflict("Contest is full".into()));
    }

    Ok(())
}

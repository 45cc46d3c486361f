use chrono::{DateTime, Utc};
use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

use super::shared::{
    Pagination, validate_amount, validate_capacity, validate_description, validate_name,
};
use crate::domain::ContestStatus;
use crate::error::AppError;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CreateContestRequest {
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    /// Entry fee in minor currency units.
    pub entry_fee: i64,
    /// Prize money in minor currency units.
    pub prize_money: i64,
    pub capacity: i32,
    pub deadline: DateTime<Utc>,
}

#[derive(Deserialize, Default, PartialEq, utoipa::ToSchema)]
pub struct UpdateContestRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
    pub entry_fee: Option<i64>,
    pub prize_money: Option<i64>,
    pub capacity: Option<i32>,
    pub deadline: Option<DateTime<Utc>>,
}

/// Admin moderation verdict for a pending contest.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct UpdateContestStatusRequest {
    /// Either `Confirmed` or `Rejected`.
    pub status: ContestStatus,
}

#[derive(Deserialize, utoipa::IntoParams)]
pub struct ContestListQuery {
    pub page: Option<u64>,
    pub per_page: Option<u64>,
    /// Case-insensitive substring match on the contest name.
    pub search: Option<String>,
    pub category: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

// ---------------------------------------------------------------------------
// Response DTOs
// ---------------------------------------------------------------------------

/// Winner record, present only once the contest is `Completed`.
#[derive(Serialize, utoipa::ToSchema)]
pub struct WinnerInfo {
    pub submission_id: i32,
    pub name: String,
    pub email: String,
    pub photo_url: Option<String>,
    pub declared_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestResponse {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub image_url: String,
    pub entry_fee: i64,
    pub prize_money: i64,
    pub capacity: i32,
    pub deadline: DateTime<Utc>,
    pub status: ContestStatus,
    pub creator_name: String,
    pub creator_email: String,
    pub creator_photo: Option<String>,
    pub participant_count: u64,
    pub winner: Option<WinnerInfo>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl WinnerInfo {
    /// Assemble a winner record from the contest's nullable winner columns.
    /// Returns `None` unless every required field is present.
    pub fn from_parts(
        submission_id: Option<i32>,
        name: Option<String>,
        email: Option<String>,
        photo_url: Option<String>,
        declared_at: Option<DateTime<Utc>>,
    ) -> Option<Self> {
        match (submission_id, name, email, declared_at) {
            (Some(submission_id), Some(name), Some(email), Some(declared_at)) => Some(WinnerInfo {
                submission_id,
                name,
                email,
                photo_url,
                declared_at,
            }),
            _ => None,
        }
    }
}

impl ContestResponse {
    pub fn from_model(m: crate::entity::contest::Model, participant_count: u64) -> Self {
        let winner = WinnerInfo::from_parts(
            m.winner_submission_id,
            m.winner_name,
            m.winner_email,
            m.winner_photo,
            m.winner_declared_at,
        );

        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category: m.category,
            image_url: m.image_url,
            entry_fee: m.entry_fee,
            prize_money: m.prize_money,
            capacity: m.capacity,
            deadline: m.deadline,
            status: m.status,
            creator_name: m.creator_name,
            creator_email: m.creator_email,
            creator_photo: m.creator_photo,
            participant_count,
            winner,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

#[derive(Serialize, FromQueryResult, utoipa::ToSchema)]
pub struct ContestListItem {
    pub id: i32,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub entry_fee: i64,
    pub prize_money: i64,
    pub capacity: i32,
    pub deadline: DateTime<Utc>,
    pub status: ContestStatus,
    pub creator_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, utoipa::ToSchema)]
pub struct ContestListResponse {
    pub data: Vec<ContestListItem>,
    pub pagination: Pagination,
}

/// A contest the caller has paid into, with their own progress in it.
/// Drives the participant dashboard: no submission yet means the task is
/// still open, `won` marks a winning entry.
#[derive(Serialize, utoipa::ToSchema)]
pub struct JoinedContestResponse {
    pub contest_id: i32,
    pub name: String,
    pub category: String,
    pub image_url: String,
    pub prize_money: i64,
    pub deadline: DateTime<Utc>,
    pub status: ContestStatus,
    pub paid_at: DateTime<Utc>,
    pub amount_paid: i64,
    pub submission_id: Option<i32>,
    pub won: bool,
}

pub fn validate_create_contest(req: &CreateContestRequest) -> Result<(), AppError> {
    validate_name(&req.name)?;
    validate_description(&req.description)?;
    validate_category(&req.category)?;
    validate_amount(req.entry_fee, "entry_fee")?;
    validate_amount(req.prize_money, "prize_money")?;
    validate_capacity(req.capacity)?;
    if req.deadline <= Utc::now() {
        return Err(AppError::Validation(
            "deadline must be in the future".into(),
        ));
    }
    Ok(())
}

pub fn validate_update_contest(req: &UpdateContestRequest) -> Result<(), AppError> {
    if let Some(ref name) = req.name {
        validate_name(name)?;
    }
    if let Some(ref description) = req.description {
        validate_description(description)?;
    }
    if let Some(ref category) = req.category {
        validate_category(category)?;
    }
    if let Some(entry_fee) = req.entry_fee {
        validate_amount(entry_fee, "entry_fee")?;
    }
    if let Some(prize_money) = req.prize_money {
        validate_amount(prize_money, "prize_money")?;
    }
    if let Some(capacity) = req.capacity {
        validate_capacity(capacity)?;
    }
    if let Some(deadline) = req.deadline
        && deadline <= Utc::now()
    {
        return Err(AppError::Validation(
            "deadline must be in the future".into(),
        ));
    }
    Ok(())
}

fn validate_category(category: &str) -> Result<(), AppError> {
    let category = category.trim();
    if category.is_empty() || category.chars().count() > 64 {
        return Err(AppError::Validation(
            "Category must be 1-64 characters".into(),
        ));
    }
    Ok(())
}

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::domain::ContestStatus;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contest")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    pub description: String, // in Markdown
    pub category: String,
    pub image_url: String,

    /// Entry fee and prize money in minor currency units.
    pub entry_fee: i64,
    pub prize_money: i64,
    /// Maximum number of paying participants.
    pub capacity: i32,
    pub deadline: DateTimeUtc,

    pub status: ContestStatus,

    pub creator_id: i32,
    #[sea_orm(belongs_to, from = "creator_id", to = "id", relation_enum = "Creator")]
    pub creator: HasOne<super::user::Entity>,
    /// Creator identity snapshot, immutable after creation.
    pub creator_name: String,
    pub creator_email: String,
    pub creator_photo: Option<String>,

    /// Winner fields are all set iff `status == Completed`.
    pub winner_submission_id: Option<i32>,
    pub winner_name: Option<String>,
    pub winner_email: Option<String>,
    pub winner_photo: Option<String>,
    pub winner_declared_at: Option<DateTimeUtc>,

    #[sea_orm(has_many, via = "registration", relation_enum = "Participants")]
    pub participants: HasMany<super::user::Entity>,

    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}

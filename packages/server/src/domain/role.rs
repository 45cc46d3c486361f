use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The role assigned to newly registered users.
pub const DEFAULT_ROLE: UserRole = UserRole::Participant;

/// Closed set of user roles.
///
/// `Participant` is the default. `ContestCreator` is granted through an
/// admin-approved creator request (or directly by an admin). `Admin` is only
/// ever assigned by another admin.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    utoipa::ToSchema,
    sea_orm::DeriveActiveEnum,
    sea_orm::EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    #[sea_orm(string_value = "participant")]
    Participant,
    #[sea_orm(string_value = "contest_creator")]
    ContestCreator,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl UserRole {
    /// All role values.
    pub const ALL: &'static [UserRole] = &[Self::Participant, Self::ContestCreator, Self::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Participant => "participant",
            Self::ContestCreator => "contest_creator",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for UserRole {
    fn default() -> Self {
        DEFAULT_ROLE
    }
}

/// Error when parsing an invalid role string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseRoleError {
    invalid: String,
}

impl fmt::Display for ParseRoleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid role '{}'. Valid values: {}",
            self.invalid,
            UserRole::ALL
                .iter()
                .map(|r| r.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseRoleError {}

impl FromStr for UserRole {
    type Err = ParseRoleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "participant" => Ok(Self::Participant),
            "contest_creator" => Ok(Self::ContestCreator),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseRoleError {
                invalid: s.to_string(),
            }),
        }
    }
}

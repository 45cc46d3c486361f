use sea_orm::prelude::StringLen;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of a contest.
///
/// A contest starts `Pending` and is confirmed or rejected by an admin.
/// Declaring a winner moves a confirmed contest to `Completed`. `Rejected`
/// and `Completed` are terminal.
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
#[serde(rename_all = "PascalCase")]
pub enum ContestStatus {
    /// Created by a contest creator, awaiting admin moderation.
    #[sea_orm(string_value = "Pending")]
    Pending,
    /// Approved by an admin; open for registration and submissions.
    #[sea_orm(string_value = "Confirmed")]
    Confirmed,
    /// Rejected by an admin. Terminal.
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    /// A winner has been declared. Terminal.
    #[sea_orm(string_value = "Completed")]
    Completed,
}

/// Attempted status change that the lifecycle does not allow.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot transition contest from {from} to {to}")]
pub struct TransitionError {
    pub from: ContestStatus,
    pub to: ContestStatus,
}

impl ContestStatus {
    /// Validate a status change against the lifecycle.
    ///
    /// The winner path (`Confirmed -> Completed`) is included here even
    /// though handlers only reach it through winner declaration.
    pub fn transition(self, to: ContestStatus) -> Result<ContestStatus, TransitionError> {
        use ContestStatus::*;
        match (self, to) {
            (Pending, Confirmed) | (Pending, Rejected) | (Confirmed, Completed) => Ok(to),
            (from, to) => Err(TransitionError { from, to }),
        }
    }

    /// Returns true if no further transitions are possible.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Completed)
    }

    /// Creator-side edit and delete are allowed only before moderation.
    pub fn allows_creator_changes(&self) -> bool {
        matches!(self, Self::Pending)
    }

    /// Registration (paying the entry fee) and task submission require a
    /// confirmed, not-yet-completed contest.
    pub fn allows_participation(&self) -> bool {
        matches!(self, Self::Confirmed)
    }

    /// All possible status values.
    pub const ALL: &'static [ContestStatus] =
        &[Self::Pending, Self::Confirmed, Self::Rejected, Self::Completed];

    /// Returns the string representation (PascalCase).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Rejected => "Rejected",
            Self::Completed => "Completed",
        }
    }
}

impl fmt::Display for ContestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Default for ContestStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            ContestStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for ContestStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(Self::Pending),
            "Confirmed" => Ok(Self::Confirmed),
            "Rejected" => Ok(Self::Rejected),
            "Completed" => Ok(Self::Completed),
            _ => Err(ParseStatusError {
                invalid: s.to_string(),
            }),
        }
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entity::payment_session::PaymentStatus;

#[derive(Deserialize, utoipa::ToSchema)]
pub struct CheckoutRequest {
    pub contest_id: i32,
}

/// A created checkout session. The client hands `session_id` to the external
/// gateway and reports success back via the completion endpoint.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CheckoutResponse {
    pub session_id: Uuid,
    pub contest_id: i32,
    /// Entry fee captured at session creation, in minor units.
    pub amount: i64,
    pub status: PaymentStatus,
}

impl From<crate::entity::payment_session::Model> for CheckoutResponse {
    fn from(m: crate::entity::payment_session::Model) -> Self {
        Self {
            session_id: m.id,
            contest_id: m.contest_id,
            amount: m.amount,
            status: m.status,
        }
    }
}

/// The registration created by a completed payment.
#[derive(Serialize, utoipa::ToSchema)]
pub struct RegistrationResponse {
    pub contest_id: i32,
    pub user_id: i32,
    pub amount_paid: i64,
    pub paid_at: DateTime<Utc>,
}

impl From<crate::entity::registration::Model> for RegistrationResponse {
    fn from(m: crate::entity::registration::Model) -> Self {
        Self {
            contest_id: m.contest_id,
            user_id: m.user_id,
            amount_paid: m.amount_paid,
            paid_at: m.paid_at,
        }
    }
}

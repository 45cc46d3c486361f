use serde::Serialize;

/// Platform-wide totals for the admin dashboard.
#[derive(Serialize, utoipa::ToSchema)]
pub struct AdminStatsResponse {
    pub total_users: u64,
    pub total_creators: u64,
    pub total_participants: u64,
    pub pending_contests: u64,
    pub confirmed_contests: u64,
    pub rejected_contests: u64,
    pub completed_contests: u64,
    pub total_submissions: u64,
    /// Sum of all completed payments, in minor units.
    pub payment_volume: i64,
}

/// Totals over the caller's own contests.
#[derive(Serialize, utoipa::ToSchema)]
pub struct CreatorStatsResponse {
    pub total_contests: u64,
    pub pending_contests: u64,
    pub confirmed_contests: u64,
    pub rejected_contests: u64,
    pub completed_contests: u64,
    pub total_submissions: u64,
    pub winners_declared: u64,
}

/// The caller's participation record.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ParticipantStatsResponse {
    pub participation_count: u64,
    pub win_count: u64,
    /// `win_count / participation_count * 100`, one decimal place.
    pub win_rate_percent: f64,
    /// Remainder of the split: `100 - win_rate_percent`.
    pub participated_percent: f64,
}

/// Split a participation record into won / participated percentages.
///
/// Zero participations reads as a 0/100 split rather than a division error.
pub fn win_percentages(participation_count: u64, win_count: u64) -> (f64, f64) {
    if participation_count == 0 {
        return (0.0, 100.0);
    }
    let won = round1(win_count as f64 / participation_count as f64 * 100.0);
    (won, round1(100.0 - won))
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

use serde_json::json;

use crate::common::{TestApp, routes};
use server::domain::UserRole;

/// Set up two confirmed contests by the same creator, both joined by the
/// participant, who wins the first. Returns (app, creator, admin, participant).
async fn platform_with_history() -> (TestApp, String, String, String) {
    let app = TestApp::spawn().await;
    let creator = app
        .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
        .await;
    let admin = app
        .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
        .await;
    let participant = app
        .create_authenticated_user("pat@example.com", "pass12345")
        .await;

    let won = app.create_contest(&creator, "Won This One").await;
    app.set_contest_status(&admin, won, "Confirmed").await;
    app.join_contest(&participant, won).await;
    let winning = app.submit_task(&participant, won, "winning entry").await;
    let res = app
        .post_with_token(
            &routes::contest_winner(won),
            &json!({ "submission_id": winning }),
            &creator,
        )
        .await;
    assert_eq!(res.status, 200, "declare failed: {}", res.text);

    let lost = app.create_contest(&creator, "Still Running").await;
    app.set_contest_status(&admin, lost, "Confirmed").await;
    app.join_contest(&participant, lost).await;

    (app, creator, admin, participant)
}

mod participant_stats {
    use super::*;

    #[tokio::test]
    async fn win_rate_splits_the_percentages() {
        let (app, _creator, _admin, participant) = platform_with_history().await;

        let res = app.get_with_token(routes::STATS_ME, &participant).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["participation_count"], 2);
        assert_eq!(res.body["win_count"], 1);
        assert_eq!(res.body["win_rate_percent"], 50.0);
        assert_eq!(res.body["participated_percent"], 50.0);
    }

    #[tokio::test]
    async fn fresh_participant_has_a_zero_hundred_split() {
        let app = TestApp::spawn().await;
        let participant = app
            .create_authenticated_user("pat@example.com", "pass12345")
            .await;

        let res = app.get_with_token(routes::STATS_ME, &participant).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["participation_count"], 0);
        assert_eq!(res.body["win_count"], 0);
        assert_eq!(res.body["win_rate_percent"], 0.0);
        assert_eq!(res.body["participated_percent"], 100.0);
    }

    #[tokio::test]
    async fn creator_cannot_read_participant_stats() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let res = app.get_with_token(routes::STATS_ME, &creator).await;

        assert_eq!(res.status, 403);
    }
}

mod creator_stats {
    use super::*;

    #[tokio::test]
    async fn counts_own_contests_and_submissions() {
        let (app, creator, _admin, _participant) = platform_with_history().await;

        let res = app.get_with_token(routes::STATS_CREATOR, &creator).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total_contests"], 2);
        assert_eq!(res.body["confirmed_contests"], 1);
        assert_eq!(res.body["completed_contests"], 1);
        assert_eq!(res.body["total_submissions"], 1);
        assert_eq!(res.body["winners_declared"], 1);
    }

    #[tokio::test]
    async fn other_creators_contests_are_not_counted() {
        let (app, _creator, _admin, _participant) = platform_with_history().await;
        let newcomer = app
            .create_user_with_role("dave@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let res = app.get_with_token(routes::STATS_CREATOR, &newcomer).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total_contests"], 0);
        assert_eq!(res.body["total_submissions"], 0);
    }
}

mod admin_stats {
    use super::*;

    #[tokio::test]
    async fn totals_cover_users_contests_and_payments() {
        let (app, _creator, admin, _participant) = platform_with_history().await;

        let res = app.get_with_token(routes::STATS_ADMIN, &admin).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total_users"], 3);
        assert_eq!(res.body["total_creators"], 1);
        assert_eq!(res.body["total_participants"], 1);
        assert_eq!(res.body["confirmed_contests"], 1);
        assert_eq!(res.body["completed_contests"], 1);
        assert_eq!(res.body["total_submissions"], 1);
        // Two completed entry-fee payments of 10 each.
        assert_eq!(res.body["payment_volume"], 20);
    }

    #[tokio::test]
    async fn requires_the_admin_permission() {
        let app = TestApp::spawn().await;
        let participant = app
            .create_authenticated_user("pat@example.com", "pass12345")
            .await;

        let res = app.get_with_token(routes::STATS_ADMIN, &participant).await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

use serde_json::json;
use uuid::Uuid;

use crate::common::{TestApp, routes, valid_contest_body};
use server::domain::UserRole;

/// Spawn an app with a confirmed contest (fee 10), returning
/// (app, admin, participant, contest_id).
async fn confirmed_contest() -> (TestApp, String, String, i32) {
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

    let id = app.create_contest(&creator, "Paid Entry").await;
    app.set_contest_status(&admin, id, "Confirmed").await;

    (app, admin, participant, id)
}

mod checkout {
    use super::*;

    #[tokio::test]
    async fn opens_a_session_capturing_the_entry_fee() {
        let (app, _admin, participant, id) = confirmed_contest().await;

        let res = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &participant)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["contest_id"], id);
        assert_eq!(res.body["amount"], 10);
        assert_eq!(res.body["status"], "Pending");
        assert!(res.body["session_id"].as_str().is_some());
    }

    #[tokio::test]
    async fn rejects_a_pending_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let participant = app
            .create_authenticated_user("pat@example.com", "pass12345")
            .await;
        let id = app.create_contest(&creator, "Unconfirmed").await;

        let res = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &participant)
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn rejects_an_already_joined_contest() {
        let (app, _admin, participant, id) = confirmed_contest().await;
        app.join_contest(&participant, id).await;

        let res = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &participant)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn creator_role_cannot_join() {
        let (app, _admin, _participant, id) = confirmed_contest().await;
        let other_creator = app
            .create_user_with_role("dave@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let res = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &other_creator)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn rejects_a_full_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;
        let first = app
            .create_authenticated_user("pat@example.com", "pass12345")
            .await;
        let second = app
            .create_authenticated_user("riley@example.com", "pass12345")
            .await;

        let mut body = valid_contest_body("Single Seat");
        body["capacity"] = json!(1);
        let res = app.post_with_token(routes::CONTESTS, &body, &creator).await;
        assert_eq!(res.status, 201);
        let id = res.id();
        app.set_contest_status(&admin, id, "Confirmed").await;

        app.join_contest(&first, id).await;

        let res = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &second)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}

mod completion {
    use super::*;

    #[tokio::test]
    async fn records_the_payment_and_registers_the_payer() {
        let (app, _admin, participant, id) = confirmed_contest().await;

        let checkout = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &participant)
            .await;
        let session_id: Uuid = checkout.body["session_id"].as_str().unwrap().parse().unwrap();

        let res = app
            .post_with_token(&routes::payment_complete(&session_id), &json!({}), &participant)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["contest_id"], id);
        assert_eq!(res.body["amount_paid"], 10);

        let detail = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(detail.body["participant_count"], 1);
    }

    #[tokio::test]
    async fn completing_twice_is_a_conflict() {
        let (app, _admin, participant, id) = confirmed_contest().await;

        let checkout = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &participant)
            .await;
        let session_id: Uuid = checkout.body["session_id"].as_str().unwrap().parse().unwrap();

        let first = app
            .post_with_token(&routes::payment_complete(&session_id), &json!({}), &participant)
            .await;
        assert_eq!(first.status, 201);

        let second = app
            .post_with_token(&routes::payment_complete(&session_id), &json!({}), &participant)
            .await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn cannot_complete_another_users_session() {
        let (app, _admin, participant, id) = confirmed_contest().await;
        let intruder = app
            .create_authenticated_user("mallory@example.com", "pass12345")
            .await;

        let checkout = app
            .post_with_token(routes::CHECKOUT, &json!({ "contest_id": id }), &participant)
            .await;
        let session_id: Uuid = checkout.body["session_id"].as_str().unwrap().parse().unwrap();

        let res = app
            .post_with_token(&routes::payment_complete(&session_id), &json!({}), &intruder)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let (app, _admin, participant, _id) = confirmed_contest().await;

        let bogus = Uuid::new_v4();
        let res = app
            .post_with_token(&routes::payment_complete(&bogus), &json!({}), &participant)
            .await;

        assert_eq!(res.status, 404);
    }

    #[tokio::test]
    async fn joined_listing_shows_the_registration() {
        let (app, _admin, participant, id) = confirmed_contest().await;
        app.join_contest(&participant, id).await;

        let res = app.get_with_token(routes::CONTESTS_JOINED, &participant).await;

        assert_eq!(res.status, 200);
        let entries = res.body.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["contest_id"], id);
        assert_eq!(entries[0]["amount_paid"], 10);
        assert!(entries[0]["submission_id"].is_null());
        assert_eq!(entries[0]["won"], false);
    }
}

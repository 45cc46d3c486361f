use serde_json::json;

use crate::common::{TestApp, routes, valid_contest_body};
use server::domain::UserRole;

mod contest_creation {
    use super::*;

    #[tokio::test]
    async fn creator_can_create_a_contest() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let res = app
            .post_with_token(routes::CONTESTS, &valid_contest_body("Logo Sprint"), &token)
            .await;

        assert_eq!(res.status, 201);
        assert_eq!(res.body["name"], "Logo Sprint");
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["creator_email"], "carol@example.com");
        assert_eq!(res.body["participant_count"], 0);
        assert!(res.body["winner"].is_null());
    }

    #[tokio::test]
    async fn participant_cannot_create_a_contest() {
        let app = TestApp::spawn().await;
        let token = app
            .create_authenticated_user("pat@example.com", "pass12345")
            .await;

        let res = app
            .post_with_token(routes::CONTESTS, &valid_contest_body("Nope"), &token)
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }

    #[tokio::test]
    async fn unauthenticated_user_cannot_create_a_contest() {
        let app = TestApp::spawn().await;

        let res = app
            .post_without_token(routes::CONTESTS, &valid_contest_body("Nope"))
            .await;

        assert_eq!(res.status, 401);
    }

    #[tokio::test]
    async fn rejects_past_deadline() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let mut body = valid_contest_body("Old News");
        body["deadline"] = json!("2001-01-01T00:00:00Z");
        let res = app.post_with_token(routes::CONTESTS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_zero_capacity() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let mut body = valid_contest_body("No Room");
        body["capacity"] = json!(0);
        let res = app.post_with_token(routes::CONTESTS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn rejects_negative_entry_fee() {
        let app = TestApp::spawn().await;
        let token = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let mut body = valid_contest_body("Cheapskate");
        body["entry_fee"] = json!(-1);
        let res = app.post_with_token(routes::CONTESTS, &body, &token).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod contest_visibility {
    use super::*;

    #[tokio::test]
    async fn pending_contest_is_hidden_from_public_list() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Hidden Until Confirmed").await;

        let public = app.get_without_token(routes::CONTESTS).await;
        assert_eq!(public.status, 200);
        assert_eq!(public.body["data"].as_array().unwrap().len(), 0);

        let moderated = app.get_with_token(routes::CONTESTS, &admin).await;
        assert_eq!(moderated.body["data"].as_array().unwrap().len(), 1);

        app.set_contest_status(&admin, id, "Confirmed").await;

        let public = app.get_without_token(routes::CONTESTS).await;
        assert_eq!(public.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(public.body["data"][0]["status"], "Confirmed");
    }

    #[tokio::test]
    async fn pending_contest_detail_is_creator_and_admin_only() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;
        let stranger = app
            .create_authenticated_user("pat@example.com", "pass12345")
            .await;

        let id = app.create_contest(&creator, "Secret Draft").await;

        let own = app.get_with_token(&routes::contest(id), &creator).await;
        assert_eq!(own.status, 200);

        let moderated = app.get_with_token(&routes::contest(id), &admin).await;
        assert_eq!(moderated.status, 200);

        let hidden = app.get_with_token(&routes::contest(id), &stranger).await;
        assert_eq!(hidden.status, 404);
        assert_eq!(hidden.body["code"], "NOT_FOUND");

        let anonymous = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(anonymous.status, 404);
    }

    #[tokio::test]
    async fn filters_by_category() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let design = app.create_contest(&creator, "Design Battle").await;
        app.set_contest_status(&admin, design, "Confirmed").await;

        let mut body = valid_contest_body("Writing Duel");
        body["category"] = json!("writing");
        let res = app.post_with_token(routes::CONTESTS, &body, &creator).await;
        assert_eq!(res.status, 201);
        app.set_contest_status(&admin, res.id(), "Confirmed").await;

        let filtered = app
            .get_without_token(&format!("{}?category=writing", routes::CONTESTS))
            .await;
        assert_eq!(filtered.body["data"].as_array().unwrap().len(), 1);
        assert_eq!(filtered.body["data"][0]["name"], "Writing Duel");
    }

    #[tokio::test]
    async fn search_matches_name_substring() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        for name in ["Poster Jam", "Logo Jam", "Essay Contest"] {
            let id = app.create_contest(&creator, name).await;
            app.set_contest_status(&admin, id, "Confirmed").await;
        }

        let res = app
            .get_without_token(&format!("{}?search=jam", routes::CONTESTS))
            .await;
        assert_eq!(res.body["data"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn creator_inventory_lists_all_own_statuses() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let other = app
            .create_user_with_role("dave@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let a = app.create_contest(&creator, "Mine Pending").await;
        let b = app.create_contest(&creator, "Mine Rejected").await;
        app.set_contest_status(&admin, b, "Rejected").await;
        app.create_contest(&other, "Not Mine").await;

        let res = app.get_with_token(routes::CONTESTS_MINE, &creator).await;
        assert_eq!(res.status, 200);
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data.len(), 2);
        let ids: Vec<i64> = data.iter().map(|c| c["id"].as_i64().unwrap()).collect();
        assert!(ids.contains(&(a as i64)));
        assert!(ids.contains(&(b as i64)));
    }
}

mod contest_moderation {
    use super::*;

    #[tokio::test]
    async fn admin_confirms_a_pending_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Awaiting Review").await;

        let res = app
            .patch_with_token(
                &routes::contest_status(id),
                &json!({ "status": "Confirmed" }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "Confirmed");
    }

    #[tokio::test]
    async fn admin_rejects_a_pending_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Not Good Enough").await;

        let res = app
            .patch_with_token(
                &routes::contest_status(id),
                &json!({ "status": "Rejected" }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["status"], "Rejected");
    }

    #[tokio::test]
    async fn confirming_twice_is_a_conflict() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Twice Confirmed").await;
        app.set_contest_status(&admin, id, "Confirmed").await;

        let res = app
            .patch_with_token(
                &routes::contest_status(id),
                &json!({ "status": "Confirmed" }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn rejecting_a_confirmed_contest_is_a_conflict() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Settled").await;
        app.set_contest_status(&admin, id, "Confirmed").await;

        let res = app
            .patch_with_token(
                &routes::contest_status(id),
                &json!({ "status": "Rejected" }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn completed_is_not_a_moderation_target() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "No Shortcut").await;

        let res = app
            .patch_with_token(
                &routes::contest_status(id),
                &json!({ "status": "Completed" }),
                &admin,
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn creator_cannot_moderate() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let id = app.create_contest(&creator, "Self Service").await;

        let res = app
            .patch_with_token(
                &routes::contest_status(id),
                &json!({ "status": "Confirmed" }),
                &creator,
            )
            .await;

        assert_eq!(res.status, 403);
        assert_eq!(res.body["code"], "PERMISSION_DENIED");
    }
}

mod contest_editing {
    use super::*;

    #[tokio::test]
    async fn creator_edits_a_pending_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let id = app.create_contest(&creator, "Draft Title").await;

        let res = app
            .patch_with_token(
                &routes::contest(id),
                &json!({ "name": "Final Title", "prize_money": 750 }),
                &creator,
            )
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["name"], "Final Title");
        assert_eq!(res.body["prize_money"], 750);
    }

    #[tokio::test]
    async fn editing_after_confirmation_is_a_conflict() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Locked In").await;
        app.set_contest_status(&admin, id, "Confirmed").await;

        let res = app
            .patch_with_token(&routes::contest(id), &json!({ "name": "Too Late" }), &creator)
            .await;

        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }

    #[tokio::test]
    async fn only_the_owner_can_edit() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let other = app
            .create_user_with_role("dave@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let id = app.create_contest(&creator, "Hands Off").await;

        let res = app
            .patch_with_token(&routes::contest(id), &json!({ "name": "Hijacked" }), &other)
            .await;

        assert_eq!(res.status, 403);
    }

    #[tokio::test]
    async fn creator_deletes_a_pending_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;

        let id = app.create_contest(&creator, "Changed My Mind").await;

        let res = app.delete_with_token(&routes::contest(id), &creator).await;
        assert_eq!(res.status, 204);

        let gone = app.get_with_token(&routes::contest(id), &creator).await;
        assert_eq!(gone.status, 404);
    }

    #[tokio::test]
    async fn creator_delete_after_confirmation_is_a_conflict() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Committed").await;
        app.set_contest_status(&admin, id, "Confirmed").await;

        let res = app.delete_with_token(&routes::contest(id), &creator).await;

        assert_eq!(res.status, 409);
    }

    #[tokio::test]
    async fn admin_deletes_a_confirmed_contest() {
        let app = TestApp::spawn().await;
        let creator = app
            .create_user_with_role("carol@example.com", "pass12345", UserRole::ContestCreator)
            .await;
        let admin = app
            .create_user_with_role("admin@example.com", "pass12345", UserRole::Admin)
            .await;

        let id = app.create_contest(&creator, "Removed By Moderation").await;
        app.set_contest_status(&admin, id, "Confirmed").await;

        let res = app.delete_with_token(&routes::contest(id), &admin).await;
        assert_eq!(res.status, 204);
    }
}

mod full_lifecycle {
    use super::*;

    /// Creator submits a contest, admin confirms it, a participant pays and
    /// submits, and the creator declares that submission the winner.
    #[tokio::test]
    async fn pending_to_completed_end_to_end() {
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
        let rival = app
            .create_authenticated_user("riley@example.com", "pass12345")
            .await;

        // Created with fee=10, prize=500, future deadline => Pending.
        let id = app.create_contest(&creator, "Grand Challenge").await;
        let res = app.get_with_token(&routes::contest(id), &creator).await;
        assert_eq!(res.body["status"], "Pending");
        assert_eq!(res.body["entry_fee"], 10);
        assert_eq!(res.body["prize_money"], 500);

        // Admin confirms => Confirmed.
        app.set_contest_status(&admin, id, "Confirmed").await;

        // Both participants pay and submit.
        app.join_contest(&participant, id).await;
        app.join_contest(&rival, id).await;
        let winning_submission = app.submit_task(&participant, id, "https://work.example/pat").await;
        app.submit_task(&rival, id, "https://work.example/riley").await;

        let res = app.get_without_token(&routes::contest(id)).await;
        assert_eq!(res.body["participant_count"], 2);

        // Creator declares the winner => Completed, winner snapshot recorded.
        let res = app
            .post_with_token(
                &routes::contest_winner(id),
                &json!({ "submission_id": winning_submission }),
                &creator,
            )
            .await;
        assert_eq!(res.status, 200, "declare failed: {}", res.text);
        assert_eq!(res.body["status"], "Completed");
        assert_eq!(res.body["winner"]["email"], "pat@example.com");
        assert_eq!(res.body["winner"]["submission_id"], winning_submission);

        // Declaring any other submission now fails.
        let submissions = app
            .get_with_token(&routes::contest_submissions(id), &creator)
            .await;
        let other_id = submissions.body.as_array().unwrap()[1]["id"].as_i64().unwrap();
        let res = app
            .post_with_token(
                &routes::contest_winner(id),
                &json!({ "submission_id": other_id }),
                &creator,
            )
            .await;
        assert_eq!(res.status, 409);
        assert_eq!(res.body["code"], "CONFLICT");
    }
}

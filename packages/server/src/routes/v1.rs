use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/contests", contest_routes())
        .nest("/payments", payment_routes())
        .nest("/users", user_routes())
        .nest("/creator-requests", creator_request_routes())
        .nest("/stats", stats_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn contest_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::contest::list_contests,
            handlers::contest::create_contest
        ))
        .routes(routes!(handlers::contest::list_my_contests))
        .routes(routes!(handlers::contest::list_joined_contests))
        .routes(routes!(
            handlers::contest::get_contest,
            handlers::contest::update_contest,
            handlers::contest::delete_contest
        ))
        .routes(routes!(handlers::contest::update_contest_status))
        .routes(routes!(
            handlers::submission::list_contest_submissions,
            handlers::submission::submit_task
        ))
        .routes(routes!(handlers::submission::declare_winner))
}

fn payment_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::payment::create_checkout_session))
        .routes(routes!(handlers::payment::complete_payment))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::list_users))
        .routes(routes!(handlers::user::update_user_role))
}

fn creator_request_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::user::list_creator_requests,
            handlers::user::create_creator_request
        ))
        .routes(routes!(handlers::user::approve_creator_request))
        .routes(routes!(handlers::user::dismiss_creator_request))
}

fn stats_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::stats::admin_stats))
        .routes(routes!(handlers::stats::creator_stats))
        .routes(routes!(handlers::stats::participant_stats))
}

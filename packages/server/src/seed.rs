use sea_orm::*;
use sea_orm::sea_query::{Index, PostgresQueryBuilder};
use tracing::info;

use crate::domain::UserRole;
use crate::entity::{payment_session, role, role_permission, submission};

/// Default role-permission mappings seeded on startup.
const DEFAULT_MAPPINGS: &[(&str, &str)] = &[
    // Admin: platform moderation
    ("admin", "contest:moderate"),
    ("admin", "contest:delete"),
    ("admin", "user:manage"),
    ("admin", "creator-request:manage"),
    ("admin", "stats:admin"),
    // Contest creator
    ("contest_creator", "contest:create"),
    ("contest_creator", "submission:view"),
    ("contest_creator", "winner:declare"),
    ("contest_creator", "stats:creator"),
    // Participant
    ("participant", "contest:join"),
    ("participant", "submission:submit"),
    ("participant", "creator-request:create"),
    ("participant", "stats:participant"),
];

/// Seed the `role` and `role_permission` tables with defaults.
pub async fn seed_role_permissions(db: &DatabaseConnection) -> Result<(), DbErr> {
    // Seed roles
    let mut roles_inserted = 0u32;
    for role in UserRole::ALL {
        let model = role::ActiveModel {
            name: Set(role.as_str().to_string()),
        };

        let result = role::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::column(role::Column::Name)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => roles_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if roles_inserted > 0 {
        info!("Seeded {} new roles", roles_inserted);
    }

    // Seed role-permission mappings
    let mut perms_inserted = 0u32;
    for &(role, permission) in DEFAULT_MAPPINGS {
        let model = role_permission::ActiveModel {
            role: Set(role.to_string()),
            permission: Set(permission.to_string()),
        };

        let result = role_permission::Entity::insert(model)
            .on_conflict(
                sea_orm::sea_query::OnConflict::columns([
                    role_permission::Column::Role,
                    role_permission::Column::Permission,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(db)
            .await;

        match result {
            Ok(_) => perms_inserted += 1,
            Err(DbErr::RecordNotInserted) => {}
            Err(e) => return Err(e),
        }
    }

    if perms_inserted > 0 {
        info!("Seeded {} new role-permission mappings", perms_inserted);
    }

    Ok(())
}

/// Ensure required database indexes exist.
///
/// SeaORM's schema-sync doesn't support composite indexes,
/// so we create them manually on startup.
pub async fn ensure_indexes(db: &DatabaseConnection) -> Result<(), DbErr> {
    // One submission per participant per contest:
    // the unique index is what turns a concurrent duplicate submit into a
    // constraint violation the handler maps to 409.
    let stmt = Index::create()
        .if_not_exists()
        .unique()
        .name("idx_submission_contest_user")
        .table(submission::Entity)
        .col(submission::Column::ContestId)
        .col(submission::Column::UserId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_submission_contest_user exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_submission_contest_user: {}", e);
        }
    }

    // Composite index for checkout lookups:
    // SELECT * FROM payment_session WHERE user_id = ? AND contest_id = ? AND status = ?
    let stmt = Index::create()
        .if_not_exists()
        .name("idx_payment_user_contest")
        .table(payment_session::Entity)
        .col(payment_session::Column::UserId)
        .col(payment_session::Column::ContestId)
        .to_string(PostgresQueryBuilder);

    match db.execute_unprepared(&stmt).await {
        Ok(_) => {
            info!("Ensured index idx_payment_user_contest exists");
        }
        Err(e) => {
            tracing::warn!("Failed to create index idx_payment_user_contest: {}", e);
        }
    }

    Ok(())
}

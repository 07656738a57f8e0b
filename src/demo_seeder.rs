use crate::auth::demo_auth::DEMO_USERS;
use crate::db::user_repository::UserRepository;
use crate::error::AppError;

/// Insert the demo users that are not present yet.
///
/// Failures are logged per user and never abort startup.
pub async fn seed_demo_users(users: &dyn UserRepository) {
    tracing::info!("Starting demo user seeding...");

    for demo in DEMO_USERS {
        match users.find_by_username(demo.username).await {
            Ok(Some(_)) => {
                tracing::info!("Demo user '{}' already exists, skipping.", demo.username);
                continue;
            }
            Err(e) => {
                tracing::error!("Failed to check for demo user '{}': {}", demo.username, e);
                continue;
            }
            Ok(None) => {}
        }

        match users.insert(&demo.to_user()).await {
            Ok(()) => tracing::info!("Seeded demo user '{}'", demo.username),
            Err(AppError::Conflict(_)) => {
                tracing::info!("Demo user '{}' created concurrently, skipping.", demo.username)
            }
            Err(e) => tracing::error!("Failed to seed demo user '{}': {}", demo.username, e),
        }
    }

    tracing::info!("Demo user seeding complete.");
}

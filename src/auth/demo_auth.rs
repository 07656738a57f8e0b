use axum::extract::State;
use axum::Json;
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::auth::token::issue_token;
use crate::config::AppConfig;
use crate::db::models::{PublicUser, User};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::models::fiction::AuthorView;
use crate::state::AppState;

/// Built-in demo user definition.
#[derive(Debug, Clone)]
pub struct DemoUser {
    pub username: &'static str,
    pub password: &'static str,
    pub fullname: &'static str,
    pub email: &'static str,
}

/// The hard-coded demo users available when demo mode is on.
pub const DEMO_USERS: &[DemoUser] = &[
    DemoUser {
        username: "reader",
        password: "reader",
        fullname: "Demo Reader",
        email: "reader@demo.talebook.dev",
    },
    DemoUser {
        username: "writer",
        password: "writer",
        fullname: "Demo Writer",
        email: "writer@demo.talebook.dev",
    },
];

impl DemoUser {
    /// A fresh user record for this entry.
    pub fn to_user(&self) -> User {
        User {
            id: ObjectId::new(),
            username: self.username.to_string(),
            fullname: self.fullname.to_string(),
            email: self.email.to_string(),
            user_image: None,
            fictions: Vec::new(),
        }
    }
}

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Login response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub user: AuthorView,
}

/// Validate demo credentials against the built-in table.
pub fn authenticate_demo_user(
    username: &str,
    password: &str,
) -> Result<&'static DemoUser, AppError> {
    DEMO_USERS
        .iter()
        .find(|u| u.username == username && u.password == password)
        .ok_or_else(|| AppError::Auth("Invalid username or password".into()))
}

/// Check credentials, make sure the user record exists and issue a token.
pub async fn process_demo_login(
    users: &dyn UserRepository,
    config: &AppConfig,
    req: &LoginRequest,
) -> Result<LoginResponse, AppError> {
    if !config.demo_mode {
        return Err(AppError::NotFound("Demo login is disabled".into()));
    }

    let demo = authenticate_demo_user(&req.username, &req.password)?;

    let user = find_or_create(users, demo).await?;

    let token = issue_token(
        &user.id,
        &config.jwt_secret,
        chrono::Duration::hours(config.jwt_ttl_hours),
    )?;

    Ok(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: PublicUser::from(&user).into(),
    })
}

/// Load the record for `demo`, creating it on first login.
///
/// A concurrent first login may win the insert; its record is used then.
async fn find_or_create(users: &dyn UserRepository, demo: &DemoUser) -> Result<User, AppError> {
    if let Some(user) = users.find_by_username(demo.username).await? {
        return Ok(user);
    }

    let user = demo.to_user();
    match users.insert(&user).await {
        Ok(()) => {
            tracing::info!(user = %user.username, "Created demo user on first login");
            Ok(user)
        }
        Err(AppError::Conflict(_)) => {
            tracing::debug!(user = %user.username, "Demo user created concurrently");
            users.find_by_username(demo.username).await?.ok_or_else(|| {
                AppError::Internal(format!("Demo user '{}' vanished", demo.username))
            })
        }
        Err(e) => Err(e),
    }
}

/// `POST /api/users/login`
pub async fn login_handler(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let response = process_demo_login(state.user_repo.as_ref(), &state.config, &req).await?;
    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::token::verify_token;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockUserRepo {
        users: Mutex<Vec<User>>,
    }

    /// Another login inserts the same username between our lookup and insert.
    struct RacingUserRepo {
        inner: MockUserRepo,
        lookups: Mutex<usize>,
    }

    #[async_trait]
    impl UserRepository for RacingUserRepo {
        async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
            self.inner.find_by_id(id).await
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
            let first = {
                let mut lookups = self.lookups.lock().unwrap();
                *lookups += 1;
                *lookups == 1
            };
            if first {
                return Ok(None);
            }
            self.inner.find_by_username(username).await
        }

        async fn insert(&self, user: &User) -> Result<(), AppError> {
            let taken = self
                .inner
                .users
                .lock()
                .unwrap()
                .iter()
                .any(|u| u.username == user.username);
            if taken {
                return Err(AppError::Conflict(format!(
                    "Username '{}' is taken",
                    user.username
                )));
            }
            self.inner.insert(user).await
        }

        async fn add_fiction(&self, _: &ObjectId, _: &ObjectId) -> Result<(), AppError> {
            Ok(())
        }

        async fn ensure_indexes(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepo {
        async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
            Ok(self.users.lock().unwrap().iter().find(|u| u.id == *id).cloned())
        }

        async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
            Ok(self
                .users
                .lock()
                .unwrap()
                .iter()
                .find(|u| u.username == username)
                .cloned())
        }

        async fn insert(&self, user: &User) -> Result<(), AppError> {
            self.users.lock().unwrap().push(user.clone());
            Ok(())
        }

        async fn add_fiction(&self, _: &ObjectId, _: &ObjectId) -> Result<(), AppError> {
            Ok(())
        }

        async fn ensure_indexes(&self) -> Result<(), AppError> {
            Ok(())
        }
    }

    fn demo_config() -> AppConfig {
        AppConfig {
            demo_mode: true,
            ..AppConfig::default()
        }
    }

    fn login(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn test_authenticate_demo_user_success() {
        let user = authenticate_demo_user("writer", "writer").unwrap();
        assert_eq!(user.email, "writer@demo.talebook.dev");
    }

    #[test]
    fn test_wrong_password() {
        assert!(authenticate_demo_user("writer", "wrong").is_err());
    }

    #[test]
    fn test_unknown_user() {
        assert!(authenticate_demo_user("nobody", "nothing").is_err());
    }

    #[tokio::test]
    async fn test_login_creates_user_once() {
        let repo = MockUserRepo {
            users: Mutex::new(vec![]),
        };
        let config = demo_config();

        let first = process_demo_login(&repo, &config, &login("writer", "writer"))
            .await
            .unwrap();
        let second = process_demo_login(&repo, &config, &login("writer", "writer"))
            .await
            .unwrap();

        assert_eq!(repo.users.lock().unwrap().len(), 1);
        assert_eq!(first.user.id, second.user.id);
        assert_eq!(first.message, "Login successful");

        let sub = verify_token(&first.token, &config.jwt_secret).unwrap();
        assert_eq!(sub.to_hex(), first.user.id);
    }

    #[tokio::test]
    async fn test_login_losing_insert_race_uses_existing_user() {
        let winner = DEMO_USERS[1].to_user();
        let repo = RacingUserRepo {
            inner: MockUserRepo {
                users: Mutex::new(vec![winner.clone()]),
            },
            lookups: Mutex::new(0),
        };

        let response = process_demo_login(&repo, &demo_config(), &login("writer", "writer"))
            .await
            .unwrap();

        assert_eq!(response.user.id, winner.id.to_hex());
        assert_eq!(repo.inner.users.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_login_disabled_outside_demo_mode() {
        let repo = MockUserRepo {
            users: Mutex::new(vec![]),
        };
        let err = process_demo_login(&repo, &AppConfig::default(), &login("writer", "writer"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_login_bad_credentials() {
        let repo = MockUserRepo {
            users: Mutex::new(vec![]),
        };
        let err = process_demo_login(&repo, &demo_config(), &login("writer", "nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));
        assert!(repo.users.lock().unwrap().is_empty());
    }
}

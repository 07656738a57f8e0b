use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::models::AuthenticatedUser;
use crate::db::models::{PublicUser, User};
use crate::models::fiction::AuthorView;

/// Profile of the calling user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileResponse {
    pub message: String,
    pub user: AuthorView,
    /// Hex ids of the fictions this user owns.
    pub fictions: Vec<String>,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            message: "User data".to_string(),
            user: PublicUser::from(user).into(),
            fictions: user.fictions.iter().map(|id| id.to_hex()).collect(),
        }
    }
}

/// `GET /api/users/me`
pub async fn me_handler(auth: AuthenticatedUser) -> Json<ProfileResponse> {
    Json(ProfileResponse::from(&auth.user))
}

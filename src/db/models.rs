use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A fiction (story/post) stored in the `fictions` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fiction {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    /// Owning user.
    pub user_id: ObjectId,
    pub title: String,
    pub description: String,
    /// Public path of the cover image (an upload or the default image).
    pub image: String,
    pub category: String,
    pub body: String,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// A user account stored in the `users` collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub user_image: Option<String>,
    /// Ids of the fictions this user owns, in creation order.
    #[serde(default)]
    pub fictions: Vec<ObjectId>,
}

/// A comment stored in the `comments` collection. Only read here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub user_id: ObjectId,
    pub fiction_id: ObjectId,
    pub body: String,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

/// The subset of a [`User`] exposed when a reference is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub username: String,
    pub fullname: String,
    pub email: String,
    #[serde(default)]
    pub user_image: Option<String>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            fullname: user.fullname.clone(),
            email: user.email.clone(),
            user_image: user.user_image.clone(),
        }
    }
}

/// A fiction with its references resolved.
///
/// `author` is `None` when the owning user record no longer exists.
/// `body` is `None` for projections that exclude it (search results), and
/// `populated_comments` is only resolved for single-fiction lookups.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopulatedFiction {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default)]
    pub author: Option<PublicUser>,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub comments: Vec<ObjectId>,
    #[serde(default)]
    pub populated_comments: Option<Vec<Comment>>,
    #[serde(with = "bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

impl PopulatedFiction {
    /// Resolve a fiction against an already-loaded owner.
    pub fn from_parts(fiction: Fiction, author: Option<PublicUser>, keep_body: bool) -> Self {
        Self {
            id: fiction.id,
            author,
            title: fiction.title,
            description: fiction.description,
            image: fiction.image,
            category: fiction.category,
            body: keep_body.then_some(fiction.body),
            comments: fiction.comments,
            populated_comments: None,
            created_at: fiction.created_at,
        }
    }
}

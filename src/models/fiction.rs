use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::db::models::{Comment, Fiction, PopulatedFiction, PublicUser};

/// The text fields submitted when creating a fiction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FictionInput {
    pub title: String,
    pub description: String,
    pub category: String,
    pub body: String,
}

/// Public fields of a fiction's owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorView {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub fullname: String,
    pub email: String,
    pub user_image: Option<String>,
}

impl From<PublicUser> for AuthorView {
    fn from(user: PublicUser) -> Self {
        Self {
            id: user.id.to_hex(),
            username: user.username,
            fullname: user.fullname,
            email: user.email,
            user_image: user.user_image,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentView {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl From<Comment> for CommentView {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id.to_hex(),
            user_id: comment.user_id.to_hex(),
            body: comment.body,
            created_at: comment.created_at,
        }
    }
}

/// The `userId` field: an id, or the owner's public fields once populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Populated(AuthorView),
    Id(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CommentRef {
    Populated(CommentView),
    Id(String),
}

/// JSON shape of a fiction in API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FictionView {
    #[serde(rename = "_id")]
    pub id: String,
    /// `null` when the owner reference dangles.
    pub user_id: Option<OwnerRef>,
    pub title: String,
    pub description: String,
    pub image: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub comments: Vec<CommentRef>,
    pub created_at: DateTime<Utc>,
}

impl From<Fiction> for FictionView {
    fn from(fiction: Fiction) -> Self {
        Self {
            id: fiction.id.to_hex(),
            user_id: Some(OwnerRef::Id(fiction.user_id.to_hex())),
            title: fiction.title,
            description: fiction.description,
            image: fiction.image,
            category: fiction.category,
            body: Some(fiction.body),
            comments: fiction
                .comments
                .into_iter()
                .map(|id| CommentRef::Id(id.to_hex()))
                .collect(),
            created_at: fiction.created_at,
        }
    }
}

impl From<PopulatedFiction> for FictionView {
    fn from(fiction: PopulatedFiction) -> Self {
        let comments = match fiction.populated_comments {
            Some(resolved) => resolved
                .into_iter()
                .map(|c| CommentRef::Populated(c.into()))
                .collect(),
            None => fiction
                .comments
                .into_iter()
                .map(|id| CommentRef::Id(id.to_hex()))
                .collect(),
        };

        Self {
            id: fiction.id.to_hex(),
            user_id: fiction.author.map(|a| OwnerRef::Populated(a.into())),
            title: fiction.title,
            description: fiction.description,
            image: fiction.image,
            category: fiction.category,
            body: fiction.body,
            comments,
            created_at: fiction.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateFictionResponse {
    pub message: String,
    pub fiction_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FictionListResponse {
    pub message: String,
    pub fictions: Vec<FictionView>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FictionResponse {
    pub message: String,
    pub fiction: FictionView,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub message: String,
    pub results: Vec<FictionView>,
}

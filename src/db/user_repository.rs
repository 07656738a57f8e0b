use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::bson::oid::ObjectId;
use mongodb::error::{ErrorKind, WriteFailure};

use crate::db::models::User;
use crate::error::AppError;

pub const USERS_COLLECTION: &str = "users";

const DUPLICATE_KEY: i32 = 11000;

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(e)) if e.code == DUPLICATE_KEY
    )
}

/// Repository trait for user accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError>;

    /// Persist a new user. A taken username is reported as `Conflict`.
    async fn insert(&self, user: &User) -> Result<(), AppError>;

    /// Append `fiction_id` to the user's `fictions`. The id is added at most
    /// once; a missing user is reported as `NotFound`.
    async fn add_fiction(&self, user_id: &ObjectId, fiction_id: &ObjectId)
        -> Result<(), AppError>;

    async fn ensure_indexes(&self) -> Result<(), AppError>;
}

/// MongoDB implementation of the UserRepository.
pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection(USERS_COLLECTION),
        }
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    async fn find_by_id(&self, id: &ObjectId) -> Result<Option<User>, AppError> {
        Ok(self.collection.find_one(doc! { "_id": *id }).await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self
            .collection
            .find_one(doc! { "username": username })
            .await?)
    }

    async fn insert(&self, user: &User) -> Result<(), AppError> {
        match self.collection.insert_one(user).await {
            Ok(_) => Ok(()),
            Err(e) if is_duplicate_key(&e) => Err(AppError::Conflict(format!(
                "Username '{}' is taken",
                user.username
            ))),
            Err(e) => Err(e.into()),
        }
    }

    async fn add_fiction(
        &self,
        user_id: &ObjectId,
        fiction_id: &ObjectId,
    ) -> Result<(), AppError> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": *user_id },
                doc! { "$addToSet": { "fictions": *fiction_id } },
            )
            .await?;

        if result.matched_count == 0 {
            return Err(AppError::NotFound(format!("User '{user_id}' not found")));
        }

        Ok(())
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::options::IndexOptions;
        use mongodb::IndexModel;

        let unique = IndexOptions::builder().unique(true).build();
        self.collection
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "username": 1 })
                    .options(unique)
                    .build(),
            )
            .await?;

        Ok(())
    }
}

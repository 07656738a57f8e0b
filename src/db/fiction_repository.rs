use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{doc, Document};

use crate::db::models::{Fiction, PopulatedFiction};
use crate::db::user_repository::USERS_COLLECTION;
use crate::error::AppError;

pub const FICTIONS_COLLECTION: &str = "fictions";
pub const COMMENTS_COLLECTION: &str = "comments";

/// Fields a fiction listing may be sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Title,
    Category,
    CreatedAt,
}

impl SortField {
    /// Parse a public field name. Matching is exact.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "title" => Some(SortField::Title),
            "category" => Some(SortField::Category),
            "createdAt" => Some(SortField::CreatedAt),
            _ => None,
        }
    }

    /// The stored document key for this field.
    pub fn key(&self) -> &'static str {
        match self {
            SortField::Title => "title",
            SortField::Category => "category",
            SortField::CreatedAt => "createdAt",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Validated options for listing fictions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub sort: Option<(SortField, SortDirection)>,
    /// `None` means unlimited.
    pub limit: Option<u32>,
}

/// Repository trait for fiction operations.
///
/// Read operations resolve the owner reference into its public fields.
#[async_trait]
pub trait FictionRepository: Send + Sync {
    /// Persist a new fiction.
    async fn insert(&self, fiction: &Fiction) -> Result<(), AppError>;

    /// Remove a fiction. Returns `false` if nothing matched.
    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError>;

    /// List all fictions with owners populated.
    async fn list(&self, options: &ListOptions) -> Result<Vec<PopulatedFiction>, AppError>;

    /// Fetch one fiction with owner and comments populated.
    async fn find_populated(&self, id: &ObjectId) -> Result<Option<PopulatedFiction>, AppError>;

    /// All fictions whose category equals `category` exactly.
    async fn find_by_category(&self, category: &str) -> Result<Vec<Fiction>, AppError>;

    /// Fictions matching any of `terms` (case-insensitive substring on title,
    /// description or category). Bodies are excluded from the results.
    async fn search(&self, terms: &[String]) -> Result<Vec<PopulatedFiction>, AppError>;

    /// Create the indexes the queries above rely on.
    async fn ensure_indexes(&self) -> Result<(), AppError>;
}

/// MongoDB implementation of the FictionRepository.
pub struct MongoFictionRepository {
    collection: mongodb::Collection<Fiction>,
}

impl MongoFictionRepository {
    pub fn new(db: &mongodb::Database) -> Self {
        Self {
            collection: db.collection(FICTIONS_COLLECTION),
        }
    }

    async fn aggregate_populated(
        &self,
        pipeline: Vec<Document>,
    ) -> Result<Vec<PopulatedFiction>, AppError> {
        let mut cursor = self.collection.aggregate(pipeline).await?;

        let mut fictions = Vec::new();
        while let Some(raw) = cursor.try_next().await? {
            fictions.push(mongodb::bson::from_document(raw)?);
        }

        Ok(fictions)
    }
}

/// Stages resolving `userId` into an `author` sub-document holding only the
/// public user fields. A dangling reference leaves `author` absent.
fn author_lookup() -> [Document; 2] {
    [
        doc! {
            "$lookup": {
                "from": USERS_COLLECTION,
                "let": { "owner": "$userId" },
                "pipeline": [
                    { "$match": { "$expr": { "$eq": ["$_id", "$$owner"] } } },
                    { "$project": {
                        "_id": 1,
                        "username": 1,
                        "fullname": 1,
                        "email": 1,
                        "userImage": 1,
                    } },
                ],
                "as": "author",
            }
        },
        doc! { "$unwind": { "path": "$author", "preserveNullAndEmptyArrays": true } },
    ]
}

fn sort_stage(options: &ListOptions) -> Document {
    match options.sort {
        Some((field, direction)) => {
            let order = match direction {
                SortDirection::Ascending => 1,
                SortDirection::Descending => -1,
            };
            doc! { "$sort": { field.key(): order, "_id": 1 } }
        }
        None => doc! { "$sort": { "_id": 1 } },
    }
}

/// Build the `$or` filter for a term search.
pub(crate) fn search_filter(terms: &[String]) -> Document {
    let clauses: Vec<Document> = terms
        .iter()
        .flat_map(|term| {
            let pattern = regex::escape(term);
            ["title", "description", "category"].map(|field| {
                doc! { field: { "$regex": pattern.as_str(), "$options": "i" } }
            })
        })
        .collect();

    doc! { "$or": clauses }
}

#[async_trait]
impl FictionRepository for MongoFictionRepository {
    async fn insert(&self, fiction: &Fiction) -> Result<(), AppError> {
        self.collection.insert_one(fiction).await?;
        Ok(())
    }

    async fn delete(&self, id: &ObjectId) -> Result<bool, AppError> {
        let result = self.collection.delete_one(doc! { "_id": *id }).await?;
        Ok(result.deleted_count > 0)
    }

    async fn list(&self, options: &ListOptions) -> Result<Vec<PopulatedFiction>, AppError> {
        let mut pipeline = vec![sort_stage(options)];
        if let Some(limit) = options.limit {
            pipeline.push(doc! { "$limit": i64::from(limit) });
        }
        pipeline.extend(author_lookup());

        self.aggregate_populated(pipeline).await
    }

    async fn find_populated(&self, id: &ObjectId) -> Result<Option<PopulatedFiction>, AppError> {
        let mut pipeline = vec![doc! { "$match": { "_id": *id } }];
        pipeline.extend(author_lookup());
        pipeline.push(doc! {
            "$lookup": {
                "from": COMMENTS_COLLECTION,
                "localField": "comments",
                "foreignField": "_id",
                "as": "populatedComments",
            }
        });

        Ok(self.aggregate_populated(pipeline).await?.into_iter().next())
    }

    async fn find_by_category(&self, category: &str) -> Result<Vec<Fiction>, AppError> {
        use mongodb::options::FindOptions;

        let options = FindOptions::builder().sort(doc! { "_id": 1 }).build();

        let cursor = self
            .collection
            .find(doc! { "category": category })
            .with_options(options)
            .await?;

        Ok(cursor.try_collect().await?)
    }

    async fn search(&self, terms: &[String]) -> Result<Vec<PopulatedFiction>, AppError> {
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        let mut pipeline = vec![
            doc! { "$match": search_filter(terms) },
            doc! { "$project": { "body": 0 } },
            doc! { "$sort": { "_id": 1 } },
        ];
        pipeline.extend(author_lookup());

        self.aggregate_populated(pipeline).await
    }

    async fn ensure_indexes(&self) -> Result<(), AppError> {
        use mongodb::IndexModel;

        self.collection
            .create_index(IndexModel::builder().keys(doc! { "category": 1 }).build())
            .await?;
        self.collection
            .create_index(IndexModel::builder().keys(doc! { "userId": 1 }).build())
            .await?;

        tracing::debug!("Fiction indexes ensured");
        Ok(())
    }
}

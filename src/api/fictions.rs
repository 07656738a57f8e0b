use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use mongodb::bson::oid::ObjectId;

use crate::api::query::{parse_list_options, ListQuery, SearchParams};
use crate::api::upload::{discard_upload, read_fiction_form, store_upload, FictionForm};
use crate::auth::models::AuthenticatedUser;
use crate::config::AppConfig;
use crate::db::fiction_repository::{FictionRepository, ListOptions};
use crate::db::models::{Fiction, User};
use crate::db::user_repository::UserRepository;
use crate::error::AppError;
use crate::models::fiction::{
    CreateFictionResponse, FictionListResponse, FictionResponse, FictionView, SearchResponse,
};
use crate::state::AppState;
use crate::storage::client::StorageClient;
use crate::validation::{sanitize, validate};

pub const CREATE_FAILED: &str = "Failed to create fiction";
pub const LINK_FAILED: &str = "Failed to add fiction in user";

/// Core creation logic, separated from the HTTP layer for testability.
///
/// Stores the upload, sanitizes and validates the fields, inserts the
/// fiction and links it to `owner`. The insert and the link form one unit:
/// if linking fails the fiction is deleted again, and any failure after the
/// upload was stored removes the file.
pub async fn process_create_fiction(
    fictions: &dyn FictionRepository,
    users: &dyn UserRepository,
    storage: &dyn StorageClient,
    config: &AppConfig,
    owner: &User,
    form: FictionForm,
) -> Result<CreateFictionResponse, AppError> {
    let FictionForm {
        input,
        image,
        mut errors,
    } = form;

    // 1. Store the upload first; it is discarded again on any failure below
    let stored = match image {
        Some(upload) => Some(store_upload(storage, upload, &config.uploads_url_prefix).await?),
        None => None,
    };

    // 2. Sanitize, then validate
    let sanitized = sanitize::fiction_input(&input);
    if let Err(field_errors) = validate::fiction_input(&sanitized) {
        errors.extend(field_errors);
    }

    if !errors.is_empty() {
        if let Some(stored) = &stored {
            discard_upload(storage, stored).await;
        }
        let inputs = serde_json::to_value(&sanitized)
            .map_err(|e| AppError::Internal(format!("Failed to encode inputs: {e}")))?;
        return Err(AppError::Validation { errors, inputs });
    }

    // 3. Uploaded image, or the default one
    let image = stored
        .as_ref()
        .map(|s| s.url.clone())
        .unwrap_or_else(|| config.default_image.clone());

    let fiction = Fiction {
        id: ObjectId::new(),
        user_id: owner.id,
        title: sanitized.title,
        description: sanitized.description,
        image,
        category: sanitized.category,
        body: sanitized.body,
        comments: Vec::new(),
        created_at: Utc::now(),
    };

    // 4. Persist the fiction
    if let Err(e) = fictions.insert(&fiction).await {
        tracing::error!("{CREATE_FAILED}: {e}");
        if let Some(stored) = &stored {
            discard_upload(storage, stored).await;
        }
        return Err(AppError::Internal(CREATE_FAILED.into()));
    }

    // 5. Link it to its owner, rolling the insert back on failure
    if let Err(e) = users.add_fiction(&owner.id, &fiction.id).await {
        tracing::error!("{LINK_FAILED}: {e}");
        match fictions.delete(&fiction.id).await {
            Ok(_) => tracing::warn!(fiction_id = %fiction.id, "Rolled back unlinked fiction"),
            Err(e) => tracing::error!(
                fiction_id = %fiction.id,
                "Failed to roll back unlinked fiction, it is now orphaned: {e}"
            ),
        }
        if let Some(stored) = &stored {
            discard_upload(storage, stored).await;
        }
        return Err(AppError::Internal(LINK_FAILED.into()));
    }

    tracing::info!(
        fiction_id = %fiction.id,
        owner = %owner.username,
        "Fiction created"
    );

    Ok(CreateFictionResponse {
        message: "Fiction Created".to_string(),
        fiction_id: fiction.id.to_hex(),
    })
}

/// List every fiction with its owner's public fields.
pub async fn process_list_fictions(
    fictions: &dyn FictionRepository,
    options: &ListOptions,
) -> Result<FictionListResponse, AppError> {
    let found = fictions.list(options).await?;

    Ok(FictionListResponse {
        message: "Fictions data".to_string(),
        fictions: found.into_iter().map(FictionView::from).collect(),
    })
}

/// Fetch one fiction with owner and comments resolved.
pub async fn process_get_fiction(
    fictions: &dyn FictionRepository,
    fiction_id: &str,
) -> Result<FictionResponse, AppError> {
    let id = ObjectId::parse_str(fiction_id)
        .map_err(|_| AppError::BadRequest(format!("Invalid fiction id '{fiction_id}'")))?;

    let fiction = fictions
        .find_populated(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Fiction '{fiction_id}' not found")))?;

    Ok(FictionResponse {
        message: "Fiction data".to_string(),
        fiction: fiction.into(),
    })
}

/// Fictions whose category equals `category` exactly.
pub async fn process_fictions_by_category(
    fictions: &dyn FictionRepository,
    category: &str,
) -> Result<FictionListResponse, AppError> {
    let found = fictions.find_by_category(category).await?;

    Ok(FictionListResponse {
        message: format!("{category} related fictions"),
        fictions: found.into_iter().map(FictionView::from).collect(),
    })
}

/// Fuzzy search over title, description and category.
///
/// An absent or empty query is rejected before anything else runs.
pub async fn process_search(
    fictions: &dyn FictionRepository,
    q: Option<&str>,
) -> Result<SearchResponse, AppError> {
    let q = match q {
        Some(q) if !q.is_empty() => q,
        _ => return Err(AppError::MissingInput("Pass search query with request".into())),
    };

    let sanitized = sanitize::search_query(q);
    validate::search_query(&sanitized).map_err(AppError::InvalidQuery)?;

    tracing::debug!(query = %sanitized, "Searching fictions");

    let terms: Vec<String> = sanitized.split_whitespace().map(String::from).collect();
    let results = fictions.search(&terms).await?;

    Ok(SearchResponse {
        message: format!("Search results for {q}"),
        results: results.into_iter().map(FictionView::from).collect(),
    })
}

/// Axum handler for `POST /api/fictions`.
pub async fn create_fiction_handler(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<CreateFictionResponse>), AppError> {
    let form = read_fiction_form(multipart).await?;

    let response = process_create_fiction(
        state.fiction_repo.as_ref(),
        state.user_repo.as_ref(),
        state.storage_client.as_ref(),
        &state.config,
        &auth.user,
        form,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Axum handler for `GET /api/fictions`.
pub async fn list_fictions_handler(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<FictionListResponse>, AppError> {
    let options = parse_list_options(&query, state.config.max_list_limit)?;
    let response = process_list_fictions(state.fiction_repo.as_ref(), &options).await?;
    Ok(Json(response))
}

/// Axum handler for `GET /api/fictions/{fiction_id}`.
pub async fn get_fiction_handler(
    State(state): State<AppState>,
    Path(fiction_id): Path<String>,
) -> Result<Json<FictionResponse>, AppError> {
    let response = process_get_fiction(state.fiction_repo.as_ref(), &fiction_id).await?;
    Ok(Json(response))
}

/// Axum handler for `GET /api/fictions/category/{category}`.
pub async fn fictions_by_category_handler(
    State(state): State<AppState>,
    Path(category): Path<String>,
) -> Result<Json<FictionListResponse>, AppError> {
    let response = process_fictions_by_category(state.fiction_repo.as_ref(), &category).await?;
    Ok(Json(response))
}

/// Axum handler for `GET /api/fictions/search`.
pub async fn search_fictions_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    let response = process_search(state.fiction_repo.as_ref(), params.q.as_deref()).await?;
    Ok(Json(response))
}

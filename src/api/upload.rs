use axum::extract::Multipart;
use mongodb::bson::oid::ObjectId;

use crate::error::{AppError, FieldErrors};
use crate::models::fiction::FictionInput;
use crate::storage::client::StorageClient;

/// Multipart field carrying the optional cover image.
pub const IMAGE_FIELD: &str = "image";

const NOT_AN_IMAGE: &str = "Only image files are allowed";

/// Raster formats accepted as cover images, identified by content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    /// Identify the format from the leading bytes. The declared content
    /// type and file name are never trusted for this.
    pub fn sniff(data: &[u8]) -> Option<Self> {
        match data {
            [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => Some(ImageKind::Png),
            [0xFF, 0xD8, 0xFF, ..] => Some(ImageKind::Jpeg),
            [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(ImageKind::Gif),
            [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => {
                Some(ImageKind::Webp)
            }
            _ => None,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ImageKind::Png => "png",
            ImageKind::Jpeg => "jpg",
            ImageKind::Gif => "gif",
            ImageKind::Webp => "webp",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
        }
    }
}

/// A verified image part received with a create request, not yet stored.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub kind: ImageKind,
    pub data: Vec<u8>,
}

/// Everything a create request carried, before sanitizing.
#[derive(Debug, Clone, Default)]
pub struct FictionForm {
    pub input: FictionInput,
    pub image: Option<ImageUpload>,
    /// Problems found while reading parts (e.g. a non-image file).
    pub errors: FieldErrors,
}

/// An upload written to storage.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredUpload {
    /// Storage key (the file name inside the uploads directory).
    pub key: String,
    /// Public path the file is served from.
    pub url: String,
}

/// Read the create form. Unknown parts are ignored.
pub async fn read_fiction_form(mut multipart: Multipart) -> Result<FictionForm, AppError> {
    let mut form = FictionForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart error: {e}")))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == IMAGE_FIELD {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;

            // browsers send an empty part when no file was picked
            if file_name.is_empty() && data.is_empty() {
                continue;
            }

            let kind = match ImageKind::sniff(&data) {
                Some(kind) if content_type.starts_with("image/") => kind,
                _ => {
                    tracing::debug!(
                        file_name = %file_name,
                        content_type = %content_type,
                        "Rejected non-image upload"
                    );
                    form.errors.insert(IMAGE_FIELD.into(), NOT_AN_IMAGE.into());
                    continue;
                }
            };

            form.image = Some(ImageUpload {
                file_name,
                kind,
                data: data.to_vec(),
            });
            continue;
        }

        let slot = match name.as_str() {
            "title" => &mut form.input.title,
            "description" => &mut form.input.description,
            "category" => &mut form.input.category,
            "body" => &mut form.input.body,
            _ => continue,
        };

        *slot = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Failed to read field '{name}': {e}")))?;
    }

    Ok(form)
}

/// Reduce a client-supplied file name to a safe flat stem.
///
/// Everything from the first `.` on is dropped; the stored extension comes
/// from the sniffed [`ImageKind`] instead.
pub fn sanitize_file_stem(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or("")
        .trim_start_matches('.');
    let stem = base.split('.').next().unwrap_or("");

    let cleaned: String = stem
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' { c } else { '_' })
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

/// Write the upload under a unique key ending in the verified extension.
pub async fn store_upload(
    storage: &dyn StorageClient,
    upload: ImageUpload,
    url_prefix: &str,
) -> Result<StoredUpload, AppError> {
    let key = format!(
        "{}_{}.{}",
        ObjectId::new().to_hex(),
        sanitize_file_stem(&upload.file_name),
        upload.kind.extension()
    );

    storage.put_object(&key, upload.data).await?;
    tracing::debug!(key = %key, content_type = upload.kind.mime_type(), "Stored upload");

    let url = format!("{}/{}", url_prefix.trim_end_matches('/'), key);
    Ok(StoredUpload { key, url })
}

/// Remove an upload that will not be referenced. Failures are only logged.
pub async fn discard_upload(storage: &dyn StorageClient, upload: &StoredUpload) {
    if let Err(e) = storage.delete_object(&upload.key).await {
        tracing::warn!("Failed to remove unreferenced upload '{}': {e}", upload.key);
    }
}

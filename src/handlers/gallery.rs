use std::sync::Arc;

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;

use crate::db::queries;
use crate::errors::AppError;
use crate::handlers::extract::ApiPath;
use crate::models::{AdminIdentity, GalleryImage};
use crate::services::gallery;
use crate::services::uploads::{ImageStore, StoredImage};
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GalleryImageResponse {
    id: i64,
    title: String,
    description: Option<String>,
    url: String,
    upload_date: String,
}

impl From<GalleryImage> for GalleryImageResponse {
    fn from(image: GalleryImage) -> Self {
        Self {
            id: image.id,
            url: image.url(),
            title: image.title,
            description: image.description,
            upload_date: image.upload_date.format(queries::TIMESTAMP_FORMAT).to_string(),
        }
    }
}

// GET /api/gallery
pub async fn list_images(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<GalleryImageResponse>>, AppError> {
    let images = {
        let db = state.conn()?;
        gallery::list(&db)?
    };
    Ok(Json(
        images.into_iter().map(GalleryImageResponse::from).collect(),
    ))
}

// POST /api/admin/gallery/upload
#[derive(Default)]
struct UploadForm {
    title: Option<String>,
    description: Option<String>,
    image: Option<StoredImage>,
}

#[derive(Serialize)]
pub struct UploadResponse {
    id: i64,
    message: &'static str,
    url: String,
}

fn bad_multipart(e: MultipartError) -> AppError {
    AppError::Validation(format!("invalid upload: {}", e.body_text()))
}

/// Reads the form, writing the image part to disk as soon as it arrives.
async fn read_upload_form(
    images: &ImageStore,
    multipart: &mut Multipart,
    form: &mut UploadForm,
) -> Result<(), AppError> {
    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                if form.image.is_some() {
                    return Err(AppError::Validation(
                        "only one image can be uploaded at a time".to_string(),
                    ));
                }
                let original_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(bad_multipart)?;
                form.image = Some(
                    images
                        .save(&original_name, content_type.as_deref(), &data)
                        .await?,
                );
            }
            "title" => form.title = Some(field.text().await.map_err(bad_multipart)?),
            "description" => form.description = Some(field.text().await.map_err(bad_multipart)?),
            _ => {}
        }
    }
    Ok(())
}

pub async fn upload_image(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, AppError> {
    let mut multipart = multipart?;
    let mut form = UploadForm::default();
    if let Err(e) = read_upload_form(&state.images, &mut multipart, &mut form).await {
        if let Some(stored) = form.image.take() {
            state.images.remove(&stored.filename).await;
        }
        return Err(e);
    }

    let stored = form
        .image
        .ok_or_else(|| AppError::Validation("image file is required".to_string()))?;

    let image = gallery::add(
        &state.db,
        &state.images,
        form.title.as_deref(),
        form.description.as_deref(),
        stored,
    )
    .await?;

    Ok(Json(UploadResponse {
        id: image.id,
        message: "image uploaded",
        url: image.url(),
    }))
}

// DELETE /api/admin/gallery/:id
pub async fn delete_image(
    State(state): State<Arc<AppState>>,
    Extension(admin): Extension<AdminIdentity>,
    ApiPath(id): ApiPath<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    gallery::remove(&state.db, &state.images, id).await?;
    tracing::info!(image_id = id, admin = %admin.username, "admin delete request handled");
    Ok(Json(serde_json::json!({ "message": "image deleted" })))
}

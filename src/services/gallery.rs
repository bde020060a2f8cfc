use std::sync::Mutex;

use rusqlite::Connection;

use crate::db::{self, queries};
use crate::errors::AppError;
use crate::models::{GalleryImage, NewGalleryImage};
use crate::services::uploads::{ImageStore, StoredImage};

pub fn list(conn: &Connection) -> Result<Vec<GalleryImage>, AppError> {
    Ok(queries::list_gallery_images(conn)?)
}

/// Records an already-stored upload. On any failure the stored file is
/// deleted before the error is returned.
pub async fn add(
    db: &Mutex<Connection>,
    images: &ImageStore,
    title: Option<&str>,
    description: Option<&str>,
    stored: StoredImage,
) -> Result<GalleryImage, AppError> {
    let title = title.map(str::trim).unwrap_or_default();
    if title.is_empty() {
        images.remove(&stored.filename).await;
        return Err(AppError::Validation("title is required".to_string()));
    }

    let new_image = NewGalleryImage {
        title: title.to_string(),
        description: description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string),
        filename: stored.filename.clone(),
        original_name: stored.original_name.clone(),
    };

    match insert(db, &new_image) {
        Ok(image) => {
            tracing::info!(image_id = image.id, filename = %image.filename, "gallery image added");
            Ok(image)
        }
        Err(e) => {
            images.remove(&stored.filename).await;
            Err(e)
        }
    }
}

fn insert(db: &Mutex<Connection>, image: &NewGalleryImage) -> Result<GalleryImage, AppError> {
    let conn = db::lock(db)?;
    Ok(queries::insert_gallery_image(&conn, image)?)
}

/// Deletes the metadata row, then the backing file. The file delete is
/// best-effort and never turns a successful removal into an error.
pub async fn remove(db: &Mutex<Connection>, images: &ImageStore, id: i64) -> Result<(), AppError> {
    let filename = {
        let conn = db::lock(db)?;
        let image = queries::get_gallery_image(&conn, id)?
            .ok_or_else(|| AppError::NotFound("image".to_string()))?;
        if !queries::delete_gallery_image(&conn, id)? {
            return Err(AppError::NotFound("image".to_string()));
        }
        image.filename
    };

    images.remove(&filename).await;
    tracing::info!(image_id = id, filename = %filename, "gallery image removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    async fn setup() -> (Mutex<Connection>, ImageStore) {
        let conn = db::init_db(":memory:").unwrap();
        let dir = std::env::temp_dir().join(format!("salonbook-gallery-{}", Uuid::new_v4()));
        (Mutex::new(conn), ImageStore::new(dir).await.unwrap())
    }

    async fn store_png(images: &ImageStore, name: &str) -> StoredImage {
        images.save(name, Some("image/png"), b"png-bytes").await.unwrap()
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let (db, images) = setup().await;
        let stored = store_png(&images, "first.png").await;
        let added = add(&db, &images, Some("Ombre"), Some(" soft pink "), stored)
            .await
            .unwrap();
        assert_eq!(added.title, "Ombre");
        assert_eq!(added.description.as_deref(), Some("soft pink"));
        assert!(images.file_path(&added.filename).exists());

        let stored = store_png(&images, "second.png").await;
        let second = add(&db, &images, Some("Chrome"), None, stored).await.unwrap();

        let listed = list(&db::lock(&db).unwrap()).unwrap();
        let ids: Vec<i64> = listed.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![second.id, added.id]);

        let _ = tokio::fs::remove_dir_all(images.dir()).await;
    }

    #[tokio::test]
    async fn test_missing_title_leaves_no_file() {
        let (db, images) = setup().await;
        let stored = store_png(&images, "untitled.png").await;
        let path = images.file_path(&stored.filename);
        assert!(path.exists());

        let err = add(&db, &images, Some("   "), None, stored).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!path.exists());
        assert!(list(&db::lock(&db).unwrap()).unwrap().is_empty());

        let _ = tokio::fs::remove_dir_all(images.dir()).await;
    }

    #[tokio::test]
    async fn test_remove_deletes_row_and_file() {
        let (db, images) = setup().await;
        let stored = store_png(&images, "gone.png").await;
        let added = add(&db, &images, Some("Gone"), None, stored).await.unwrap();
        let path = images.file_path(&added.filename);

        remove(&db, &images, added.id).await.unwrap();
        assert!(!path.exists());
        assert!(matches!(
            remove(&db, &images, added.id).await,
            Err(AppError::NotFound(_))
        ));

        let _ = tokio::fs::remove_dir_all(images.dir()).await;
    }

    #[tokio::test]
    async fn test_remove_succeeds_when_file_already_gone() {
        let (db, images) = setup().await;
        let stored = store_png(&images, "orphan.png").await;
        let added = add(&db, &images, Some("Orphan"), None, stored).await.unwrap();
        tokio::fs::remove_file(images.file_path(&added.filename))
            .await
            .unwrap();

        remove(&db, &images, added.id).await.unwrap();
        assert!(list(&db::lock(&db).unwrap()).unwrap().is_empty());

        let _ = tokio::fs::remove_dir_all(images.dir()).await;
    }
}

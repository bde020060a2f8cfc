use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GalleryImage {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub original_name: String,
    pub upload_date: NaiveDateTime,
}

impl GalleryImage {
    /// Public path the image is served under.
    pub fn url(&self) -> String {
        format!("/uploads/{}", self.filename)
    }
}

#[derive(Debug, Clone)]
pub struct NewGalleryImage {
    pub title: String,
    pub description: Option<String>,
    pub filename: String,
    pub original_name: String,
}

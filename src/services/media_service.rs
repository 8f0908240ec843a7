use crate::error::AppError;
use gallery_api::ApiClient;
use media_gallery::{MediaDetail, MediaItem, MediaPage, MediaQuery, MediaSource, MAX_PAGE_SIZE};
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Partial media update
///
/// An empty `taken_at` clears the stored capture time.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MediaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taken_at: Option<String>,
}

/// Files and form fields for `POST /media/upload`
#[derive(Debug, Default, Clone)]
pub struct UploadRequest {
    pub files: Vec<PathBuf>,
    pub album_id: Option<i64>,
    pub taken_at: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
struct TagsBody<'a> {
    tags: &'a [String],
}

#[derive(Debug, Deserialize)]
struct TagsEnvelope {
    #[serde(default)]
    tags: Vec<String>,
}

fn validate_query(query: &MediaQuery) -> Result<(), AppError> {
    if query.page == 0 {
        return Err(AppError::Validation("Page must be at least 1".to_string()));
    }
    if query.size == 0 || query.size > MAX_PAGE_SIZE {
        return Err(AppError::Validation(format!(
            "Page size must be between 1 and {}",
            MAX_PAGE_SIZE
        )));
    }
    Ok(())
}

/// One page of a plain listing, ordered by the server
pub async fn list_media(client: &ApiClient, query: &MediaQuery) -> Result<MediaPage, AppError> {
    validate_query(query)?;
    let page = client.list_media(query).await?;
    Ok(page)
}

pub async fn get_media(client: &ApiClient, media_id: i64) -> Result<MediaDetail, AppError> {
    let detail: MediaDetail = client.get(&format!("/media/{}", media_id), &[]).await?;
    Ok(detail)
}

pub async fn update_media(
    client: &ApiClient,
    media_id: i64,
    mut update: MediaUpdate,
) -> Result<MediaDetail, AppError> {
    if let Some(taken_at) = update.taken_at.as_deref() {
        update.taken_at = Some(taken_at.trim().to_string());
    }
    if update.title.is_none() && update.album_id.is_none() && update.taken_at.is_none() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    let detail: MediaDetail = client
        .patch(&format!("/media/{}", media_id), &update)
        .await?;
    Ok(detail)
}

pub async fn delete_media(client: &ApiClient, media_id: i64) -> Result<(), AppError> {
    let _: serde_json::Value = client.delete(&format!("/media/{}", media_id)).await?;
    log::info!("Deleted media {}", media_id);
    Ok(())
}

/// Trimmed, non-empty, unique tag names in input order
pub fn normalize_tags<S: AsRef<str>>(tags: &[S]) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.iter()
        .map(|t| t.as_ref().trim())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.to_string()))
        .map(str::to_string)
        .collect()
}

/// Replaces the tags of a media item; returns the stored tag names
pub async fn set_media_tags<S: AsRef<str>>(
    client: &ApiClient,
    media_id: i64,
    tags: &[S],
) -> Result<Vec<String>, AppError> {
    let tags = normalize_tags(tags);
    let envelope: TagsEnvelope = client
        .post(&format!("/media/{}/tags", media_id), &TagsBody { tags: &tags })
        .await?;
    Ok(envelope.tags)
}

/// Mime type for common photo and video extensions
fn guess_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_lowercase();
    let mime = match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mkv" => "video/x-matroska",
        _ => return None,
    };
    Some(mime)
}

async fn file_part(path: &Path) -> Result<Part, AppError> {
    let data = tokio::fs::read(path).await?;
    if data.is_empty() {
        return Err(AppError::Validation(format!(
            "{} is empty",
            path.display()
        )));
    }
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string());

    let part = Part::bytes(data).file_name(file_name);
    match guess_mime(path) {
        Some(mime) => part
            .mime_str(mime)
            .map_err(|e| AppError::Other(format!("Invalid mime type: {}", e))),
        None => Ok(part),
    }
}

/// Uploads one or more files in a single request
pub async fn upload_media(client: &ApiClient, request: UploadRequest) -> Result<Vec<MediaItem>, AppError> {
    if request.files.is_empty() {
        return Err(AppError::Validation("No files to upload".to_string()));
    }

    let mut form = Form::new();
    for path in &request.files {
        form = form.part("file", file_part(path).await?);
    }
    if let Some(album_id) = request.album_id {
        form = form.text("album_id", album_id.to_string());
    }
    if let Some(taken_at) = request.taken_at.filter(|t| !t.trim().is_empty()) {
        form = form.text("taken_at", taken_at.trim().to_string());
    }
    if let Some(title) = request.title.filter(|t| !t.trim().is_empty()) {
        form = form.text("title", title.trim().to_string());
    }

    let created: Vec<MediaItem> = client.post_multipart("/media/upload", form).await?;
    log::info!("Uploaded {} files", created.len());
    Ok(created)
}

/// Download URL of the original file
pub fn file_url(client: &ApiClient, media_id: i64) -> String {
    client.url(&format!("/media/{}/file", media_id))
}

/// Download URL of the preview image
pub fn preview_url(client: &ApiClient, media_id: i64) -> String {
    client.url(&format!("/media/{}/preview", media_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn client() -> ApiClient {
        ApiClient::new("http://127.0.0.1:9/").unwrap()
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(&[" beach ", "", "family", "beach", "   "]);
        assert_eq!(tags, vec!["beach".to_string(), "family".to_string()]);
    }

    #[test]
    fn test_download_urls() {
        let client = client();
        assert_eq!(file_url(&client, 5), "http://127.0.0.1:9/media/5/file");
        assert_eq!(preview_url(&client, 5), "http://127.0.0.1:9/media/5/preview");
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a/IMG_1.JPG")), Some("image/jpeg"));
        assert_eq!(guess_mime(Path::new("clip.mov")), Some("video/quicktime"));
        assert_eq!(guess_mime(Path::new("notes.txt")), None);
        assert_eq!(guess_mime(Path::new("README")), None);
    }

    #[test]
    fn test_update_keeps_empty_taken_at() {
        let update = MediaUpdate {
            taken_at: Some(String::new()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "taken_at": "" }));
    }

    #[tokio::test]
    async fn test_list_validates_size() {
        let query = MediaQuery {
            page: 1,
            size: 101,
            ..Default::default()
        };
        let err = list_media(&client(), &query).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upload_requires_files() {
        let err = upload_media(&client(), UploadRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_upload_rejects_empty_file() {
        let file = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        let request = UploadRequest {
            files: vec![file.path().to_path_buf()],
            ..Default::default()
        };
        let err = upload_media(&client(), request).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_file_part_reads_content() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(b"not really a png").unwrap();
        assert!(file_part(file.path()).await.is_ok());

        let missing = file.path().with_extension("gone");
        assert!(matches!(
            file_part(&missing).await,
            Err(AppError::Filesystem(_))
        ));
    }
}

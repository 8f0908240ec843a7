use crate::error::AppError;
use gallery_api::ApiClient;
use media_gallery::{Album, Visibility};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct AlbumCreate<'a> {
    title: &'a str,
    visibility: Visibility,
}

/// Partial album update; unset fields are left alone by the server
#[derive(Debug, Default, Clone, Serialize)]
pub struct AlbumUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_media_id: Option<i64>,
}

impl AlbumUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.visibility.is_none() && self.cover_media_id.is_none()
    }
}

/// Parses a user supplied visibility
pub fn parse_visibility(value: &str) -> Result<Visibility, AppError> {
    Visibility::parse(value).ok_or_else(|| {
        AppError::Validation(format!(
            "Visibility must be private, unlisted or public, got '{}'",
            value
        ))
    })
}

fn validate_title(title: &str) -> Result<&str, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("Album title is required".to_string()));
    }
    Ok(title)
}

/// Lists visible albums, newest first
pub async fn list_albums(
    client: &ApiClient,
    visibility: Option<Visibility>,
) -> Result<Vec<Album>, AppError> {
    let params: Vec<(&str, String)> = visibility
        .map(|v| vec![("visibility", v.as_str().to_string())])
        .unwrap_or_default();
    let albums: Vec<Album> = client.get("/albums", &params).await?;
    log::debug!("Loaded {} albums", albums.len());
    Ok(albums)
}

/// Finds one album by id in the listing
pub async fn get_album(client: &ApiClient, album_id: i64) -> Result<Album, AppError> {
    list_albums(client, None)
        .await?
        .into_iter()
        .find(|album| album.id == album_id)
        .ok_or_else(|| AppError::NotFound(format!("Album {}", album_id)))
}

pub async fn create_album(
    client: &ApiClient,
    title: &str,
    visibility: Option<Visibility>,
) -> Result<Album, AppError> {
    let title = validate_title(title)?;
    let body = AlbumCreate {
        title,
        visibility: visibility.unwrap_or(Visibility::Private),
    };
    let album: Album = client.post("/albums", &body).await?;
    log::info!("Created album {} ({})", album.id, album.title);
    Ok(album)
}

pub async fn update_album(
    client: &ApiClient,
    album_id: i64,
    mut update: AlbumUpdate,
) -> Result<Album, AppError> {
    if let Some(title) = update.title.as_deref() {
        update.title = Some(validate_title(title)?.to_string());
    }
    if update.is_empty() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    let album: Album = client
        .patch(&format!("/albums/{}", album_id), &update)
        .await?;
    Ok(album)
}

pub async fn delete_album(client: &ApiClient, album_id: i64) -> Result<(), AppError> {
    let _: serde_json::Value = client.delete(&format!("/albums/{}", album_id)).await?;
    log::info!("Deleted album {}", album_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_visibility() {
        assert_eq!(parse_visibility("Public").unwrap(), Visibility::Public);
        assert!(matches!(
            parse_visibility("secret"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = AlbumUpdate {
            visibility: Some(Visibility::Unlisted),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "visibility": "unlisted" }));
    }

    #[tokio::test]
    async fn test_create_requires_title() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = create_album(&client, "   ", None).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_update_is_rejected() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let err = update_album(&client, 1, AlbumUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

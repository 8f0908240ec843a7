use crate::error::AppError;
use gallery_api::ApiClient;
use media_gallery::Tag;
use serde::Serialize;

#[derive(Debug, Serialize)]
struct TagCreate<'a> {
    name: &'a str,
}

/// All tags, sorted by name
pub async fn list_tags(client: &ApiClient) -> Result<Vec<Tag>, AppError> {
    let tags: Vec<Tag> = client.get("/tags", &[]).await?;
    Ok(tags)
}

pub async fn create_tag(client: &ApiClient, name: &str) -> Result<Tag, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Tag name is required".to_string()));
    }
    let tag: Tag = client.post("/tags", &TagCreate { name }).await?;
    log::info!("Created tag {}", tag.name);
    Ok(tag)
}

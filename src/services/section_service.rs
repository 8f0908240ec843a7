use crate::error::AppError;
use gallery_api::ApiClient;
use media_gallery::HomeSection;
use serde::Serialize;
use std::collections::HashSet;

/// Fields for a new or updated home section
#[derive(Debug, Default, Clone, Serialize)]
pub struct SectionInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_rows: Option<u8>,
}

impl SectionInput {
    fn validated(mut self) -> Result<Self, AppError> {
        if let Some(title) = self.title.as_deref() {
            let title = title.trim();
            if title.is_empty() || title.chars().count() > 255 {
                return Err(AppError::Validation(
                    "Section title must be 1 to 255 characters".to_string(),
                ));
            }
            self.title = Some(title.to_string());
        }
        if let Some(key) = self.key.as_deref() {
            let key = key.trim();
            if key.is_empty() || key.chars().count() > 64 {
                return Err(AppError::Validation(
                    "Section key must be 1 to 64 characters".to_string(),
                ));
            }
            self.key = Some(key.to_string());
        }
        if let Some(rows) = self.preview_rows {
            if !(1..=2).contains(&rows) {
                return Err(AppError::Validation(
                    "Preview rows must be 1 or 2".to_string(),
                ));
            }
        }
        Ok(self)
    }
}

#[derive(Debug, Serialize)]
struct SectionAlbumsBody<'a> {
    album_ids: &'a [i64],
}

#[derive(Debug, Serialize)]
struct ReorderBody<'a> {
    order: &'a [i64],
}

/// Removes repeated ids, keeping the first occurrence
pub fn dedup_preserving_order(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Lists home sections in display order
pub async fn list_sections(client: &ApiClient) -> Result<Vec<HomeSection>, AppError> {
    let mut sections: Vec<HomeSection> = client.get("/home-sections", &[]).await?;
    sections.sort_by_key(|s| (s.order_index, s.id));
    Ok(sections)
}

/// Finds a section by its URL key
pub async fn find_section(client: &ApiClient, key: &str) -> Result<HomeSection, AppError> {
    let key = key.trim();
    list_sections(client)
        .await?
        .into_iter()
        .find(|section| section.key == key)
        .ok_or_else(|| AppError::NotFound(format!("Section '{}'", key)))
}

pub async fn create_section(client: &ApiClient, input: SectionInput) -> Result<HomeSection, AppError> {
    if input.title.is_none() {
        return Err(AppError::Validation("Section title is required".to_string()));
    }
    let input = SectionInput {
        preview_rows: input.preview_rows.or(Some(1)),
        ..input
    }
    .validated()?;

    let section: HomeSection = client.post("/home-sections", &input).await?;
    log::info!("Created section {} ({})", section.id, section.key);
    Ok(section)
}

pub async fn update_section(
    client: &ApiClient,
    section_id: i64,
    input: SectionInput,
) -> Result<HomeSection, AppError> {
    let input = input.validated()?;
    if input.title.is_none() && input.key.is_none() && input.preview_rows.is_none() {
        return Err(AppError::Validation("Nothing to update".to_string()));
    }
    let section: HomeSection = client
        .patch(&format!("/home-sections/{}", section_id), &input)
        .await?;
    Ok(section)
}

pub async fn delete_section(client: &ApiClient, section_id: i64) -> Result<(), AppError> {
    let _: serde_json::Value = client
        .delete(&format!("/home-sections/{}", section_id))
        .await?;
    log::info!("Deleted section {}", section_id);
    Ok(())
}

/// Replaces the albums of a section; order is kept and repeats dropped
pub async fn set_section_albums(
    client: &ApiClient,
    section_id: i64,
    album_ids: &[i64],
) -> Result<HomeSection, AppError> {
    let album_ids = dedup_preserving_order(album_ids);
    let section: HomeSection = client
        .put(
            &format!("/home-sections/{}/albums", section_id),
            &SectionAlbumsBody {
                album_ids: &album_ids,
            },
        )
        .await?;
    log::debug!(
        "Section {} now holds {} albums",
        section.key,
        section.album_ids.len()
    );
    Ok(section)
}

/// Moves the given sections to the front in this order
///
/// Sections not listed keep their relative order after them.
pub async fn reorder_sections(client: &ApiClient, order: &[i64]) -> Result<(), AppError> {
    let order = dedup_preserving_order(order);
    if order.is_empty() {
        return Ok(());
    }
    let _: serde_json::Value = client
        .put("/home-sections/reorder", &ReorderBody { order: &order })
        .await?;
    Ok(())
}

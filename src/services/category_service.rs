use crate::error::AppError;
use crate::services::section_service;
use gallery_api::ApiClient;
use media_gallery::{paginate, CategoryQuery, HomeSection, MediaItem, MediaSource, MediaType};
use serde::Serialize;

/// One page of a home section's merged media
#[derive(Debug, Clone, Serialize)]
pub struct CategoryPage {
    pub key: String,
    pub title: String,
    pub items: Vec<MediaItem>,
    pub page: u32,
    pub size: u32,
    pub total: u64,
    pub total_pages: u32,
}

/// Pages through the albums of `section`
///
/// Page 0 is read as page 1. A page past the end is clamped to the last page
/// and fetched again, so a shrinking collection never yields an empty page.
pub async fn browse_section<S: MediaSource>(
    source: &S,
    section: &HomeSection,
    page: u32,
    size: u32,
    media_type: Option<MediaType>,
) -> Result<CategoryPage, AppError> {
    let requested = page.max(1);
    let query = CategoryQuery::new(section.album_ids.clone(), requested, size).with_type(media_type);
    let mut merged = paginate(source, &query).await?;
    let total_pages = merged.total_pages(size);

    let mut page = requested;
    if requested > total_pages {
        log::debug!(
            "Page {} of '{}' is past the end, showing page {}",
            requested,
            section.key,
            total_pages
        );
        page = total_pages;
        let query = CategoryQuery {
            page,
            ..query
        };
        merged = paginate(source, &query).await?;
    }

    Ok(CategoryPage {
        key: section.key.clone(),
        title: section.title.clone(),
        total_pages: merged.total_pages(size),
        items: merged.items,
        page,
        size,
        total: merged.total,
    })
}

/// Resolves a section by key and pages through its albums
pub async fn browse_category(
    client: &ApiClient,
    key: &str,
    page: u32,
    size: u32,
    media_type: Option<MediaType>,
) -> Result<CategoryPage, AppError> {
    let section = section_service::find_section(client, key).await?;
    browse_section(client, &section, page, size, media_type).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use gallery_api::ApiError;
    use media_gallery::{MediaPage, MediaQuery};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        albums: HashMap<i64, Vec<MediaItem>>,
        calls: AtomicUsize,
    }

    impl MediaSource for FixedSource {
        async fn list_media(&self, query: &MediaQuery) -> Result<MediaPage, ApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let items = self
                .albums
                .get(&query.album_id.unwrap_or_default())
                .cloned()
                .unwrap_or_default();
            let total = items.len() as u64;
            let start = ((query.page - 1) * query.size) as usize;
            Ok(MediaPage {
                items: items
                    .into_iter()
                    .skip(start)
                    .take(query.size as usize)
                    .collect(),
                page: Some(query.page),
                size: Some(query.size),
                total,
            })
        }
    }

    fn item(id: i64, name: &str) -> MediaItem {
        MediaItem {
            id,
            media_type: MediaType::Image,
            album_id: None,
            title: Some(name.to_string()),
            filename: None,
            mime_type: None,
            bytes: None,
            created_at: Some("2024-03-01T09:00:00".to_string()),
            taken_at: None,
            preview_path: None,
        }
    }

    fn section(album_ids: Vec<i64>) -> HomeSection {
        HomeSection {
            id: 1,
            key: "family".to_string(),
            title: "Family".to_string(),
            preview_rows: 1,
            order_index: 0,
            album_ids,
            albums: Vec::new(),
        }
    }

    fn source() -> FixedSource {
        let mut albums = HashMap::new();
        albums.insert(1, (1..=4).map(|i| item(i, &format!("{}.jpg", i))).collect());
        albums.insert(2, (5..=7).map(|i| item(i, &format!("{}.jpg", i))).collect());
        FixedSource {
            albums,
            calls: AtomicUsize::new(0),
        }
    }

    #[tokio::test]
    async fn test_browse_reports_total_pages() {
        let source = source();
        let page = browse_section(&source, &section(vec![1, 2]), 1, 3, None)
            .await
            .unwrap();
        assert_eq!(page.total, 7);
        assert_eq!(page.total_pages, 3);
        let ids: Vec<i64> = page.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_page_past_end_is_clamped() {
        let source = source();
        let page = browse_section(&source, &section(vec![1, 2]), 9, 3, None)
            .await
            .unwrap();
        assert_eq!(page.page, 3);
        let ids: Vec<i64> = page.items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![7]);
    }

    #[tokio::test]
    async fn test_page_zero_reads_first_page() {
        let source = source();
        let page = browse_section(&source, &section(vec![2]), 0, 2, None)
            .await
            .unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_empty_section_makes_no_requests() {
        let source = source();
        let page = browse_section(&source, &section(Vec::new()), 4, 12, None)
            .await
            .unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.page, 1);
        assert_eq!(page.total_pages, 1);
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}

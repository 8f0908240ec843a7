use crate::models::{MediaItem, MediaPage, MediaQuery, MediaType};
use gallery_api::{clean_params, ApiClient, ApiError};
use std::future::Future;

/// Largest page the server hands out per request
pub const MAX_PAGE_SIZE: u32 = 100;

/// Anything that can list one page of media for a query
pub trait MediaSource {
    fn list_media(
        &self,
        query: &MediaQuery,
    ) -> impl Future<Output = Result<MediaPage, ApiError>> + Send;
}

impl MediaSource for ApiClient {
    fn list_media(
        &self,
        query: &MediaQuery,
    ) -> impl Future<Output = Result<MediaPage, ApiError>> + Send {
        let params = query_params(query);
        async move { self.get("/media", &params).await }
    }
}

/// Query string for `GET /media`
pub fn query_params(query: &MediaQuery) -> Vec<(&'static str, String)> {
    clean_params(&[
        ("album_id", query.album_id.map(|id| id.to_string())),
        ("type", query.media_type.map(|t| t.as_str().to_string())),
        ("q", query.search.clone()),
        ("page", Some(query.page.to_string())),
        ("size", Some(query.size.to_string())),
        ("sort", Some(query.sort.as_str().to_string())),
    ])
}

/// Leading items of one album plus the total the server reported
#[derive(Debug, Clone, PartialEq)]
pub struct AlbumSlice {
    pub album_id: i64,
    pub items: Vec<MediaItem>,
    pub total: u64,
}

/// Collect up to `needed` leading items of an album
///
/// Pages through the album with a fixed page size of
/// `min(needed, MAX_PAGE_SIZE)` and stops at the first short page. The total
/// is taken from the first response only.
pub async fn fetch_album_slice<S: MediaSource>(
    source: &S,
    album_id: i64,
    needed: usize,
    media_type: Option<MediaType>,
) -> Result<AlbumSlice, ApiError> {
    let mut slice = AlbumSlice {
        album_id,
        items: Vec::new(),
        total: 0,
    };
    if needed == 0 {
        return Ok(slice);
    }

    // needed.min(100) always fits
    let chunk = needed.min(MAX_PAGE_SIZE as usize) as u32;
    let mut page = 1;

    loop {
        let query = MediaQuery::for_album(album_id, page, chunk, media_type);
        let response = source.list_media(&query).await?;
        if page == 1 {
            slice.total = response.total;
        }

        let received = response.items.len();
        slice.items.extend(response.items);

        if received < chunk as usize || slice.items.len() >= needed {
            break;
        }
        page += 1;
    }

    slice.items.truncate(needed);
    log::debug!(
        "Album {}: {} of {} items after {} request(s)",
        album_id,
        slice.items.len(),
        slice.total,
        page
    );
    Ok(slice)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// In-memory albums that record every request
    #[derive(Default)]
    pub struct MockSource {
        albums: HashMap<i64, Vec<MediaItem>>,
        /// Overrides the reported total of an album
        totals: HashMap<i64, u64>,
        failing: Option<i64>,
        pub calls: Mutex<Vec<MediaQuery>>,
    }

    impl MockSource {
        pub fn new() -> Self {
            Self::default()
        }

        /// Items are served in the given order, as the server's own sort left them
        pub fn with_album(mut self, album_id: i64, items: Vec<MediaItem>) -> Self {
            self.albums.insert(album_id, items);
            self
        }

        pub fn with_total(mut self, album_id: i64, total: u64) -> Self {
            self.totals.insert(album_id, total);
            self
        }

        pub fn failing_on(mut self, album_id: i64) -> Self {
            self.failing = Some(album_id);
            self
        }

        pub fn call_count(&self) -> usize {
            self.calls.lock().map(|c| c.len()).unwrap_or(0)
        }

        pub fn calls_for(&self, album_id: i64) -> Vec<MediaQuery> {
            self.calls
                .lock()
                .map(|c| {
                    c.iter()
                        .filter(|q| q.album_id == Some(album_id))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default()
        }
    }

    impl MediaSource for MockSource {
        async fn list_media(&self, query: &MediaQuery) -> Result<MediaPage, ApiError> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(query.clone());
            }

            let album_id = query.album_id.unwrap_or_default();
            if self.failing == Some(album_id) {
                return Err(ApiError::Http { status: 500 });
            }

            let matching: Vec<MediaItem> = self
                .albums
                .get(&album_id)
                .map(|items| {
                    items
                        .iter()
                        .filter(|i| query.media_type.map_or(true, |t| i.media_type == t))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            let total = self
                .totals
                .get(&album_id)
                .copied()
                .unwrap_or(matching.len() as u64);
            let start = ((query.page - 1) * query.size) as usize;
            let items = matching
                .into_iter()
                .skip(start)
                .take(query.size as usize)
                .collect();

            Ok(MediaPage {
                items,
                page: Some(query.page),
                size: Some(query.size),
                total,
            })
        }
    }

    /// Item carrying its file name
    pub fn media(id: i64, name: &str, created_at: &str, media_type: MediaType) -> MediaItem {
        MediaItem {
            media_type,
            filename: Some(name.to_string()),
            ..listed(id, name, created_at)
        }
    }

    /// Item shaped like a `GET /media` list entry: a title, no file name
    pub fn listed(id: i64, title: &str, created_at: &str) -> MediaItem {
        MediaItem {
            id,
            media_type: MediaType::Image,
            album_id: None,
            title: Some(title.to_string()),
            filename: None,
            mime_type: None,
            bytes: None,
            created_at: Some(created_at.to_string()),
            taken_at: None,
            preview_path: None,
        }
    }

    /// `count` images named 1.jpg.. two minutes apart on one day
    pub fn album_items(first_id: i64, count: usize, minute_offset: u32) -> Vec<MediaItem> {
        (0..count)
            .map(|i| {
                let minute = minute_offset + i as u32 * 2;
                media(
                    first_id + i as i64,
                    &format!("{}.jpg", i + 1),
                    &format!("2024-06-01T{:02}:{:02}:00", 8 + minute / 60, minute % 60),
                    MediaType::Image,
                )
            })
            .collect()
    }

    #[test]
    fn test_query_params_drop_empty_values() {
        let query = MediaQuery::for_album(4, 2, 50, Some(MediaType::Video));
        let params = query_params(&query);
        assert!(params.contains(&("album_id", "4".to_string())));
        assert!(params.contains(&("type", "video".to_string())));
        assert!(params.contains(&("page", "2".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "q"));
    }

    #[tokio::test]
    async fn test_short_first_page_exhausts_source() {
        let source = MockSource::new().with_album(1, album_items(1, 2, 0));
        let slice = fetch_album_slice(&source, 1, 10, None).await.unwrap();

        assert_eq!(slice.items.len(), 2);
        assert_eq!(slice.total, 2);
        assert_eq!(source.call_count(), 1);
    }

    #[tokio::test]
    async fn test_pages_with_fixed_chunk_until_needed() {
        let source = MockSource::new().with_album(1, album_items(1, 250, 0));
        let slice = fetch_album_slice(&source, 1, 150, None).await.unwrap();

        assert_eq!(slice.items.len(), 150);
        let calls = source.calls_for(1);
        assert_eq!(calls.len(), 2);
        assert!(calls.iter().all(|q| q.size == MAX_PAGE_SIZE));
        assert_eq!(calls[1].page, 2);
        // no duplicates across pages
        let mut ids: Vec<i64> = slice.items.iter().map(|i| i.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), 150);
    }

    #[tokio::test]
    async fn test_full_page_meeting_need_stops() {
        let source = MockSource::new().with_album(1, album_items(1, 20, 0));
        let slice = fetch_album_slice(&source, 1, 20, None).await.unwrap();
        assert_eq!(slice.items.len(), 20);
        assert_eq!(source.call_count(), 1);
    }
}

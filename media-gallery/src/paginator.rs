//! Cross-album pagination
//!
//! Merges several independently paginated albums into one ordered listing and
//! cuts page N out of it. Every album is asked for its first `page * size`
//! items, which is always enough: in the worst case the whole window comes
//! from a single album. Deeper pages therefore cost more requests per album.

use crate::models::{MediaType, MergedPage};
use crate::ordering::sort_media;
use crate::source::{fetch_album_slice, MediaSource};
use futures_util::future::try_join_all;
use gallery_api::ApiError;

/// One page of a merged listing over a set of albums
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryQuery {
    pub album_ids: Vec<i64>,
    /// 1-based
    pub page: u32,
    pub size: u32,
    pub media_type: Option<MediaType>,
}

impl CategoryQuery {
    pub fn new(album_ids: Vec<i64>, page: u32, size: u32) -> Self {
        Self {
            album_ids,
            page,
            size,
            media_type: None,
        }
    }

    pub fn with_type(mut self, media_type: Option<MediaType>) -> Self {
        self.media_type = media_type;
        self
    }
}

/// Sorted, de-duplicated album ids
pub fn normalize_album_ids(album_ids: &[i64]) -> Vec<i64> {
    let mut ids = album_ids.to_vec();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Fetch page `query.page` of the merged listing
///
/// All albums are fetched concurrently; the first failure fails the whole
/// page. `total` is the sum of the totals each album reported.
pub async fn paginate<S: MediaSource>(
    source: &S,
    query: &CategoryQuery,
) -> Result<MergedPage, ApiError> {
    if query.page == 0 || query.size == 0 {
        return Err(ApiError::Validation(
            "Page and size must be at least 1".to_string(),
        ));
    }

    let album_ids = normalize_album_ids(&query.album_ids);
    if album_ids.is_empty() {
        return Ok(MergedPage::default());
    }

    let size = query.size as usize;
    let start = (query.page as usize - 1)
        .checked_mul(size)
        .ok_or_else(|| ApiError::Validation("Page is out of range".to_string()))?;
    let needed = start
        .checked_add(size)
        .ok_or_else(|| ApiError::Validation("Page is out of range".to_string()))?;

    let slices = try_join_all(
        album_ids
            .iter()
            .map(|&album_id| fetch_album_slice(source, album_id, needed, query.media_type)),
    )
    .await?;

    let total: u64 = slices.iter().map(|s| s.total).sum();
    // Slices stay in album id order and each keeps the server's order, which
    // the stable sort preserves on ties
    let mut merged: Vec<_> = slices.into_iter().flat_map(|s| s.items).collect();
    sort_media(&mut merged);

    let items = merged.into_iter().skip(start).take(size).collect::<Vec<_>>();
    log::debug!(
        "Merged page {} of {} album(s): {} item(s), total {}",
        query.page,
        album_ids.len(),
        items.len(),
        total
    );

    Ok(MergedPage { items, total })
}

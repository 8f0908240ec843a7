use serde::{Deserialize, Serialize};

/// Kind of a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    /// Parses a type filter; `all` and empty mean no filter
    pub fn parse_filter(value: &str) -> Result<Option<MediaType>, String> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Ok(None),
            "image" => Ok(Some(MediaType::Image)),
            "video" => Ok(Some(MediaType::Video)),
            other => Err(format!("Unknown media type: {}", other)),
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A photo or video as listed by the server
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: i64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(default)]
    pub album_id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    /// Only present on detail responses
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub bytes: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub taken_at: Option<String>,
    #[serde(default)]
    pub preview_path: Option<String>,
}

impl MediaItem {
    /// Name shown to the user: the file name, else the title
    pub fn display_name(&self) -> &str {
        self.filename
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or("")
    }
}

/// Full media record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaDetail {
    #[serde(flatten)]
    pub item: MediaItem,
    #[serde(default)]
    pub width: Option<i32>,
    #[serde(default)]
    pub height: Option<i32>,
    #[serde(default)]
    pub duration_sec: Option<i32>,
    #[serde(default)]
    pub storage_path: Option<String>,
    #[serde(default)]
    pub sha256: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
}

/// One page of a single listing as returned by `GET /media`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaPage {
    #[serde(default)]
    pub items: Vec<MediaItem>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub size: Option<u32>,
    #[serde(default)]
    pub total: u64,
}

/// One page of the merged, globally ordered listing
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MergedPage {
    pub items: Vec<MediaItem>,
    pub total: u64,
}

impl MergedPage {
    /// Number of pages for the given page size, never less than one
    pub fn total_pages(&self, size: u32) -> u32 {
        if size == 0 {
            return 1;
        }
        let pages = self.total.div_ceil(u64::from(size));
        u32::try_from(pages).unwrap_or(u32::MAX).max(1)
    }
}

/// Server-side sort column for plain listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MediaSort {
    #[default]
    CreatedAt,
    TakenAt,
}

impl MediaSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaSort::CreatedAt => "created_at",
            MediaSort::TakenAt => "taken_at",
        }
    }
}

/// Query for one page of one listing
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MediaQuery {
    pub album_id: Option<i64>,
    pub media_type: Option<MediaType>,
    pub search: Option<String>,
    pub page: u32,
    pub size: u32,
    pub sort: MediaSort,
}

impl MediaQuery {
    pub fn for_album(album_id: i64, page: u32, size: u32, media_type: Option<MediaType>) -> Self {
        Self {
            album_id: Some(album_id),
            media_type,
            page,
            size,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Private,
    Unlisted,
    Public,
}

impl Visibility {
    pub fn parse(value: &str) -> Option<Visibility> {
        match value.trim().to_lowercase().as_str() {
            "private" => Some(Visibility::Private),
            "unlisted" => Some(Visibility::Unlisted),
            "public" => Some(Visibility::Public),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Private => "private",
            Visibility::Unlisted => "unlisted",
            Visibility::Public => "public",
        }
    }
}

/// An album; the unit the paginator merges over
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Album {
    pub id: i64,
    pub title: String,
    pub visibility: Visibility,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub owner_id: Option<i64>,
    #[serde(default)]
    pub cover_media_id: Option<i64>,
    #[serde(default)]
    pub media_count: Option<u64>,
    #[serde(default)]
    pub first_media_id: Option<i64>,
    #[serde(default)]
    pub first_media_preview_path: Option<String>,
    #[serde(default)]
    pub first_media_storage_path: Option<String>,
    #[serde(default)]
    pub first_media_type: Option<MediaType>,
}

impl Album {
    /// Media id to show as the album cover
    pub fn cover_id(&self) -> Option<i64> {
        self.cover_media_id.or(self.first_media_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionAlbum {
    pub album_id: i64,
    pub title: String,
    pub visibility: Visibility,
}

/// A curated home page section grouping several albums
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomeSection {
    pub id: i64,
    pub key: String,
    pub title: String,
    pub preview_rows: u8,
    pub order_index: i32,
    #[serde(default)]
    pub album_ids: Vec<i64>,
    #[serde(default)]
    pub albums: Vec<SectionAlbum>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    X,
    Instagram,
}

impl SocialPlatform {
    /// Parses a platform filter; `all` and empty mean no filter
    pub fn parse_filter(value: &str) -> Result<Option<SocialPlatform>, String> {
        match value.trim().to_lowercase().as_str() {
            "" | "all" => Ok(None),
            "x" => Ok(Some(SocialPlatform::X)),
            "instagram" => Ok(Some(SocialPlatform::Instagram)),
            other => Err(format!("Unknown platform: {}", other)),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SocialPlatform::X => "x",
            SocialPlatform::Instagram => "instagram",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialMedia {
    pub id: i64,
    pub media_type: MediaType,
    pub url: String,
    #[serde(default)]
    pub preview_url: Option<String>,
    #[serde(default)]
    pub alt_text: Option<String>,
    #[serde(default)]
    pub order_index: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialReply {
    pub id: i64,
    pub author_name: String,
    pub author_handle: String,
    #[serde(default)]
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub permalink: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPost {
    pub id: i64,
    pub platform: SocialPlatform,
    pub external_id: String,
    pub author_name: String,
    pub author_handle: String,
    #[serde(default)]
    pub author_avatar_url: Option<String>,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub like_count: i64,
    #[serde(default)]
    pub repost_count: i64,
    #[serde(default)]
    pub reply_count: i64,
    #[serde(default)]
    pub is_pinned: bool,
    #[serde(default)]
    pub permalink: Option<String>,
    #[serde(default)]
    pub media: Vec<SocialMedia>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialPostDetail {
    #[serde(flatten)]
    pub post: SocialPost,
    #[serde(default)]
    pub replies: Vec<SocialReply>,
}

/// Cursor-paginated feed page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialFeedPage {
    #[serde(default)]
    pub items: Vec<SocialPost>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_item_from_list_response() {
        let json = r#"{
            "id": 12, "type": "video", "album_id": 3, "title": "7.mp4",
            "mime_type": "video/mp4", "bytes": 1024,
            "created_at": "2024-05-01T10:00:00", "taken_at": null, "preview_path": "p/12.jpg"
        }"#;
        let item: MediaItem = serde_json::from_str(json).unwrap();
        assert_eq!(item.media_type, MediaType::Video);
        assert_eq!(item.display_name(), "7.mp4");
        assert!(item.filename.is_none());
    }

    #[test]
    fn test_media_detail_flattens_summary() {
        let json = r#"{
            "id": 5, "type": "image", "filename": "2.jpg", "title": "Beach",
            "tags": ["summer"], "width": 800, "height": 600
        }"#;
        let detail: MediaDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.item.id, 5);
        assert_eq!(detail.item.display_name(), "2.jpg");
        assert_eq!(detail.tags, vec!["summer".to_string()]);
    }

    #[test]
    fn test_parse_type_filter() {
        assert_eq!(MediaType::parse_filter("all"), Ok(None));
        assert_eq!(MediaType::parse_filter("Image"), Ok(Some(MediaType::Image)));
        assert!(MediaType::parse_filter("audio").is_err());
    }

    #[test]
    fn test_total_pages() {
        let page = MergedPage {
            items: Vec::new(),
            total: 25,
        };
        assert_eq!(page.total_pages(12), 3);
        assert_eq!(MergedPage::default().total_pages(12), 1);
    }

    #[test]
    fn test_album_cover_prefers_explicit_cover() {
        let json = r#"{"id": 1, "title": "Trip", "visibility": "public",
            "cover_media_id": null, "first_media_id": 9}"#;
        let mut album: Album = serde_json::from_str(json).unwrap();
        assert_eq!(album.cover_id(), Some(9));
        album.cover_media_id = Some(4);
        assert_eq!(album.cover_id(), Some(4));
    }
}

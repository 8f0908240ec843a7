//! # Media Gallery
//!
//! Media models and cross-album pagination for the family gallery.
//!
//! This crate provides:
//! - Wire models for media, albums, home sections, tags and social posts
//! - The deterministic merge order used across albums
//! - A paginator that merges several independently paginated albums into one
//!   ordered listing without fetching everything up front
//!
//! ## Sources
//!
//! The paginator reads through the [`MediaSource`] trait. `gallery_api::ApiClient`
//! implements it against `GET /media`; tests use an in-memory source.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use gallery_api::ApiClient;
//! use media_gallery::{paginate, CategoryQuery, MediaType};
//!
//! let client = ApiClient::new("http://localhost:8000")?;
//! let query = CategoryQuery::new(vec![3, 7, 9], 2, 12).with_type(Some(MediaType::Image));
//! let page = paginate(&client, &query).await?;
//! println!("{} of {} items", page.items.len(), page.total);
//! ```

pub mod models;
pub mod ordering;
pub mod paginator;
pub mod source;

pub use models::{
    Album, HomeSection, MediaDetail, MediaItem, MediaPage, MediaQuery, MediaSort, MediaType,
    MergedPage, SectionAlbum, SocialFeedPage, SocialMedia, SocialPlatform, SocialPost,
    SocialPostDetail, SocialReply, Tag, Visibility,
};
pub use ordering::{compare_media, sort_media, MediaSortKey};
pub use paginator::{normalize_album_ids, paginate, CategoryQuery};
pub use source::{fetch_album_slice, AlbumSlice, MediaSource, MAX_PAGE_SIZE};

use crate::error::AppError;
use gallery_api::{clean_params, ApiClient};
use media_gallery::{SocialFeedPage, SocialPlatform, SocialPost, SocialPostDetail};

pub const DEFAULT_FEED_LIMIT: u32 = 10;
pub const MAX_FEED_LIMIT: u32 = 50;

/// One request against the social feed
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    pub platform: Option<SocialPlatform>,
    pub limit: u32,
    /// Opaque cursor from the previous page
    pub cursor: Option<String>,
}

impl Default for FeedQuery {
    fn default() -> Self {
        Self {
            platform: None,
            limit: DEFAULT_FEED_LIMIT,
            cursor: None,
        }
    }
}

impl FeedQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        clean_params(&[
            ("platform", self.platform.map(|p| p.as_str().to_string())),
            ("limit", Some(self.limit.to_string())),
            ("cursor", self.cursor.clone()),
        ])
    }
}

pub async fn list_posts(client: &ApiClient, query: &FeedQuery) -> Result<SocialFeedPage, AppError> {
    if query.limit == 0 || query.limit > MAX_FEED_LIMIT {
        return Err(AppError::Validation(format!(
            "Limit must be between 1 and {}",
            MAX_FEED_LIMIT
        )));
    }
    let page: SocialFeedPage = client.get("/social/posts", &query.params()).await?;
    Ok(page)
}

/// Follows `next_cursor` until `max_pages` pages were read or the feed ends
///
/// Pinned posts only appear on the first page.
pub async fn collect_posts(
    client: &ApiClient,
    query: FeedQuery,
    max_pages: usize,
) -> Result<Vec<SocialPost>, AppError> {
    let mut query = query;
    let mut posts = Vec::new();

    for _ in 0..max_pages {
        let page = list_posts(client, &query).await?;
        posts.extend(page.items);
        match page.next_cursor {
            Some(cursor) if page.has_more => query.cursor = Some(cursor),
            _ => break,
        }
    }

    log::debug!("Collected {} social posts", posts.len());
    Ok(posts)
}

pub async fn get_post(client: &ApiClient, post_id: i64) -> Result<SocialPostDetail, AppError> {
    let detail: SocialPostDetail = client
        .get(&format!("/social/posts/{}", post_id), &[])
        .await?;
    Ok(detail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_skip_missing_values() {
        let query = FeedQuery::default();
        assert_eq!(query.params(), vec![("limit", "10".to_string())]);

        let query = FeedQuery {
            platform: Some(SocialPlatform::Instagram),
            limit: 5,
            cursor: Some("2024-05-01T10:00:00|42".to_string()),
        };
        let params = query.params();
        assert_eq!(params[0], ("platform", "instagram".to_string()));
        assert_eq!(params[2], ("cursor", "2024-05-01T10:00:00|42".to_string()));
    }

    #[tokio::test]
    async fn test_limit_bounds() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let query = FeedQuery {
            limit: 51,
            ..Default::default()
        };
        assert!(matches!(
            list_posts(&client, &query).await,
            Err(AppError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_zero_pages_makes_no_request() {
        let client = ApiClient::new("http://127.0.0.1:9").unwrap();
        let posts = collect_posts(&client, FeedQuery::default(), 0).await.unwrap();
        assert!(posts.is_empty());
    }
}

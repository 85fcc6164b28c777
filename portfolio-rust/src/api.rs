use crate::{Article, PortfolioResult};
use portfolio_session::{api::build_client, client_utils, SessionOptions};
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const BLOGS_PATH: &str = "/api/v1/portfolio/blogs";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlogsResponse {
    #[serde(default)]
    pub blogs: Option<Vec<Article>>,
}

/// Source of the blog list for the portfolio store.
#[async_trait::async_trait]
pub trait BlogsApi: Send + Sync {
    /// `GET /api/v1/portfolio/blogs` with `Authorization: Bearer <token>`.
    async fn fetch_blogs(&self, bearer_token: &str) -> PortfolioResult<BlogsResponse>;
}

pub struct HttpBlogsApi {
    url: String,
    client: Client,
}

impl HttpBlogsApi {
    pub fn new(options: &SessionOptions) -> PortfolioResult<Self> {
        Ok(Self {
            url: options.endpoint(BLOGS_PATH),
            client: build_client(options)?,
        })
    }
}

#[async_trait::async_trait]
impl BlogsApi for HttpBlogsApi {
    async fn fetch_blogs(&self, bearer_token: &str) -> PortfolioResult<BlogsResponse> {
        Ok(client_utils::get_json(&self.client, &self.url, Some(bearer_token)).await?)
    }
}

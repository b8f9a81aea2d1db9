use std::fmt;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use rmg_core::pagination;
use rmg_core::{
    Analysis, AnalyzeRequest, ApiInfo, Error, FetchNewsSummary, HeadlinesQuery, HealthReport,
    MarketInsights, NewsApi, NewsPage, NewsQuery, Result, SentimentReport, SourcesResponse,
    TrendingTopics,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};
use url::Url;

use crate::config::{ClientConfig, Timeouts};

const ERROR_BODY_LIMIT: usize = 200;

/// [`NewsApi`] over HTTP. One attempt per call, bounded by the endpoint's deadline.
pub struct HttpNewsApi {
    client: Client,
    base_url: Url,
    timeouts: Timeouts,
}

impl fmt::Debug for HttpNewsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpNewsApi")
            .field("client", &"<reqwest::Client>")
            .field("base_url", &self.base_url.as_str())
            .field("timeouts", &self.timeouts)
            .finish()
    }
}

impl HttpNewsApi {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("rmg-news/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url,
            timeouts: config.timeouts,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint_url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        segments: &[&str],
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T> {
        let url = self.endpoint_url(segments)?;
        let request = self.client.get(url).query(query);
        self.send(endpoint, request, timeout).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        segments: &[&str],
        query: &[(&str, String)],
        body: &B,
        timeout: Duration,
    ) -> Result<T> {
        let url = self.endpoint_url(segments)?;
        let request = self.client.post(url).query(query).json(body);
        self.send(endpoint, request, timeout).await
    }

    /// Runs the request under `timeout`. Dropping the future on expiry aborts
    /// the in-flight request.
    async fn send<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        request: RequestBuilder,
        timeout: Duration,
    ) -> Result<T> {
        let started = Instant::now();
        debug!(endpoint, timeout_secs = timeout.as_secs(), "Calling backend");

        let call = async {
            let response = request.send().await?;
            let status = response.status();
            let body = response.text().await?;
            if !status.is_success() {
                return Err(Error::Status {
                    endpoint: endpoint.to_string(),
                    status: status.as_u16(),
                    body: truncate(&body, ERROR_BODY_LIMIT),
                });
            }
            serde_json::from_str::<T>(&body).map_err(|source| Error::Decode {
                endpoint: endpoint.to_string(),
                source,
            })
        };

        let result = match tokio::time::timeout(timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout {
                endpoint: endpoint.to_string(),
                timeout,
            }),
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(_) => debug!(endpoint, elapsed_ms, "Backend call succeeded"),
            Err(e) => warn!(endpoint, elapsed_ms, error = %e, "Backend call failed"),
        }
        result
    }
}

fn page_params(page: u32, per_page: u32) -> Vec<(&'static str, String)> {
    let (page, per_page) = pagination::normalize(page, per_page);
    vec![("page", page.to_string()), ("per_page", per_page.to_string())]
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn truncate(body: &str, limit: usize) -> String {
    match body.char_indices().nth(limit) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[derive(Serialize)]
struct FetchNewsRequest {
    articles_per_source: u32,
}

#[async_trait]
impl NewsApi for HttpNewsApi {
    async fn api_info(&self) -> Result<ApiInfo> {
        self.get("/", &[""], &[], self.timeouts.health).await
    }

    async fn health(&self) -> Result<HealthReport> {
        self.get("/health", &["health"], &[], self.timeouts.health)
            .await
    }

    async fn get_sources(&self) -> Result<SourcesResponse> {
        self.get("/api/sources", &["api", "sources"], &[], self.timeouts.sources)
            .await
    }

    async fn get_news(&self, query: &NewsQuery) -> Result<NewsPage> {
        let mut params = page_params(query.page, query.per_page);
        if let Some(q) = non_blank(query.query.as_deref()) {
            params.push(("query", q.to_string()));
        }
        if let Some(source) = non_blank(query.source.as_deref()) {
            params.push(("source", source.to_string()));
        }
        self.get("/api/news", &["api", "news"], &params, self.timeouts.news)
            .await
    }

    async fn get_news_by_source(&self, source_id: &str, page: u32, per_page: u32) -> Result<NewsPage> {
        let endpoint = format!("/api/news/sources/{}", source_id);
        let params = page_params(page, per_page);
        self.get(
            &endpoint,
            &["api", "news", "sources", source_id],
            &params,
            self.timeouts.news,
        )
        .await
    }

    async fn fetch_news(&self, articles_per_source: u32) -> Result<FetchNewsSummary> {
        let params = [("articles_per_source", articles_per_source.to_string())];
        self.post(
            "/api/fetch-news",
            &["api", "fetch-news"],
            &params,
            &FetchNewsRequest { articles_per_source },
            self.timeouts.fetch_news,
        )
        .await
    }

    async fn get_headlines(&self, query: &HeadlinesQuery) -> Result<NewsPage> {
        let params = [
            ("category", query.category.clone()),
            ("country", query.country.clone()),
            ("page_size", query.page_size.to_string()),
            ("per_page", query.page_size.to_string()),
        ];
        self.get(
            "/api/headlines",
            &["api", "headlines"],
            &params,
            self.timeouts.headlines,
        )
        .await
    }

    async fn get_trending(&self, hours_back: u32) -> Result<TrendingTopics> {
        let params = [("hours_back", hours_back.to_string())];
        self.get(
            "/api/trending",
            &["api", "trending"],
            &params,
            self.timeouts.trending,
        )
        .await
    }

    async fn get_insights(&self) -> Result<MarketInsights> {
        self.get("/api/insights", &["api", "insights"], &[], self.timeouts.insights)
            .await
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis> {
        self.post(
            "/api/analyze",
            &["api", "analyze"],
            &[],
            request,
            self.timeouts.analyze,
        )
        .await
    }

    async fn sentiment(&self, text: &str) -> Result<SentimentReport> {
        let params = [("text", text.to_string())];
        self.get(
            "/api/sentiment",
            &["api", "sentiment"],
            &params,
            self.timeouts.sentiment,
        )
        .await
    }
}

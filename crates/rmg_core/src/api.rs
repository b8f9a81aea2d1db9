use async_trait::async_trait;

use crate::types::{
    Analysis, AnalyzeRequest, ApiInfo, FetchNewsSummary, HeadlinesQuery, HealthReport,
    MarketInsights, NewsPage, NewsQuery, SentimentReport, SourcesResponse, TrendingTopics,
};
use crate::Result;

/// The RMG news backend as seen from a client.
#[async_trait]
pub trait NewsApi: Send + Sync {
    /// Welcome payload served at the API root
    async fn api_info(&self) -> Result<ApiInfo>;

    /// Full health report
    async fn health(&self) -> Result<HealthReport>;

    /// Liveness probe; failures are reported as `false`, never as errors
    async fn health_check(&self) -> bool {
        match self.health().await {
            Ok(report) => report.is_healthy(),
            Err(e) => {
                tracing::warn!(error = %e, "Health check failed");
                false
            }
        }
    }

    /// Configured upstream news sources
    async fn get_sources(&self) -> Result<SourcesResponse>;

    /// Paginated article listing, optionally filtered by query and source
    async fn get_news(&self, query: &NewsQuery) -> Result<NewsPage>;

    /// Paginated article listing scoped to one source
    async fn get_news_by_source(&self, source_id: &str, page: u32, per_page: u32) -> Result<NewsPage>;

    /// Trigger backend ingestion from every source
    async fn fetch_news(&self, articles_per_source: u32) -> Result<FetchNewsSummary>;

    async fn get_headlines(&self, query: &HeadlinesQuery) -> Result<NewsPage>;

    async fn get_trending(&self, hours_back: u32) -> Result<TrendingTopics>;

    async fn get_insights(&self) -> Result<MarketInsights>;

    /// AI analysis of a single article
    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis>;

    async fn sentiment(&self, text: &str) -> Result<SentimentReport>;
}

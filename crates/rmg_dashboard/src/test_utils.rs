use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rmg_core::{
    Analysis, AnalyzeRequest, ApiInfo, Article, Error, FetchNewsSummary, HeadlinesQuery,
    HealthReport, MarketImpact, MarketInsights, NewsApi, NewsPage, NewsQuery, Result,
    SentimentReport, Source, SourcesResponse, TrendingTopics,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Health,
    Sources,
    News(NewsQuery),
    NewsBySource { source: String, page: u32, per_page: u32 },
    FetchNews(u32),
    Analyze(String),
    Other(&'static str),
}

impl Call {
    fn name(&self) -> &'static str {
        match self {
            Call::Health => "health",
            Call::Sources => "sources",
            Call::News(_) => "news",
            Call::NewsBySource { .. } => "news_by_source",
            Call::FetchNews(_) => "fetch_news",
            Call::Analyze(_) => "analyze",
            Call::Other(name) => *name,
        }
    }
}

pub fn article(id: i64, source: &str) -> Article {
    Article {
        id,
        title: format!("Article {}", id),
        content: Some(format!("Garment export story number {}.", id)),
        summary: None,
        url: format!("https://{}.example/{}", source, id),
        source: source.to_string(),
        source_url: None,
        author: Some("Desk".to_string()),
        published_at: Utc::now(),
        created_at: None,
        updated_at: None,
        ai_summary: None,
        market_impact: None,
        confidence_score: None,
        is_processed: false,
        sentiment_score: None,
        sentiment_label: None,
        relevance_score: None,
    }
}

fn failure(endpoint: &str) -> Error {
    Error::Status {
        endpoint: endpoint.to_string(),
        status: 500,
        body: "mock failure".to_string(),
    }
}

/// Scriptable in-memory backend that records every call.
pub struct MockApi {
    healthy: AtomicBool,
    sources_fail: bool,
    news_fail: bool,
    fetch_fail: bool,
    total: u64,
    failing_titles: Vec<String>,
    analysis_delay: Option<Duration>,
    calls: Mutex<Vec<Call>>,
}

impl MockApi {
    pub fn healthy() -> Self {
        Self {
            healthy: AtomicBool::new(true),
            sources_fail: false,
            news_fail: false,
            fetch_fail: false,
            total: 47,
            failing_titles: Vec::new(),
            analysis_delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unhealthy() -> Self {
        let api = Self::healthy();
        api.set_healthy(false);
        api
    }

    /// Flip the health endpoint between calls.
    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::SeqCst);
    }

    pub fn failing_sources(mut self) -> Self {
        self.sources_fail = true;
        self
    }

    pub fn failing_news(mut self) -> Self {
        self.news_fail = true;
        self
    }

    pub fn failing_fetch(mut self) -> Self {
        self.fetch_fail = true;
        self
    }

    pub fn with_total(mut self, total: u64) -> Self {
        self.total = total;
        self
    }

    pub fn failing_analysis_for(mut self, title: &str) -> Self {
        self.failing_titles.push(title.to_string());
        self
    }

    pub fn with_analysis_delay(mut self, delay: Duration) -> Self {
        self.analysis_delay = Some(delay);
        self
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    pub fn recorded(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.name() == name)
            .count()
    }

    pub fn last_call(&self) -> Option<Call> {
        self.calls.lock().unwrap().last().cloned()
    }

    fn page(&self, source: &str, page: u32, per_page: u32) -> NewsPage {
        let offset = (page.saturating_sub(1) as u64) * per_page as u64;
        let count = self.total.saturating_sub(offset).min(per_page as u64);
        NewsPage {
            articles: (0..count)
                .map(|i| article((offset + i + 1) as i64, source))
                .collect(),
            total: self.total,
            page,
            per_page,
            total_pages: None,
            has_next: None,
            has_prev: None,
            next_page: None,
            prev_page: None,
        }
    }
}

#[async_trait]
impl NewsApi for MockApi {
    async fn api_info(&self) -> Result<ApiInfo> {
        self.record(Call::Other("api_info"));
        Ok(ApiInfo {
            message: "Welcome to RMG News AI Agent API".to_string(),
            status: "healthy".to_string(),
            version: "1.0.0".to_string(),
            features: Vec::new(),
        })
    }

    async fn health(&self) -> Result<HealthReport> {
        self.record(Call::Health);
        if !self.healthy.load(Ordering::SeqCst) {
            return Err(Error::Timeout {
                endpoint: "/health".to_string(),
                timeout: Duration::from_secs(15),
            });
        }
        Ok(HealthReport {
            status: "healthy".to_string(),
            message: None,
            database: Some("connected".to_string()),
            deepseek_service: None,
        })
    }

    async fn get_sources(&self) -> Result<SourcesResponse> {
        self.record(Call::Sources);
        if self.sources_fail {
            return Err(failure("/api/sources"));
        }
        let sources = [("bgmea", "BGMEA"), ("textiletoday", "Textile Today")]
            .into_iter()
            .map(|(id, name)| {
                (
                    id.to_string(),
                    Source {
                        name: name.to_string(),
                        url: format!("https://{}.example/news", id),
                        base_url: format!("https://{}.example", id),
                    },
                )
            })
            .collect::<rmg_core::SourceMap>();
        Ok(SourcesResponse {
            total: sources.len(),
            sources,
        })
    }

    async fn get_news(&self, query: &NewsQuery) -> Result<NewsPage> {
        self.record(Call::News(query.clone()));
        if self.news_fail {
            return Err(failure("/api/news"));
        }
        let source = query.source.as_deref().unwrap_or("textiletoday");
        Ok(self.page(source, query.page, query.per_page))
    }

    async fn get_news_by_source(&self, source_id: &str, page: u32, per_page: u32) -> Result<NewsPage> {
        self.record(Call::NewsBySource {
            source: source_id.to_string(),
            page,
            per_page,
        });
        if self.news_fail {
            return Err(failure("/api/news/sources"));
        }
        Ok(self.page(source_id, page, per_page))
    }

    async fn fetch_news(&self, articles_per_source: u32) -> Result<FetchNewsSummary> {
        self.record(Call::FetchNews(articles_per_source));
        if self.fetch_fail {
            return Err(failure("/api/fetch-news"));
        }
        Ok(FetchNewsSummary {
            message: "News fetching completed".to_string(),
            results: [("bgmea".to_string(), 3), ("textiletoday".to_string(), 5)]
                .into_iter()
                .collect(),
            total_articles: 8,
            timestamp: Some(Utc::now()),
        })
    }

    async fn get_headlines(&self, _query: &HeadlinesQuery) -> Result<NewsPage> {
        self.record(Call::Other("headlines"));
        Ok(self.page("textiletoday", 1, 10))
    }

    async fn get_trending(&self, _hours_back: u32) -> Result<TrendingTopics> {
        self.record(Call::Other("trending"));
        Ok(TrendingTopics {
            topics: Vec::new(),
            updated_at: Utc::now(),
        })
    }

    async fn get_insights(&self) -> Result<MarketInsights> {
        self.record(Call::Other("insights"));
        Err(failure("/api/insights"))
    }

    async fn analyze(&self, request: &AnalyzeRequest) -> Result<Analysis> {
        self.record(Call::Analyze(request.title.clone()));
        if let Some(delay) = self.analysis_delay {
            tokio::time::sleep(delay).await;
        }
        if self.failing_titles.contains(&request.title) {
            return Err(failure("/api/analyze"));
        }
        Ok(Analysis {
            id: 1,
            article_id: 1,
            key_insights: Some(format!("Insights: {}", request.title)),
            market_impact: Some(MarketImpact::Medium),
            industry_sectors: None,
            geographic_impact: None,
            agno_analysis_id: None,
            agno_confidence: Some(0.75),
            created_at: Utc::now(),
        })
    }

    async fn sentiment(&self, _text: &str) -> Result<SentimentReport> {
        self.record(Call::Other("sentiment"));
        Err(failure("/api/sentiment"))
    }
}

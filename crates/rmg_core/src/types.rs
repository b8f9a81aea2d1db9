use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::time::{flexible, flexible_option};

/// Model output is passed through unnormalised, so labels match in any case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketImpact {
    High,
    Medium,
    Low,
    Unknown,
}

impl<'de> Deserialize<'de> for MarketImpact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(match label.trim().to_ascii_lowercase().as_str() {
            "high" => MarketImpact::High,
            "medium" => MarketImpact::Medium,
            "low" => MarketImpact::Low,
            _ => MarketImpact::Unknown,
        })
    }
}

impl fmt::Display for MarketImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            MarketImpact::High => "high",
            MarketImpact::Medium => "medium",
            MarketImpact::Low => "low",
            MarketImpact::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    pub url: String,
    pub source: String,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(with = "flexible")]
    pub published_at: DateTime<Utc>,
    #[serde(default, with = "flexible_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "flexible_option")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_summary: Option<String>,
    #[serde(default)]
    pub market_impact: Option<MarketImpact>,
    #[serde(default)]
    pub confidence_score: Option<f64>,
    #[serde(default)]
    pub is_processed: bool,
    #[serde(default)]
    pub sentiment_score: Option<f64>,
    #[serde(default)]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
}

impl Article {
    /// Text sent for AI analysis: the body when present, otherwise the
    /// backend summary, otherwise nothing.
    pub fn analysis_text(&self) -> &str {
        self.content
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .or(self.summary.as_deref())
            .unwrap_or("")
    }

    /// Overlay freshly fetched AI fields. Fields absent from the enrichment
    /// keep whatever the backend listed.
    pub fn apply_enrichment(&mut self, enrichment: &Enrichment) {
        if let Some(summary) = &enrichment.ai_summary {
            self.ai_summary = Some(summary.clone());
        }
        if let Some(impact) = enrichment.market_impact {
            self.market_impact = Some(impact);
        }
        if let Some(confidence) = enrichment.confidence_score {
            self.confidence_score = Some(confidence);
        }
        self.is_processed = true;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub name: String,
    pub url: String,
    pub base_url: String,
}

pub type SourceMap = BTreeMap<String, Source>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesResponse {
    pub sources: SourceMap,
    #[serde(default)]
    pub total: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsPage {
    pub articles: Vec<Article>,
    pub total: u64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub has_next: Option<bool>,
    #[serde(default)]
    pub has_prev: Option<bool>,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub prev_page: Option<u32>,
}

fn default_page() -> u32 {
    1
}

fn default_per_page() -> u32 {
    crate::pagination::PAGE_SIZE
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchNewsSummary {
    pub message: String,
    #[serde(default)]
    pub results: BTreeMap<String, u64>,
    pub total_articles: u64,
    #[serde(default, with = "flexible_option")]
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_trending: bool,
    #[serde(default)]
    pub trend_score: f64,
    #[serde(with = "flexible")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendingTopics {
    pub topics: Vec<Topic>,
    #[serde(with = "flexible")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketTrend {
    pub id: i64,
    pub metric_name: String,
    pub metric_value: f64,
    #[serde(default)]
    pub metric_unit: Option<String>,
    pub category: String,
    pub time_period: String,
    #[serde(with = "flexible")]
    pub recorded_at: DateTime<Utc>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketInsights {
    #[serde(default)]
    pub sentiment_overview: BTreeMap<String, String>,
    #[serde(default)]
    pub trending_topics: Vec<Topic>,
    #[serde(default)]
    pub market_trends: Vec<MarketTrend>,
    pub total_articles: u64,
    #[serde(with = "flexible")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub article_text: String,
    pub title: String,
}

impl AnalyzeRequest {
    pub fn for_article(article: &Article) -> Self {
        Self {
            article_text: article.analysis_text().to_string(),
            title: article.title.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub id: i64,
    pub article_id: i64,
    #[serde(default)]
    pub key_insights: Option<String>,
    #[serde(default)]
    pub market_impact: Option<MarketImpact>,
    #[serde(default)]
    pub industry_sectors: Option<String>,
    #[serde(default)]
    pub geographic_impact: Option<String>,
    #[serde(default)]
    pub agno_analysis_id: Option<String>,
    #[serde(default)]
    pub agno_confidence: Option<f64>,
    #[serde(with = "flexible")]
    pub created_at: DateTime<Utc>,
}

/// The AI fields the dashboard overlays onto a listed article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enrichment {
    pub ai_summary: Option<String>,
    pub market_impact: Option<MarketImpact>,
    pub confidence_score: Option<f64>,
}

impl From<&Analysis> for Enrichment {
    fn from(analysis: &Analysis) -> Self {
        Self {
            ai_summary: analysis
                .key_insights
                .clone()
                .filter(|s| !s.trim().is_empty()),
            market_impact: analysis.market_impact,
            confidence_score: analysis.agno_confidence,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub confidence: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentReport {
    #[serde(default)]
    pub sentiment: Sentiment,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub method: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub deepseek_service: Option<String>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiInfo {
    pub message: String,
    pub status: String,
    pub version: String,
    #[serde(default)]
    pub features: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewsQuery {
    pub query: Option<String>,
    pub source: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl NewsQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page,
            per_page,
            ..Default::default()
        }
    }

    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HeadlinesQuery {
    pub category: String,
    pub country: String,
    pub page_size: u32,
}

impl Default for HeadlinesQuery {
    fn default() -> Self {
        Self {
            category: "business".to_string(),
            country: "us".to_string(),
            page_size: crate::pagination::PAGE_SIZE,
        }
    }
}

//! Plain-text and JSON rendering for one-shot commands.

use rmg_core::{
    Analysis, ApiInfo, Article, FetchNewsSummary, HealthReport, MarketInsights, NewsPage,
    SentimentReport, SourcesResponse, TrendingTopics,
};
use rmg_dashboard::view::format_confidence;
use serde::Serialize;

/// Print `value` as pretty JSON, or hand it to `human`.
pub fn emit<T, F>(value: &T, json: bool, human: F) -> anyhow::Result<()>
where
    T: Serialize,
    F: FnOnce(&T) -> String,
{
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        println!("{}", human(value));
    }
    Ok(())
}

pub fn info(info: &ApiInfo) -> String {
    let mut out = format!("{} (v{}, {})", info.message, info.version, info.status);
    for feature in &info.features {
        out.push_str(&format!("\n  - {}", feature));
    }
    out
}

pub fn health(report: &HealthReport) -> String {
    let mut out = format!("status: {}", report.status);
    for (label, value) in [
        ("message", &report.message),
        ("database", &report.database),
        ("deepseek", &report.deepseek_service),
    ] {
        if let Some(value) = value {
            out.push_str(&format!("\n{}: {}", label, value));
        }
    }
    out
}

pub fn sources(response: &SourcesResponse) -> String {
    let mut out = format!("{} sources", response.sources.len());
    for (id, source) in &response.sources {
        out.push_str(&format!("\n  {:<16} {} <{}>", id, source.name, source.url));
    }
    out
}

pub fn article(article: &Article) -> String {
    let mut out = format!(
        "#{} {}\n    {} · {}",
        article.id,
        article.title,
        article.source,
        article.published_at.format("%Y-%m-%d %H:%M")
    );
    if let Some(author) = &article.author {
        out.push_str(&format!(" · {}", author));
    }
    out.push_str(&format!("\n    {}", article.url));
    if let Some(summary) = &article.ai_summary {
        out.push_str(&format!("\n    AI: {}", summary));
    }
    match (article.market_impact, article.confidence_score) {
        (Some(impact), Some(confidence)) => out.push_str(&format!(
            "\n    Impact: {}  Confidence: {}",
            impact,
            format_confidence(confidence)
        )),
        (Some(impact), None) => out.push_str(&format!("\n    Impact: {}", impact)),
        (None, Some(confidence)) => {
            out.push_str(&format!("\n    Confidence: {}", format_confidence(confidence)))
        }
        (None, None) => {}
    }
    out
}

pub fn news_page(page: &NewsPage) -> String {
    let total_pages = page
        .total_pages
        .unwrap_or_else(|| rmg_core::pagination::total_pages(page.total, page.per_page));
    let mut out = format!(
        "Page {} of {} ({} articles)",
        page.page, total_pages, page.total
    );
    if page.articles.is_empty() {
        out.push_str("\nNo articles found.");
    }
    for item in &page.articles {
        out.push('\n');
        out.push_str(&article(item));
    }
    out
}

pub fn fetch_summary(summary: &FetchNewsSummary) -> String {
    let mut out = format!("{}: {} articles", summary.message, summary.total_articles);
    for (source, count) in &summary.results {
        out.push_str(&format!("\n  {:<16} {}", source, count));
    }
    out
}

pub fn trending(trending: &TrendingTopics) -> String {
    let mut out = format!("Trending topics (updated {})", trending.updated_at.format("%Y-%m-%d %H:%M"));
    if trending.topics.is_empty() {
        out.push_str("\n  none");
    }
    for topic in &trending.topics {
        out.push_str(&format!(
            "\n  {:<24} {:<12} {:.2}",
            topic.name, topic.category, topic.trend_score
        ));
    }
    out
}

pub fn insights(insights: &MarketInsights) -> String {
    let mut out = format!(
        "{} articles (updated {})",
        insights.total_articles,
        insights.last_updated.format("%Y-%m-%d %H:%M")
    );
    if !insights.sentiment_overview.is_empty() {
        out.push_str("\nSentiment:");
        for (label, share) in &insights.sentiment_overview {
            out.push_str(&format!("\n  {:<10} {}", label, share));
        }
    }
    if !insights.trending_topics.is_empty() {
        out.push_str("\nTopics:");
        for topic in &insights.trending_topics {
            out.push_str(&format!("\n  {} ({})", topic.name, topic.category));
        }
    }
    if !insights.market_trends.is_empty() {
        out.push_str("\nTrends:");
        for trend in &insights.market_trends {
            out.push_str(&format!(
                "\n  {} = {}{} [{}]",
                trend.metric_name,
                trend.metric_value,
                trend.metric_unit.as_deref().unwrap_or(""),
                trend.time_period
            ));
        }
    }
    out
}

pub fn analysis(analysis: &Analysis) -> String {
    let mut out = String::new();
    out.push_str(analysis.key_insights.as_deref().unwrap_or("No insights returned"));
    if let Some(impact) = analysis.market_impact {
        out.push_str(&format!("\nImpact: {}", impact));
    }
    if let Some(confidence) = analysis.agno_confidence {
        out.push_str(&format!("\nConfidence: {}", format_confidence(confidence)));
    }
    if let Some(sectors) = &analysis.industry_sectors {
        out.push_str(&format!("\nSectors: {}", sectors));
    }
    if let Some(regions) = &analysis.geographic_impact {
        out.push_str(&format!("\nRegions: {}", regions));
    }
    out
}

pub fn sentiment(report: &SentimentReport) -> String {
    format!(
        "{} (score {:.2}, confidence {}, via {})",
        report.sentiment.label.as_deref().unwrap_or("unknown"),
        report.sentiment.score.unwrap_or_default(),
        format_confidence(report.confidence),
        if report.method.is_empty() { "unknown" } else { report.method.as_str() }
    )
}

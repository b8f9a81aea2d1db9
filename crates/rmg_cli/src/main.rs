use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rmg_client::{ClientConfig, HttpNewsApi, Timeouts, DEFAULT_API_URL};
use rmg_core::pagination::PAGE_SIZE;
use rmg_core::{AnalyzeRequest, Enrichment, HeadlinesQuery, NewsApi, NewsPage, NewsQuery};
use rmg_dashboard::config::DEFAULT_ARTICLES_PER_SOURCE;
use rmg_dashboard::{Dashboard, DashboardConfig, EnrichmentBatch};
use tracing::{info, warn};

mod logging;
mod output;
mod tui;

use logging::{init_logging, LogTarget};

#[derive(Debug, Clone, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|secs| total_seconds.checked_add(secs))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // Bare number means seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds = total_seconds
                        .checked_add(num)
                        .ok_or_else(|| "Duration is too large".to_string())?;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be greater than zero".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

/// Client for the RMG news backend, with an interactive dashboard.
#[derive(Parser, Debug)]
#[command(name = "rmg", author, version, about, long_about = None)]
struct Cli {
    /// Backend base URL
    #[arg(long, global = true, env = "RMG_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,
    /// Deadline applied to every call instead of the per-endpoint defaults (e.g. 30s, 1m30s)
    #[arg(long, global = true)]
    timeout: Option<HumanDuration>,
    /// Print raw JSON
    #[arg(long, global = true)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug, PartialEq)]
enum Commands {
    /// Backend name, version and features
    Info,
    /// Check backend health
    Health,
    /// List configured news sources
    Sources,
    /// List stored articles
    News {
        #[arg(long, short)]
        query: Option<String>,
        #[arg(long, short)]
        source: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = PAGE_SIZE)]
        per_page: u32,
        /// Skip per-article AI analysis
        #[arg(long)]
        no_analyze: bool,
    },
    /// Ask the backend to ingest fresh articles from every source
    Fetch {
        #[arg(long, default_value_t = DEFAULT_ARTICLES_PER_SOURCE)]
        per_source: u32,
    },
    Headlines {
        #[arg(long, default_value = "business")]
        category: String,
        #[arg(long, default_value = "us")]
        country: String,
        #[arg(long, default_value_t = PAGE_SIZE)]
        page_size: u32,
    },
    Trending {
        #[arg(long, default_value_t = 24)]
        hours_back: u32,
    },
    /// Aggregate market insights
    Insights,
    /// Run AI analysis on a piece of text
    Analyze {
        #[arg(long)]
        title: String,
        #[arg(long)]
        text: String,
    },
    Sentiment {
        #[arg(long)]
        text: String,
    },
    /// Interactive terminal dashboard
    Dashboard {
        /// Write logs here instead of discarding them
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
}

impl Cli {
    fn client_config(&self) -> anyhow::Result<ClientConfig> {
        let config = ClientConfig::new(&self.api_url)
            .with_context(|| format!("Invalid API URL: {}", self.api_url))?;
        Ok(match &self.timeout {
            Some(timeout) => config.with_timeouts(Timeouts::uniform(timeout.0)),
            None => config,
        })
    }
}

/// Analyze every listed article and overlay the results; failures leave the
/// article as listed.
async fn enrich_page(api: &dyn NewsApi, page: &mut NewsPage) {
    let outcome = EnrichmentBatch::for_articles(0, &page.articles).run(api).await;
    info!(
        succeeded = outcome.succeeded(),
        failed = outcome.failed(),
        "AI analysis finished"
    );
    for (id, result) in outcome.results {
        match result {
            Ok(analysis) => {
                let enrichment = Enrichment::from(&analysis);
                if let Some(article) = page.articles.iter_mut().find(|a| a.id == id) {
                    article.apply_enrichment(&enrichment);
                }
            }
            Err(e) => warn!(article_id = id, error = %e, "AI analysis failed"),
        }
    }
}

async fn run_command(cli: Cli, api: Arc<dyn NewsApi>) -> anyhow::Result<()> {
    let json = cli.json;
    match cli.command {
        Commands::Info => output::emit(&api.api_info().await?, json, output::info),
        Commands::Health => {
            let report = api.health().await?;
            output::emit(&report, json, output::health)?;
            if !report.is_healthy() {
                anyhow::bail!("Backend reports status '{}'", report.status);
            }
            Ok(())
        }
        Commands::Sources => output::emit(&api.get_sources().await?, json, output::sources),
        Commands::News {
            query,
            source,
            page,
            per_page,
            no_analyze,
        } => {
            let request = NewsQuery {
                query,
                source,
                page,
                per_page,
            };
            let mut news = api.get_news(&request).await?;
            if !no_analyze && !news.articles.is_empty() {
                enrich_page(api.as_ref(), &mut news).await;
            }
            output::emit(&news, json, output::news_page)
        }
        Commands::Fetch { per_source } => {
            let summary = api.fetch_news(per_source).await?;
            output::emit(&summary, json, output::fetch_summary)
        }
        Commands::Headlines {
            category,
            country,
            page_size,
        } => {
            let query = HeadlinesQuery {
                category,
                country,
                page_size,
            };
            output::emit(&api.get_headlines(&query).await?, json, output::news_page)
        }
        Commands::Trending { hours_back } => {
            output::emit(&api.get_trending(hours_back).await?, json, output::trending)
        }
        Commands::Insights => output::emit(&api.get_insights().await?, json, output::insights),
        Commands::Analyze { title, text } => {
            let request = AnalyzeRequest {
                article_text: text,
                title,
            };
            output::emit(&api.analyze(&request).await?, json, output::analysis)
        }
        Commands::Sentiment { text } => {
            output::emit(&api.sentiment(&text).await?, json, output::sentiment)
        }
        Commands::Dashboard { .. } => {
            tui::run(Dashboard::new(api, DashboardConfig::default())).await
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let target = match &cli.command {
        Commands::Dashboard { log_file: Some(path) } => LogTarget::File(path.clone()),
        Commands::Dashboard { log_file: None } => LogTarget::Off,
        _ => LogTarget::Stderr,
    };
    init_logging(target)?;

    let config = cli.client_config()?;
    info!(base_url = %config.base_url, "Using backend");
    let api: Arc<dyn NewsApi> = Arc::new(HttpNewsApi::new(config)?);

    run_command(cli, api).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(30));
        assert_eq!("1m30s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert_eq!("2h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(7200));
        assert_eq!("45".parse::<HumanDuration>().unwrap().0, Duration::from_secs(45));
        assert!("10x".parse::<HumanDuration>().is_err());
        assert!("s".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_human_duration_overflow_is_an_error() {
        assert_eq!(
            "9999999999999999h".parse::<HumanDuration>(),
            Err("Duration is too large".to_string())
        );
        assert!("18446744073709551615s1s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_news_defaults() {
        let cli = Cli::parse_from(["rmg", "news"]);
        assert_eq!(
            cli.command,
            Commands::News {
                query: None,
                source: None,
                page: 1,
                per_page: PAGE_SIZE,
                no_analyze: false,
            }
        );
        assert!(!cli.json);
        assert!(cli.timeout.is_none());
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "rmg",
            "news",
            "--source",
            "bgmea",
            "--no-analyze",
            "--json",
            "--timeout",
            "5s",
            "--api-url",
            "http://10.0.0.2:9000",
        ]);
        assert!(cli.json);
        assert_eq!(cli.timeout, Some(HumanDuration(Duration::from_secs(5))));
        let config = cli.client_config().unwrap();
        assert_eq!(config.base_url.as_str(), "http://10.0.0.2:9000/");
        assert_eq!(config.timeouts, Timeouts::uniform(Duration::from_secs(5)));
        match cli.command {
            Commands::News {
                source, no_analyze, ..
            } => {
                assert_eq!(source.as_deref(), Some("bgmea"));
                assert!(no_analyze);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_fetch_defaults_to_fifteen_per_source() {
        let cli = Cli::parse_from(["rmg", "fetch"]);
        assert_eq!(cli.command, Commands::Fetch { per_source: 15 });
    }

    #[test]
    fn test_analyze_requires_title_and_text() {
        assert!(Cli::try_parse_from(["rmg", "analyze", "--title", "x"]).is_err());
        let cli = Cli::parse_from(["rmg", "analyze", "--title", "Orders", "--text", "Body"]);
        assert_eq!(
            cli.command,
            Commands::Analyze {
                title: "Orders".to_string(),
                text: "Body".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let cli = Cli::parse_from(["rmg", "--api-url", "ftp://example.com", "health"]);
        assert!(cli.client_config().is_err());
    }
}

use std::sync::Arc;

use chrono::Utc;
use rmg_core::pagination;
use rmg_core::{Enrichment, NewsApi, NewsQuery, SourceMap};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::config::DashboardConfig;
use crate::enrichment::{EnrichmentBatch, EnrichmentOutcome};
use crate::state::{DashboardState, Phase, SourceFilter, BACKEND_UNAVAILABLE};

/// Drives the backend on behalf of the view and owns the view state.
///
/// Every operation catches client errors into the banner, so callers never
/// see a `Result`. Operations that load a page hand back the enrichment batch
/// for that page; running it is up to the caller.
pub struct Dashboard {
    api: Arc<dyn NewsApi>,
    config: DashboardConfig,
    state: DashboardState,
    updates: watch::Sender<DashboardState>,
}

impl Dashboard {
    pub fn new(api: Arc<dyn NewsApi>, config: DashboardConfig) -> Self {
        let state = DashboardState::default();
        let (updates, _) = watch::channel(state.clone());
        Self {
            api,
            config,
            state,
            updates,
        }
    }

    pub fn api(&self) -> Arc<dyn NewsApi> {
        self.api.clone()
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.updates.subscribe()
    }

    fn publish(&self) {
        self.updates.send_replace(self.state.clone());
    }

    /// Health check, then the source list. Articles wait for a user action.
    pub async fn initialize(&mut self) -> bool {
        self.state.phase = Phase::Checking;
        self.state.loading = true;
        self.state.error = None;
        self.publish();

        if !self.api.health_check().await {
            warn!("Backend health check failed");
            self.state.phase = Phase::Unavailable;
            self.state.loading = false;
            self.state.error = Some(BACKEND_UNAVAILABLE.to_string());
            self.publish();
            return false;
        }

        self.state.sources = match self.api.get_sources().await {
            Ok(response) => {
                info!(count = response.sources.len(), "Loaded news sources");
                response.sources
            }
            Err(e) => {
                warn!(error = %e, "Failed to load sources; continuing without them");
                SourceMap::new()
            }
        };

        self.state.phase = Phase::Ready;
        self.state.loading = false;
        self.publish();
        true
    }

    /// "Try Again": rerun the initial sequence from scratch.
    pub async fn retry(&mut self) -> bool {
        self.state.error = None;
        self.state.notice = None;
        self.initialize().await
    }

    /// Ask the backend to ingest fresh articles, then show page 1.
    pub async fn fetch_news(&mut self) -> Option<EnrichmentBatch> {
        if self.state.phase != Phase::Ready {
            debug!(phase = ?self.state.phase, "Ignoring fetch while backend is not ready");
            return None;
        }

        self.state.loading = true;
        self.state.error = None;
        self.state.notice = None;
        self.publish();

        match self.api.fetch_news(self.config.articles_per_source).await {
            Ok(summary) => {
                info!(
                    total = summary.total_articles,
                    sources = summary.results.len(),
                    "Backend ingestion completed"
                );
                self.state.notice = Some(format!(
                    "Fetched {} articles from {} sources",
                    summary.total_articles,
                    summary.results.len()
                ));
            }
            Err(e) => {
                warn!(error = %e, "Backend ingestion failed");
                self.state.loading = false;
                self.state.error = Some(format!("Failed to fetch news: {}", e));
                self.publish();
                return None;
            }
        }

        self.load_page(1).await
    }

    /// A blank query drops back to the selected source's unfiltered listing.
    pub async fn search(&mut self, query: &str) -> Option<EnrichmentBatch> {
        if self.state.phase != Phase::Ready {
            debug!(phase = ?self.state.phase, "Ignoring search while backend is not ready");
            return None;
        }
        self.state.query = query.trim().to_string();
        self.load_page(1).await
    }

    pub async fn select_source(&mut self, filter: SourceFilter) -> Option<EnrichmentBatch> {
        if self.state.phase != Phase::Ready {
            debug!(phase = ?self.state.phase, "Ignoring source change while backend is not ready");
            return None;
        }
        self.state.source = filter;
        self.load_page(1).await
    }

    /// Out-of-range pages are ignored.
    pub async fn go_to_page(&mut self, page: u32) -> Option<EnrichmentBatch> {
        let last = self.state.total_pages.max(1);
        if page == 0 || page > last {
            debug!(page, last, "Ignoring out-of-range page");
            return None;
        }
        self.load_page(page).await
    }

    pub async fn next_page(&mut self) -> Option<EnrichmentBatch> {
        if !self.state.has_next() {
            return None;
        }
        self.go_to_page(self.state.current_page + 1).await
    }

    pub async fn prev_page(&mut self) -> Option<EnrichmentBatch> {
        if !self.state.has_prev() {
            return None;
        }
        self.go_to_page(self.state.current_page - 1).await
    }

    /// Fetch `page` for the current query and source filter.
    pub async fn load_page(&mut self, page: u32) -> Option<EnrichmentBatch> {
        if self.state.phase != Phase::Ready {
            debug!(phase = ?self.state.phase, "Ignoring page load while backend is not ready");
            return None;
        }

        self.state.generation += 1;
        let generation = self.state.generation;
        self.state.loading = true;
        self.state.error = None;
        self.publish();

        let per_page = self.config.page_size;
        let query = Some(self.state.query.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        let source = self.state.source.id().map(str::to_string);

        let result = match (query, source) {
            (Some(q), source) => {
                let mut request = NewsQuery::page(page, per_page).with_query(q);
                request.source = source;
                self.api.get_news(&request).await
            }
            (None, Some(source)) => self.api.get_news_by_source(&source, page, per_page).await,
            (None, None) => self.api.get_news(&NewsQuery::page(page, per_page)).await,
        };

        self.state.loading = false;
        match result {
            Ok(news) => {
                info!(
                    page,
                    total = news.total,
                    count = news.articles.len(),
                    generation,
                    "Loaded articles"
                );
                self.state.total = news.total;
                self.state.total_pages = pagination::total_pages(news.total, per_page);
                self.state.current_page = page;
                self.state.articles = news.articles;
                self.state.last_updated = Some(Utc::now());
                self.state.shown_generation = generation;

                let batch = EnrichmentBatch::for_articles(generation, &self.state.articles);
                self.state.analyzing = !batch.is_empty();
                self.publish();
                (!batch.is_empty()).then_some(batch)
            }
            Err(e) => {
                warn!(page, error = %e, "Failed to load articles");
                self.state.error = Some(format!("Failed to load articles: {}", e));
                self.publish();
                None
            }
        }
    }

    /// Merge analysis results into the listed articles. Results for any page
    /// load other than the one on screen are dropped. Returns whether the
    /// outcome was applied.
    pub fn apply_enrichment(&mut self, outcome: EnrichmentOutcome) -> bool {
        if outcome.generation != self.state.shown_generation {
            debug!(
                stale = outcome.generation,
                shown = self.state.shown_generation,
                "Discarding stale AI analysis"
            );
            return false;
        }

        let (succeeded, failed) = (outcome.succeeded(), outcome.failed());
        for (id, result) in outcome.results {
            match result {
                Ok(analysis) => {
                    let enrichment = Enrichment::from(&analysis);
                    if let Some(article) = self.state.articles.iter_mut().find(|a| a.id == id) {
                        article.apply_enrichment(&enrichment);
                    }
                }
                Err(e) => warn!(article_id = id, error = %e, "AI analysis failed"),
            }
        }
        info!(succeeded, failed, "AI analysis merged");

        self.state.analyzing = false;
        self.publish();
        true
    }

    /// Run a batch in place and merge it.
    pub async fn enrich(&mut self, batch: EnrichmentBatch) -> bool {
        let outcome = batch.run(self.api.as_ref()).await;
        self.apply_enrichment(outcome)
    }
}

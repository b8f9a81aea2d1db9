//! Per-article AI analysis fan-out.

use futures::future::join_all;
use rmg_core::{Analysis, AnalyzeRequest, Article, NewsApi, Result};
use tracing::debug;

/// One analysis request per article of a loaded page, tagged with the
/// generation of that page load.
#[derive(Debug, Clone)]
pub struct EnrichmentBatch {
    generation: u64,
    requests: Vec<(i64, AnalyzeRequest)>,
}

impl EnrichmentBatch {
    pub fn for_articles(generation: u64, articles: &[Article]) -> Self {
        Self {
            generation,
            requests: articles
                .iter()
                .map(|a| (a.id, AnalyzeRequest::for_article(a)))
                .collect(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.requests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requests.is_empty()
    }

    /// Issue every request at once and wait for all of them. Individual
    /// failures are kept per article; the batch itself cannot fail.
    pub async fn run(self, api: &dyn NewsApi) -> EnrichmentOutcome {
        debug!(generation = self.generation, count = self.requests.len(), "Running AI analysis batch");
        let calls = self.requests.iter().map(|(id, request)| async move {
            (*id, api.analyze(request).await)
        });
        let results = join_all(calls).await;
        EnrichmentOutcome {
            generation: self.generation,
            results,
        }
    }
}

#[derive(Debug)]
pub struct EnrichmentOutcome {
    pub generation: u64,
    pub results: Vec<(i64, Result<Analysis>)>,
}

impl EnrichmentOutcome {
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }
}

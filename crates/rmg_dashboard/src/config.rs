use rmg_core::pagination::PAGE_SIZE;

/// Articles the backend is asked to ingest per source on a manual fetch.
pub const DEFAULT_ARTICLES_PER_SOURCE: u32 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub page_size: u32,
    pub articles_per_source: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            page_size: PAGE_SIZE,
            articles_per_source: DEFAULT_ARTICLES_PER_SOURCE,
        }
    }
}

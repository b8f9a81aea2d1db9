use chrono::{DateTime, Utc};
use rmg_core::pagination;
use rmg_core::{Article, SourceMap};

pub const BACKEND_UNAVAILABLE: &str =
    "Backend service is not available. Please make sure the API server is running.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Health check in flight
    Checking,
    /// Health check failed; only a retry leaves this phase
    Unavailable,
    Ready,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SourceFilter {
    #[default]
    All,
    Source(String),
}

impl SourceFilter {
    pub fn id(&self) -> Option<&str> {
        match self {
            SourceFilter::All => None,
            SourceFilter::Source(id) => Some(id.as_str()),
        }
    }
}

impl From<Option<String>> for SourceFilter {
    fn from(id: Option<String>) -> Self {
        match id {
            Some(id) if !id.trim().is_empty() && id != "all" => SourceFilter::Source(id),
            _ => SourceFilter::All,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub phase: Phase,
    pub query: String,
    pub source: SourceFilter,
    pub current_page: u32,
    pub total_pages: u32,
    pub total: u64,
    pub articles: Vec<Article>,
    pub sources: SourceMap,
    pub loading: bool,
    pub analyzing: bool,
    /// Banner text for the last failure
    pub error: Option<String>,
    /// Outcome of the last manual ingestion
    pub notice: Option<String>,
    /// Bumped on every page load attempt
    pub generation: u64,
    /// Generation of the load whose articles are listed; enrichment for any
    /// other load is dropped
    pub shown_generation: u64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            phase: Phase::Checking,
            query: String::new(),
            source: SourceFilter::All,
            current_page: 1,
            total_pages: 0,
            total: 0,
            articles: Vec::new(),
            sources: SourceMap::new(),
            loading: false,
            analyzing: false,
            error: None,
            notice: None,
            generation: 0,
            shown_generation: 0,
            last_updated: None,
        }
    }
}

impl DashboardState {
    pub fn page_window(&self) -> Vec<u32> {
        pagination::page_window(self.current_page, self.total_pages)
    }

    pub fn has_next(&self) -> bool {
        pagination::has_next(self.current_page, self.total_pages)
    }

    pub fn has_prev(&self) -> bool {
        pagination::has_prev(self.current_page)
    }

    /// Display name for a source id, falling back to the id itself.
    pub fn source_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.sources
            .get(id)
            .map(|s| s.name.as_str())
            .unwrap_or(id)
    }

    /// Tab order: "All" first, then sources by id.
    pub fn source_tabs(&self) -> Vec<SourceFilter> {
        std::iter::once(SourceFilter::All)
            .chain(self.sources.keys().cloned().map(SourceFilter::Source))
            .collect()
    }

    pub fn selected_tab(&self) -> usize {
        self.source_tabs()
            .iter()
            .position(|tab| *tab == self.source)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmg_core::Source;

    fn with_sources() -> DashboardState {
        let mut state = DashboardState::default();
        for (id, name) in [("tbsnews", "TBS News RMG"), ("bgmea", "BGMEA")] {
            state.sources.insert(
                id.to_string(),
                Source {
                    name: name.to_string(),
                    url: format!("https://{}.example", id),
                    base_url: format!("https://{}.example", id),
                },
            );
        }
        state
    }

    #[test]
    fn test_source_tabs_start_with_all() {
        let state = with_sources();
        assert_eq!(
            state.source_tabs(),
            vec![
                SourceFilter::All,
                SourceFilter::Source("bgmea".to_string()),
                SourceFilter::Source("tbsnews".to_string()),
            ]
        );
    }

    #[test]
    fn test_selected_tab_follows_filter() {
        let mut state = with_sources();
        assert_eq!(state.selected_tab(), 0);
        state.source = SourceFilter::Source("tbsnews".to_string());
        assert_eq!(state.selected_tab(), 2);
        state.source = SourceFilter::Source("gone".to_string());
        assert_eq!(state.selected_tab(), 0);
    }

    #[test]
    fn test_source_name_falls_back_to_id() {
        let state = with_sources();
        assert_eq!(state.source_name("bgmea"), "BGMEA");
        assert_eq!(state.source_name("rmgbd"), "rmgbd");
    }

    #[test]
    fn test_filter_from_option() {
        assert_eq!(SourceFilter::from(None), SourceFilter::All);
        assert_eq!(SourceFilter::from(Some("all".to_string())), SourceFilter::All);
        assert_eq!(
            SourceFilter::from(Some("bgmea".to_string())),
            SourceFilter::Source("bgmea".to_string())
        );
    }

    #[test]
    fn test_page_window_from_state() {
        let mut state = DashboardState::default();
        state.total_pages = 5;
        state.current_page = 5;
        assert_eq!(state.page_window(), vec![1, 2, 3, 4, 5]);
        assert!(!state.has_next());
        assert!(state.has_prev());
    }
}

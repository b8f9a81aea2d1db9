//! Actor that owns a [`Dashboard`] so a UI can stay responsive while calls
//! are in flight.

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::dashboard::Dashboard;
use crate::enrichment::{EnrichmentBatch, EnrichmentOutcome};
use crate::state::{DashboardState, SourceFilter};

const COMMAND_BUFFER: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Initialize,
    Retry,
    FetchNews,
    Search(String),
    SelectSource(SourceFilter),
    GoToPage(u32),
    NextPage,
    PrevPage,
}

pub struct DashboardHandle {
    commands: mpsc::Sender<Command>,
    state: watch::Receiver<DashboardState>,
    task: JoinHandle<()>,
}

impl DashboardHandle {
    /// Queue a command. Returns false once the controller has stopped.
    pub async fn send(&self, command: Command) -> bool {
        self.commands.send(command).await.is_ok()
    }

    /// Non-blocking variant for input loops.
    pub fn try_send(&self, command: Command) -> bool {
        self.commands.try_send(command).is_ok()
    }

    /// Latest published state.
    pub fn state(&self) -> DashboardState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.state.clone()
    }

    /// Stop accepting commands and wait for the current one to finish.
    pub async fn shutdown(self) {
        drop(self.commands);
        let _ = self.task.await;
    }
}

/// Move `dashboard` onto its own task.
pub fn spawn(dashboard: Dashboard) -> DashboardHandle {
    let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
    let state = dashboard.subscribe();
    let task = tokio::spawn(run(dashboard, rx));
    DashboardHandle {
        commands,
        state,
        task,
    }
}

async fn run(mut dashboard: Dashboard, mut commands: mpsc::Receiver<Command>) {
    let (enriched_tx, mut enriched_rx) = mpsc::unbounded_channel::<EnrichmentOutcome>();

    loop {
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else { break };
                debug!(?command, "Dashboard command");
                if let Some(batch) = handle(&mut dashboard, command).await {
                    spawn_enrichment(&dashboard, batch, enriched_tx.clone());
                }
            }
            Some(outcome) = enriched_rx.recv() => {
                dashboard.apply_enrichment(outcome);
            }
        }
    }
    debug!("Dashboard controller stopped");
}

async fn handle(dashboard: &mut Dashboard, command: Command) -> Option<EnrichmentBatch> {
    match command {
        Command::Initialize => {
            dashboard.initialize().await;
            None
        }
        Command::Retry => {
            dashboard.retry().await;
            None
        }
        Command::FetchNews => dashboard.fetch_news().await,
        Command::Search(query) => dashboard.search(&query).await,
        Command::SelectSource(filter) => dashboard.select_source(filter).await,
        Command::GoToPage(page) => dashboard.go_to_page(page).await,
        Command::NextPage => dashboard.next_page().await,
        Command::PrevPage => dashboard.prev_page().await,
    }
}

/// Enrichment runs beside the controller; its outcome comes back through
/// `results` and is merged between commands.
fn spawn_enrichment(
    dashboard: &Dashboard,
    batch: EnrichmentBatch,
    results: mpsc::UnboundedSender<EnrichmentOutcome>,
) {
    let api = dashboard.api();
    tokio::spawn(async move {
        let outcome = batch.run(api.as_ref()).await;
        let _ = results.send(outcome);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DashboardConfig;
    use crate::state::Phase;
    use crate::test_utils::MockApi;
    use std::sync::Arc;
    use std::time::Duration;

    async fn wait_for<F>(rx: &mut watch::Receiver<DashboardState>, pred: F) -> DashboardState
    where
        F: Fn(&DashboardState) -> bool,
    {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let current = rx.borrow_and_update().clone();
                if pred(&current) {
                    return current;
                }
                rx.changed().await.unwrap();
            }
        })
        .await
        .expect("state never matched")
    }

    #[tokio::test]
    async fn test_controller_loads_and_enriches_in_background() {
        let api = Arc::new(MockApi::healthy().with_analysis_delay(Duration::from_millis(50)));
        let handle = spawn(Dashboard::new(api.clone(), DashboardConfig::default()));
        let mut rx = handle.subscribe();

        assert!(handle.send(Command::Initialize).await);
        wait_for(&mut rx, |s| s.phase == Phase::Ready).await;

        assert!(handle.send(Command::FetchNews).await);
        let listed = wait_for(&mut rx, |s| s.articles.len() == 10).await;
        assert_eq!(listed.notice.as_deref(), Some("Fetched 8 articles from 2 sources"));

        let enriched = wait_for(&mut rx, |s| {
            !s.analyzing && s.articles.iter().all(|a| a.ai_summary.is_some())
        })
        .await;
        assert_eq!(enriched.current_page, 1);
        assert_eq!(api.calls("analyze"), 10);

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_controller_keeps_newest_page_on_rapid_paging() {
        let api = Arc::new(MockApi::healthy().with_analysis_delay(Duration::from_millis(100)));
        let handle = spawn(Dashboard::new(api.clone(), DashboardConfig::default()));
        let mut rx = handle.subscribe();

        handle.send(Command::Initialize).await;
        handle.send(Command::GoToPage(1)).await;
        handle.send(Command::NextPage).await;
        handle.send(Command::NextPage).await;

        let state = wait_for(&mut rx, |s| {
            s.current_page == 3 && !s.analyzing && s.articles.iter().all(|a| a.is_processed)
        })
        .await;
        let ids: Vec<i64> = state.articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, (21..=30).collect::<Vec<_>>());
        for article in &state.articles {
            assert_eq!(
                article.ai_summary.as_deref(),
                Some(format!("Insights: Article {}", article.id).as_str())
            );
        }

        handle.shutdown().await;
    }

    #[tokio::test]
    async fn test_unavailable_backend_reported_through_handle() {
        let handle = spawn(Dashboard::new(
            Arc::new(MockApi::unhealthy()),
            DashboardConfig::default(),
        ));
        let mut rx = handle.subscribe();
        handle.send(Command::Initialize).await;
        let state = wait_for(&mut rx, |s| s.phase == Phase::Unavailable).await;
        assert!(state.error.is_some());
        assert_eq!(handle.state().phase, Phase::Unavailable);
        handle.shutdown().await;
    }
}

pub mod config;
pub mod controller;
pub mod dashboard;
pub mod enrichment;
pub mod state;
pub mod view;

#[cfg(test)]
mod test_utils;

pub use config::DashboardConfig;
pub use controller::{spawn, Command, DashboardHandle};
pub use dashboard::Dashboard;
pub use enrichment::{EnrichmentBatch, EnrichmentOutcome};
pub use state::{DashboardState, Phase, SourceFilter};

pub mod prelude {
    pub use super::{Command, Dashboard, DashboardConfig, DashboardHandle, DashboardState};
    pub use super::{Phase, SourceFilter};
}

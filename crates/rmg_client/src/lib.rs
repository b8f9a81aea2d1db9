pub mod client;
pub mod config;

pub use client::HttpNewsApi;
pub use config::{ClientConfig, Timeouts, DEFAULT_API_URL};

pub mod prelude {
    pub use super::{ClientConfig, HttpNewsApi, Timeouts};
    pub use rmg_core::{NewsApi, Result, Error};
}

pub mod api;
pub mod error;
pub mod pagination;
pub mod time;
pub mod types;

pub use api::NewsApi;
pub use error::{Error, Result};
pub use types::*;

pub mod prelude {
    pub use crate::api::NewsApi;
    pub use crate::types::{Article, Enrichment, NewsPage, NewsQuery, Source, SourceMap};
    pub use crate::{Error, Result};
}

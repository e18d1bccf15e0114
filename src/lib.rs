//! Knowledge Graph entity search: one request per query, normalized into
//! result cards for the web front-end and the terminal.

pub mod client;
pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod render;
pub mod view;
#[cfg(feature = "web")]
pub mod web;

#[cfg(all(test, feature = "web"))]
mod test_support;

pub use client::KgClient;
pub use config::{ConfigError, SearchConfig};
pub use entity::{Entity, KgId, ResultItem, SearchOutcome, normalize, parse_response};
pub use error::SearchError;
pub use query::Query;
pub use render::{CardView, LinkCard, LinkKind, ResultsView};
pub use view::{Ticket, ViewController, ViewState};

//! Concurrent fetch → extract → normalize → aggregate pipeline.

pub mod aggregate;
pub mod client;
pub mod error;
pub mod extract;
pub mod normalize;
pub mod orchestrator;
mod rate_limit;
pub mod registry;
pub mod task;
pub mod types;

pub use aggregate::ResultAggregator;
pub use client::PageClient;
pub use error::ScraperError;
pub use normalize::{normalize_price, PricePair, DEFAULT_VAT_RATE};
pub use orchestrator::{Orchestrator, RunPlan, RunSettings};
pub use registry::{ExtractionRule, SelectorRegistry};
pub use task::EndpointTask;
pub use types::{EndpointFailure, PriceResult, RunReport};

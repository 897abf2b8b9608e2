//! Rate aggregation, price composition and chit plan progress

pub mod aggregator;
pub mod chit;
pub mod config;
pub mod fetch;
pub mod log;
pub mod pricing;
pub mod rate;
pub mod store;

// Re-export main types for cleaner imports
pub use aggregator::{AggregatorConfig, RateAggregator};
pub use chit::{ChitPlan, ChitPlanProgress, ChitStatus, compute_progress};
pub use fetch::RateFetcher;
pub use pricing::{PriceBreakdown, ProductPricingInput, compute_breakdown, price_product};
pub use rate::{Metal, MetalRateQuote, Provenance, RateError, RatePair, RateSnapshot};
pub use store::RateStore;

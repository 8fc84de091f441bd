//! Core business logic abstractions

pub mod amount;
pub mod binder;
pub mod config;
pub mod fetcher;
pub mod log;
pub mod rate;

// Re-export main types for cleaner imports
pub use binder::{ConversionBinder, EditOutcome, Field};
pub use fetcher::{FetchState, PollReply, RateFetcher};
pub use rate::{RateMode, RateProvider, RateSnapshot};

pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use crate::config::CliConfig;

pub use crate::adapters::{GeminiExtractor, LocalStorage};
pub use crate::app::QuoterApp;
pub use crate::core::{engine::compute_quote, store::PricingStore, updater::PriceUpdater};
pub use crate::utils::error::{QuoterError, Result};

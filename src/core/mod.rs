pub mod currency;
pub mod engine;
pub mod snapshot;
pub mod store;
pub mod updater;

pub use crate::domain::model::{
    AgeBracket, ImageUpload, PlanId, PlanPrices, PricingTable, QuoteError, QuoteInput,
    QuoteOutcome, QuoteResult,
};
pub use crate::domain::ports::{ConfigProvider, MoneyFormatter, PriceExtractor, Storage};
pub use crate::utils::error::Result;

use crate::domain::model::{ImageUpload, PricingTable};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
    fn write_file(
        &self,
        path: &str,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Settings of the image-to-table extraction service.
pub trait ConfigProvider: Send + Sync {
    fn api_endpoint(&self) -> &str;
    fn model(&self) -> &str;
    fn api_key(&self) -> Option<&str>;
    fn timeout_seconds(&self) -> u64;
}

/// Turns a photographed price grid into a pricing table.
///
/// Implementations report every failure as `QuoterError::ExtractionFailed`;
/// callers must not rely on a more specific error.
#[async_trait]
pub trait PriceExtractor: Send + Sync {
    async fn extract(&self, image: &ImageUpload) -> Result<PricingTable>;
}

pub trait MoneyFormatter: Send + Sync {
    fn format(&self, amount: f64) -> String;
}

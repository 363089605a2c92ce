use crate::domain::model::PricingTable;
use crate::domain::ports::Storage;
use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A price table saved to disk after an update, so a later run can start from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingSnapshot {
    pub updated_at: DateTime<Utc>,
    pub source: String,
    pub table: PricingTable,
}

impl PricingSnapshot {
    pub fn new(source: impl Into<String>, table: PricingTable) -> Self {
        Self {
            updated_at: Utc::now(),
            source: source.into(),
            table,
        }
    }

    pub async fn save<S: Storage>(&self, storage: &S, path: &str) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        storage.write_file(path, json.as_bytes()).await?;
        tracing::debug!("Pricing snapshot written to {}", path);
        Ok(())
    }

    pub async fn load<S: Storage>(storage: &S, path: &str) -> Result<Self> {
        let data = storage.read_file(path).await?;
        let snapshot: PricingSnapshot = serde_json::from_slice(&data)?;
        tracing::debug!(
            "Loaded pricing snapshot from {} (updated {})",
            path,
            snapshot.updated_at
        );
        Ok(snapshot)
    }
}

use crate::domain::model::{PlanId, PlanPrices, PricingTable, BY_CONTRIBUTION_PRICE};
use arc_swap::ArcSwap;
use std::sync::Arc;

/// Current price table. Readers get a whole-table snapshot; the only writer
/// is `install_extracted`, which swaps the table in one step.
#[derive(Debug)]
pub struct PricingStore {
    current: ArcSwap<PricingTable>,
}

impl PricingStore {
    pub fn new(table: PricingTable) -> Self {
        Self {
            current: ArcSwap::from_pointee(table),
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(PricingTable::builtin())
    }

    pub fn snapshot(&self) -> Arc<PricingTable> {
        self.current.load_full()
    }

    /// Replaces the whole table with an extracted one. The by-contribution
    /// entry is always reset to the fixed flat price, whatever the extractor sent.
    pub fn install_extracted(&self, mut table: PricingTable) -> Arc<PricingTable> {
        table.set_plan(
            PlanId::ByContribution,
            Some(PlanPrices::flat(BY_CONTRIBUTION_PRICE)),
        );
        let installed = Arc::new(table);
        self.current.store(Arc::clone(&installed));

        tracing::debug!(
            "Pricing table replaced ({} priced cells)",
            installed.priced_cells()
        );
        installed
    }
}

impl Default for PricingStore {
    fn default() -> Self {
        Self::with_defaults()
    }
}

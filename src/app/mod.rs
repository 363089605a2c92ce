// Front end: the quote form, one-shot commands and the interactive session.

pub mod form;
pub mod session;

use crate::adapters::storage::load_image;
use crate::core::currency::CurrencyFormat;
use crate::core::engine;
use crate::core::snapshot::PricingSnapshot;
use crate::core::store::PricingStore;
use crate::core::updater::{PriceUpdater, UpdateReport};
use crate::domain::model::{AgeBracket, PlanId, PricingTable};
use crate::domain::ports::{MoneyFormatter, PriceExtractor, Storage};
use crate::utils::error::Result;
use form::QuoteForm;
use std::sync::Arc;

/// What the result card shows after "Cotizar".
#[derive(Debug, Clone, PartialEq)]
pub struct QuoteView {
    pub contribution_total: String,
    pub result: String,
}

pub struct QuoterApp<E: PriceExtractor, S: Storage> {
    store: Arc<PricingStore>,
    updater: Arc<PriceUpdater<E>>,
    storage: S,
    formatter: CurrencyFormat,
}

impl<E: PriceExtractor, S: Storage> QuoterApp<E, S> {
    pub fn new(store: PricingStore, extractor: E, storage: S, formatter: CurrencyFormat) -> Self {
        Self {
            store: Arc::new(store),
            updater: Arc::new(PriceUpdater::new(extractor)),
            storage,
            formatter,
        }
    }

    pub fn store(&self) -> &Arc<PricingStore> {
        &self.store
    }

    pub fn formatter(&self) -> &CurrencyFormat {
        &self.formatter
    }

    pub fn quote(&self, form: &QuoteForm) -> QuoteView {
        let table = self.store.snapshot();
        let result = engine::compute_quote(&form.to_input(), &table);

        tracing::debug!(
            "Quote for plan {} (aportes {:?}, edad {:?}): {:?}",
            form.plan(),
            form.aportes(),
            form.edad(),
            result
        );

        QuoteView {
            contribution_total: self.formatter.format(form.contribution_total()),
            result: engine::result_message(&result, &self.formatter),
        }
    }

    /// Loads the image at `image_path`, refreshes the store from it and
    /// optionally writes the installed table to `output` as a snapshot.
    pub async fn update_prices(&self, image_path: &str, output: Option<&str>) -> Result<UpdateReport> {
        let image = load_image(&self.storage, image_path).await?;
        let report = self.updater.update_from_image(&self.store, &image).await?;

        if let Some(path) = output {
            PricingSnapshot::new(image.name.clone(), (*report.table).clone())
                .save(&self.storage, path)
                .await?;
            tracing::info!("Pricing snapshot saved to {}", path);
        }

        Ok(report)
    }

    pub fn prices_report(&self) -> String {
        render_table(&self.store.snapshot(), &self.formatter)
    }
}

/// Plain-text grid of the table, one row per plan.
pub fn render_table(table: &PricingTable, formatter: &dyn MoneyFormatter) -> String {
    let cell = |price: Option<f64>| price.map(|p| formatter.format(p)).unwrap_or_else(|| "-".to_string());

    let mut lines = vec![format!(
        "{:<18}{}",
        "Plan",
        AgeBracket::ALL
            .iter()
            .map(|bracket| format!("{:>16}", bracket.key()))
            .collect::<String>()
    )];

    for plan in PlanId::TIERS {
        let prices = table.plan(plan);
        let row: String = AgeBracket::ALL
            .iter()
            .map(|bracket| format!("{:>16}", cell(prices.and_then(|p| p.price_for(*bracket)))))
            .collect();
        lines.push(format!("{:<18}{}", plan.label(), row));
    }

    lines.push(format!(
        "{:<18}{:>16}",
        PlanId::ByContribution.label(),
        cell(table.by_contribution_price())
    ));

    lines.join("\n")
}

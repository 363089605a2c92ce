use crate::core::store::PricingStore;
use crate::domain::model::{AgeBracket, ImageUpload, PlanId, PricingTable};
use crate::domain::ports::PriceExtractor;
use crate::utils::error::{QuoterError, Result};
use std::error::Error as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub const UPDATE_SUCCESS_MESSAGE: &str = "¡Tabla de precios actualizada correctamente!";

#[derive(Debug, Clone)]
pub struct UpdateReport {
    pub table: Arc<PricingTable>,
    pub priced_cells: usize,
    pub missing_cells: Vec<(PlanId, AgeBracket)>,
}

/// Runs price extractions one at a time and installs successful results.
pub struct PriceUpdater<E: PriceExtractor> {
    extractor: E,
    in_flight: AtomicBool,
}

struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<E: PriceExtractor> PriceUpdater<E> {
    pub fn new(extractor: E) -> Self {
        Self {
            extractor,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Result<InFlightGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| QuoterError::UpdateInProgress)?;
        Ok(InFlightGuard(&self.in_flight))
    }

    /// Extracts a table from `image` and installs it into `store`.
    ///
    /// Fails fast with `UpdateInProgress` if another update is running. Any
    /// extraction failure leaves `store` untouched and is reported as
    /// `ExtractionFailed`.
    pub async fn update_from_image(
        &self,
        store: &PricingStore,
        image: &ImageUpload,
    ) -> Result<UpdateReport> {
        let _guard = self.begin()?;

        tracing::info!(
            "Extracting prices from '{}' ({}, {} bytes)",
            image.name,
            image.mime.as_str(),
            image.bytes.len()
        );

        let extracted = match self.extractor.extract(image).await {
            Ok(table) => table,
            Err(e) => {
                let err = QuoterError::extraction_failed(e);
                match err.source() {
                    Some(cause) => tracing::error!("Price extraction failed: {}", cause),
                    None => tracing::error!("Price extraction failed: {}", err),
                }
                return Err(err);
            }
        };

        let missing_cells = extracted.missing_cells();
        for (plan, bracket) in &missing_cells {
            tracing::warn!("Extracted table has no price for plan {} age {}", plan, bracket);
        }

        let table = store.install_extracted(extracted);
        tracing::info!("{}", UPDATE_SUCCESS_MESSAGE);

        Ok(UpdateReport {
            priced_cells: table.priced_cells(),
            table,
            missing_cells,
        })
    }
}

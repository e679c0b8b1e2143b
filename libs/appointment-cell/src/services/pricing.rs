use std::collections::HashSet;

use tracing::debug;
use uuid::Uuid;

use catalog_cell::{CatalogService, Service};

use crate::models::{AppointmentError, Quote};

/// Drops repeated ids while keeping the first occurrence's position.
pub fn dedupe_service_ids(ids: &[Uuid]) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

pub fn total_price(services: &[Service]) -> f64 {
    services.iter().map(|service| service.base_price).sum()
}

pub struct PricingService {
    catalog: CatalogService,
}

impl PricingService {
    pub fn new(catalog: CatalogService) -> Self {
        Self { catalog }
    }

    /// Prices a selection from the catalog; client-sent totals never enter here.
    pub async fn quote(&self, service_ids: &[Uuid]) -> Result<Quote, AppointmentError> {
        let ids = dedupe_service_ids(service_ids);
        if ids.is_empty() {
            return Err(AppointmentError::ValidationError(
                "Select at least one service".to_string(),
            ));
        }

        let services = self.catalog.get_services_by_ids(&ids).await?;
        let total = total_price(&services);
        debug!("Quoted {} services at {:.2}", services.len(), total);

        Ok(Quote { services, total })
    }
}

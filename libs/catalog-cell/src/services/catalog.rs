use std::collections::HashMap;

use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreQuery};

use crate::models::{CatalogError, CreateServiceRequest, Service, UpdateServiceRequest};

pub const SERVICES: &str = "services";
const APPOINTMENTS: &str = "appointments";

pub fn parse_service_id(raw: &str) -> Result<Uuid, CatalogError> {
    Uuid::parse_str(raw.trim()).map_err(|_| CatalogError::NotFound)
}

fn validate_price(field: &str, value: Option<f64>) -> Result<(), CatalogError> {
    match value {
        Some(price) if !price.is_finite() || price < 0.0 => Err(CatalogError::ValidationError(
            format!("{} must be a non-negative number", field),
        )),
        _ => Ok(()),
    }
}

pub struct CatalogService {
    store: StoreClient,
}

impl CatalogService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub fn with_store(store: StoreClient) -> Self {
        Self { store }
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, CatalogError> {
        debug!("Listing services");
        Ok(self
            .store
            .select(SERVICES, &StoreQuery::new().order("name.asc"))
            .await?)
    }

    pub async fn get_service(&self, service_id: Uuid) -> Result<Service, CatalogError> {
        self.store
            .select_one(SERVICES, &StoreQuery::new().eq("id", service_id))
            .await?
            .ok_or(CatalogError::NotFound)
    }

    /// Loads the requested services in request order; any unknown id fails the call.
    pub async fn get_services_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Service>, CatalogError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found: Vec<Service> = self
            .store
            .select(SERVICES, &StoreQuery::new().in_list("id", ids))
            .await?;
        let by_id: HashMap<Uuid, Service> = found.into_iter().map(|s| (s.id, s)).collect();

        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !by_id.contains_key(id))
            .map(Uuid::to_string)
            .collect();
        if !missing.is_empty() {
            warn!("Unknown services requested: {:?}", missing);
            return Err(CatalogError::MissingServices(missing.join(", ")));
        }

        Ok(ids.iter().filter_map(|id| by_id.get(id).cloned()).collect())
    }

    pub async fn create_service(&self, request: CreateServiceRequest) -> Result<Service, CatalogError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::ValidationError("name is required".to_string()));
        }
        validate_price("base_price", Some(request.base_price))?;
        validate_price("min_price", request.min_price)?;
        validate_price("max_price", request.max_price)?;

        if self.name_taken(&name, None).await? {
            return Err(CatalogError::DuplicateName(name));
        }

        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4(),
            name,
            base_price: request.base_price,
            min_price: request.min_price,
            max_price: request.max_price,
            description: request.description,
            created_at: now,
            updated_at: now,
        };

        let created: Service = self.store.insert(SERVICES, &service).await?;
        info!("Service {} created ({})", created.name, created.id);
        Ok(created)
    }

    pub async fn update_service(
        &self,
        service_id: Uuid,
        request: UpdateServiceRequest,
    ) -> Result<Service, CatalogError> {
        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(CatalogError::ValidationError("name is required".to_string()));
            }
            if self.name_taken(&name, Some(service_id)).await? {
                return Err(CatalogError::DuplicateName(name));
            }
            update_data.insert("name".to_string(), json!(name));
        }
        if let Some(price) = request.base_price {
            validate_price("base_price", Some(price))?;
            update_data.insert("base_price".to_string(), json!(price));
        }
        if let Some(price) = request.min_price {
            validate_price("min_price", Some(price))?;
            update_data.insert("min_price".to_string(), json!(price));
        }
        if let Some(price) = request.max_price {
            validate_price("max_price", Some(price))?;
            update_data.insert("max_price".to_string(), json!(price));
        }
        if let Some(description) = request.description {
            update_data.insert("description".to_string(), json!(description));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        let updated: Vec<Service> = self
            .store
            .update(SERVICES, &StoreQuery::new().eq("id", service_id), Value::Object(update_data))
            .await?;
        updated.into_iter().next().ok_or(CatalogError::NotFound)
    }

    pub async fn delete_service(&self, service_id: Uuid) -> Result<(), CatalogError> {
        let referenced = self
            .store
            .exists(APPOINTMENTS, &StoreQuery::new().contains("services", service_id))
            .await?;
        if referenced {
            warn!("Refusing to delete service {} used by appointments", service_id);
            return Err(CatalogError::InUse);
        }

        let removed = self
            .store
            .delete(SERVICES, &StoreQuery::new().eq("id", service_id))
            .await?;
        if removed == 0 {
            return Err(CatalogError::NotFound);
        }

        info!("Service {} deleted", service_id);
        Ok(())
    }

    async fn name_taken(&self, name: &str, except: Option<Uuid>) -> Result<bool, CatalogError> {
        let existing: Vec<Service> = self
            .store
            .select(SERVICES, &StoreQuery::new().ilike("name", name))
            .await?;
        Ok(existing
            .iter()
            .any(|service| same_name(&service.name, name) && Some(service.id) != except))
    }
}

fn same_name(a: &str, b: &str) -> bool {
    a.trim().to_lowercase() == b.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn negative_prices_are_rejected() {
        assert_matches!(validate_price("base_price", Some(-1.0)), Err(CatalogError::ValidationError(_)));
        assert_matches!(validate_price("base_price", Some(f64::NAN)), Err(CatalogError::ValidationError(_)));
        assert!(validate_price("base_price", Some(0.0)).is_ok());
        assert!(validate_price("min_price", None).is_ok());
    }

    #[test]
    fn service_names_compare_without_case() {
        assert!(same_name("Cleaning", "cleaning"));
        assert!(same_name("Root Canal ", "ROOT CANAL"));
        assert!(!same_name("Cleaning", "Deep Cleaning"));
    }

    #[test]
    fn service_ids_must_be_uuids() {
        assert_matches!(parse_service_id("cleaning"), Err(CatalogError::NotFound));
    }
}

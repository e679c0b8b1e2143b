use chrono::Utc;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{StoreClient, StoreQuery};
use shared_models::dates::normalize_dates;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, UpdateDoctorRequest};

pub const DOCTORS: &str = "doctors";
pub const APPOINTMENTS: &str = "appointments";

pub fn parse_doctor_id(raw: &str) -> Result<Uuid, DoctorError> {
    Uuid::parse_str(raw.trim()).map_err(|_| DoctorError::NotFound)
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require(field: &str, value: &str) -> Result<(), DoctorError> {
    if value.trim().is_empty() {
        return Err(DoctorError::ValidationError(format!("{} is required", field)));
    }
    Ok(())
}

pub struct DoctorService {
    store: StoreClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            store: StoreClient::new(config),
        }
    }

    pub fn with_store(store: StoreClient) -> Self {
        Self { store }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        debug!("Listing doctors");
        let doctors = self
            .store
            .select(DOCTORS, &StoreQuery::new().order("name.asc"))
            .await?;
        Ok(doctors)
    }

    pub async fn get_doctor(&self, doctor_id: Uuid) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);
        self.store
            .select_one(DOCTORS, &StoreQuery::new().eq("id", doctor_id))
            .await?
            .ok_or(DoctorError::NotFound)
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        require("name", &request.name)?;
        require("specialization", &request.specialization)?;
        require("email", &request.email)?;

        let email = normalize_email(&request.email);
        debug!("Creating doctor profile for: {}", email);

        if self.email_taken(&email, None).await? {
            return Err(DoctorError::DuplicateEmail(email));
        }

        let now = Utc::now();
        let doctor = Doctor {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            specialization: request.specialization.trim().to_string(),
            email,
            phone: request.phone.trim().to_string(),
            holidays: normalize_dates(request.holidays),
            created_at: now,
            updated_at: now,
        };

        let created: Doctor = self.store.insert(DOCTORS, &doctor).await?;
        info!("Doctor profile created with ID: {}", created.id);
        Ok(created)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: Uuid,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor profile: {}", doctor_id);

        let mut update_data = serde_json::Map::new();

        if let Some(name) = request.name {
            require("name", &name)?;
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(specialization) = request.specialization {
            require("specialization", &specialization)?;
            update_data.insert("specialization".to_string(), json!(specialization.trim()));
        }
        if let Some(email) = request.email {
            require("email", &email)?;
            let email = normalize_email(&email);
            if self.email_taken(&email, Some(doctor_id)).await? {
                return Err(DoctorError::DuplicateEmail(email));
            }
            update_data.insert("email".to_string(), json!(email));
        }
        if let Some(phone) = request.phone {
            update_data.insert("phone".to_string(), json!(phone.trim()));
        }

        update_data.insert("updated_at".to_string(), json!(Utc::now()));

        self.patch(doctor_id, Value::Object(update_data)).await
    }

    /// Refuses to delete a doctor that appointments still point at.
    pub async fn delete_doctor(&self, doctor_id: Uuid) -> Result<(), DoctorError> {
        debug!("Deleting doctor: {}", doctor_id);

        let referenced = self
            .store
            .exists(APPOINTMENTS, &StoreQuery::new().eq("doctor", doctor_id))
            .await?;
        if referenced {
            warn!("Refusing to delete doctor {} with existing appointments", doctor_id);
            return Err(DoctorError::InUse);
        }

        let removed = self
            .store
            .delete(DOCTORS, &StoreQuery::new().eq("id", doctor_id))
            .await?;
        if removed == 0 {
            return Err(DoctorError::NotFound);
        }

        info!("Doctor {} deleted", doctor_id);
        Ok(())
    }

    pub(crate) async fn patch(&self, doctor_id: Uuid, patch: Value) -> Result<Doctor, DoctorError> {
        let updated: Vec<Doctor> = self
            .store
            .update(DOCTORS, &StoreQuery::new().eq("id", doctor_id), patch)
            .await?;
        updated.into_iter().next().ok_or(DoctorError::NotFound)
    }

    pub(crate) fn store(&self) -> &StoreClient {
        &self.store
    }

    async fn email_taken(&self, email: &str, except: Option<Uuid>) -> Result<bool, DoctorError> {
        let existing: Vec<Doctor> = self
            .store
            .select(DOCTORS, &StoreQuery::new().eq("email", email))
            .await?;
        Ok(existing.iter().any(|doctor| Some(doctor.id) != except))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn doctor_ids_must_be_uuids() {
        assert_matches!(parse_doctor_id("not-a-uuid"), Err(DoctorError::NotFound));
        let id = Uuid::new_v4();
        assert_eq!(parse_doctor_id(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn emails_compare_case_insensitively() {
        assert_eq!(normalize_email("  Dr.A@Clinic.Test "), "dr.a@clinic.test");
    }

    #[test]
    fn blank_fields_are_rejected() {
        assert_matches!(require("name", "   "), Err(DoctorError::ValidationError(_)));
        assert!(require("name", "Dr. A").is_ok());
    }
}

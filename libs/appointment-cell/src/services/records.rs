use chrono::{NaiveDate, Utc};
use rand::{distributions::Alphanumeric, Rng};
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use doctor_cell::DoctorService;
use shared_config::AppConfig;
use shared_database::{StoreClient, StoreQuery};
use shared_models::dates::DATE_FORMAT;
use shared_models::scheduling::AppointmentStatus;

use crate::models::{
    Appointment, AppointmentDocument, AppointmentError, AppointmentFilter, MedicalHistoryUpdate,
    PatientUpdateRequest, RescheduleRequest,
};
use crate::services::lifecycle::AppointmentLifecycleService;
use crate::services::report::sort_for_report;

pub const APPOINTMENTS: &str = "appointments";
const REPORT_ID_PREFIX: &str = "APT-";
const REPORT_ID_LENGTH: usize = 10;
const REPORT_ID_ATTEMPTS: usize = 5;

pub fn generate_report_id() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REPORT_ID_LENGTH)
        .map(char::from)
        .collect();
    format!("{}{}", REPORT_ID_PREFIX, suffix.to_uppercase())
}

/// Case-insensitive match on patient name, email, phone or report token.
pub fn matches_search(appointment: &Appointment, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    [
        &appointment.patient_name,
        &appointment.patient_email,
        &appointment.patient_phone,
        &appointment.appointment_id,
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(&term))
}

/// Which image slot an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Before,
    After,
}

impl ImageSlot {
    fn column(self) -> &'static str {
        match self {
            ImageSlot::Before => "before_image",
            ImageSlot::After => "after_image",
        }
    }
}

pub struct AppointmentRecordService {
    store: StoreClient,
    doctors: DoctorService,
    lifecycle: AppointmentLifecycleService,
}

impl AppointmentRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self::with_store(StoreClient::new(config))
    }

    pub fn with_store(store: StoreClient) -> Self {
        Self {
            doctors: DoctorService::with_store(store.clone()),
            store,
            lifecycle: AppointmentLifecycleService::new(),
        }
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self
            .store
            .select_one(APPOINTMENTS, &StoreQuery::new().eq("id", id))
            .await?)
    }

    pub async fn find_by_payment_id(&self, payment_id: &str) -> Result<Option<Appointment>, AppointmentError> {
        Ok(self
            .store
            .select_one(APPOINTMENTS, &StoreQuery::new().eq("razorpay_payment_id", payment_id))
            .await?)
    }

    /// All records sharing a report token, newest first.
    pub async fn group(&self, appointment_id: &str) -> Result<Vec<Appointment>, AppointmentError> {
        let mut records: Vec<Appointment> = self
            .store
            .select(
                APPOINTMENTS,
                &StoreQuery::new()
                    .eq("appointment_id", appointment_id)
                    .order("date.desc,created_at.desc"),
            )
            .await?;
        sort_for_report(&mut records);
        Ok(records)
    }

    pub async fn report_id_exists(&self, appointment_id: &str) -> Result<bool, AppointmentError> {
        Ok(self
            .store
            .exists(APPOINTMENTS, &StoreQuery::new().eq("appointment_id", appointment_id))
            .await?)
    }

    pub async fn issue_report_id(&self) -> Result<String, AppointmentError> {
        for _ in 0..REPORT_ID_ATTEMPTS {
            let candidate = generate_report_id();
            if !self.report_id_exists(&candidate).await? {
                return Ok(candidate);
            }
            debug!("Report id {} already taken, retrying", candidate);
        }
        Err(AppointmentError::DatabaseError(
            "Could not allocate a unique appointment id".to_string(),
        ))
    }

    /// A document id first, then the primary record of a report group.
    pub async fn resolve(&self, identifier: &str) -> Result<Appointment, AppointmentError> {
        let identifier = identifier.trim();

        if let Ok(id) = Uuid::parse_str(identifier) {
            if let Some(appointment) = self.get(id).await? {
                return Ok(appointment);
            }
        }

        self.group(identifier)
            .await?
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound)
    }

    async fn resolve_primary(&self, identifier: &str) -> Result<Appointment, AppointmentError> {
        let target = self.resolve(identifier).await?;
        Ok(self
            .group(&target.appointment_id)
            .await?
            .into_iter()
            .next()
            .unwrap_or(target))
    }

    pub async fn ensure_doctor_available(&self, doctor_id: Uuid, date: NaiveDate) -> Result<(), AppointmentError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;
        if doctor.is_on_holiday(date) {
            warn!("Doctor {} is on holiday on {}", doctor_id, date);
            return Err(AppointmentError::DoctorOnHoliday(date));
        }
        Ok(())
    }

    pub async fn insert(&self, appointment: &Appointment) -> Result<Appointment, AppointmentError> {
        Ok(self.store.insert(APPOINTMENTS, appointment).await?)
    }

    async fn patch(&self, id: Uuid, mut patch: Value) -> Result<Appointment, AppointmentError> {
        if let Value::Object(fields) = &mut patch {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }
        let updated: Vec<Appointment> = self
            .store
            .update(APPOINTMENTS, &StoreQuery::new().eq("id", id), patch)
            .await?;
        updated.into_iter().next().ok_or(AppointmentError::NotFound)
    }

    pub async fn list(&self, filter: &AppointmentFilter) -> Result<Vec<Appointment>, AppointmentError> {
        let mut query = StoreQuery::new();
        if let Some(status) = filter.status {
            query = query.eq("status", status);
        }
        if let Some(payment_status) = filter.payment_status {
            query = query.eq("payment_status", payment_status);
        }
        if let Some(doctor) = filter.doctor {
            query = query.eq("doctor", doctor);
        }
        if let Some(from) = filter.from {
            query = query.gte("date", from.format(DATE_FORMAT));
        }
        if let Some(to) = filter.to {
            query = query.lte("date", to.format(DATE_FORMAT));
        }
        if let Some(offline) = filter.offline {
            query = query.eq("is_offline_booking", offline);
        }

        let mut appointments: Vec<Appointment> = self
            .store
            .select(APPOINTMENTS, &query.order("date.desc,created_at.desc"))
            .await?;
        sort_for_report(&mut appointments);

        if let Some(term) = filter.search.as_deref() {
            appointments.retain(|appointment| matches_search(appointment, term));
        }

        debug!("Listed {} appointments", appointments.len());
        Ok(appointments)
    }

    pub async fn update_status(
        &self,
        identifier: &str,
        status: AppointmentStatus,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.resolve(identifier).await?;
        self.lifecycle.validate_status_transition(appointment.status, status)?;

        let updated = self.patch(appointment.id, json!({ "status": status })).await?;
        info!("Appointment {} moved {} -> {}", updated.id, appointment.status, updated.status);
        Ok(updated)
    }

    /// Moves a booking to a new day and slot; both are required.
    pub async fn reschedule(
        &self,
        identifier: &str,
        request: RescheduleRequest,
    ) -> Result<Appointment, AppointmentError> {
        let (date, time_slot) = match (request.date, request.time_slot) {
            (Some(date), Some(time_slot)) => (date, time_slot),
            _ => {
                return Err(AppointmentError::ValidationError(
                    "Both date and time_slot are required to reschedule".to_string(),
                ))
            }
        };

        let appointment = self.resolve(identifier).await?;
        let status = self
            .lifecycle
            .resolve_reschedule_status(appointment.status, request.status)?;
        self.ensure_doctor_available(appointment.doctor, date).await?;

        let updated = self
            .patch(
                appointment.id,
                json!({
                    "date": date.format(DATE_FORMAT).to_string(),
                    "time_slot": time_slot,
                    "status": status
                }),
            )
            .await?;

        info!("Appointment {} rescheduled to {} {}", updated.id, date, time_slot);
        Ok(updated)
    }

    pub async fn update_notes(
        &self,
        identifier: &str,
        notes: Option<String>,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.resolve(identifier).await?;
        self.patch(appointment.id, json!({ "notes": notes })).await
    }

    pub async fn update_medical_history(
        &self,
        identifier: &str,
        update: MedicalHistoryUpdate,
    ) -> Result<Appointment, AppointmentError> {
        if update.is_empty() {
            return Err(AppointmentError::ValidationError(
                "No medical history fields supplied".to_string(),
            ));
        }

        let primary = self.resolve_primary(identifier).await?;
        let history = update.apply(primary.medical_history.clone());

        let updated = self
            .patch(primary.id, json!({ "medical_history": history }))
            .await?;
        info!("Medical history updated for report {}", updated.appointment_id);
        Ok(updated)
    }

    pub async fn update_patient(
        &self,
        identifier: &str,
        request: PatientUpdateRequest,
    ) -> Result<Appointment, AppointmentError> {
        let mut fields = serde_json::Map::new();
        for (column, value) in [
            ("patient_name", request.patient_name),
            ("patient_email", request.patient_email),
            ("patient_phone", request.patient_phone),
        ] {
            if let Some(value) = value {
                let value = value.trim().to_string();
                if value.is_empty() {
                    return Err(AppointmentError::ValidationError(format!("{} cannot be empty", column)));
                }
                fields.insert(column.to_string(), json!(value));
            }
        }
        if fields.is_empty() {
            return Err(AppointmentError::ValidationError("No patient fields supplied".to_string()));
        }

        let primary = self.resolve_primary(identifier).await?;
        self.patch(primary.id, Value::Object(fields)).await
    }

    pub async fn set_image(
        &self,
        identifier: &str,
        slot: ImageSlot,
        path: &str,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.resolve(identifier).await?;
        let mut fields = serde_json::Map::new();
        fields.insert(slot.column().to_string(), json!(path));
        self.patch(appointment.id, Value::Object(fields)).await
    }

    pub async fn add_document(
        &self,
        identifier: &str,
        document: AppointmentDocument,
    ) -> Result<Appointment, AppointmentError> {
        let appointment = self.resolve(identifier).await?;
        let mut documents = appointment.documents.clone();
        documents.push(document);
        self.patch(appointment.id, json!({ "documents": documents })).await
    }

    pub async fn delete(&self, identifier: &str) -> Result<Appointment, AppointmentError> {
        let appointment = self.resolve(identifier).await?;
        let removed = self
            .store
            .delete(APPOINTMENTS, &StoreQuery::new().eq("id", appointment.id))
            .await?;
        if removed == 0 {
            return Err(AppointmentError::NotFound);
        }

        info!("Appointment {} ({}) deleted", appointment.id, appointment.appointment_id);
        Ok(appointment)
    }
}

use chrono::NaiveDate;
use uuid::Uuid;

use shared_models::scheduling::{TimeSlot, ADVANCE_AMOUNT};

use crate::models::{BookingSelection, PatientDetails, Service};

/// Edits the booking page makes to its form.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    SelectDoctor(Uuid),
    HolidaysLoaded { doctor_id: Uuid, holidays: Vec<NaiveDate> },
    SelectDate(NaiveDate),
    SelectSlot(TimeSlot),
    ToggleService(Uuid),
    SetPatient(PatientDetails),
    SetNotes(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormIssue {
    MissingDoctor,
    /// The selected doctor's holidays have not arrived yet.
    HolidaysNotLoaded,
    MissingDate,
    DateOnHoliday(NaiveDate),
    MissingSlot,
    NoServices,
    MissingPatientField(&'static str),
}

/// A form that passed `validate`, ready to be paid for.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidBooking {
    pub selection: BookingSelection,
    pub patient: PatientDetails,
    pub notes: Option<String>,
    pub total: f64,
}

#[derive(Debug, Clone, Default)]
pub struct BookingForm {
    catalog: Vec<Service>,
    pub doctor: Option<Uuid>,
    pub holidays: Vec<NaiveDate>,
    holidays_loaded_for: Option<Uuid>,
    pub date: Option<NaiveDate>,
    pub time_slot: Option<TimeSlot>,
    pub services: Vec<Uuid>,
    pub patient: PatientDetails,
    pub notes: Option<String>,
}

impl BookingForm {
    pub fn new(catalog: Vec<Service>) -> Self {
        Self {
            catalog,
            ..Self::default()
        }
    }

    pub fn reduce(mut self, action: BookingAction) -> Self {
        match action {
            BookingAction::SelectDoctor(doctor_id) => {
                if self.doctor != Some(doctor_id) {
                    self.doctor = Some(doctor_id);
                    self.holidays.clear();
                    self.holidays_loaded_for = None;
                }
            }
            BookingAction::HolidaysLoaded { doctor_id, holidays } => {
                // Late answers for a previously selected doctor are dropped
                if self.doctor == Some(doctor_id) {
                    self.holidays = holidays;
                    self.holidays_loaded_for = Some(doctor_id);
                }
            }
            BookingAction::SelectDate(date) => self.date = Some(date),
            BookingAction::SelectSlot(slot) => self.time_slot = Some(slot),
            BookingAction::ToggleService(service_id) => {
                if let Some(pos) = self.services.iter().position(|id| *id == service_id) {
                    self.services.remove(pos);
                } else {
                    self.services.push(service_id);
                }
            }
            BookingAction::SetPatient(patient) => self.patient = patient,
            BookingAction::SetNotes(notes) => {
                let notes = notes.trim().to_string();
                self.notes = if notes.is_empty() { None } else { Some(notes) };
            }
        }
        self
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    /// Sum of the selected services' base prices, as shown before payment.
    pub fn total(&self) -> f64 {
        self.services
            .iter()
            .filter_map(|id| self.catalog.iter().find(|s| s.id == *id))
            .map(|s| s.base_price)
            .sum()
    }

    pub fn advance(&self) -> f64 {
        ADVANCE_AMOUNT
    }

    pub fn validate(&self) -> Result<ValidBooking, Vec<FormIssue>> {
        let mut issues = Vec::new();

        match self.doctor {
            None => issues.push(FormIssue::MissingDoctor),
            Some(doctor) if self.holidays_loaded_for != Some(doctor) => {
                issues.push(FormIssue::HolidaysNotLoaded)
            }
            Some(_) => {}
        }
        match self.date {
            None => issues.push(FormIssue::MissingDate),
            Some(date) if self.is_holiday(date) => issues.push(FormIssue::DateOnHoliday(date)),
            Some(_) => {}
        }
        if self.time_slot.is_none() {
            issues.push(FormIssue::MissingSlot);
        }
        if self.services.is_empty() {
            issues.push(FormIssue::NoServices);
        }
        for (field, value) in [
            ("patient_name", &self.patient.patient_name),
            ("patient_email", &self.patient.patient_email),
            ("patient_phone", &self.patient.patient_phone),
        ] {
            if value.trim().is_empty() {
                issues.push(FormIssue::MissingPatientField(field));
            }
        }

        match (self.doctor, self.date, self.time_slot) {
            (Some(doctor), Some(date), Some(time_slot)) if issues.is_empty() => Ok(ValidBooking {
                selection: BookingSelection {
                    doctor,
                    services: self.services.clone(),
                    date,
                    time_slot,
                },
                patient: self.patient.clone(),
                notes: self.notes.clone(),
                total: self.total(),
            }),
            _ => Err(issues),
        }
    }
}

use chrono::{NaiveDate, Utc};
use serde_json::json;
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::StoreQuery;
use shared_models::dates::{normalize_dates, DATE_FORMAT};

use crate::models::{
    DoctorError, DoctorHolidays, DoctorSchedule, HolidayUpdateRequest, ScheduledAppointment,
};
use crate::services::doctor::{DoctorService, APPOINTMENTS};

/// Adds then removes holidays by calendar day; the result is sorted and unique.
pub fn apply_holiday_update(
    current: &[NaiveDate],
    add: &[NaiveDate],
    remove: &[NaiveDate],
) -> Vec<NaiveDate> {
    normalize_dates(
        current
            .iter()
            .chain(add.iter())
            .copied()
            .filter(|date| !remove.contains(date)),
    )
}

pub struct AvailabilityService {
    doctors: DoctorService,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            doctors: DoctorService::new(config),
        }
    }

    pub async fn get_holidays(&self, doctor_id: Uuid) -> Result<DoctorHolidays, DoctorError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;
        Ok(DoctorHolidays {
            doctor_id: doctor.id,
            holidays: normalize_dates(doctor.holidays),
        })
    }

    pub async fn update_holidays(
        &self,
        doctor_id: Uuid,
        request: HolidayUpdateRequest,
    ) -> Result<DoctorHolidays, DoctorError> {
        if request.add.is_empty() && request.remove.is_empty() {
            return Err(DoctorError::ValidationError(
                "Provide at least one date to add or remove".to_string(),
            ));
        }

        let doctor = self.doctors.get_doctor(doctor_id).await?;
        let holidays = apply_holiday_update(&doctor.holidays, &request.add, &request.remove);
        debug!("Doctor {} holidays: {} -> {}", doctor_id, doctor.holidays.len(), holidays.len());

        let formatted: Vec<String> = holidays
            .iter()
            .map(|date| date.format(DATE_FORMAT).to_string())
            .collect();

        let updated = self
            .doctors
            .patch(
                doctor_id,
                json!({
                    "holidays": formatted,
                    "updated_at": Utc::now()
                }),
            )
            .await?;

        info!("Updated holidays for doctor {}", doctor_id);
        Ok(DoctorHolidays {
            doctor_id: updated.id,
            holidays: updated.holidays,
        })
    }

    /// Holidays plus every appointment booked with the doctor, oldest first.
    pub async fn get_schedule(&self, doctor_id: Uuid) -> Result<DoctorSchedule, DoctorError> {
        let doctor = self.doctors.get_doctor(doctor_id).await?;

        let mut appointments: Vec<ScheduledAppointment> = self
            .doctors
            .store()
            .select(
                APPOINTMENTS,
                &StoreQuery::new().eq("doctor", doctor_id).order("date.asc"),
            )
            .await?;
        appointments.sort_by(|a, b| a.date.cmp(&b.date).then(a.time_slot.cmp(&b.time_slot)));

        Ok(DoctorSchedule {
            holidays: normalize_dates(doctor.holidays.clone()),
            doctor,
            appointments,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn adding_an_existing_day_is_a_no_op() {
        let result = apply_holiday_update(&[day(10)], &[day(10), day(2)], &[]);
        assert_eq!(result, vec![day(2), day(10)]);
    }

    #[test]
    fn removal_ignores_order_and_missing_days() {
        let result = apply_holiday_update(&[day(3), day(1), day(2)], &[], &[day(2), day(9)]);
        assert_eq!(result, vec![day(1), day(3)]);
    }

    #[test]
    fn remove_wins_over_add_for_the_same_day() {
        let result = apply_holiday_update(&[], &[day(5)], &[day(5)]);
        assert!(result.is_empty());
    }
}

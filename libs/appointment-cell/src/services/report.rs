use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;

use crate::models::{Appointment, AppointmentDocument, AppointmentError, ReportView};
use crate::services::records::AppointmentRecordService;

/// Newest visit first; same-day records by creation time.
pub fn sort_for_report(records: &mut [Appointment]) {
    records.sort_by(|a, b| b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at)));
}

fn latest_image<F>(records: &[Appointment], pick: F) -> Option<String>
where
    F: Fn(&Appointment) -> Option<&String>,
{
    records
        .iter()
        .filter_map(pick)
        .find(|path| !path.trim().is_empty())
        .cloned()
}

/// Folds a report group into its view; `None` for an empty group.
pub fn build_report(mut records: Vec<Appointment>) -> Option<ReportView> {
    sort_for_report(&mut records);
    let primary = records.first()?.clone();

    let mut documents: Vec<AppointmentDocument> = records
        .iter()
        .flat_map(|record| record.documents.iter().cloned())
        .collect();
    documents.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));

    Some(ReportView {
        appointment_id: primary.appointment_id.clone(),
        before_image: latest_image(&records, |r| r.before_image.as_ref()),
        after_image: latest_image(&records, |r| r.after_image.as_ref()),
        documents,
        primary,
        history: records,
    })
}

pub struct ReportService {
    records: AppointmentRecordService,
}

impl ReportService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            records: AppointmentRecordService::new(config),
        }
    }

    /// Report token first, falling back to a document id.
    pub async fn lookup(&self, identifier: &str) -> Result<ReportView, AppointmentError> {
        let identifier = identifier.trim();
        debug!("Looking up report {}", identifier);

        let group = self.records.group(identifier).await?;
        if let Some(report) = build_report(group) {
            return Ok(report);
        }

        match Uuid::parse_str(identifier) {
            Ok(id) => self.lookup_by_document_id(id).await,
            Err(_) => Err(AppointmentError::NotFound),
        }
    }

    pub async fn lookup_by_document_id(&self, id: Uuid) -> Result<ReportView, AppointmentError> {
        let appointment = self.records.get(id).await?.ok_or(AppointmentError::NotFound)?;
        let group = self.records.group(&appointment.appointment_id).await?;

        // The document itself may be the only member of its group
        let group = if group.is_empty() { vec![appointment] } else { group };
        build_report(group).ok_or(AppointmentError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, NaiveDate, Utc};
    use shared_models::scheduling::{AppointmentStatus, PaymentOption, PaymentStatus, TimeSlot};

    use crate::models::MedicalHistory;

    fn record(date: &str, created: &str) -> Appointment {
        let created_at: DateTime<Utc> = created.parse().unwrap();
        Appointment {
            id: Uuid::new_v4(),
            appointment_id: "APT-TESTREPORT".to_string(),
            patient_name: "Asha Rao".to_string(),
            patient_email: "asha@example.com".to_string(),
            patient_phone: "9000000001".to_string(),
            doctor: Uuid::new_v4(),
            services: vec![Uuid::new_v4()],
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            time_slot: TimeSlot::TenAm,
            payment_option: PaymentOption::PayAdvance,
            advance_amount: 50.0,
            total_amount: 800.0,
            payment_status: PaymentStatus::Paid,
            razorpay_order_id: None,
            razorpay_payment_id: None,
            is_offline_booking: false,
            status: AppointmentStatus::Pending,
            notes: None,
            medical_history: MedicalHistory::default(),
            before_image: None,
            after_image: None,
            documents: vec![],
            created_at,
            updated_at: created_at,
        }
    }

    fn document(name: &str, at: &str) -> AppointmentDocument {
        AppointmentDocument {
            name: name.to_string(),
            path: format!("/uploads/{}", name),
            uploaded_at: at.parse().unwrap(),
            mime_type: "application/pdf".to_string(),
        }
    }

    #[test]
    fn records_sort_by_date_then_creation_descending() {
        let mut records = vec![
            record("2025-03-01", "2025-02-20T10:00:00Z"),
            record("2025-04-01", "2025-03-20T10:00:00Z"),
            record("2025-04-01", "2025-03-25T10:00:00Z"),
        ];
        let newest = records[2].id;
        let oldest = records[0].id;

        sort_for_report(&mut records);

        assert_eq!(records[0].id, newest);
        assert_eq!(records[2].id, oldest);
    }

    #[test]
    fn report_takes_latest_non_empty_images() {
        let mut older = record("2025-03-01", "2025-02-20T10:00:00Z");
        older.before_image = Some("/uploads/before-1.jpg".to_string());
        older.after_image = Some("/uploads/after-1.jpg".to_string());
        older.documents = vec![document("xray.pdf", "2025-03-01T12:00:00Z")];

        let mut newer = record("2025-04-01", "2025-03-20T10:00:00Z");
        newer.after_image = Some(String::new());
        newer.documents = vec![document("plan.pdf", "2025-04-01T12:00:00Z")];

        let report = build_report(vec![older, newer.clone()]).unwrap();

        assert_eq!(report.primary.id, newer.id);
        assert_eq!(report.history.len(), 2);
        assert_eq!(report.before_image.as_deref(), Some("/uploads/before-1.jpg"));
        assert_eq!(report.after_image.as_deref(), Some("/uploads/after-1.jpg"));
        assert_eq!(report.documents[0].name, "plan.pdf");
    }

    #[test]
    fn empty_group_has_no_report() {
        assert!(build_report(Vec::new()).is_none());
    }
}

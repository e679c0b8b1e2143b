use std::collections::HashMap;

use uuid::Uuid;

use shared_models::dates::DATE_FORMAT;

use crate::models::Appointment;

pub const EXPORT_HEADER: &str = "appointment_id,patient_name,patient_email,patient_phone,doctor,date,time_slot,status,payment_status,payment_option,advance_amount,total_amount";

fn csv_field(value: &str) -> String {
    if value.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per appointment; the doctor column shows the name when known.
pub fn appointments_to_csv(appointments: &[Appointment], doctor_names: &HashMap<Uuid, String>) -> String {
    let mut out = String::from(EXPORT_HEADER);
    out.push('\n');

    for appointment in appointments {
        let doctor = doctor_names
            .get(&appointment.doctor)
            .cloned()
            .unwrap_or_else(|| appointment.doctor.to_string());
        let row = [
            appointment.appointment_id.clone(),
            appointment.patient_name.clone(),
            appointment.patient_email.clone(),
            appointment.patient_phone.clone(),
            doctor,
            appointment.date.format(DATE_FORMAT).to_string(),
            appointment.time_slot.to_string(),
            appointment.status.to_string(),
            appointment.payment_status.to_string(),
            appointment.payment_option.to_string(),
            format!("{:.2}", appointment.advance_amount),
            format!("{:.2}", appointment.total_amount),
        ];
        let line: Vec<String> = row.iter().map(|field| csv_field(field)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn fields_with_separators_are_quoted() {
        assert_eq!(csv_field("plain"), "plain");
        assert_eq!(csv_field("Rao, Asha"), "\"Rao, Asha\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn rows_follow_the_header() {
        let doctor = Uuid::new_v4();
        let appointment: Appointment = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "appointment_id": "APT-ABCDE12345",
            "patient_name": "Rao, Asha",
            "patient_email": "asha@example.com",
            "patient_phone": "9000000001",
            "doctor": doctor,
            "services": [Uuid::new_v4()],
            "date": "2025-03-10",
            "time_slot": "02:00 PM - 03:00 PM",
            "payment_option": "Offline Payment",
            "advance_amount": 0.0,
            "total_amount": 1200.0,
            "payment_status": "Bypassed",
            "status": "Approved",
            "created_at": "2025-03-01T08:00:00Z",
            "updated_at": "2025-03-01T08:00:00Z"
        }))
        .unwrap();
        let names = HashMap::from([(doctor, "Dr. Mehta".to_string())]);

        let csv = appointments_to_csv(&[appointment], &names);
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], EXPORT_HEADER);
        assert_eq!(
            lines[1],
            "APT-ABCDE12345,\"Rao, Asha\",asha@example.com,9000000001,Dr. Mehta,2025-03-10,02:00 PM - 03:00 PM,Approved,Bypassed,Offline Payment,0.00,1200.00"
        );
    }
}

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Fixed advance collected online for every paid booking, in rupees.
pub const ADVANCE_AMOUNT: f64 = 50.0;
pub const CURRENCY: &str = "INR";

/// Converts a rupee amount into paise for the payment processor.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

// ==============================================================================
// TIME SLOTS
// ==============================================================================

/// One of the seven bookable one-hour windows. 01:00 PM - 02:00 PM is lunch.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimeSlot {
    #[serde(rename = "09:00 AM - 10:00 AM")]
    NineAm,
    #[serde(rename = "10:00 AM - 11:00 AM")]
    TenAm,
    #[serde(rename = "11:00 AM - 12:00 PM")]
    ElevenAm,
    #[serde(rename = "12:00 PM - 01:00 PM")]
    Noon,
    #[serde(rename = "02:00 PM - 03:00 PM")]
    TwoPm,
    #[serde(rename = "03:00 PM - 04:00 PM")]
    ThreePm,
    #[serde(rename = "04:00 PM - 05:00 PM")]
    FourPm,
}

impl TimeSlot {
    pub const ALL: [TimeSlot; 7] = [
        TimeSlot::NineAm,
        TimeSlot::TenAm,
        TimeSlot::ElevenAm,
        TimeSlot::Noon,
        TimeSlot::TwoPm,
        TimeSlot::ThreePm,
        TimeSlot::FourPm,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            TimeSlot::NineAm => "09:00 AM - 10:00 AM",
            TimeSlot::TenAm => "10:00 AM - 11:00 AM",
            TimeSlot::ElevenAm => "11:00 AM - 12:00 PM",
            TimeSlot::Noon => "12:00 PM - 01:00 PM",
            TimeSlot::TwoPm => "02:00 PM - 03:00 PM",
            TimeSlot::ThreePm => "03:00 PM - 04:00 PM",
            TimeSlot::FourPm => "04:00 PM - 05:00 PM",
        }
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TimeSlot {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeSlot::ALL
            .iter()
            .copied()
            .find(|slot| slot.label() == s.trim())
            .ok_or_else(|| format!("Unknown time slot: {}", s))
    }
}

// ==============================================================================
// WORKFLOW AND PAYMENT STATES
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Pending,
    Approved,
    Rejected,
    Completed,
    Cancelled,
    Rescheduled,
}

impl AppointmentStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Completed | AppointmentStatus::Rejected | AppointmentStatus::Cancelled
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Rejected => "Rejected",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
            AppointmentStatus::Rescheduled => "Rescheduled",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentOption {
    #[serde(rename = "Pay advance")]
    PayAdvance,
    #[serde(rename = "Offline Payment")]
    OfflinePayment,
}

impl fmt::Display for PaymentOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentOption::PayAdvance => write!(f, "Pay advance"),
            PaymentOption::OfflinePayment => write!(f, "Offline Payment"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Failed,
    Refunded,
    Bypassed,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Failed => "Failed",
            PaymentStatus::Refunded => "Refunded",
            PaymentStatus::Bypassed => "Bypassed",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_round_trip_through_their_labels() {
        for slot in TimeSlot::ALL {
            let json = serde_json::to_value(slot).unwrap();
            assert_eq!(json, slot.label());
            assert_eq!(slot.label().parse::<TimeSlot>().unwrap(), slot);
        }
    }

    #[test]
    fn lunch_hour_is_not_a_slot() {
        assert!("01:00 PM - 02:00 PM".parse::<TimeSlot>().is_err());
        assert!(serde_json::from_str::<TimeSlot>("\"01:00 PM - 02:00 PM\"").is_err());
    }

    #[test]
    fn advance_converts_to_paise() {
        assert_eq!(to_minor_units(ADVANCE_AMOUNT), 5000);
        assert_eq!(to_minor_units(499.99), 49999);
    }

    #[test]
    fn payment_labels_match_wire_format() {
        assert_eq!(serde_json::to_value(PaymentOption::PayAdvance).unwrap(), "Pay advance");
        assert_eq!(serde_json::to_value(PaymentOption::OfflinePayment).unwrap(), "Offline Payment");
        assert_eq!(serde_json::to_value(PaymentStatus::Bypassed).unwrap(), "Bypassed");
        assert_eq!(serde_json::to_value(AppointmentStatus::Rescheduled).unwrap(), "Rescheduled");
    }
}

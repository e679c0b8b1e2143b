use async_trait::async_trait;
use tracing::{info, warn};

use crate::api::ApiClient;
use crate::booking::BookingForm;
use crate::error::ClientError;
use crate::models::{AppointmentSubmission, BookingReceipt, CreateOrderRequest, PatientDetails, PaymentOrder, PaymentProof};

/// Checkout collaborator that collects the advance for an order and hands back the signed proof.
#[async_trait]
pub trait PaymentWidget: Send + Sync {
    async fn capture(&self, order: &PaymentOrder, patient: &PatientDetails) -> Result<PaymentProof, ClientError>;
}

pub struct BookingFlow<'a> {
    api: &'a ApiClient,
}

impl<'a> BookingFlow<'a> {
    pub fn new(api: &'a ApiClient) -> Self {
        Self { api }
    }

    /// Gate, order, checkout, booking. Nothing is sent when the form is incomplete.
    pub async fn submit(&self, form: &BookingForm, widget: &dyn PaymentWidget) -> Result<BookingReceipt, ClientError> {
        let booking = form.validate().map_err(ClientError::InvalidForm)?;

        let order = self
            .api
            .create_order(&CreateOrderRequest {
                booking: Some(booking.selection.clone()),
                receipt: None,
            })
            .await?;
        info!("Payment order {} created for {} {}", order.order_id, order.amount, order.currency);

        let proof = widget.capture(&order, &booking.patient).await.map_err(|e| {
            warn!("Checkout for order {} did not complete: {}", order.order_id, e);
            e
        })?;

        let receipt = self
            .api
            .create_appointment(&AppointmentSubmission {
                selection: booking.selection,
                patient: booking.patient,
                payment: proof,
                notes: booking.notes,
            })
            .await?;

        info!(
            "Appointment {} booked{}",
            receipt.appointment.appointment_id,
            if receipt.duplicate { " (already recorded)" } else { "" }
        );

        Ok(receipt)
    }
}

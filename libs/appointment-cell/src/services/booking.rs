use chrono::Utc;
use serde_json::json;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use catalog_cell::CatalogService;
use shared_config::AppConfig;
use shared_database::{StoreClient, StoreQuery};
use shared_models::scheduling::{
    to_minor_units, AppointmentStatus, PaymentOption, PaymentStatus, ADVANCE_AMOUNT, CURRENCY,
};

use crate::models::{
    Appointment, AppointmentError, BookingOutcome, BookingSelection, CreateAppointmentRequest,
    CreateOrderRequest, CreateOrderResponse, MedicalHistory, OfflineBookingRequest, PatientDetails,
    PaymentOrder, PaymentOrderStatus, PaymentProof, Quote, RebookRequest,
};
use crate::services::payment::PaymentService;
use crate::services::pricing::PricingService;
use crate::services::records::AppointmentRecordService;

pub const PAYMENT_ORDERS: &str = "payment_orders";

/// How a new booking is settled.
#[derive(Debug, Clone, Copy)]
pub enum Settlement<'a> {
    Paid(&'a PaymentProof),
    Offline,
}

pub struct NewAppointment<'a> {
    pub appointment_id: String,
    pub selection: &'a BookingSelection,
    pub patient: PatientDetails,
    pub quote: &'a Quote,
    pub notes: Option<String>,
    pub medical_history: MedicalHistory,
}

/// Builds the record for a validated booking.
pub fn build_appointment(draft: NewAppointment<'_>, settlement: Settlement<'_>) -> Appointment {
    let now = Utc::now();
    let (payment_option, advance_amount, payment_status, status, order_id, payment_id, offline) =
        match settlement {
            Settlement::Paid(proof) => (
                PaymentOption::PayAdvance,
                ADVANCE_AMOUNT,
                PaymentStatus::Paid,
                AppointmentStatus::Pending,
                Some(proof.razorpay_order_id.clone()),
                Some(proof.razorpay_payment_id.clone()),
                false,
            ),
            Settlement::Offline => (
                PaymentOption::OfflinePayment,
                0.0,
                PaymentStatus::Bypassed,
                AppointmentStatus::Approved,
                None,
                None,
                true,
            ),
        };

    Appointment {
        id: Uuid::new_v4(),
        appointment_id: draft.appointment_id,
        patient_name: draft.patient.patient_name.trim().to_string(),
        patient_email: draft.patient.patient_email.trim().to_lowercase(),
        patient_phone: draft.patient.patient_phone.trim().to_string(),
        doctor: draft.selection.doctor,
        services: draft.quote.services.iter().map(|service| service.id).collect(),
        date: draft.selection.date,
        time_slot: draft.selection.time_slot,
        payment_option,
        advance_amount,
        total_amount: draft.quote.total,
        payment_status,
        razorpay_order_id: order_id,
        razorpay_payment_id: payment_id,
        is_offline_booking: offline,
        status,
        notes: draft.notes.filter(|notes| !notes.trim().is_empty()),
        medical_history: draft.medical_history,
        before_image: None,
        after_image: None,
        documents: Vec::new(),
        created_at: now,
        updated_at: now,
    }
}

fn validate_patient(patient: &PatientDetails) -> Result<(), AppointmentError> {
    for (field, value) in [
        ("patient_name", &patient.patient_name),
        ("patient_email", &patient.patient_email),
        ("patient_phone", &patient.patient_phone),
    ] {
        if value.trim().is_empty() {
            return Err(AppointmentError::ValidationError(format!("{} is required", field)));
        }
    }
    Ok(())
}

fn default_receipt() -> String {
    format!("receipt_{}", Uuid::new_v4().simple())
}

pub struct AppointmentBookingService {
    store: StoreClient,
    records: AppointmentRecordService,
    pricing: PricingService,
    payments: PaymentService,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        let store = StoreClient::new(config);
        Self {
            records: AppointmentRecordService::with_store(store.clone()),
            pricing: PricingService::new(CatalogService::with_store(store.clone())),
            payments: PaymentService::new(config),
            store,
        }
    }

    /// Services chosen, doctor known and working that day; returns the priced selection.
    pub async fn validate_booking(&self, selection: &BookingSelection) -> Result<Quote, AppointmentError> {
        if selection.services.is_empty() {
            return Err(AppointmentError::ValidationError(
                "Select at least one service".to_string(),
            ));
        }
        self.records
            .ensure_doctor_available(selection.doctor, selection.date)
            .await?;
        self.pricing.quote(&selection.services).await
    }

    pub async fn create_order(&self, request: CreateOrderRequest) -> Result<CreateOrderResponse, AppointmentError> {
        if let Some(selection) = &request.booking {
            self.validate_booking(selection).await?;
        }

        let receipt = request
            .receipt
            .filter(|receipt| !receipt.trim().is_empty())
            .unwrap_or_else(default_receipt);
        let order = self
            .payments
            .create_order(to_minor_units(ADVANCE_AMOUNT), &receipt)
            .await?;

        let now = Utc::now();
        let record = PaymentOrder {
            id: Uuid::new_v4(),
            order_id: order.id.clone(),
            amount: order.amount,
            currency: order.currency.clone(),
            receipt: order.receipt.clone().unwrap_or_else(|| receipt.clone()),
            status: PaymentOrderStatus::Created,
            payment_id: None,
            appointment: None,
            created_at: now,
            updated_at: now,
        };
        let _: PaymentOrder = self.store.insert(PAYMENT_ORDERS, &record).await?;

        Ok(CreateOrderResponse {
            order_id: order.id,
            amount: order.amount,
            currency: if order.currency.is_empty() { CURRENCY.to_string() } else { order.currency },
            key_id: self.payments.key_id().to_string(),
            receipt: record.receipt,
        })
    }

    /// Checks the checkout signature and marks the recorded order verified.
    pub async fn verify_payment(&self, proof: &PaymentProof) -> Result<(), AppointmentError> {
        self.payments.verify(proof)?;

        let updated: Vec<PaymentOrder> = self
            .store
            .update(
                PAYMENT_ORDERS,
                &StoreQuery::new()
                    .eq("order_id", &proof.razorpay_order_id)
                    .eq("status", "Created"),
                json!({
                    "status": PaymentOrderStatus::Verified,
                    "payment_id": proof.razorpay_payment_id,
                    "updated_at": Utc::now()
                }),
            )
            .await?;
        if updated.is_empty() {
            debug!("No open order record for {}", proof.razorpay_order_id);
        }

        info!("Payment {} verified", proof.razorpay_payment_id);
        Ok(())
    }

    /// Persists a paid booking. Replays of the same payment return the first record.
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<BookingOutcome, AppointmentError> {
        let CreateAppointmentRequest {
            selection,
            patient,
            payment,
            notes,
            medical_history,
            appointment_id,
        } = request;

        self.payments.verify(&payment)?;
        if let Some(existing) = self.find_duplicate(&payment).await? {
            return Ok(BookingOutcome { appointment: existing, duplicate: true });
        }

        validate_patient(&patient)?;
        let quote = self.validate_paid_booking(&selection, &payment).await?;
        let appointment_id = self.resolve_report_id(appointment_id.as_deref()).await?;

        let appointment = build_appointment(
            NewAppointment {
                appointment_id,
                selection: &selection,
                patient,
                quote: &quote,
                notes,
                medical_history: medical_history.unwrap_or_default(),
            },
            Settlement::Paid(&payment),
        );

        self.persist_paid(&appointment, &payment).await
    }

    pub async fn book_offline(&self, request: OfflineBookingRequest) -> Result<Appointment, AppointmentError> {
        validate_patient(&request.patient)?;
        let quote = self.validate_booking(&request.selection).await?;
        let appointment_id = self.resolve_report_id(request.appointment_id.as_deref()).await?;

        let appointment = build_appointment(
            NewAppointment {
                appointment_id,
                selection: &request.selection,
                patient: request.patient,
                quote: &quote,
                notes: request.notes,
                medical_history: request.medical_history.unwrap_or_default(),
            },
            Settlement::Offline,
        );

        let created = self.records.insert(&appointment).await?;
        info!("Offline appointment {} booked for report {}", created.id, created.appointment_id);
        Ok(created)
    }

    /// Books a follow-up for the patient of an existing record.
    pub async fn rebook(
        &self,
        identifier: &str,
        request: RebookRequest,
        offline: bool,
    ) -> Result<BookingOutcome, AppointmentError> {
        let source = self.records.resolve(identifier).await?;
        let patient = PatientDetails {
            patient_name: source.patient_name.clone(),
            patient_email: source.patient_email.clone(),
            patient_phone: source.patient_phone.clone(),
        };

        let payment = if offline {
            None
        } else {
            let payment = request.payment.clone().ok_or_else(|| {
                AppointmentError::ValidationError("Payment details are required to rebook".to_string())
            })?;
            self.payments.verify(&payment)?;
            if let Some(existing) = self.find_duplicate(&payment).await? {
                return Ok(BookingOutcome { appointment: existing, duplicate: true });
            }
            Some(payment)
        };

        let quote = match &payment {
            Some(payment) => self.validate_paid_booking(&request.selection, payment).await?,
            None => self.validate_booking(&request.selection).await?,
        };
        let appointment_id = if request.keep_report_id {
            source.appointment_id.clone()
        } else {
            self.records.issue_report_id().await?
        };

        let draft = NewAppointment {
            appointment_id,
            selection: &request.selection,
            patient,
            quote: &quote,
            notes: request.notes,
            medical_history: source.medical_history.clone(),
        };

        let created = match &payment {
            Some(payment) => {
                let appointment = build_appointment(draft, Settlement::Paid(payment));
                let outcome = self.persist_paid(&appointment, payment).await?;
                if outcome.duplicate {
                    return Ok(outcome);
                }
                outcome.appointment
            }
            None => {
                let appointment = build_appointment(draft, Settlement::Offline);
                self.records.insert(&appointment).await?
            }
        };

        info!("Rebooked {} from {} as {}", created.appointment_id, source.id, created.id);
        Ok(BookingOutcome { appointment: created, duplicate: false })
    }

    async fn find_duplicate(&self, payment: &PaymentProof) -> Result<Option<Appointment>, AppointmentError> {
        let existing = self
            .records
            .find_by_payment_id(&payment.razorpay_payment_id)
            .await?;
        if let Some(appointment) = &existing {
            info!(
                "Payment {} already booked as {}; returning existing record",
                payment.razorpay_payment_id, appointment.id
            );
        }
        Ok(existing)
    }

    async fn validate_paid_booking(
        &self,
        selection: &BookingSelection,
        payment: &PaymentProof,
    ) -> Result<Quote, AppointmentError> {
        self.validate_booking(selection).await.map_err(|e| {
            warn!(
                "Verified payment {} (order {}) rejected: {}",
                payment.razorpay_payment_id, payment.razorpay_order_id, e
            );
            e
        })
    }

    async fn resolve_report_id(&self, requested: Option<&str>) -> Result<String, AppointmentError> {
        match requested.map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => {
                if !self.records.report_id_exists(id).await? {
                    return Err(AppointmentError::NotFound);
                }
                Ok(id.to_string())
            }
            None => self.records.issue_report_id().await,
        }
    }

    /// Moves the order to `Claimed` if it is still open. Only one request can win the claim.
    async fn claim_order(&self, payment: &PaymentProof) -> Result<bool, AppointmentError> {
        let claimed: Vec<PaymentOrder> = self
            .store
            .update(
                PAYMENT_ORDERS,
                &StoreQuery::new()
                    .eq("order_id", &payment.razorpay_order_id)
                    .in_list(
                        "status",
                        &[PaymentOrderStatus::Created.as_str(), PaymentOrderStatus::Verified.as_str()],
                    ),
                json!({
                    "status": PaymentOrderStatus::Claimed,
                    "payment_id": payment.razorpay_payment_id,
                    "updated_at": Utc::now()
                }),
            )
            .await?;
        Ok(claimed.len() == 1)
    }

    async fn release_claim(&self, payment: &PaymentProof) {
        let released: Result<Vec<PaymentOrder>, _> = self
            .store
            .update(
                PAYMENT_ORDERS,
                &StoreQuery::new()
                    .eq("order_id", &payment.razorpay_order_id)
                    .eq("status", PaymentOrderStatus::Claimed.as_str()),
                json!({
                    "status": PaymentOrderStatus::Verified,
                    "updated_at": Utc::now()
                }),
            )
            .await;
        if let Err(e) = released {
            warn!("Could not release claim on order {}: {}", payment.razorpay_order_id, e);
        }
    }

    /// Another request holds or has used the order; answer with its booking when it exists.
    async fn settle_lost_claim(&self, payment: &PaymentProof) -> Result<BookingOutcome, AppointmentError> {
        if let Some(existing) = self.find_duplicate(payment).await? {
            return Ok(BookingOutcome { appointment: existing, duplicate: true });
        }

        let order: Option<PaymentOrder> = self
            .store
            .select_one(
                PAYMENT_ORDERS,
                &StoreQuery::new().eq("order_id", &payment.razorpay_order_id),
            )
            .await?;

        match order {
            None => {
                warn!("Payment {} references unknown order {}", payment.razorpay_payment_id, payment.razorpay_order_id);
                Err(AppointmentError::UnknownPaymentOrder(payment.razorpay_order_id.clone()))
            }
            Some(order) => {
                warn!(
                    "Order {} is {:?}; payment {} not booked twice",
                    order.order_id, order.status, payment.razorpay_payment_id
                );
                Err(AppointmentError::PaymentInProgress(payment.razorpay_payment_id.clone()))
            }
        }
    }

    async fn persist_paid(
        &self,
        appointment: &Appointment,
        payment: &PaymentProof,
    ) -> Result<BookingOutcome, AppointmentError> {
        if !self.claim_order(payment).await? {
            return self.settle_lost_claim(payment).await;
        }

        let created = match self.records.insert(appointment).await {
            Ok(created) => created,
            Err(e) => {
                error!(
                    payment_id = %payment.razorpay_payment_id,
                    order_id = %payment.razorpay_order_id,
                    "payment captured but appointment not persisted: {}",
                    e
                );
                self.release_claim(payment).await;
                return Err(e);
            }
        };

        let consumed: Result<Vec<PaymentOrder>, _> = self
            .store
            .update(
                PAYMENT_ORDERS,
                &StoreQuery::new().eq("order_id", &payment.razorpay_order_id),
                json!({
                    "status": PaymentOrderStatus::Consumed,
                    "payment_id": payment.razorpay_payment_id,
                    "appointment": created.id,
                    "updated_at": Utc::now()
                }),
            )
            .await;
        if let Err(e) = consumed {
            warn!("Could not mark order {} consumed: {}", payment.razorpay_order_id, e);
        }

        info!(
            "Appointment {} booked for report {} (total {:.2})",
            created.id, created.appointment_id, created.total_amount
        );
        Ok(BookingOutcome { appointment: created, duplicate: false })
    }
}

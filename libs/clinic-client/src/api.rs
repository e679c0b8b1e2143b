use reqwest::{Client, Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ClientError;
use crate::models::{
    Appointment, AppointmentSubmission, BookingReceipt, ContactForm, CreateOrderRequest, Doctor,
    DoctorHolidays, HolidayUpdate, LoginResponse, OfflineBooking, PaymentOrder, PaymentProof, Report,
    RescheduleChange, Service, StatusChange,
};
use crate::session::AuthSession;

/// Thin typed wrapper over the clinic's HTTP API, rooted at `{base_url}/api`.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = self.url(path);
        debug!("{} {}", method, url);
        self.client.request(method, url)
    }

    fn admin_request(&self, session: &AuthSession, method: Method, path: &str) -> Result<RequestBuilder, ClientError> {
        let token = session.bearer()?;
        Ok(self.request(method, path).bearer_auth(token))
    }

    async fn read<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .unwrap_or(body);
        warn!("API call failed ({}): {}", status, message);

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ClientError> {
        Self::read(builder.send().await?).await
    }

    async fn send_json<B: Serialize, T: DeserializeOwned>(builder: RequestBuilder, body: &B) -> Result<T, ClientError> {
        Self::read(builder.json(body).send().await?).await
    }

    // Booking page

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, ClientError> {
        Self::send(self.request(Method::GET, "/appointments/doctors")).await
    }

    pub async fn doctor_holidays(&self, doctor_id: Uuid) -> Result<DoctorHolidays, ClientError> {
        Self::send(self.request(Method::GET, &format!("/appointments/doctors/{}/holidays", doctor_id))).await
    }

    pub async fn list_services(&self) -> Result<Vec<Service>, ClientError> {
        Self::send(self.request(Method::GET, "/appointments/services")).await
    }

    pub async fn create_order(&self, request: &CreateOrderRequest) -> Result<PaymentOrder, ClientError> {
        Self::send_json(self.request(Method::POST, "/appointments/create-order"), request).await
    }

    pub async fn verify_payment(&self, proof: &PaymentProof) -> Result<Value, ClientError> {
        Self::send_json(self.request(Method::POST, "/appointments/verify-payment"), proof).await
    }

    pub async fn create_appointment(&self, submission: &AppointmentSubmission) -> Result<BookingReceipt, ClientError> {
        Self::send_json(self.request(Method::POST, "/appointments"), submission).await
    }

    pub async fn get_report(&self, identifier: &str) -> Result<Report, ClientError> {
        Self::send(self.request(Method::GET, &format!("/appointments/{}", identifier))).await
    }

    pub async fn submit_contact(&self, form: &ContactForm) -> Result<Value, ClientError> {
        Self::send_json(self.request(Method::POST, "/contacts"), form).await
    }

    // Back office

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ClientError> {
        let body = serde_json::json!({ "email": email, "password": password });
        Self::send_json(self.request(Method::POST, "/admin/login"), &body).await
    }

    pub async fn update_status(&self, session: &AuthSession, id: &str, change: &StatusChange) -> Result<Appointment, ClientError> {
        let builder = self.admin_request(session, Method::PATCH, &format!("/admin/appointments/{}/status", id))?;
        Self::send_json(builder, change).await
    }

    pub async fn reschedule(&self, session: &AuthSession, id: &str, change: &RescheduleChange) -> Result<Appointment, ClientError> {
        let builder = self.admin_request(session, Method::PATCH, &format!("/admin/appointments/{}/reschedule", id))?;
        Self::send_json(builder, change).await
    }

    pub async fn book_offline(&self, session: &AuthSession, booking: &OfflineBooking) -> Result<BookingReceipt, ClientError> {
        let builder = self.admin_request(session, Method::POST, "/admin/appointments/offline")?;
        Self::send_json(builder, booking).await
    }

    pub async fn update_holidays(
        &self,
        session: &AuthSession,
        doctor_id: Uuid,
        update: &HolidayUpdate,
    ) -> Result<DoctorHolidays, ClientError> {
        let builder = self.admin_request(session, Method::PATCH, &format!("/admin/doctors/{}/holidays", doctor_id))?;
        Self::send_json(builder, update).await
    }
}

//! HTTP client for the EdgeHomes backend API.
//!
//! Every page and form in the frontend goes through `BackendClient`. It adds the
//! session's bearer token, decodes the JSON envelope and maps failures onto
//! `ServiceError`. Nothing is retried.

use crate::backend::models::*;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// A file attached to a multipart property submission.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Multipart property submission: text fields, new files and the explicit
/// lists describing what happens to assets already stored by the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertySubmission {
    pub fields: PropertyFields,
    pub new_images: Vec<UploadFile>,
    pub new_video: Option<UploadFile>,
    pub deleted_image_ids: Vec<String>,
    pub deleted_video_id: Option<String>,
    /// Final order of kept images by id; new uploads are referenced as `new:<n>`.
    pub image_order: Vec<String>,
}

#[derive(Clone)]
pub struct BackendClient {
    http_client: Client,
    base_url: String,
}

impl BackendClient {
    /// Creates a new BackendClient instance.
    pub fn new(base_url: &str, timeout: Duration) -> ServiceResult<Self> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent("EdgeHomes-Web/1.0")
            .build()
            .map_err(|e| ServiceError::internal_error(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let builder = self.http_client.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, endpoint: &str) -> ServiceResult<Response> {
        let response = builder.send().await.map_err(|e| {
            error!("Backend request to {} failed: {}", endpoint, e);
            ServiceError::external_service(e.to_string())
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("Backend {} -> {}", endpoint, status);
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let error = error_from_body(status, &body);
        error!("Backend {} -> {}: {}", endpoint, status, error);
        Err(error)
    }

    async fn decode<T: DeserializeOwned>(response: Response, endpoint: &str) -> ServiceResult<T> {
        response.json::<T>().await.map_err(|e| {
            error!("Could not decode response from {}: {}", endpoint, e);
            ServiceError::external_service(format!("Unexpected response from {}", endpoint))
        })
    }

    async fn get_data<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> ServiceResult<T> {
        let response = self
            .send(self.request(Method::GET, path, token), path)
            .await?;
        let envelope: Envelope<T> = Self::decode(response, path).await?;
        Ok(envelope.data)
    }

    async fn get_page<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
        token: Option<&str>,
    ) -> ServiceResult<Paginated<T>> {
        let response = self
            .send(self.request(Method::GET, path, token).query(query), path)
            .await?;
        Self::decode(response, path).await
    }

    async fn post_data<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> ServiceResult<T> {
        let response = self
            .send(self.request(Method::POST, path, token).json(body), path)
            .await?;
        let envelope: Envelope<T> = Self::decode(response, path).await?;
        Ok(envelope.data)
    }

    /// Sends a request whose response body is irrelevant; returns the message.
    async fn send_command(&self, builder: RequestBuilder, path: &str) -> ServiceResult<String> {
        let response = self.send(builder, path).await?;
        let value: serde_json::Value = response.json().await.unwrap_or_default();
        Ok(value
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Done")
            .to_string())
    }

    // ------------------------------------------------------------------------
    // Auth
    // ------------------------------------------------------------------------

    pub async fn sign_in(&self, payload: &SignInPayload) -> ServiceResult<String> {
        let data: TokenData = self.post_data("/auth/sign-in", payload, None).await?;
        Ok(data.access_token)
    }

    pub async fn register(&self, payload: &RegisterPayload) -> ServiceResult<String> {
        self.send_command(
            self.request(Method::POST, "/auth/register", None).json(payload),
            "/auth/register",
        )
        .await
    }

    pub async fn send_otp(&self, payload: &OtpRequestPayload) -> ServiceResult<String> {
        self.send_command(
            self.request(Method::POST, "/otp/send", None).json(payload),
            "/otp/send",
        )
        .await
    }

    pub async fn verify_otp(&self, payload: &OtpVerifyPayload) -> ServiceResult<OtpVerified> {
        self.post_data("/otp/verify", payload, None).await
    }

    pub async fn reset_password(&self, payload: &ResetPasswordPayload) -> ServiceResult<String> {
        self.send_command(
            self.request(Method::POST, "/auth/reset-password", None)
                .json(payload),
            "/auth/reset-password",
        )
        .await
    }

    // ------------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------------

    pub async fn profile(&self, token: &str) -> ServiceResult<UserProfile> {
        self.get_data("/user/profile", Some(token)).await
    }

    pub async fn update_profile(
        &self,
        token: &str,
        payload: &UpdateProfilePayload,
    ) -> ServiceResult<String> {
        self.send_command(
            self.request(Method::PATCH, "/user/profile", Some(token))
                .json(payload),
            "/user/profile",
        )
        .await
    }

    pub async fn dashboard_summary(&self, token: &str) -> ServiceResult<DashboardSummary> {
        self.get_data("/user/dashboard/summary", Some(token)).await
    }

    pub async fn admin_overview(&self, token: &str) -> ServiceResult<AdminOverview> {
        self.get_data("/user/admin-dashboard-overview", Some(token))
            .await
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    pub async fn list_properties(
        &self,
        query: &PropertyQuery,
        token: Option<&str>,
    ) -> ServiceResult<Paginated<Property>> {
        self.get_page("/property/fetch-all", query, token).await
    }

    /// Properties listed by the signed-in user.
    pub async fn my_properties(
        &self,
        token: &str,
        query: &PropertyQuery,
    ) -> ServiceResult<Paginated<Property>> {
        self.get_page("/property/user", query, Some(token)).await
    }

    pub async fn get_property(&self, id: &str, token: Option<&str>) -> ServiceResult<Property> {
        let path = resource_path(&["property", id])?;
        match self.get_data(&path, token).await {
            Err(ServiceError::Backend { status: 404, .. }) => {
                Err(ServiceError::not_found("Property", id))
            }
            other => other,
        }
    }

    pub async fn create_property(
        &self,
        token: &str,
        submission: PropertySubmission,
    ) -> ServiceResult<String> {
        let form = property_form(submission)?;
        self.send_command(
            self.request(Method::POST, "/property", Some(token))
                .multipart(form),
            "/property",
        )
        .await
    }

    pub async fn update_property(
        &self,
        token: &str,
        id: &str,
        submission: PropertySubmission,
    ) -> ServiceResult<String> {
        let path = resource_path(&["property", id])?;
        let form = property_form(submission)?;
        self.send_command(
            self.request(Method::PATCH, &path, Some(token)).multipart(form),
            &path,
        )
        .await
    }

    pub async fn delete_property(&self, token: &str, id: &str) -> ServiceResult<String> {
        let path = resource_path(&["property", id])?;
        self.send_command(self.request(Method::DELETE, &path, Some(token)), &path)
            .await
    }

    // ------------------------------------------------------------------------
    // Bookings
    // ------------------------------------------------------------------------

    pub async fn list_bookings(
        &self,
        token: &str,
        query: &PageQuery,
    ) -> ServiceResult<Paginated<Booking>> {
        self.get_page("/bookings", query, Some(token)).await
    }

    pub async fn confirm_booking(&self, token: &str, id: &str) -> ServiceResult<String> {
        let path = resource_path(&["bookings", id, "confirm"])?;
        self.send_command(self.request(Method::PATCH, &path, Some(token)), &path)
            .await
    }

    pub async fn cancel_booking(&self, token: &str, id: &str) -> ServiceResult<String> {
        let path = resource_path(&["bookings", id, "cancel"])?;
        self.send_command(self.request(Method::PATCH, &path, Some(token)), &path)
            .await
    }

    // ------------------------------------------------------------------------
    // Payments
    // ------------------------------------------------------------------------

    pub async fn initialize_booking_payment(
        &self,
        payload: &BookingPaymentPayload,
        token: Option<&str>,
    ) -> ServiceResult<PaymentInitialized> {
        self.post_data("/payments/booking/initialize", payload, token)
            .await
    }

    pub async fn initialize_credit_payment(
        &self,
        token: &str,
        payload: &CreditPaymentPayload,
    ) -> ServiceResult<PaymentInitialized> {
        self.post_data("/payments/credit/initialize", payload, Some(token))
            .await
    }

    pub async fn verify_payment(&self, reference: &str) -> ServiceResult<PaymentVerification> {
        let path = resource_path(&["payments", "verify", reference])?;
        self.get_data(&path, None).await
    }

    pub async fn list_transactions(
        &self,
        token: &str,
        query: &PageQuery,
    ) -> ServiceResult<Paginated<Transaction>> {
        self.get_page("/transaction", query, Some(token)).await
    }
}

/// Maps a non-success backend response onto a `ServiceError`.
/// Joins path segments, percent-encoding each one so caller-supplied ids
/// cannot add segments or climb out of the resource.
fn resource_path(segments: &[&str]) -> ServiceResult<String> {
    if let Some(bad) = segments
        .iter()
        .find(|s| s.trim().is_empty() || **s == "." || **s == "..")
    {
        return Err(ServiceError::validation(format!("Invalid identifier {:?}", bad)));
    }
    let mut url = Url::parse("http://backend.local/")
        .map_err(|e| ServiceError::internal_error(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| ServiceError::internal_error("backend path cannot be a base"))?
        .clear()
        .extend(segments);
    Ok(url.path().to_string())
}

pub fn error_from_body(status: StatusCode, body: &str) -> ServiceError {
    let messages = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.message)
        .unwrap_or_default();

    let message = if messages.is_empty() {
        status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string()
    } else {
        messages.join(", ")
    };

    match status {
        StatusCode::UNAUTHORIZED => ServiceError::unauthorized(message),
        StatusCode::FORBIDDEN => ServiceError::permission_denied(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY if messages.len() > 1 => {
            ServiceError::invalid_input(messages)
        }
        _ => ServiceError::backend(status.as_u16(), message),
    }
}

fn property_form(submission: PropertySubmission) -> ServiceResult<Form> {
    let PropertySubmission {
        fields,
        new_images,
        new_video,
        deleted_image_ids,
        deleted_video_id,
        image_order,
    } = submission;

    let mut form = Form::new()
        .text("title", fields.title)
        .text("description", fields.description)
        .text("location", fields.location)
        .text("type", fields.property_type.as_str())
        .text("price[amount]", fields.amount.to_string())
        .text("price[currency]", fields.currency)
        .text("price[duration]", fields.duration)
        .text("beds", fields.beds.to_string())
        .text("baths", fields.baths.to_string())
        .text("isAvailable", fields.is_available.to_string());

    for feature in fields.features {
        form = form.text("features[]", feature);
    }
    for file in new_images {
        form = form.part("images", file_part(file)?);
    }
    if let Some(video) = new_video {
        form = form.part("video", file_part(video)?);
    }
    if !deleted_image_ids.is_empty() {
        let ids = serde_json::to_string(&deleted_image_ids)
            .map_err(|e| ServiceError::internal_error(e.to_string()))?;
        form = form.text("deletedImageIds", ids);
    }
    if let Some(video_id) = deleted_video_id {
        form = form.text("deletedVideoId", video_id);
    }
    if !image_order.is_empty() {
        let order = serde_json::to_string(&image_order)
            .map_err(|e| ServiceError::internal_error(e.to_string()))?;
        form = form.text("imageOrder", order);
    }

    Ok(form)
}

fn file_part(file: UploadFile) -> ServiceResult<Part> {
    Part::bytes(file.bytes)
        .file_name(file.file_name)
        .mime_str(&file.content_type)
        .map_err(|e| ServiceError::validation(format!("Unsupported file type: {}", e)))
}

/// Backend call made by the booking wizard's `pay` step.
#[async_trait]
pub trait PaymentInitializer: Send + Sync {
    async fn initialize_booking(
        &self,
        payload: &BookingPaymentPayload,
        token: Option<&str>,
    ) -> ServiceResult<PaymentInitialized>;
}

#[async_trait]
impl PaymentInitializer for BackendClient {
    async fn initialize_booking(
        &self,
        payload: &BookingPaymentPayload,
        token: Option<&str>,
    ) -> ServiceResult<PaymentInitialized> {
        self.initialize_booking_payment(payload, token).await
    }
}

/// Backend call made by the debounced property search.
#[async_trait]
pub trait PropertySearch: Send + Sync {
    async fn search(
        &self,
        query: &PropertyQuery,
        cancel: CancellationToken,
    ) -> ServiceResult<Paginated<Property>>;
}

#[async_trait]
impl PropertySearch for BackendClient {
    async fn search(
        &self,
        query: &PropertyQuery,
        cancel: CancellationToken,
    ) -> ServiceResult<Paginated<Property>> {
        // Dropping the request future aborts the in-flight HTTP call.
        tokio::select! {
            result = self.list_properties(query, None) => result,
            _ = cancel.cancelled() => Err(ServiceError::validation("Search superseded")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_from_body_maps_statuses() {
        let error = error_from_body(
            StatusCode::UNAUTHORIZED,
            r#"{"message":"Invalid credentials","statusCode":401}"#,
        );
        assert!(matches!(error, ServiceError::Unauthorized { ref message } if message == "Invalid credentials"));

        let error = error_from_body(StatusCode::FORBIDDEN, "");
        assert!(matches!(error, ServiceError::PermissionDenied { ref message } if message == "Forbidden"));

        let error = error_from_body(StatusCode::BAD_GATEWAY, "<html>oops</html>");
        assert!(matches!(error, ServiceError::Backend { status: 502, .. }));
    }

    #[test]
    fn test_error_from_body_keeps_message_lists() {
        let error = error_from_body(
            StatusCode::BAD_REQUEST,
            r#"{"message":["email must be an email","phoneNumber should not be empty"]}"#,
        );
        assert_eq!(
            error.user_messages(),
            vec![
                "email must be an email".to_string(),
                "phoneNumber should not be empty".to_string()
            ]
        );

        let error = error_from_body(StatusCode::BAD_REQUEST, r#"{"message":"Insufficient credits"}"#);
        assert_eq!(error.user_messages(), vec!["Insufficient credits".to_string()]);
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = BackendClient::new("http://api.example.com/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url, "http://api.example.com");
    }

    #[test]
    fn test_resource_path_keeps_ids_in_one_segment() {
        assert_eq!(resource_path(&["property", "p-1"]).unwrap(), "/property/p-1");
        assert_eq!(
            resource_path(&["payments", "verify", "../user/profile"]).unwrap(),
            "/payments/verify/..%2Fuser%2Fprofile"
        );
        assert_eq!(
            resource_path(&["bookings", "a b?c", "confirm"]).unwrap(),
            "/bookings/a%20b%3Fc/confirm"
        );
        assert!(resource_path(&["property", ".."]).is_err());
        assert!(resource_path(&["property", ""]).is_err());
    }
}

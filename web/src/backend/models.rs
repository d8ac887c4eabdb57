//! Data transfer objects mirrored from the backend API.
//!
//! Field names follow the backend's camelCase JSON. None of these types carry
//! behaviour beyond small display helpers; the backend owns every invariant.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Standard success envelope `{ message?, data }`.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub message: Option<String>,
    pub data: T,
}

/// Paginated list envelope `{ data: [...], meta }`.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub meta: Pagination,
}

/// Pagination metadata, passed through unchanged from backend responses.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub item_count: u64,
    pub total_pages: u32,
    pub has_next_page: bool,
    pub has_previous_page: bool,
}

impl Pagination {
    /// One-based index range of the items shown on this page.
    pub fn showing_range(&self) -> (u64, u64) {
        if self.item_count == 0 {
            return (0, 0);
        }
        let start = (self.page.saturating_sub(1) as u64) * self.limit as u64 + 1;
        let end = (start + self.limit as u64 - 1).min(self.item_count);
        (start.min(self.item_count), end)
    }
}

/// Error body `{ message: string | string[], statusCode? }`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default, deserialize_with = "deserialize_messages")]
    pub message: Vec<String>,
    #[serde(default)]
    pub status_code: Option<u16>,
}

fn deserialize_messages<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match Option::<OneOrMany>::deserialize(deserializer)? {
        Some(OneOrMany::One(message)) => vec![message],
        Some(OneOrMany::Many(messages)) => messages,
        None => Vec::new(),
    })
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignInPayload {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenData {
    #[serde(alias = "token", alias = "access_token")]
    pub access_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpRequestPayload {
    pub email: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerifyPayload {
    pub email: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OtpVerified {
    /// Short-lived token authorizing the password reset.
    #[serde(alias = "token")]
    pub reset_token: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordPayload {
    pub reset_token: String,
    pub password: String,
}

// ============================================================================
// Users and dashboards
// ============================================================================

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub credits: u32,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfilePayload {
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardSummary {
    pub credits: u32,
    pub total_properties: u64,
    pub active_listings: u64,
    pub total_bookings: u64,
    pub total_spent: f64,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AdminOverview {
    pub total_users: u64,
    pub total_properties: u64,
    pub total_bookings: u64,
    pub pending_bookings: u64,
    pub total_revenue: f64,
}

// ============================================================================
// Properties
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyType {
    #[serde(rename = "Short-let")]
    ShortLet,
    #[serde(rename = "Long-stay")]
    LongStay,
}

impl PropertyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyType::ShortLet => "Short-let",
            PropertyType::LongStay => "Long-stay",
        }
    }

    pub fn all() -> [PropertyType; 2] {
        [PropertyType::ShortLet, PropertyType::LongStay]
    }
}

impl fmt::Display for PropertyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PropertyType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "short-let" | "shortlet" | "short_let" => Ok(PropertyType::ShortLet),
            "long-stay" | "longstay" | "long_stay" => Ok(PropertyType::LongStay),
            _ => Err(format!("Unknown property type: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Price {
    pub amount: f64,
    pub currency: String,
    /// Billing period, e.g. `night`, `month`, `year`.
    pub duration: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyImage {
    pub id: String,
    pub url: String,
    /// Low-resolution image shown while `url` loads.
    #[serde(default)]
    pub placeholder: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyVideo {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct BookingStats {
    pub total_bookings: u64,
    pub confirmed_bookings: u64,
    pub pending_bookings: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnerContact {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub location: String,
    #[serde(rename = "type")]
    pub property_type: PropertyType,
    pub price: Price,
    #[serde(default)]
    pub images: Vec<PropertyImage>,
    #[serde(default)]
    pub video: Option<PropertyVideo>,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub baths: u32,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub booking_stats: BookingStats,
    #[serde(default)]
    pub owner: Option<OwnerContact>,
}

impl Property {
    pub fn cover_image(&self) -> Option<&PropertyImage> {
        self.images.first()
    }
}

/// Query for `/property/fetch-all`.
#[derive(Debug, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PropertyQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<u64>,
}

/// Text fields of the create/edit property multipart payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFields {
    pub title: String,
    pub description: String,
    pub location: String,
    pub property_type: PropertyType,
    pub amount: f64,
    pub currency: String,
    pub duration: String,
    pub beds: u32,
    pub baths: u32,
    pub is_available: bool,
    pub features: Vec<String>,
}

// ============================================================================
// Bookings
// ============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" | "canceled" => Ok(BookingStatus::Cancelled),
            _ => Err(format!("Unknown booking status: {}", s)),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingProperty {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub property: BookingProperty,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub total_amount: f64,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Booking {
    /// Only pending bookings can still be confirmed or cancelled.
    pub fn is_actionable(&self) -> bool {
        self.status == BookingStatus::Pending
    }
}

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BookingPaymentPayload {
    pub property_id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub callback_url: String,
}

// ============================================================================
// Payments and transactions
// ============================================================================

#[derive(Debug, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CreditPaymentPayload {
    pub credits: u32,
    pub callback_url: String,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInitialized {
    #[serde(alias = "authorization_url")]
    pub authorization_url: String,
    #[serde(default)]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    #[serde(alias = "successful")]
    Success,
    #[default]
    Pending,
    #[serde(alias = "abandoned")]
    Failed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Success => "success",
            TransactionStatus::Pending => "pending",
            TransactionStatus::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Credit,
    Booking,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub amount: f64,
    #[serde(default)]
    pub credits_purchased: Option<u32>,
    pub reference: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub status: TransactionStatus,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentVerification {
    pub status: TransactionStatus,
    pub reference: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Query for list endpoints that only paginate.
#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct PageQuery {
    pub page: u32,
    pub limit: u32,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

use crate::auth::session::Session;
use crate::services::booking_flow::{BookingAction, BookingForm, BookingStep};
use axum::http::HeaderMap;
use serde::Deserialize;

/// Booking wizard post. The step being shown and all typed values are
/// resubmitted on every transition.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingWizardInput {
    #[serde(default)]
    pub step: BookingStep,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub check_in: String,
    #[serde(default)]
    pub check_out: String,
}

impl BookingWizardInput {
    pub fn action(&self) -> Option<BookingAction> {
        match self.action.as_str() {
            "pay_now" => Some(BookingAction::ChoosePayNow),
            "contact_owner" => Some(BookingAction::ChooseContactOwner),
            "back" => Some(BookingAction::Back),
            "submit" => Some(BookingAction::Submit),
            _ => None,
        }
    }

    pub fn form(&self) -> BookingForm {
        BookingForm {
            full_name: self.full_name.clone(),
            email: self.email.clone(),
            phone_number: self.phone_number.clone(),
            check_in: self.check_in.clone(),
            check_out: self.check_out.clone(),
        }
    }
}

/// Identifies the browser tab issuing debounced searches.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchClient {
    pub client: Option<String>,
}

impl SearchClient {
    /// The page's own tab id when sent, then the signed-in user, then the
    /// forwarding address.
    pub fn key(&self, session: Option<&Session>, headers: &HeaderMap) -> String {
        if let Some(client) = self.client.as_deref().filter(|c| !c.trim().is_empty()) {
            return format!("tab:{}", client.trim());
        }
        if let Some(session) = session {
            return format!("user:{}", session.claims.sub);
        }
        headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(|ip| format!("ip:{}", ip.trim()))
            .unwrap_or_else(|| "anonymous".to_string())
    }
}

/// Gateway callback parameters; Paystack-style gateways send both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VerifyQuery {
    pub reference: Option<String>,
    pub trxref: Option<String>,
}

impl VerifyQuery {
    pub fn reference(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .or(self.trxref.as_deref())
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_wizard_actions() {
        let input = |action: &str| BookingWizardInput {
            action: action.to_string(),
            ..Default::default()
        };
        assert_eq!(input("pay_now").action(), Some(BookingAction::ChoosePayNow));
        assert_eq!(input("back").action(), Some(BookingAction::Back));
        assert_eq!(input("submit").action(), Some(BookingAction::Submit));
        assert_eq!(input("explode").action(), None);
    }

    #[test]
    fn test_search_client_key_precedence() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.7, 10.0.0.1"));

        let tab = SearchClient {
            client: Some("abc".to_string()),
        };
        assert_eq!(tab.key(None, &headers), "tab:abc");
        assert_eq!(SearchClient::default().key(None, &headers), "ip:10.0.0.7");
        assert_eq!(SearchClient::default().key(None, &HeaderMap::new()), "anonymous");
    }

    #[test]
    fn test_verify_reference_falls_back_to_trxref() {
        let query = VerifyQuery {
            reference: None,
            trxref: Some("T123".to_string()),
        };
        assert_eq!(query.reference(), Some("T123"));
        assert_eq!(VerifyQuery::default().reference(), None);
    }
}

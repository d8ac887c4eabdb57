//! Booking request wizard.
//!
//! A visitor picks how to proceed (`Options`), then either fills the booking
//! form and is sent to the payment gateway (`Pay`), or is shown the owner's
//! contact details (`Owner`). Going back keeps whatever was typed. A failed
//! submission stays on `Pay` with the errors listed; nothing is retried.

use crate::backend::client::PaymentInitializer;
use crate::backend::models::BookingPaymentPayload;
use crate::errors::field_messages;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStep {
    #[default]
    Options,
    Pay,
    Owner,
}

/// Contact and stay details collected on the `Pay` step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct BookingForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,

    #[serde(default)]
    #[validate(email(message = "Enter a valid email address"))]
    pub email: String,

    #[serde(default)]
    #[validate(length(min = 7, max = 20, message = "Enter a valid phone number"))]
    pub phone_number: String,

    /// `YYYY-MM-DD`, as submitted by a date input.
    #[serde(default)]
    pub check_in: String,

    #[serde(default)]
    pub check_out: String,
}

impl BookingForm {
    /// Field-specific errors; empty when the form can be submitted.
    pub fn errors(&self, today: NaiveDate) -> Vec<String> {
        let mut errors = match self.validate() {
            Ok(()) => Vec::new(),
            Err(e) => field_messages(&e),
        };

        let check_in = parse_date(&self.check_in, "check_in", "Check-in", &mut errors);
        let check_out = parse_date(&self.check_out, "check_out", "Check-out", &mut errors);

        if let Some(check_in) = check_in {
            if check_in < today {
                errors.push("check_in: Check-in date cannot be in the past".to_string());
            }
        }
        if let (Some(check_in), Some(check_out)) = (check_in, check_out) {
            if check_out <= check_in {
                errors.push("check_out: Check-out date must be after check-in date".to_string());
            }
        }

        errors
    }

    fn dates(&self) -> Option<(NaiveDate, NaiveDate)> {
        let check_in = NaiveDate::parse_from_str(self.check_in.trim(), "%Y-%m-%d").ok()?;
        let check_out = NaiveDate::parse_from_str(self.check_out.trim(), "%Y-%m-%d").ok()?;
        Some((check_in, check_out))
    }

    /// Number of nights between the two dates, when both are valid.
    pub fn nights(&self) -> Option<i64> {
        self.dates()
            .map(|(check_in, check_out)| (check_out - check_in).num_days())
            .filter(|n| *n > 0)
    }
}

fn parse_date(
    value: &str,
    field: &str,
    label: &str,
    errors: &mut Vec<String>,
) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        errors.push(format!("{}: {} date is required", field, label));
        return None;
    }
    match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(format!("{}: {} date is not a valid date", field, label));
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    ChoosePayNow,
    ChooseContactOwner,
    Back,
    Submit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BookingFlow {
    pub property_id: String,
    pub step: BookingStep,
    pub form: BookingForm,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookingOutcome {
    /// Show the wizard in its new state.
    Render(BookingFlow),
    /// Send the browser to the payment gateway.
    Redirect(String),
}

/// Where the payment gateway should return to and who is paying.
pub struct SubmitContext<'a> {
    pub gateway: &'a dyn PaymentInitializer,
    pub token: Option<&'a str>,
    pub callback_url: &'a str,
    pub today: NaiveDate,
}

impl BookingFlow {
    pub fn new(property_id: impl Into<String>) -> Self {
        Self {
            property_id: property_id.into(),
            step: BookingStep::Options,
            form: BookingForm::default(),
            errors: Vec::new(),
        }
    }

    /// Restores the wizard from a submitted form (state travels in hidden fields).
    pub fn resume(property_id: impl Into<String>, step: BookingStep, form: BookingForm) -> Self {
        Self {
            property_id: property_id.into(),
            step,
            form,
            errors: Vec::new(),
        }
    }

    /// Applies a navigation action. `Submit` is handled by [`BookingFlow::submit`].
    pub fn apply(self, action: &BookingAction) -> Self {
        let step = match (self.step, action) {
            (BookingStep::Options, BookingAction::ChoosePayNow) => BookingStep::Pay,
            (BookingStep::Options, BookingAction::ChooseContactOwner) => BookingStep::Owner,
            (_, BookingAction::Back) => BookingStep::Options,
            (step, _) => step,
        };
        Self {
            step,
            errors: Vec::new(),
            ..self
        }
    }

    /// Runs `action`, calling the payment-initialization endpoint only for a
    /// valid `Submit` on the `Pay` step.
    pub async fn dispatch(self, action: BookingAction, ctx: SubmitContext<'_>) -> BookingOutcome {
        match action {
            BookingAction::Submit if self.step == BookingStep::Pay => self.submit(ctx).await,
            BookingAction::Submit => BookingOutcome::Render(self),
            other => BookingOutcome::Render(self.apply(&other)),
        }
    }

    async fn submit(mut self, ctx: SubmitContext<'_>) -> BookingOutcome {
        let errors = self.form.errors(ctx.today);
        if !errors.is_empty() {
            self.errors = errors;
            return BookingOutcome::Render(self);
        }

        let Some((check_in_date, check_out_date)) = self.form.dates() else {
            self.errors = vec!["Please provide valid dates".to_string()];
            return BookingOutcome::Render(self);
        };

        let payload = BookingPaymentPayload {
            property_id: self.property_id.clone(),
            full_name: self.form.full_name.trim().to_string(),
            email: self.form.email.trim().to_string(),
            phone_number: self.form.phone_number.trim().to_string(),
            check_in_date,
            check_out_date,
            callback_url: ctx.callback_url.to_string(),
        };

        match ctx.gateway.initialize_booking(&payload, ctx.token).await {
            Ok(initialized) => {
                info!(
                    "Booking payment initialized for property {} (reference {:?})",
                    self.property_id, initialized.reference
                );
                BookingOutcome::Redirect(initialized.authorization_url)
            }
            Err(e) => {
                warn!("Booking payment for property {} failed: {}", self.property_id, e);
                self.errors = e.user_messages();
                BookingOutcome::Render(self)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::models::PaymentInitialized;
    use crate::errors::{ServiceError, ServiceResult};
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeGateway {
        calls: Mutex<Vec<BookingPaymentPayload>>,
        fail_with: Option<String>,
    }

    #[async_trait]
    impl PaymentInitializer for FakeGateway {
        async fn initialize_booking(
            &self,
            payload: &BookingPaymentPayload,
            _token: Option<&str>,
        ) -> ServiceResult<PaymentInitialized> {
            self.calls.lock().unwrap().push(payload.clone());
            match &self.fail_with {
                Some(message) => Err(ServiceError::backend(400, message.clone())),
                None => Ok(PaymentInitialized {
                    authorization_url: "https://checkout.example/abc".to_string(),
                    reference: Some("abc".to_string()),
                }),
            }
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
    }

    fn ctx(gateway: &FakeGateway) -> SubmitContext<'_> {
        SubmitContext {
            gateway,
            token: None,
            callback_url: "http://localhost:3000/payments/verify",
            today: today(),
        }
    }

    fn valid_form() -> BookingForm {
        BookingForm {
            full_name: "Chidi Okeke".to_string(),
            email: "chidi@example.com".to_string(),
            phone_number: "+2348012345678".to_string(),
            check_in: "2026-03-12".to_string(),
            check_out: "2026-03-15".to_string(),
        }
    }

    #[test]
    fn test_navigation_keeps_form_data() {
        let flow = BookingFlow::new("p1").apply(&BookingAction::ChoosePayNow);
        assert_eq!(flow.step, BookingStep::Pay);

        let flow = BookingFlow { form: valid_form(), ..flow }.apply(&BookingAction::Back);
        assert_eq!(flow.step, BookingStep::Options);
        assert_eq!(flow.form, valid_form());

        let flow = flow.apply(&BookingAction::ChooseContactOwner);
        assert_eq!(flow.step, BookingStep::Owner);

        // Owner is terminal apart from going back.
        assert_eq!(flow.clone().apply(&BookingAction::ChoosePayNow).step, BookingStep::Owner);
    }

    #[tokio::test]
    async fn test_missing_fields_block_submission() {
        let gateway = FakeGateway::default();
        let flow = BookingFlow::resume("p1", BookingStep::Pay, BookingForm::default());

        let BookingOutcome::Render(flow) = flow.dispatch(BookingAction::Submit, ctx(&gateway)).await
        else {
            panic!("expected the form to be shown again");
        };

        assert_eq!(flow.step, BookingStep::Pay);
        assert_eq!(
            flow.errors,
            vec![
                "email: Enter a valid email address".to_string(),
                "full_name: Full name is required".to_string(),
                "phone_number: Enter a valid phone number".to_string(),
                "check_in: Check-in date is required".to_string(),
                "check_out: Check-out date is required".to_string(),
            ]
        );
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_mismatched_dates_block_submission() {
        let gateway = FakeGateway::default();
        let form = BookingForm {
            check_in: "2026-03-15".to_string(),
            check_out: "2026-03-12".to_string(),
            ..valid_form()
        };
        let flow = BookingFlow::resume("p1", BookingStep::Pay, form);

        let outcome = flow.dispatch(BookingAction::Submit, ctx(&gateway)).await;
        let BookingOutcome::Render(flow) = outcome else {
            panic!("expected errors");
        };
        assert_eq!(
            flow.errors,
            vec!["check_out: Check-out date must be after check-in date".to_string()]
        );
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_past_check_in_is_rejected() {
        let form = BookingForm {
            check_in: "2026-03-01".to_string(),
            ..valid_form()
        };
        assert_eq!(
            form.errors(today()),
            vec!["check_in: Check-in date cannot be in the past".to_string()]
        );
    }

    #[tokio::test]
    async fn test_valid_submission_redirects_to_gateway() {
        let gateway = FakeGateway::default();
        let flow = BookingFlow::resume("p1", BookingStep::Pay, valid_form());

        let outcome = flow.dispatch(BookingAction::Submit, ctx(&gateway)).await;
        assert_eq!(
            outcome,
            BookingOutcome::Redirect("https://checkout.example/abc".to_string())
        );

        let calls = gateway.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].property_id, "p1");
        assert_eq!(calls[0].check_in_date, NaiveDate::from_ymd_opt(2026, 3, 12).unwrap());
        assert_eq!(calls[0].callback_url, "http://localhost:3000/payments/verify");
    }

    #[tokio::test]
    async fn test_backend_failure_is_shown_inline_without_retry() {
        let gateway = FakeGateway {
            fail_with: Some("Property is not available for these dates".to_string()),
            ..Default::default()
        };
        let flow = BookingFlow::resume("p1", BookingStep::Pay, valid_form());

        let BookingOutcome::Render(flow) = flow.dispatch(BookingAction::Submit, ctx(&gateway)).await
        else {
            panic!("expected inline error");
        };
        assert_eq!(flow.step, BookingStep::Pay);
        assert_eq!(flow.errors, vec!["Property is not available for these dates".to_string()]);
        assert_eq!(flow.form, valid_form());
        assert_eq!(gateway.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_submit_outside_pay_step_does_nothing() {
        let gateway = FakeGateway::default();
        let flow = BookingFlow::resume("p1", BookingStep::Options, valid_form());
        let outcome = flow.clone().dispatch(BookingAction::Submit, ctx(&gateway)).await;
        assert_eq!(outcome, BookingOutcome::Render(flow));
        assert!(gateway.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_nights() {
        assert_eq!(valid_form().nights(), Some(3));
        assert_eq!(BookingForm::default().nights(), None);
    }
}
